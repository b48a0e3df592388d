// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded in-memory log of routing attempts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use steer_core::ErrorType;
use tokio::sync::Mutex;

/// One provider attempt made while serving a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Model id of the attempted candidate.
    pub chosen_model: String,
    /// Candidates that failed earlier in the same request.
    pub fallback_count: usize,
    pub latency_ms: u64,
    pub cost_estimate: f64,
    pub error_type: Option<ErrorType>,
    pub success: bool,
    pub task_type: Option<String>,
}

/// Ring buffer of [`RequestLogEntry`], oldest evicted first.
#[derive(Debug)]
pub struct RequestLog {
    capacity: usize,
    entries: Mutex<VecDeque<RequestLogEntry>>,
}

impl RequestLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub async fn push(&self, entry: RequestLogEntry) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The `limit` most recent entries, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<RequestLogEntry> {
        let entries = self.entries.lock().await;
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
