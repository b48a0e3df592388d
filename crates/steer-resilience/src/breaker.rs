// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-model circuit breaker.
//!
//! ```text
//! Closed --3 consecutive failures--> Open --probe begins--> HalfOpen
//!   ^                                  ^                       |
//!   |                                  +----probe fails--------+
//!   +-------------------any success----------------------------+
//! ```
//!
//! The tracker only holds state. Scheduling the recovery probe is the
//! caller's job: [`HealthTracker::record_failure`] hands out a
//! [`ProbeTicket`] when one is due, and the probe reports back with it.
//!
//! While a probe is in flight the breaker is Half-Open and admits a single
//! live request, claimed through [`HealthTracker::try_acquire_trial`].

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Consecutive failures that open a closed breaker.
pub const FAILURE_THRESHOLD: u32 = 3;

/// Failure timestamps retained per model.
pub const MAX_FAILURE_TIMESTAMPS: usize = 10;

/// Breaker state derived from a [`ModelHealth`] record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Health record for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelHealth {
    pub is_unhealthy: bool,
    pub is_half_open: bool,
    pub consecutive_failures: u32,
    /// Most recent failures, oldest first.
    pub failure_timestamps: VecDeque<DateTime<Utc>>,
    pub last_check: DateTime<Utc>,
    pub last_fail_time: Option<DateTime<Utc>>,
    /// A recovery probe is pending or in flight.
    pub probe_scheduled: bool,
    /// The live request allowed through this half-open window was taken.
    pub trial_taken: bool,
    #[serde(skip)]
    probe_generation: u64,
}

impl ModelHealth {
    fn new() -> Self {
        Self {
            is_unhealthy: false,
            is_half_open: false,
            consecutive_failures: 0,
            failure_timestamps: VecDeque::with_capacity(MAX_FAILURE_TIMESTAMPS),
            last_check: Utc::now(),
            last_fail_time: None,
            probe_scheduled: false,
            trial_taken: false,
            probe_generation: 0,
        }
    }

    pub fn state(&self) -> CircuitState {
        match (self.is_unhealthy, self.is_half_open) {
            (false, _) => CircuitState::Closed,
            (true, false) => CircuitState::Open,
            (true, true) => CircuitState::HalfOpen,
        }
    }

    fn push_failure(&mut self, at: DateTime<Utc>) {
        if self.failure_timestamps.len() == MAX_FAILURE_TIMESTAMPS {
            self.failure_timestamps.pop_front();
        }
        self.failure_timestamps.push_back(at);
        self.last_fail_time = Some(at);
    }

    fn holds(&self, ticket: ProbeTicket) -> bool {
        self.probe_scheduled && self.probe_generation == ticket.0
    }
}

/// Authorization for one recovery-probe loop.
///
/// Tickets go stale once the model closes, so a probe that outlives its
/// breaker cycle cannot flip a newer cycle's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTicket(u64);

/// Result of [`HealthTracker::record_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    /// This failure moved the breaker from Closed to Open.
    pub opened: bool,
    /// Set when the caller must schedule a recovery probe.
    pub probe: Option<ProbeTicket>,
}

/// Circuit breakers for every configured model.
///
/// Ids that were never registered read as [`CircuitState::Closed`] and
/// ignore updates.
#[derive(Debug, Default)]
pub struct HealthTracker {
    models: DashMap<String, ModelHealth>,
}

impl HealthTracker {
    pub fn new<I, S>(model_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: model_ids
                .into_iter()
                .map(|id| (id.into(), ModelHealth::new()))
                .collect(),
        }
    }

    pub fn state(&self, model_id: &str) -> CircuitState {
        self.models
            .get(model_id)
            .map_or(CircuitState::Closed, |h| h.state())
    }

    pub fn is_unhealthy(&self, model_id: &str) -> bool {
        self.state(model_id) != CircuitState::Closed
    }

    /// Copy of one model's record.
    pub fn health(&self, model_id: &str) -> Option<ModelHealth> {
        self.models.get(model_id).map(|h| h.clone())
    }

    /// Close the breaker and reset the failure counter.
    pub fn record_success(&self, model_id: &str) {
        let Some(mut health) = self.models.get_mut(model_id) else {
            return;
        };
        let previous = health.state();
        health.is_unhealthy = false;
        health.is_half_open = false;
        health.consecutive_failures = 0;
        health.probe_scheduled = false;
        health.trial_taken = false;
        health.last_check = Utc::now();

        if previous != CircuitState::Closed {
            info!(model_id, from = %previous, "circuit closed");
        }
    }

    /// Count a failure, opening the breaker at [`FAILURE_THRESHOLD`].
    pub fn record_failure(&self, model_id: &str) -> FailureOutcome {
        let Some(mut health) = self.models.get_mut(model_id) else {
            return FailureOutcome {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened: false,
                probe: None,
            };
        };

        let was_closed = !health.is_unhealthy;
        health.consecutive_failures += 1;
        health.push_failure(Utc::now());

        // A failed half-open trial leaves the in-flight probe to settle the state.
        if health.consecutive_failures >= FAILURE_THRESHOLD {
            health.is_unhealthy = true;
            if !health.probe_scheduled {
                health.is_half_open = false;
            }
        }

        let opened = was_closed && health.is_unhealthy;
        if opened {
            warn!(
                model_id,
                consecutive_failures = health.consecutive_failures,
                "circuit opened"
            );
        }

        let probe = if health.is_unhealthy && !health.probe_scheduled {
            health.probe_scheduled = true;
            health.probe_generation += 1;
            Some(ProbeTicket(health.probe_generation))
        } else {
            None
        };

        FailureOutcome {
            state: health.state(),
            consecutive_failures: health.consecutive_failures,
            opened,
            probe,
        }
    }

    /// Move an Open breaker to Half-Open ahead of a probe request.
    ///
    /// Returns `false` when the ticket is stale or the model is no longer
    /// open; the probe should then be dropped.
    pub fn begin_probe(&self, model_id: &str, ticket: ProbeTicket) -> bool {
        let Some(mut health) = self.models.get_mut(model_id) else {
            return false;
        };
        if !health.holds(ticket) || !health.is_unhealthy {
            debug!(model_id, "stale recovery probe dropped");
            return false;
        }
        health.is_half_open = true;
        health.trial_taken = false;
        health.last_check = Utc::now();
        info!(model_id, "circuit half-open, probing");
        true
    }

    /// Return a breaker to Open after a failed probe.
    ///
    /// The failure counter is left as is. Returns `true` when the caller
    /// should schedule another probe with the same ticket.
    pub fn abort_probe(&self, model_id: &str, ticket: ProbeTicket) -> bool {
        let Some(mut health) = self.models.get_mut(model_id) else {
            return false;
        };
        if !health.holds(ticket) || !health.is_unhealthy {
            return false;
        }
        health.is_half_open = false;
        health.trial_taken = false;
        health.push_failure(Utc::now());
        warn!(model_id, "recovery probe failed, circuit re-opened");
        true
    }

    /// Give up on a probe loop without changing the breaker state.
    pub fn cancel_probe(&self, model_id: &str, ticket: ProbeTicket) {
        if let Some(mut health) = self.models.get_mut(model_id)
            && health.holds(ticket)
        {
            health.probe_scheduled = false;
            health.is_half_open = false;
            health.trial_taken = false;
        }
    }

    /// Decide whether a live request may call `model_id` now.
    ///
    /// Closed breakers always admit and Open ones never do. A Half-Open
    /// breaker admits the first caller of its window and rejects the rest.
    pub fn try_acquire_trial(&self, model_id: &str) -> bool {
        let Some(mut health) = self.models.get_mut(model_id) else {
            return true;
        };
        match health.state() {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen if health.trial_taken => false,
            CircuitState::HalfOpen => {
                health.trial_taken = true;
                true
            }
        }
    }

    /// Every record, ordered by model id.
    pub fn snapshot(&self) -> BTreeMap<String, ModelHealth> {
        self.models
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
