// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the score engine, circuit breaker, and router.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Static description of one routable model.
///
/// Supplied by configuration and immutable for the lifetime of a router.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Unique key, e.g. `zai/glm-4.7-flash`.
    pub id: String,

    /// Display name used in logs and aggregate errors.
    pub alias: String,

    /// Key into the provider registry.
    pub provider: String,

    /// Preference rank; lower is preferred.
    #[serde(default = "default_tier")]
    pub tier: u32,

    /// Whether calls to this model are free of charge.
    #[serde(default)]
    pub is_free: bool,

    /// Only tried after every primary model has been exhausted.
    #[serde(default)]
    pub fallback: bool,

    /// Initial cost factor in `[0, 1]` for scoring (default 0.9).
    #[serde(default)]
    pub cost_score: Option<f64>,

    /// USD per 1K tokens, overriding the built-in pricing table.
    #[serde(default)]
    pub cost_per_1k: Option<f64>,
}

fn default_tier() -> u32 {
    1
}

impl ModelConfig {
    /// Build a primary, paid model with default scoring hints.
    pub fn new(
        id: impl Into<String>,
        alias: impl Into<String>,
        provider: impl Into<String>,
        tier: u32,
    ) -> Self {
        Self {
            id: id.into(),
            alias: alias.into(),
            provider: provider.into(),
            tier,
            is_free: false,
            fallback: false,
            cost_score: None,
            cost_per_1k: None,
        }
    }

    /// Mark the model as free.
    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    /// Mark the model as fallback-only.
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

/// Classified failure category for a provider call.
///
/// Produced by the router's heuristic classifier and consumed by the score
/// engine to pick a health penalty.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorType {
    RateLimit,
    InsufficientFunds,
    NetworkError,
    Other,
}

/// Speaker of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request options passed through to the provider.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Model id selected by the router for this attempt.
    pub model: Option<String>,
    /// Free-form task label; selects a task routing rule when one matches.
    pub task_type: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
    /// Per-call deadline overriding the router's configured provider timeout.
    pub timeout: Option<Duration>,
}

impl ChatOptions {
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}
