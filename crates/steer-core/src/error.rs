// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Steer model router.

use thiserror::Error;

/// The primary error type used across provider adapters and the router.
#[derive(Debug, Error)]
pub enum SteerError {
    /// Configuration errors (invalid TOML, inconsistent model tables).
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream provider failure (HTTP error, rate limit, exhausted balance).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A model references a provider key that was never registered.
    #[error("provider {name} not found")]
    ProviderNotFound { name: String },

    /// The model's circuit is open; the call was short-circuited.
    #[error("model {model} is unhealthy")]
    ProviderUnavailable { model: String },

    /// A provider call exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Every candidate in the fallback chain failed.
    #[error("all models failed (tried: {})", attempted.join(", "))]
    AllModelsFailed { attempted: Vec<String> },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SteerError {
    /// Shorthand for a [`SteerError::Provider`] without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        SteerError::Provider {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_models_failed_lists_aliases() {
        let err = SteerError::AllModelsFailed {
            attempted: vec!["GLM".into(), "GLM-450".into()],
        };
        assert_eq!(err.to_string(), "all models failed (tried: GLM, GLM-450)");
    }

    #[test]
    fn provider_shorthand_has_no_source() {
        let err = SteerError::provider("HTTP 429");
        assert!(matches!(err, SteerError::Provider { ref source, .. } if source.is_none()));
        assert_eq!(err.to_string(), "provider error: HTTP 429");
    }

    #[test]
    fn unavailable_names_model() {
        let err = SteerError::ProviderUnavailable {
            model: "TRINITY-FREE".into(),
        };
        assert!(err.to_string().contains("TRINITY-FREE"));
    }
}
