// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for the Steer model router.

pub mod breaker;

pub use breaker::{
    CircuitState, FailureOutcome, HealthTracker, ModelHealth, ProbeTicket, FAILURE_THRESHOLD,
    MAX_FAILURE_TIMESTAMPS,
};
