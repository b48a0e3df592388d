// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adaptive model routing for the Steer model router.
//!
//! This crate provides:
//! - [`RouteEngine`]: score-ranked routing with per-model circuit breakers
//!   and an ordered fallback chain
//! - [`ProviderRegistry`]: provider adapters keyed by name
//! - [`RequestLog`]: bounded log of routing attempts
//! - [`detect_error_type`]: failure classification for health penalties

pub mod classifier;
pub mod registry;
pub mod request_log;
pub mod router;

pub use classifier::{classify_message, detect_error_type};
pub use registry::ProviderRegistry;
pub use request_log::{RequestLog, RequestLogEntry};
pub use router::{ModelStatus, RouteEngine, RouterStatus};
