// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimation for routed requests.
//!
//! Estimates are for logging and reporting only; they never gate routing.

pub mod pricing;

pub use pricing::{estimate_cost, rate_per_1k, ESTIMATED_INPUT_TOKENS, ESTIMATED_OUTPUT_TOKENS};
