// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider failure classification.
//!
//! Maps an error to an [`ErrorType`], which drives the health penalty in
//! the score engine.

use steer_core::{ErrorType, SteerError};

const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "429"];
const FUNDS_MARKERS: &[&str] = &["insufficient funds", "balance"];
const NETWORK_MARKERS: &[&str] = &["network", "timeout"];

/// Classify a provider failure.
///
/// Deadline expiry is always a network error. Anything else is matched
/// case-insensitively against the error text, first match wins.
pub fn detect_error_type(err: &SteerError) -> ErrorType {
    if matches!(err, SteerError::Timeout { .. }) {
        return ErrorType::NetworkError;
    }
    classify_message(&err.to_string())
}

/// Substring heuristic over an error message.
pub fn classify_message(message: &str) -> ErrorType {
    let message = message.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

    if mentions(RATE_LIMIT_MARKERS) {
        ErrorType::RateLimit
    } else if mentions(FUNDS_MARKERS) {
        ErrorType::InsufficientFunds
    } else if mentions(NETWORK_MARKERS) {
        ErrorType::NetworkError
    } else {
        ErrorType::Other
    }
}
