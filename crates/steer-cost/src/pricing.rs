// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing table and request cost estimation.
//!
//! Rates are USD per 1K tokens, blended across input and output:
//!
//! zai/glm-4.7-flash:                    $0.10  / 1M
//! zai/glm-4.5-flash:                    $0.05  / 1M
//! zai/glm-4-flash-250414:               $0.02  / 1M
//! arcee-ai/trinity-large-preview:free:  free

use steer_core::ModelConfig;

/// Input tokens assumed per message.
pub const ESTIMATED_INPUT_TOKENS: u64 = 2000;

/// Output tokens assumed per request.
pub const ESTIMATED_OUTPUT_TOKENS: u64 = 500;

/// Rate used for models missing from the table.
const DEFAULT_RATE_PER_1K: f64 = 0.0001;

/// Look up the USD-per-1K-token rate for a model.
///
/// Free models cost nothing. An explicit `cost_per_1k` override wins over the
/// built-in table, and unknown ids get the highest table rate.
pub fn rate_per_1k(model: &ModelConfig) -> f64 {
    if model.is_free {
        return 0.0;
    }
    if let Some(rate) = model.cost_per_1k {
        return rate;
    }
    match model.id.as_str() {
        "zai/glm-4.7-flash" => 0.0001,
        "zai/glm-4.5-flash" => 0.00005,
        "zai/glm-4-flash-250414" => 0.00002,
        "arcee-ai/trinity-large-preview:free" => 0.0,
        _ => DEFAULT_RATE_PER_1K,
    }
}

/// Estimate the USD cost of a request with `message_count` messages.
///
/// Formula: `(2000 * message_count + 500) / 1000 * rate_per_1k`.
pub fn estimate_cost(model: &ModelConfig, message_count: usize) -> f64 {
    let total_tokens = ESTIMATED_INPUT_TOKENS * message_count as u64 + ESTIMATED_OUTPUT_TOKENS;
    (total_tokens as f64 / 1000.0) * rate_per_1k(model)
}
