// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `steer estimate` command implementation.

use steer_config::SteerConfig;
use steer_core::{ModelConfig, SteerError};
use steer_cost::{estimate_cost, rate_per_1k, ESTIMATED_INPUT_TOKENS, ESTIMATED_OUTPUT_TOKENS};

/// Find a model by id, falling back to a case-insensitive alias match.
pub fn find_model<'a>(config: &'a SteerConfig, key: &str) -> Option<&'a ModelConfig> {
    config
        .models
        .iter()
        .find(|m| m.id == key)
        .or_else(|| config.models.iter().find(|m| m.alias.eq_ignore_ascii_case(key)))
}

pub fn run_estimate(config: &SteerConfig, key: &str, messages: usize) -> Result<(), SteerError> {
    let model = find_model(config, key)
        .ok_or_else(|| SteerError::Config(format!("unknown model `{key}`")))?;

    let tokens = ESTIMATED_INPUT_TOKENS * messages as u64 + ESTIMATED_OUTPUT_TOKENS;
    let cost = estimate_cost(model, messages);

    println!("{} ({})", model.alias, model.id);
    println!("  messages:  {messages}");
    println!("  tokens:    ~{tokens}");
    println!("  rate:      ${:.6} / 1K tokens", rate_per_1k(model));
    println!("  estimate:  ${cost:.6}");
    Ok(())
}
