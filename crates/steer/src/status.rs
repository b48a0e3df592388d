// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `steer status` command implementation.
//!
//! Builds a route engine from the configuration and prints its snapshot:
//! the model table in first-request order, each model's score, circuit
//! state, and estimated cost per single-message request.

use std::io::IsTerminal;

use serde::Serialize;
use steer_config::SteerConfig;
use steer_core::SteerError;
use steer_cost::estimate_cost;
use steer_router::{ProviderRegistry, RouteEngine, RouterStatus};

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub router: RouterStatus,
    pub watch_model: String,
    pub credentials: Vec<&'static str>,
    /// Estimated USD cost of a one-message request, per model id.
    pub cost_per_request: Vec<(String, f64)>,
}

pub async fn build_report(config: &SteerConfig) -> StatusReport {
    let engine = RouteEngine::new(config, ProviderRegistry::new());
    let router = engine.get_status().await;
    engine.shutdown();

    StatusReport {
        router,
        watch_model: config.router.watch_model.clone(),
        credentials: config.providers.configured(),
        cost_per_request: config
            .models
            .iter()
            .map(|m| (m.id.clone(), estimate_cost(m, 1)))
            .collect(),
    }
}

/// Run the `steer status` command.
pub async fn run_status(config: &SteerConfig, json: bool, plain: bool) -> Result<(), SteerError> {
    let report = build_report(config).await;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| SteerError::Internal(format!("failed to serialize status: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    print_report(&report, use_color);
    Ok(())
}

fn print_report(report: &StatusReport, use_color: bool) {
    println!();
    println!("  steer status");
    println!("  {}", "-".repeat(72));
    println!(
        "    {:<38} {:<14} {:>4} {:>6} {:>10}",
        "MODEL", "ALIAS", "TIER", "SCORE", "STATE"
    );

    for model in &report.router.models {
        let mut alias = model.config.alias.clone();
        if model.config.fallback {
            alias.push('*');
        }
        let state = model.state.to_string();
        let state = if use_color {
            use colored::Colorize;
            match model.state {
                steer_resilience::CircuitState::Closed => state.green().to_string(),
                steer_resilience::CircuitState::HalfOpen => state.yellow().to_string(),
                steer_resilience::CircuitState::Open => state.red().to_string(),
            }
        } else {
            state
        };
        println!(
            "    {:<38} {:<14} {:>4} {:>6.3} {:>10}",
            model.config.id, alias, model.config.tier, model.score, state
        );
    }

    println!();
    println!("    * fallback model, tried after every primary");
    println!("    Watch model:  {}", report.watch_model);
    println!(
        "    Fallback:     {}",
        if report.router.should_switch_to_fallback {
            "switch recommended"
        } else {
            "not needed"
        }
    );
    let credentials = if report.credentials.is_empty() {
        "none".to_string()
    } else {
        report.credentials.join(", ")
    };
    println!("    Credentials:  {credentials}");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_covers_every_model() {
        let config = SteerConfig::default();
        let report = build_report(&config).await;
        assert_eq!(report.router.models.len(), config.models.len());
        assert_eq!(report.cost_per_request.len(), config.models.len());
        assert!(!report.router.should_switch_to_fallback);
        assert!(report.router.providers.is_empty());
        assert_eq!(report.router.request_log_len, 0);
    }

    #[tokio::test]
    async fn report_serializes_flat() {
        let mut config = SteerConfig::default();
        config.providers.zai.api_key = Some("k".into());
        let report = build_report(&config).await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["watch_model"], "zai/glm-4.7-flash");
        assert_eq!(json["credentials"][0], "zai");
        assert_eq!(json["should_switch_to_fallback"], false);
        assert_eq!(json["models"][0]["state"], "closed");
        assert_eq!(json["cost_per_request"][3][1], 0.0);
    }
}
