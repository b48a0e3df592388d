// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `steer check` command implementation.
//!
//! Configuration errors stop the binary before this runs, so every check
//! here is about routing readiness rather than syntax.

use std::collections::BTreeSet;
use std::io::IsTerminal;

use steer_config::SteerConfig;
use steer_core::SteerError;

/// Status of a readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single readiness check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    fn warn(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

/// Run every readiness check against a validated configuration.
pub fn run_checks(config: &SteerConfig) -> Vec<CheckResult> {
    vec![
        check_models(config),
        check_credentials(config),
        check_fallback(config),
        check_watch_model(config),
        check_weights(config),
    ]
}

/// Run the `steer check` command.
///
/// Returns an error when any check fails; warnings are reported only.
pub fn run_check(config: &SteerConfig, plain: bool) -> Result<(), SteerError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = run_checks(config);

    println!();
    println!("  steer check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let fail_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warn_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    match fail_count + warn_count {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    if fail_count > 0 {
        return Err(SteerError::Config(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<16} {message}", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<16} {}", result.name, result.message)
    }
}

fn check_models(config: &SteerConfig) -> CheckResult {
    let primaries = config.models.iter().filter(|m| !m.fallback).count();
    if primaries == 0 {
        return CheckResult::fail(
            "Models",
            "every model is marked fallback; no primary model to rank",
        );
    }
    CheckResult::pass(
        "Models",
        format!(
            "{} configured ({primaries} primary), {} task rule(s)",
            config.models.len(),
            config.task_rules.len()
        ),
    )
}

fn check_credentials(config: &SteerConfig) -> CheckResult {
    let used: BTreeSet<&str> = config.models.iter().map(|m| m.provider.as_str()).collect();
    let missing: Vec<&str> = used
        .into_iter()
        .filter(|key| {
            config
                .providers
                .get(key)
                .is_none_or(|creds| creds.api_key.is_none())
        })
        .collect();

    if missing.is_empty() {
        CheckResult::pass("Credentials", "API keys present for every provider in use")
    } else {
        CheckResult::warn(
            "Credentials",
            format!("no API key for: {}", missing.join(", ")),
        )
    }
}

fn check_fallback(config: &SteerConfig) -> CheckResult {
    let fallbacks: Vec<&str> = config
        .models
        .iter()
        .filter(|m| m.fallback)
        .map(|m| m.alias.as_str())
        .collect();
    if fallbacks.is_empty() {
        CheckResult::warn("Fallback", "no fallback model configured")
    } else {
        CheckResult::pass("Fallback", fallbacks.join(", "))
    }
}

fn check_watch_model(config: &SteerConfig) -> CheckResult {
    let watch = &config.router.watch_model;
    if config.models.iter().any(|m| &m.id == watch) {
        CheckResult::pass("Watch model", watch.clone())
    } else {
        CheckResult::warn(
            "Watch model",
            format!("`{watch}` is not configured; fallback switching never triggers"),
        )
    }
}

fn check_weights(config: &SteerConfig) -> CheckResult {
    let s = &config.score;
    let sum = s.quality_weight + s.cost_weight + s.latency_weight + s.failure_weight;
    if (sum - 1.0).abs() > 1e-6 {
        CheckResult::warn("Score weights", format!("sum to {sum:.2}, expected 1.00"))
    } else {
        CheckResult::pass("Score weights", "sum to 1.00")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(results: &[CheckResult], name: &str) -> CheckStatus {
        results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.status)
            .unwrap()
    }

    #[test]
    fn default_config_only_lacks_credentials() {
        let results = run_checks(&SteerConfig::default());
        assert_eq!(status_of(&results, "Models"), CheckStatus::Pass);
        assert_eq!(status_of(&results, "Credentials"), CheckStatus::Warn);
        assert_eq!(status_of(&results, "Fallback"), CheckStatus::Pass);
        assert_eq!(status_of(&results, "Watch model"), CheckStatus::Pass);
        assert_eq!(status_of(&results, "Score weights"), CheckStatus::Pass);
    }

    #[test]
    fn credentials_pass_when_keys_present() {
        let mut config = SteerConfig::default();
        config.providers.zai.api_key = Some("zai-key".into());
        config.providers.openrouter.api_key = Some("or-key".into());
        let results = run_checks(&config);
        assert_eq!(status_of(&results, "Credentials"), CheckStatus::Pass);
    }

    #[test]
    fn all_fallback_models_fail() {
        let mut config = SteerConfig::default();
        for model in &mut config.models {
            model.fallback = true;
        }
        let results = run_checks(&config);
        assert_eq!(status_of(&results, "Models"), CheckStatus::Fail);
        assert!(run_check(&config, true).is_err());
    }

    #[test]
    fn missing_watch_model_warns() {
        let mut config = SteerConfig::default();
        config.router.watch_model = "nope".into();
        let results = run_checks(&config);
        assert_eq!(status_of(&results, "Watch model"), CheckStatus::Warn);
    }

    #[test]
    fn unbalanced_weights_warn() {
        let mut config = SteerConfig::default();
        config.score.quality_weight = 0.9;
        let results = run_checks(&config);
        let weights = results.iter().find(|r| r.name == "Score weights").unwrap();
        assert_eq!(weights.status, CheckStatus::Warn);
        assert!(weights.message.contains("1.55"));
    }

    #[test]
    fn plain_lines_are_tagged() {
        let line = format_line(&CheckResult::warn("Fallback", "none"), false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("none"));
    }
}
