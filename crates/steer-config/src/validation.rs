// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: unique model ids, known
//! providers, task rules that name real models, non-negative weights and
//! non-zero timeouts.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{ProvidersConfig, SteerConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &SteerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        invalid(format!(
            "logging.level `{}` must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.models.is_empty() {
        invalid("at least one [[models]] entry is required".to_string());
    }

    let mut seen_ids = HashSet::new();
    for (i, model) in config.models.iter().enumerate() {
        if model.id.trim().is_empty() {
            invalid(format!("models[{i}].id must not be empty"));
        } else if !seen_ids.insert(model.id.as_str()) {
            invalid(format!("duplicate model id `{}` in [[models]] array", model.id));
        }

        if model.provider.trim().is_empty() {
            invalid(format!("models[{i}].provider must not be empty"));
        } else if !ProvidersConfig::KNOWN.contains(&model.provider.as_str()) {
            invalid(format!(
                "models[{i}].provider `{}` is not a known provider (expected one of {})",
                model.provider,
                ProvidersConfig::KNOWN.join(", ")
            ));
        }

        if let Some(cost_score) = model.cost_score
            && !(0.0..=1.0).contains(&cost_score)
        {
            invalid(format!(
                "models[{i}].cost_score must be within 0.0..=1.0, got {cost_score}"
            ));
        }

        if let Some(rate) = model.cost_per_1k
            && rate < 0.0
        {
            invalid(format!(
                "models[{i}].cost_per_1k must be non-negative, got {rate}"
            ));
        }
    }

    for (task, rule) in &config.task_rules {
        if rule.models.is_empty() {
            invalid(format!("task_rules.{task}.models must not be empty"));
        }
        for id in &rule.models {
            if !seen_ids.contains(id.as_str()) {
                invalid(format!(
                    "task_rules.{task} references unknown model `{id}`"
                ));
            }
        }
    }

    let weights = [
        ("quality_weight", config.score.quality_weight),
        ("cost_weight", config.score.cost_weight),
        ("latency_weight", config.score.latency_weight),
        ("failure_weight", config.score.failure_weight),
    ];
    for (name, weight) in weights {
        if weight < 0.0 || !weight.is_finite() {
            invalid(format!("score.{name} must be a non-negative number, got {weight}"));
        }
    }

    if config.router.half_open_recovery_secs == 0 {
        invalid("router.half_open_recovery_secs must be greater than 0".to_string());
    }

    if config.router.provider_timeout_secs == 0 {
        invalid("router.provider_timeout_secs must be greater than 0".to_string());
    }

    if config.router.request_log_capacity == 0 {
        invalid("router.request_log_capacity must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskRule;
    use steer_core::ModelConfig;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = SteerConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_model_list_fails_validation() {
        let mut config = SteerConfig::default();
        config.models.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "[[models]]"));
    }

    #[test]
    fn duplicate_model_ids_fail_validation() {
        let mut config = SteerConfig::default();
        config.models = vec![
            ModelConfig::new("zai/glm-4.7-flash", "GLM", "zai", 1),
            ModelConfig::new("zai/glm-4.7-flash", "GLM-again", "zai", 2),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate model id"));
    }

    #[test]
    fn task_rule_with_unknown_model_fails_validation() {
        let mut config = SteerConfig::default();
        config.task_rules.insert(
            "tool_call".to_string(),
            TaskRule {
                models: vec!["zai/glm-9".to_string()],
                reason: None,
            },
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "unknown model `zai/glm-9`"));
    }

    #[test]
    fn negative_weight_fails_validation() {
        let mut config = SteerConfig::default();
        config.score.cost_weight = -0.1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "score.cost_weight"));
    }

    #[test]
    fn weights_not_summing_to_one_are_accepted() {
        let mut config = SteerConfig::default();
        config.score.quality_weight = 0.9;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_timeout_and_capacity_fail_validation() {
        let mut config = SteerConfig::default();
        config.router.provider_timeout_secs = 0;
        config.router.request_log_capacity = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn zero_recovery_delay_fails_validation() {
        let mut config = SteerConfig::default();
        config.router.half_open_recovery_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_message(&errors, "router.half_open_recovery_secs"));
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = SteerConfig::default();
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn unknown_provider_fails_validation() {
        let mut config = SteerConfig::default();
        config.models[0].provider = "anthropic".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "`anthropic` is not a known provider"));
    }

    #[test]
    fn out_of_range_cost_score_fails_validation() {
        let mut config = SteerConfig::default();
        config.models[0].cost_score = Some(1.5);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "cost_score"));
    }
}
