// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Steer model router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use steer_core::ModelConfig;

/// Top-level Steer configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SteerConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fallback loop and circuit breaker settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Score engine weights.
    #[serde(default)]
    pub score: ScoreConfig,

    /// Upstream provider credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Routable models, in preference order.
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,

    /// Task-type specific candidate pools, keyed by task type.
    #[serde(default)]
    pub task_rules: BTreeMap<String, TaskRule>,
}

impl Default for SteerConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            router: RouterConfig::default(),
            score: ScoreConfig::default(),
            providers: ProvidersConfig::default(),
            models: default_models(),
            task_rules: BTreeMap::new(),
        }
    }
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new("zai/glm-4.7-flash", "GLM", "zai", 1),
        ModelConfig::new("zai/glm-4.5-flash", "GLM-450", "zai", 2),
        ModelConfig::new("zai/glm-4-flash-250414", "GLM-4-2504", "zai", 3),
        ModelConfig::new(
            "arcee-ai/trinity-large-preview:free",
            "TRINITY-FREE",
            "openrouter",
            4,
        )
        .free()
        .as_fallback(),
    ]
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Route engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Delay between a circuit opening and its recovery probe, in seconds.
    #[serde(default = "default_half_open_recovery_secs")]
    pub half_open_recovery_secs: u64,

    /// Deadline for a single provider call, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Number of request log entries kept in memory.
    #[serde(default = "default_request_log_capacity")]
    pub request_log_capacity: usize,

    /// Model whose outage flips the switch-to-fallback signal.
    #[serde(default = "default_watch_model")]
    pub watch_model: String,
}

impl RouterConfig {
    pub fn half_open_recovery(&self) -> Duration {
        Duration::from_secs(self.half_open_recovery_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            half_open_recovery_secs: default_half_open_recovery_secs(),
            provider_timeout_secs: default_provider_timeout_secs(),
            request_log_capacity: default_request_log_capacity(),
            watch_model: default_watch_model(),
        }
    }
}

fn default_half_open_recovery_secs() -> u64 {
    600 // 10 minutes
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_request_log_capacity() -> usize {
    1000
}

fn default_watch_model() -> String {
    "zai/glm-4.7-flash".to_string()
}

/// Score engine configuration.
///
/// The four weights are expected to sum to 1.0. This is not enforced; the
/// engine logs a warning when they do not.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreConfig {
    #[serde(default = "default_quality_weight")]
    pub quality_weight: f64,

    #[serde(default = "default_cost_weight")]
    pub cost_weight: f64,

    #[serde(default = "default_latency_weight")]
    pub latency_weight: f64,

    #[serde(default = "default_failure_weight")]
    pub failure_weight: f64,

    /// Multiply the weighted score by the model's health factor.
    #[serde(default = "default_dynamic_tier")]
    pub dynamic_tier: bool,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            quality_weight: default_quality_weight(),
            cost_weight: default_cost_weight(),
            latency_weight: default_latency_weight(),
            failure_weight: default_failure_weight(),
            dynamic_tier: default_dynamic_tier(),
        }
    }
}

fn default_quality_weight() -> f64 {
    0.35
}

fn default_cost_weight() -> f64 {
    0.25
}

fn default_latency_weight() -> f64 {
    0.20
}

fn default_failure_weight() -> f64 {
    0.20
}

fn default_dynamic_tier() -> bool {
    true
}

/// Credentials for the built-in provider keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default = "default_zai")]
    pub zai: ProviderCredentials,

    #[serde(default = "default_openrouter")]
    pub openrouter: ProviderCredentials,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            zai: default_zai(),
            openrouter: default_openrouter(),
        }
    }
}

impl ProvidersConfig {
    /// Provider keys with a `[providers.<key>]` section.
    pub const KNOWN: &'static [&'static str] = &["zai", "openrouter"];

    /// Credentials for a provider key, if it is a known provider.
    pub fn get(&self, key: &str) -> Option<&ProviderCredentials> {
        match key {
            "zai" => Some(&self.zai),
            "openrouter" => Some(&self.openrouter),
            _ => None,
        }
    }

    /// Provider keys that have an API key configured, in stable order.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.zai.api_key.is_some() {
            keys.push("zai");
        }
        if self.openrouter.api_key.is_some() {
            keys.push("openrouter");
        }
        keys
    }
}

/// API key and endpoint for one provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderCredentials {
    /// API key. `None` requires the provider's environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    pub base_url: String,
}

fn default_zai() -> ProviderCredentials {
    ProviderCredentials {
        api_key: None,
        base_url: "https://api.zhipuai.cn/v4".to_string(),
    }
}

fn default_openrouter() -> ProviderCredentials {
    ProviderCredentials {
        api_key: None,
        base_url: "https://openrouter.ai/api/v1".to_string(),
    }
}

/// Candidate pool for one task type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskRule {
    /// Model ids eligible for this task type.
    pub models: Vec<String>,

    /// Human-readable reason, logged with routing decisions.
    #[serde(default)]
    pub reason: Option<String>,
}
