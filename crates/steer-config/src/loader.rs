// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./steer.toml` > `~/.config/steer/steer.toml` > `/etc/steer/steer.toml`
//! with environment variable overrides via `STEER_` prefix, plus the provider
//! key variables `ZAI_API_KEY` and `OPENROUTER_API_KEY`.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SteerConfig;

/// Provider API key variables read without the `STEER_` prefix.
const PROVIDER_KEY_VARS: &[&str] = &["ZAI_API_KEY", "OPENROUTER_API_KEY"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/steer/steer.toml` (system-wide)
/// 3. `~/.config/steer/steer.toml` (user XDG config)
/// 4. `./steer.toml` (local directory)
/// 5. `ZAI_API_KEY` / `OPENROUTER_API_KEY`
/// 6. `STEER_*` environment variables
pub fn load_config() -> Result<SteerConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SteerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SteerConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SteerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SteerConfig::default()))
        .merge(Toml::file(path))
        .merge(provider_key_env())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SteerConfig::default()))
        .merge(Toml::file("/etc/steer/steer.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("steer/steer.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("steer.toml"))
        .merge(provider_key_env())
        .merge(env_provider())
}

/// Map the conventional provider key variables onto `providers.<name>.api_key`.
fn provider_key_env() -> Env {
    Env::raw().only(PROVIDER_KEY_VARS).map(|key| {
        let lower = key.as_str().to_ascii_lowercase();
        let name = lower.trim_end_matches("_api_key");
        format!("providers.{name}.api_key").into()
    })
}

/// Create the `STEER_` environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because field names contain
/// underscores: `STEER_ROUTER_PROVIDER_TIMEOUT_SECS` must become
/// `router.provider_timeout_secs`, not `router.provider.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("STEER_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = if let Some(rest) = key_str.strip_prefix("providers_zai_") {
            format!("providers.zai.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("providers_openrouter_") {
            format!("providers.openrouter.{rest}")
        } else {
            key_str
                .replacen("logging_", "logging.", 1)
                .replacen("router_", "router.", 1)
                .replacen("score_", "score.", 1)
        };
        mapped.into()
    })
}
