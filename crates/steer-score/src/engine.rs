// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weighted multi-factor model scoring.
//!
//! Each model carries four factor sub-scores (quality, cost, latency,
//! failure) plus an independent health factor. The composite score is the
//! weighted factor sum, damped by health when dynamic tiering is on.

use std::collections::BTreeMap;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use steer_config::model::ScoreConfig;
use steer_core::{ErrorType, ModelConfig};
use tracing::{debug, info, warn};

/// Health regained per successful call.
const SUCCESS_RECOVERY: f64 = 0.05;

/// Latency at or above which the latency factor bottoms out at zero.
const LATENCY_CEILING_MS: f64 = 5000.0;

/// Assumed latency before any call has been observed.
const BASELINE_LATENCY_MS: f64 = 1000.0;

/// Cost factor for models without an explicit `cost_score`.
const DEFAULT_COST_SCORE: f64 = 0.9;

/// Health lost for a failed call of the given category.
pub fn health_penalty(error_type: ErrorType) -> f64 {
    match error_type {
        ErrorType::RateLimit => 0.10,
        ErrorType::InsufficientFunds => 0.20,
        ErrorType::NetworkError => 0.05,
        ErrorType::Other => 0.15,
    }
}

fn latency_factor(latency: Duration) -> f64 {
    (1.0 - latency.as_secs_f64() * 1000.0 / LATENCY_CEILING_MS).max(0.0)
}

/// Running statistics and factor sub-scores for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelScore {
    /// Cached composite score from the last update.
    pub score: f64,
    pub quality: f64,
    pub cost: f64,
    pub latency: f64,
    /// Mirrors `health`; kept as a separate weighted factor.
    pub failure: f64,
    pub health: f64,
    pub use_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
}

impl ModelScore {
    fn initial(model: &ModelConfig) -> Self {
        Self {
            score: 0.0,
            quality: 1.0,
            cost: model.cost_score.unwrap_or(DEFAULT_COST_SCORE),
            latency: 1.0 - BASELINE_LATENCY_MS / LATENCY_CEILING_MS,
            failure: 1.0,
            health: 1.0,
            use_count: 0,
            success_count: 0,
            failure_count: 0,
        }
    }

    fn success_rate(&self) -> Option<f64> {
        (self.use_count > 0).then(|| self.success_count as f64 / self.use_count as f64)
    }
}

/// Observations attached to a usage record.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageMetrics {
    /// Wall-clock latency of the provider call, when it completed.
    pub latency: Option<Duration>,
    /// Failure category, for failed calls.
    pub error_type: Option<ErrorType>,
}

impl UsageMetrics {
    pub fn latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            error_type: None,
        }
    }

    pub fn error(error_type: ErrorType) -> Self {
        Self {
            latency: None,
            error_type: Some(error_type),
        }
    }
}

/// Per-model usage counters for observability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub use_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    /// Percentage with two decimals (`"66.67%"`), or `"N/A"` before any use.
    pub success_rate: String,
    pub avg_health: f64,
}

/// Snapshot of one model's score state.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredModel {
    pub id: String,
    #[serde(flatten)]
    pub score: ModelScore,
}

/// Snapshot of the whole engine.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEngineStatus {
    pub weights: ScoreConfig,
    pub models: Vec<ScoredModel>,
}

/// Ranks models by composite score and tracks per-model usage.
///
/// Entries live in a [`DashMap`], so concurrent `record_usage` calls for the
/// same model serialize on that model's shard lock.
pub struct ScoreEngine {
    config: ScoreConfig,
    scores: DashMap<String, ModelScore>,
}

impl ScoreEngine {
    /// Create an engine with one score entry per configured model.
    pub fn new(config: ScoreConfig, models: &[ModelConfig]) -> Self {
        let sum =
            config.quality_weight + config.cost_weight + config.latency_weight + config.failure_weight;
        if (sum - 1.0).abs() > 1e-6 {
            warn!(sum, "score weights do not sum to 1.0");
        }

        let engine = Self {
            config,
            scores: models
                .iter()
                .map(|m| (m.id.clone(), ModelScore::initial(m)))
                .collect(),
        };
        for mut entry in engine.scores.iter_mut() {
            let score = engine.composite(entry.value());
            entry.value_mut().score = score;
        }
        engine
    }

    fn composite(&self, s: &ModelScore) -> f64 {
        let raw = s.quality * self.config.quality_weight
            + s.cost * self.config.cost_weight
            + s.latency * self.config.latency_weight
            + s.failure * self.config.failure_weight;
        if self.config.dynamic_tier {
            raw * s.health
        } else {
            raw
        }
    }

    /// Composite score for a model, recomputed from its current factors.
    ///
    /// Unknown ids score 0.0.
    pub fn calculate_score(&self, model_id: &str) -> f64 {
        let Some(entry) = self.scores.get(model_id) else {
            warn!(model_id, "model not found in score engine");
            return 0.0;
        };
        let score = self.composite(entry.value());
        debug!(
            model_id,
            score = format!("{score:.2}"),
            health = entry.health,
            "model score calculated"
        );
        score
    }

    /// Highest-scoring candidate; the earliest one wins ties.
    ///
    /// Returns `None` only for an empty candidate list.
    pub fn select_best_model(&self, candidates: &[ModelConfig]) -> Option<String> {
        let mut best: Option<(&ModelConfig, f64)> = None;
        for model in candidates {
            let score = self.calculate_score(&model.id);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((model, score));
            }
        }

        match best {
            Some((model, score)) => {
                info!(
                    model_id = model.id.as_str(),
                    alias = model.alias.as_str(),
                    score = format!("{score:.2}"),
                    "best model selected"
                );
                Some(model.id.clone())
            }
            None => {
                warn!("no models available for selection");
                None
            }
        }
    }

    /// Fold the outcome of one call into the model's statistics.
    pub fn record_usage(&self, model_id: &str, success: bool, metrics: UsageMetrics) {
        let Some(mut entry) = self.scores.get_mut(model_id) else {
            warn!(model_id, "usage recorded for unknown model");
            return;
        };
        let s = entry.value_mut();

        s.use_count += 1;
        if success {
            s.success_count += 1;
            s.health = (s.health + SUCCESS_RECOVERY).min(1.0);
        } else {
            s.failure_count += 1;
            let penalty = health_penalty(metrics.error_type.unwrap_or(ErrorType::Other));
            s.health = (s.health - penalty).max(0.0);
            warn!(
                model_id,
                error_type = ?metrics.error_type,
                health = format!("{:.2}", s.health),
                use_count = s.use_count,
                failure_count = s.failure_count,
                "model failure recorded"
            );
        }

        s.quality = 0.5 + 0.5 * s.success_rate().unwrap_or(1.0);
        if let Some(latency) = metrics.latency {
            s.latency = latency_factor(latency);
        }
        s.failure = s.health;
        s.score = self.composite(s);
    }

    /// Usage counters per model, ordered by id.
    pub fn get_model_stats(&self) -> BTreeMap<String, ModelStats> {
        self.scores
            .iter()
            .map(|entry| {
                let s = entry.value();
                let success_rate = match s.success_rate() {
                    Some(rate) => format!("{:.2}%", rate * 100.0),
                    None => "N/A".to_string(),
                };
                let stats = ModelStats {
                    use_count: s.use_count,
                    success_count: s.success_count,
                    failure_count: s.failure_count,
                    success_rate,
                    avg_health: (s.health * 100.0).round() / 100.0,
                };
                (entry.key().clone(), stats)
            })
            .collect()
    }

    /// Weights plus a copy of every model's score state, ordered by id.
    pub fn get_status(&self) -> ScoreEngineStatus {
        let mut models: Vec<ScoredModel> = self
            .scores
            .iter()
            .map(|entry| ScoredModel {
                id: entry.key().clone(),
                score: entry.value().clone(),
            })
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        ScoreEngineStatus {
            weights: self.config.clone(),
            models,
        }
    }

    /// Copy of a single model's score state.
    pub fn model_score(&self, model_id: &str) -> Option<ModelScore> {
        self.scores.get(model_id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn models() -> Vec<ModelConfig> {
        vec![
            ModelConfig::new("a", "A", "zai", 1),
            ModelConfig::new("b", "B", "zai", 2),
            ModelConfig::new("c", "C", "openrouter", 3).free(),
        ]
    }

    fn engine() -> ScoreEngine {
        ScoreEngine::new(ScoreConfig::default(), &models())
    }

    #[test]
    fn initial_score_uses_default_factors() {
        let engine = engine();
        // 1.0*0.35 + 0.9*0.25 + 0.8*0.20 + 1.0*0.20 = 0.935
        assert!((engine.calculate_score("a") - 0.935).abs() < 1e-9);
        let cached = engine.model_score("a").unwrap().score;
        assert!((cached - 0.935).abs() < 1e-9);
    }

    #[test]
    fn select_best_of_empty_is_none() {
        assert_eq!(engine().select_best_model(&[]), None);
    }

    #[test]
    fn select_best_of_singleton_ignores_score() {
        let engine = engine();
        for _ in 0..10 {
            engine.record_usage("b", false, UsageMetrics::error(ErrorType::InsufficientFunds));
        }
        assert_eq!(engine.calculate_score("b"), 0.0);
        assert_eq!(
            engine.select_best_model(&models()[1..2]),
            Some("b".to_string())
        );
    }

    #[test]
    fn ties_go_to_earliest_candidate() {
        let engine = engine();
        let mut reversed = models();
        reversed.reverse();
        assert_eq!(engine.select_best_model(&models()), Some("a".to_string()));
        assert_eq!(engine.select_best_model(&reversed), Some("c".to_string()));
    }

    #[test]
    fn failure_demotes_model() {
        let engine = engine();
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::RateLimit));
        assert_eq!(engine.select_best_model(&models()), Some("b".to_string()));
    }

    #[test]
    fn penalties_follow_error_category() {
        let engine = engine();
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::RateLimit));
        engine.record_usage("b", false, UsageMetrics::error(ErrorType::InsufficientFunds));
        engine.record_usage("c", false, UsageMetrics::default());

        assert!((engine.model_score("a").unwrap().health - 0.90).abs() < 1e-9);
        assert!((engine.model_score("b").unwrap().health - 0.80).abs() < 1e-9);
        assert!((engine.model_score("c").unwrap().health - 0.85).abs() < 1e-9);
    }

    #[test]
    fn success_recovers_health_up_to_one() {
        let engine = engine();
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::NetworkError));
        engine.record_usage("a", true, UsageMetrics::default());
        engine.record_usage("a", true, UsageMetrics::default());
        assert_eq!(engine.model_score("a").unwrap().health, 1.0);
    }

    #[test]
    fn quality_tracks_success_rate() {
        let engine = engine();
        engine.record_usage("a", true, UsageMetrics::default());
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::Other));
        let s = engine.model_score("a").unwrap();
        assert!((s.quality - 0.75).abs() < 1e-9);
    }

    #[test]
    fn latency_factor_only_updates_when_observed() {
        let engine = engine();
        engine.record_usage("a", true, UsageMetrics::latency(Duration::from_millis(2500)));
        assert!((engine.model_score("a").unwrap().latency - 0.5).abs() < 1e-9);

        engine.record_usage("a", false, UsageMetrics::error(ErrorType::Other));
        assert!((engine.model_score("a").unwrap().latency - 0.5).abs() < 1e-9);

        engine.record_usage("a", true, UsageMetrics::latency(Duration::from_secs(9)));
        assert_eq!(engine.model_score("a").unwrap().latency, 0.0);
    }

    #[test]
    fn failure_factor_mirrors_health() {
        let engine = engine();
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::InsufficientFunds));
        let s = engine.model_score("a").unwrap();
        assert_eq!(s.failure, s.health);
    }

    #[test]
    fn dynamic_tier_off_ignores_health() {
        let config = ScoreConfig {
            dynamic_tier: false,
            ..ScoreConfig::default()
        };
        let engine = ScoreEngine::new(config, &models());
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::InsufficientFunds));
        // quality 0.5, cost 0.9, latency 0.8, failure 0.8
        let expected = 0.5 * 0.35 + 0.9 * 0.25 + 0.8 * 0.20 + 0.8 * 0.20;
        assert!((engine.calculate_score("a") - expected).abs() < 1e-9);
    }

    #[test]
    fn cost_score_hint_is_used() {
        let mut m = models();
        m[0].cost_score = Some(0.5);
        let engine = ScoreEngine::new(ScoreConfig::default(), &m);
        assert_eq!(engine.model_score("a").unwrap().cost, 0.5);
        assert_eq!(engine.select_best_model(&m), Some("b".to_string()));
    }

    #[test]
    #[tracing_test::traced_test]
    fn unknown_model_scores_zero_and_warns() {
        let engine = engine();
        assert_eq!(engine.calculate_score("ghost"), 0.0);
        assert!(logs_contain("model not found in score engine"));
    }

    #[test]
    fn unknown_model_usage_is_ignored() {
        let engine = engine();
        engine.record_usage("ghost", true, UsageMetrics::default());
        assert!(!engine.get_model_stats().contains_key("ghost"));
    }

    #[test]
    fn stats_report_success_rate_strings() {
        let engine = engine();
        engine.record_usage("a", true, UsageMetrics::default());
        engine.record_usage("a", true, UsageMetrics::default());
        engine.record_usage("a", false, UsageMetrics::error(ErrorType::RateLimit));

        let stats = engine.get_model_stats();
        let a = &stats["a"];
        assert_eq!(a.use_count, 3);
        assert_eq!(a.success_count, 2);
        assert_eq!(a.failure_count, 1);
        assert_eq!(a.success_rate, "66.67%");
        assert_eq!(stats["b"].success_rate, "N/A");
        assert_eq!(stats["b"].avg_health, 1.0);
    }

    #[test]
    fn stats_are_idempotent() {
        let engine = engine();
        engine.record_usage("b", false, UsageMetrics::error(ErrorType::NetworkError));
        assert_eq!(engine.get_model_stats(), engine.get_model_stats());
    }

    #[test]
    fn status_lists_models_sorted() {
        let status = engine().get_status();
        let ids: Vec<&str> = status.models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(status.weights.dynamic_tier);
    }

    fn error_type() -> impl Strategy<Value = Option<ErrorType>> {
        prop_oneof![
            Just(None),
            Just(Some(ErrorType::RateLimit)),
            Just(Some(ErrorType::InsufficientFunds)),
            Just(Some(ErrorType::NetworkError)),
            Just(Some(ErrorType::Other)),
        ]
    }

    proptest! {
        #[test]
        fn health_stays_within_unit_interval(
            outcomes in prop::collection::vec((any::<bool>(), error_type(), 0u64..20_000), 0..200)
        ) {
            let engine = engine();
            for (success, error_type, latency_ms) in outcomes {
                let metrics = UsageMetrics {
                    latency: success.then(|| Duration::from_millis(latency_ms)),
                    error_type,
                };
                engine.record_usage("a", success, metrics);
                let s = engine.model_score("a").unwrap();
                prop_assert!((0.0..=1.0).contains(&s.health));
                prop_assert!((0.5..=1.0).contains(&s.quality));
                prop_assert!((0.0..=1.0).contains(&s.latency));
                prop_assert!(s.score >= 0.0);
            }
        }
    }
}
