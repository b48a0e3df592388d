// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Score-driven routing with circuit breaking and an ordered fallback chain.
//!
//! For each request the engine asks the score engine for the best healthy
//! primary model, then walks the remaining candidates in configuration order
//! until one answers. Models whose circuit is open are skipped without a
//! network call. A model that opens gets a recovery probe after
//! `half_open_recovery`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use steer_config::SteerConfig;
use steer_config::model::{RouterConfig, TaskRule};
use steer_core::{ChatMessage, ChatOptions, ChatResponse, ErrorType, ModelConfig, SteerError};
use steer_cost::estimate_cost;
use steer_resilience::{CircuitState, HealthTracker, ModelHealth, ProbeTicket};
use steer_score::{ModelScore, ModelStats, ScoreEngine, ScoreEngineStatus, UsageMetrics};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classifier::detect_error_type;
use crate::registry::ProviderRegistry;
use crate::request_log::{RequestLog, RequestLogEntry};

/// Message sent by recovery probes.
const PROBE_PROMPT: &str = "Hi";

/// Shortest wait between recovery probes of one model.
const MIN_PROBE_DELAY: Duration = Duration::from_secs(1);

/// Per-model view in [`RouterStatus`].
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    #[serde(flatten)]
    pub config: ModelConfig,
    pub state: CircuitState,
    pub health: Option<ModelHealth>,
    pub score: f64,
}

/// Read-only snapshot of the engine.
#[derive(Debug, Clone, Serialize)]
pub struct RouterStatus {
    pub models: Vec<ModelStatus>,
    pub score_engine: ScoreEngineStatus,
    pub should_switch_to_fallback: bool,
    pub providers: Vec<String>,
    pub request_log_len: usize,
}

struct Shared {
    models: Vec<ModelConfig>,
    task_rules: BTreeMap<String, TaskRule>,
    config: RouterConfig,
    registry: ProviderRegistry,
    scores: ScoreEngine,
    health: HealthTracker,
    log: RequestLog,
    shutdown: CancellationToken,
    request_seq: AtomicU64,
}

/// Routes chat requests across the configured models.
///
/// Dropping the engine cancels any pending recovery probes.
pub struct RouteEngine {
    shared: Arc<Shared>,
}

impl RouteEngine {
    pub fn new(config: &SteerConfig, registry: ProviderRegistry) -> Self {
        for model in &config.models {
            if !registry.contains(&model.provider) {
                debug!(
                    model_id = model.id.as_str(),
                    provider = model.provider.as_str(),
                    "model references an unregistered provider"
                );
            }
        }

        let shared = Shared {
            models: config.models.clone(),
            task_rules: config.task_rules.clone(),
            config: config.router.clone(),
            scores: ScoreEngine::new(config.score.clone(), &config.models),
            health: HealthTracker::new(config.models.iter().map(|m| m.id.clone())),
            log: RequestLog::new(config.router.request_log_capacity),
            registry,
            shutdown: CancellationToken::new(),
            request_seq: AtomicU64::new(0),
        };

        info!(
            models = shared.models.len(),
            providers = shared.registry.len(),
            task_rules = shared.task_rules.len(),
            "route engine initialized"
        );

        Self {
            shared: Arc::new(shared),
        }
    }

    /// Send `messages` to the best available model, falling back down the
    /// candidate list on failure.
    ///
    /// Only [`SteerError::AllModelsFailed`] is returned; individual provider
    /// errors are recorded and logged.
    pub async fn route_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, SteerError> {
        let shared = &self.shared;
        let request_id = shared.next_request_id();
        let task_type = options.task_type.as_deref();
        let candidates = shared.candidates(task_type);

        debug!(
            request_id = %request_id,
            task_type,
            candidates = candidates.len(),
            "routing request"
        );

        let mut attempted = Vec::with_capacity(candidates.len());
        let mut failed = 0usize;

        for model in candidates {
            attempted.push(model.alias.clone());

            let state = shared.health.state(&model.id);
            if !shared.health.try_acquire_trial(&model.id) {
                let err = SteerError::ProviderUnavailable {
                    model: model.alias.clone(),
                };
                debug!(request_id = %request_id, model = model.alias.as_str(), %state, %err, "circuit not admitting, skipping");
                failed += 1;
                continue;
            }
            if state == CircuitState::HalfOpen {
                info!(request_id = %request_id, model = model.alias.as_str(), "trying half-open model");
            }

            let cost_estimate = estimate_cost(model, messages.len());
            let started = Instant::now();
            let result = shared.call_model(model, messages, options).await;
            let latency = started.elapsed();

            let mut entry = RequestLogEntry {
                request_id: request_id.clone(),
                timestamp: Utc::now(),
                chosen_model: model.id.clone(),
                fallback_count: failed,
                latency_ms: latency.as_millis() as u64,
                cost_estimate,
                error_type: None,
                success: true,
                task_type: options.task_type.clone(),
            };

            match result {
                Ok(response) => {
                    shared.health.record_success(&model.id);
                    shared
                        .scores
                        .record_usage(&model.id, true, UsageMetrics::latency(latency));
                    shared.log.push(entry).await;

                    info!(
                        request_id = %request_id,
                        model = model.alias.as_str(),
                        latency_ms = latency.as_millis() as u64,
                        fallback_count = failed,
                        cost_estimate,
                        "request routed"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    let error_type = detect_error_type(&err);
                    let outcome = shared.health.record_failure(&model.id);
                    if let Some(ticket) = outcome.probe {
                        Shared::schedule_probe(shared, model.clone(), ticket);
                    }
                    shared
                        .scores
                        .record_usage(&model.id, false, UsageMetrics::error(error_type));

                    entry.success = false;
                    entry.error_type = Some(error_type);
                    entry.cost_estimate = 0.0;
                    shared.log.push(entry).await;

                    warn!(
                        request_id = %request_id,
                        model = model.alias.as_str(),
                        error_type = %error_type,
                        consecutive_failures = outcome.consecutive_failures,
                        error = %err,
                        "model call failed"
                    );
                    if model.provider == "openrouter" && model.is_free {
                        info!(model = model.alias.as_str(), "free model failed, skipping");
                    }
                    failed += 1;
                }
            }
        }

        warn!(request_id = %request_id, attempted = ?attempted, "all models failed");
        Err(SteerError::AllModelsFailed { attempted })
    }

    /// `true` while the watch model's circuit is open or half-open.
    pub fn should_switch_to_fallback(&self) -> bool {
        self.shared.should_switch_to_fallback()
    }

    pub async fn get_status(&self) -> RouterStatus {
        let shared = &self.shared;
        let mut health = shared.health.snapshot();
        let models = shared
            .models
            .iter()
            .map(|m| ModelStatus {
                config: m.clone(),
                state: shared.health.state(&m.id),
                health: health.remove(&m.id),
                score: shared.scores.calculate_score(&m.id),
            })
            .collect();

        RouterStatus {
            models,
            score_engine: shared.scores.get_status(),
            should_switch_to_fallback: shared.should_switch_to_fallback(),
            providers: shared.registry.names(),
            request_log_len: shared.log.len().await,
        }
    }

    /// The `limit` most recent attempts, oldest first.
    pub async fn get_request_logs(&self, limit: usize) -> Vec<RequestLogEntry> {
        self.shared.log.recent(limit).await
    }

    pub fn get_model_stats(&self) -> BTreeMap<String, ModelStats> {
        self.shared.scores.get_model_stats()
    }

    pub fn circuit_state(&self, model_id: &str) -> CircuitState {
        self.shared.health.state(model_id)
    }

    pub fn model_health(&self, model_id: &str) -> Option<ModelHealth> {
        self.shared.health.health(model_id)
    }

    pub fn model_score(&self, model_id: &str) -> Option<ModelScore> {
        self.shared.scores.model_score(model_id)
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.shared.models
    }

    /// Cancel every pending recovery probe.
    pub fn shutdown(&self) {
        if !self.shared.shutdown.is_cancelled() {
            info!("route engine shutting down");
            self.shared.shutdown.cancel();
        }
    }
}

impl Drop for RouteEngine {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}

impl Shared {
    fn next_request_id(&self) -> String {
        let seq = self.request_seq.fetch_add(1, Ordering::Relaxed);
        format!("req_{}_{seq}", Utc::now().timestamp_millis())
    }

    fn should_switch_to_fallback(&self) -> bool {
        self.health.is_unhealthy(&self.config.watch_model)
    }

    /// Ordered attempt list for one request.
    ///
    /// The best-scoring closed primary goes first, then the rest of the pool
    /// in configuration order with fallback models last.
    fn candidates(&self, task_type: Option<&str>) -> Vec<&ModelConfig> {
        let pool: Vec<&ModelConfig> = match task_type.and_then(|t| self.task_rules.get(t)) {
            Some(rule) => self
                .models
                .iter()
                .filter(|m| rule.models.contains(&m.id))
                .collect(),
            None => self.models.iter().collect(),
        };

        let eligible: Vec<ModelConfig> = pool
            .iter()
            .copied()
            .filter(|m| !m.fallback && self.health.state(&m.id) == CircuitState::Closed)
            .cloned()
            .collect();
        let best = self.scores.select_best_model(&eligible);

        let mut ordered = Vec::with_capacity(pool.len());
        if let Some(best_id) = &best
            && let Some(model) = pool.iter().find(|m| &m.id == best_id)
        {
            ordered.push(*model);
        }
        let rest = pool.iter().copied().filter(|m| Some(&m.id) != best.as_ref());
        let (primaries, fallbacks): (Vec<&ModelConfig>, Vec<&ModelConfig>) =
            rest.partition(|m| !m.fallback);
        ordered.extend(primaries);
        ordered.extend(fallbacks);
        ordered
    }

    /// One provider call bounded by the request or default timeout.
    async fn call_model(
        &self,
        model: &ModelConfig,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, SteerError> {
        let provider = self.registry.require(&model.provider)?;
        let timeout = options.timeout.unwrap_or_else(|| self.config.provider_timeout());

        let mut call_options = options.clone();
        call_options.model = Some(model.id.clone());

        match tokio::time::timeout(timeout, provider.chat(messages, &call_options)).await {
            Ok(result) => result,
            Err(_) => Err(SteerError::Timeout { duration: timeout }),
        }
    }

    fn schedule_probe(shared: &Arc<Self>, model: ModelConfig, ticket: ProbeTicket) {
        let delay = shared.config.half_open_recovery().max(MIN_PROBE_DELAY);
        info!(
            model = model.alias.as_str(),
            delay_secs = delay.as_secs(),
            "recovery probe scheduled"
        );
        let shared = Arc::clone(shared);
        tokio::spawn(async move { shared.probe_loop(model, ticket, delay).await });
    }

    /// Probe an open model until it recovers or the ticket goes stale.
    async fn probe_loop(&self, model: ModelConfig, ticket: ProbeTicket, delay: Duration) {
        let messages = [ChatMessage::user(PROBE_PROMPT)];
        let options = ChatOptions::default();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.health.cancel_probe(&model.id, ticket);
                    debug!(model = model.alias.as_str(), "recovery probe cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            if !self.health.begin_probe(&model.id, ticket) {
                return;
            }

            let result = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.health.cancel_probe(&model.id, ticket);
                    return;
                }
                result = self.call_model(&model, &messages, &options) => result,
            };

            match result {
                Ok(_) => {
                    self.health.record_success(&model.id);
                    info!(model = model.alias.as_str(), "recovery probe succeeded");
                    return;
                }
                Err(err) => {
                    if !self.health.abort_probe(&model.id, ticket) {
                        return;
                    }
                    let error_type: ErrorType = detect_error_type(&err);
                    warn!(
                        model = model.alias.as_str(),
                        error_type = %error_type,
                        error = %err,
                        retry_in_secs = delay.as_secs(),
                        "recovery probe failed"
                    );
                }
            }
        }
    }
}
