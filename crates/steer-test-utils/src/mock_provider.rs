// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic routing tests.
//!
//! Each model id served by a `MockProvider` has its own FIFO of outcomes.
//! When the queue runs dry the model's sticky default is used, which is a
//! plain "mock response" reply unless overridden.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use steer_core::{ChatMessage, ChatOptions, ChatResponse, ProviderAdapter, SteerError, TokenUsage};

/// What a scripted call does.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Succeed with this text.
    Reply(String),
    /// Fail with a provider error carrying this message.
    Fail(String),
    /// Sleep, then reply with "mock response".
    Sleep(Duration),
}

impl MockOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

#[derive(Debug)]
struct Script {
    queue: VecDeque<MockOutcome>,
    default: MockOutcome,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            default: MockOutcome::reply("mock response"),
        }
    }
}

/// A provider that answers from per-model scripts and counts its calls.
pub struct MockProvider {
    name: String,
    scripts: Mutex<HashMap<String, Script>>,
    calls: AtomicUsize,
    call_log: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            call_log: Mutex::new(Vec::new()),
        }
    }

    /// Queue outcomes for `model`, consumed in order.
    pub fn with_outcomes(mut self, model: &str, outcomes: Vec<MockOutcome>) -> Self {
        self.scripts
            .get_mut()
            .entry(model.to_string())
            .or_default()
            .queue
            .extend(outcomes);
        self
    }

    /// Outcome used for `model` whenever its queue is empty.
    pub fn with_default(mut self, model: &str, outcome: MockOutcome) -> Self {
        self.scripts
            .get_mut()
            .entry(model.to_string())
            .or_default()
            .default = outcome;
        self
    }

    /// Queue one more outcome for `model`.
    pub async fn push(&self, model: &str, outcome: MockOutcome) {
        self.scripts
            .lock()
            .await
            .entry(model.to_string())
            .or_default()
            .queue
            .push_back(outcome);
    }

    /// Replace the sticky default for `model`.
    pub async fn set_default(&self, model: &str, outcome: MockOutcome) {
        self.scripts
            .lock()
            .await
            .entry(model.to_string())
            .or_default()
            .default = outcome;
    }

    /// Total `chat` invocations.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Model ids in the order they were called.
    pub async fn called_models(&self) -> Vec<String> {
        self.call_log.lock().await.clone()
    }

    /// Number of calls addressed to `model`.
    pub async fn calls_for(&self, model: &str) -> usize {
        self.call_log
            .lock()
            .await
            .iter()
            .filter(|m| m.as_str() == model)
            .count()
    }

    async fn next_outcome(&self, model: &str) -> MockOutcome {
        let mut scripts = self.scripts.lock().await;
        let script = scripts.entry(model.to_string()).or_default();
        script
            .queue
            .pop_front()
            .unwrap_or_else(|| script.default.clone())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, SteerError> {
        let model = options.model.clone().unwrap_or_default();
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_log.lock().await.push(model.clone());

        let content = match self.next_outcome(&model).await {
            MockOutcome::Reply(text) => text,
            MockOutcome::Fail(message) => return Err(SteerError::provider(message)),
            MockOutcome::Sleep(delay) => {
                tokio::time::sleep(delay).await;
                "mock response".to_string()
            }
        };

        Ok(ChatResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content,
            model,
            usage: TokenUsage {
                input_tokens: 10 * messages.len() as u32,
                output_tokens: 20,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(model: &str) -> ChatOptions {
        ChatOptions {
            model: Some(model.to_string()),
            ..ChatOptions::default()
        }
    }

    fn hi() -> Vec<ChatMessage> {
        vec![ChatMessage::user("Hi")]
    }

    #[tokio::test]
    async fn default_reply_when_unscripted() {
        let provider = MockProvider::new("zai");
        let resp = provider.chat(&hi(), &options("m")).await.unwrap();
        assert_eq!(resp.content, "mock response");
        assert_eq!(resp.model, "m");
        assert_eq!(resp.usage.input_tokens, 10);
        assert!(resp.id.starts_with("mock-resp-"));
    }

    #[tokio::test]
    async fn scripted_outcomes_consumed_in_order() {
        let provider = MockProvider::new("zai").with_outcomes(
            "m",
            vec![MockOutcome::fail("HTTP 429"), MockOutcome::reply("second")],
        );

        let err = provider.chat(&hi(), &options("m")).await.unwrap_err();
        assert_eq!(err.to_string(), "provider error: HTTP 429");
        assert_eq!(provider.chat(&hi(), &options("m")).await.unwrap().content, "second");
        assert_eq!(
            provider.chat(&hi(), &options("m")).await.unwrap().content,
            "mock response"
        );
    }

    #[tokio::test]
    async fn sticky_default_applies_after_queue() {
        let provider = MockProvider::new("zai").with_default("m", MockOutcome::fail("down"));
        for _ in 0..3 {
            assert!(provider.chat(&hi(), &options("m")).await.is_err());
        }
        provider.set_default("m", MockOutcome::reply("up")).await;
        assert_eq!(provider.chat(&hi(), &options("m")).await.unwrap().content, "up");
    }

    #[tokio::test]
    async fn scripts_are_per_model() {
        let provider = MockProvider::new("zai");
        provider.push("a", MockOutcome::fail("a down")).await;

        assert!(provider.chat(&hi(), &options("b")).await.is_ok());
        assert!(provider.chat(&hi(), &options("a")).await.is_err());
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.called_models().await, vec!["b", "a"]);
        assert_eq!(provider.calls_for("a").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_outcome_waits_before_replying() {
        let provider = MockProvider::new("zai")
            .with_outcomes("m", vec![MockOutcome::Sleep(Duration::from_secs(5))]);
        let started = tokio::time::Instant::now();
        let resp = provider.chat(&hi(), &options("m")).await.unwrap();
        assert_eq!(resp.content, "mock response");
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
