// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for upstream LLM APIs (ZAI, OpenRouter, etc.).

use async_trait::async_trait;

use crate::error::SteerError;
use crate::types::{ChatMessage, ChatOptions, ChatResponse};

/// Adapter for an upstream LLM provider.
///
/// The router treats providers as opaque: it hands over the conversation and
/// per-request options, and classifies whatever error comes back.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this provider instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Sends a chat request and returns the full response.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, SteerError>;
}
