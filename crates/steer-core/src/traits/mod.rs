// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for pluggable LLM providers.
//!
//! Providers use `#[async_trait]` so the router can hold them as
//! `Arc<dyn ProviderAdapter>` in a string-keyed registry.

pub mod provider;

pub use provider::ProviderAdapter;
