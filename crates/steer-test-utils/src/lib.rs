// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Steer integration tests.
//!
//! - [`MockProvider`] - provider double with scripted per-model outcomes

pub mod mock_provider;

pub use mock_provider::{MockOutcome, MockProvider};
