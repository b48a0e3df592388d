// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Steer model router.
//!
//! This crate provides the provider trait, the shared error type, and the
//! model/message types used by every other crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SteerError;
pub use traits::ProviderAdapter;
pub use types::{
    ChatMessage, ChatOptions, ChatResponse, ErrorType, ModelConfig, Role, TokenUsage,
};
