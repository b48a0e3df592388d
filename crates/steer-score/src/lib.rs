// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model scoring for the Steer router.
//!
//! [`ScoreEngine`] keeps running per-model statistics and picks the
//! highest-scoring model from a candidate list.

pub mod engine;

pub use engine::{
    health_penalty, ModelScore, ModelStats, ScoreEngine, ScoreEngineStatus, ScoredModel,
    UsageMetrics,
};
