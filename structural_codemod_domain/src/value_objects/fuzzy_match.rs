// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Record of how a query was fuzzily resolved.
//!
//! Attached to every pipeline result; `used` is false when exact matching
//! succeeded and the resolver never ran.

use serde::{Deserialize, Serialize};

/// Outcome of fuzzy anchor resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FuzzyMatch {
    /// Whether the fuzzy resolver produced the anchors in this result.
    pub used: bool,
    /// The query string as originally written.
    pub original_query: String,
    /// The query string after pattern substitution.
    pub resolved_query: String,
    /// `score * (1 - distance / (max_distance + 1))`.
    pub confidence: f64,
    /// Weighted-heuristic score of the winning variant.
    pub score: f64,
    /// Minimum distance over the heuristics that contributed.
    pub distance: u32,
    /// Names of the heuristics that contributed to the score.
    pub heuristics: Vec<String>,
}

impl FuzzyMatch {
    /// The record attached when exact matching succeeded.
    pub fn unused() -> Self {
        Self::default()
    }
}
