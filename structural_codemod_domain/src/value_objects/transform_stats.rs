// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-transformation statistics filled in by pipeline Phase 8.

use serde::{Deserialize, Serialize};

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformStats {
    pub duration_ms: u64,
    pub bytes_processed: u64,
    pub lines_processed: u64,
    pub matches_found: u64,
    pub edits_applied: u64,
    pub overlaps_detected: u64,
}

impl TransformStats {
    pub fn new() -> Self {
        Self::default()
    }
}
