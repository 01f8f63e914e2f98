// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Outcome
//!
//! The complete result of one pipeline run: status, transformed source,
//! unified diff, stats, diagnostics, engine metadata, output hash, and the
//! fuzzy-resolution record.
//!
//! ## Status Semantics
//!
//! - `Success` - all eight phases completed cleanly
//! - `Error` - a phase 1-5 failure; the output equals the original source
//! - `Partial` - a phase 6-8 failure or an error-severity quick-check
//!   diagnostic; best-effort output is surfaced alongside diagnostics
//! - `Skipped` - the file processor filtered the input before the
//!   pipeline ran

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::content_hash::ContentHash;
use super::diagnostic::Diagnostic;
use super::fuzzy_match::FuzzyMatch;
use super::operation::Operation;
use super::transform_stats::TransformStats;

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
    Partial,
    Skipped,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::Partial => "partial",
            Status::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Engine identification stamped on every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMetadata {
    pub version: String,
    pub provider: String,
    /// RFC 3339 completion timestamp.
    pub timestamp: String,
}

/// Result record of one transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    status: Status,
    operation: Operation,
    output: String,
    diff: Option<String>,
    stats: TransformStats,
    diagnostics: Vec<Diagnostic>,
    metadata: EngineMetadata,
    hash: ContentHash,
    fuzzy: FuzzyMatch,
}

impl PipelineOutcome {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        status: Status,
        operation: Operation,
        output: String,
        diff: Option<String>,
        stats: TransformStats,
        diagnostics: Vec<Diagnostic>,
        metadata: EngineMetadata,
        fuzzy: FuzzyMatch,
    ) -> Self {
        let hash = ContentHash::of(output.as_bytes());
        Self {
            status,
            operation,
            output,
            diff,
            stats,
            diagnostics,
            metadata,
            hash,
            fuzzy,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn diff(&self) -> Option<&str> {
        self.diff.as_deref()
    }

    pub fn stats(&self) -> &TransformStats {
        &self.stats
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Hex-encoded SHA-256 of the output text.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    pub fn fuzzy(&self) -> &FuzzyMatch {
        &self.fuzzy
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success | Status::Partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_derived_from_output() {
        let outcome = PipelineOutcome::new(
            Status::Success,
            Operation::Replace,
            "func newMain() {}".to_string(),
            None,
            TransformStats::default(),
            Vec::new(),
            EngineMetadata {
                version: "1.0.0".to_string(),
                provider: "go".to_string(),
                timestamp: "2025-01-01T00:00:00Z".to_string(),
            },
            FuzzyMatch::unused(),
        );
        assert_eq!(outcome.hash(), &ContentHash::of(b"func newMain() {}"));
        assert!(outcome.is_success());
    }
}
