// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Edit
//!
//! The planned mutation unit: a half-open byte range `[start, end)` over
//! the original source plus the replacement text. Insertions are
//! zero-width ranges; deletions carry an empty replacement.
//!
//! ## Overlap Semantics
//!
//! Two edits overlap iff their ranges intersect after sorting by start:
//! for adjacent start-sorted edits `a, b`, a conflict exists iff
//! `a.end > b.start`. Zero-width edits at the same position do not
//! overlap each other; their relative order is decided by priority
//! (anchor discovery order).

use serde::{Deserialize, Serialize};

use super::operation::Operation;
use crate::CodemodError;

/// Planned byte-range mutation against the original source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    start: usize,
    end: usize,
    new_text: String,
    operation: Operation,
    priority: usize,
}

impl Edit {
    /// Creates an edit over `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` when `end < start`.
    pub fn new(
        start: usize,
        end: usize,
        new_text: impl Into<String>,
        operation: Operation,
        priority: usize,
    ) -> Result<Self, CodemodError> {
        if end < start {
            return Err(CodemodError::InvalidParams(format!(
                "edit range end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self {
            start,
            end,
            new_text: new_text.into(),
            operation,
            priority,
        })
    }

    /// Zero-width insertion at `position`.
    pub fn insertion(
        position: usize,
        new_text: impl Into<String>,
        operation: Operation,
        priority: usize,
    ) -> Self {
        Self {
            start: position,
            end: position,
            new_text: new_text.into(),
            operation,
            priority,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Anchor discovery order; stable tie-break for application order.
    pub fn priority(&self) -> usize {
        self.priority
    }

    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }

    /// Range length in bytes of the original source covered by this edit.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True iff this edit's range intersects `other`'s.
    ///
    /// Zero-width edits at the same offset do not conflict.
    pub fn conflicts_with(&self, other: &Edit) -> bool {
        let (first, second) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        first.end > second.start
    }
}

/// Counts conflicts among `edits` using the adjacent-pair rule over a
/// start-sorted copy.
///
/// Returns the number of adjacent pairs whose ranges intersect. Any
/// non-zero result makes the pipeline fail with status=error before
/// touching the source.
pub fn count_conflicts(edits: &[Edit]) -> usize {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.priority));
    sorted
        .windows(2)
        .filter(|pair| pair[0].end > pair[1].start)
        .count()
}

/// Applies a non-overlapping edit set to `source`.
///
/// Edits are applied in descending start order (ties broken by ascending
/// priority), so earlier byte offsets stay valid without index rewriting.
///
/// # Errors
///
/// Returns `TransformFailed` if any edit range falls outside the buffer.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, CodemodError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    // Descending by start. At equal start the higher-priority edit is
    // spliced first so that same-position insertions land in discovery
    // order in the output.
    sorted.sort_by(|a, b| b.start.cmp(&a.start).then(b.priority.cmp(&a.priority)));

    let mut buffer = source.as_bytes().to_vec();
    for edit in sorted {
        if edit.end > buffer.len() {
            return Err(CodemodError::TransformFailed(format!(
                "edit range [{}, {}) exceeds buffer length {}",
                edit.start,
                edit.end,
                buffer.len()
            )));
        }
        buffer.splice(edit.start..edit.end, edit.new_text.bytes());
    }

    String::from_utf8(buffer)
        .map_err(|e| CodemodError::TransformFailed(format!("edit produced invalid UTF-8: {}", e)))
}
