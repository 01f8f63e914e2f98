// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Line-oriented unified diff between original and transformed source.

use similar::TextDiff;

/// Stateless unified-diff producer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffService;

impl DiffService {
    pub fn new() -> Self {
        Self
    }

    /// Unified diff with three context lines, or `None` when the inputs
    /// are byte-identical.
    pub fn unified_diff(&self, original: &str, transformed: &str, label: &str) -> Option<String> {
        if original == transformed {
            return None;
        }
        let diff = TextDiff::from_lines(original, transformed);
        let text = diff
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{}", label), &format!("b/{}", label))
            .to_string();
        Some(text)
    }
}
