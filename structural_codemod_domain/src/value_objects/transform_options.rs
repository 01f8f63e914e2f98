// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transform Options
//!
//! Caller-supplied knobs recognized on a transformation request. All
//! options default to off except `max_fuzz_distance`, which defaults to 3
//! (the fuzzy resolver's edit-distance bound).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default maximum edit distance for fuzzy anchor resolution.
pub const DEFAULT_MAX_FUZZ_DISTANCE: u32 = 3;

/// Options on a transformation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Plan and report without writing any file.
    pub dry_run: bool,
    /// Require a confirmation prompt from the host before applying.
    pub interactive: bool,
    /// Enable the fuzzy anchor resolver when exact matching finds nothing.
    pub fuzz: bool,
    /// Edit-distance bound for fuzzy heuristics.
    pub max_fuzz_distance: u32,
    /// Skip snippet validation of the replacement text.
    pub skip_validation: bool,
    /// Skip the provider's formatting pass.
    pub skip_format: bool,
    /// Skip the provider's import organization pass.
    pub skip_imports: bool,
    /// Opaque host context propagated through diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            interactive: false,
            fuzz: false,
            max_fuzz_distance: DEFAULT_MAX_FUZZ_DISTANCE,
            skip_validation: false,
            skip_format: false,
            skip_imports: false,
            context: BTreeMap::new(),
        }
    }
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fuzz(mut self, fuzz: bool) -> Self {
        self.fuzz = fuzz;
        self
    }

    pub fn with_max_fuzz_distance(mut self, distance: u32) -> Self {
        self.max_fuzz_distance = distance;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TransformOptions::default();
        assert!(!opts.fuzz);
        assert!(!opts.dry_run);
        assert_eq!(opts.max_fuzz_distance, 3);
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let opts: TransformOptions = serde_json::from_str(r#"{"fuzz": true}"#).unwrap();
        assert!(opts.fuzz);
        assert_eq!(opts.max_fuzz_distance, DEFAULT_MAX_FUZZ_DISTANCE);
    }
}
