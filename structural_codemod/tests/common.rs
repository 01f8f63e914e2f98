// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Common Test Helpers
//!
//! Shared utilities for integration tests.

use std::sync::Arc;

use structural_codemod::infrastructure::matchers::MatcherCache;
use structural_codemod::infrastructure::pipeline::TransformPipeline;
use structural_codemod::infrastructure::providers::ProviderRegistry;

/// Go sample used across scenarios.
pub const GO_MAIN: &str = "package main\nfunc main() {\n\tprintln(\"hi\")\n}\n";

/// Builds a fresh pipeline over the built-in providers.
pub fn fresh_pipeline() -> Arc<TransformPipeline> {
    Arc::new(TransformPipeline::new(
        Arc::new(ProviderRegistry::with_builtin_providers()),
        Arc::new(MatcherCache::new()),
    ))
}

/// Calculate the hex SHA-256 of `data`.
pub fn calculate_sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_sha256_known_value() {
        assert_eq!(
            calculate_sha256(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
