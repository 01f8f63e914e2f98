// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Query Use Case
//!
//! Read path over a single buffer: resolve the provider, load the
//! source, run phases 1-3 of the pipeline, and return decorated matches.

use std::path::PathBuf;
use std::sync::Arc;

use structural_codemod_domain::value_objects::{MatchResult, TransformOptions};
use structural_codemod_domain::CodemodError;

use crate::infrastructure::pipeline::TransformPipeline;

/// Arguments for a single-buffer query.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub language: Option<String>,
    pub source: Option<String>,
    pub path: Option<PathBuf>,
    pub query: String,
    pub options: TransformOptions,
}

pub struct QuerySourceUseCase {
    pipeline: Arc<TransformPipeline>,
}

impl QuerySourceUseCase {
    pub fn new(pipeline: Arc<TransformPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn execute(&self, config: QueryConfig) -> Result<Vec<MatchResult>, CodemodError> {
        let provider = self
            .pipeline
            .resolve_provider(config.language.as_deref(), config.path.as_deref())?;

        let source = match (&config.source, &config.path) {
            (Some(source), None) => source.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                CodemodError::FileSystemError(format!("{}: {}", path.display(), e))
            })?,
            _ => {
                return Err(CodemodError::InvalidParams(
                    "exactly one of source and path is required".to_string(),
                ));
            }
        };

        self.pipeline
            .query_matches(provider.as_ref(), &source, &config.query, &config.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::matchers::MatcherCache;
    use crate::infrastructure::providers::ProviderRegistry;

    fn use_case() -> QuerySourceUseCase {
        QuerySourceUseCase::new(Arc::new(TransformPipeline::new(
            Arc::new(ProviderRegistry::with_builtin_providers()),
            Arc::new(MatcherCache::new()),
        )))
    }

    #[test]
    fn test_query_inline_source() {
        let matches = use_case()
            .execute(QueryConfig {
                language: Some("go".to_string()),
                source: Some("package main\nfunc main() {}\n".to_string()),
                path: None,
                query: "function:main".to_string(),
                options: TransformOptions::default(),
            })
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "main");
    }

    #[test]
    fn test_empty_source_zero_matches() {
        let matches = use_case()
            .execute(QueryConfig {
                language: Some("go".to_string()),
                source: Some(String::new()),
                path: None,
                query: "function:*".to_string(),
                options: TransformOptions::default(),
            })
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_source_and_path_rejected() {
        let err = use_case()
            .execute(QueryConfig {
                language: Some("go".to_string()),
                source: Some("package main".to_string()),
                path: Some(PathBuf::from("main.go")),
                query: "function:*".to_string(),
                options: TransformOptions::default(),
            })
            .unwrap_err();
        assert_eq!(err.code(), -32602);
    }
}
