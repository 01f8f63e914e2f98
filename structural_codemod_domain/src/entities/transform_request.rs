// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transform Request
//!
//! The complete, self-contained input of one pipeline run. Staged
//! transformations persist this record verbatim (as JSON) so that Apply
//! can replay the exact transformation later and verify the output hash
//! before touching the filesystem.
//!
//! Exactly one of `source` and `file_path` is set: inline source for
//! host-supplied buffers, a path when the engine should read (and on
//! apply, write) the file itself.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Operation, TransformOptions};
use crate::CodemodError;

/// Input record for a single transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    language: String,
    source: Option<String>,
    file_path: Option<String>,
    /// Raw DSL query string; parsed at execution time so the stored form
    /// stays human-readable.
    query: String,
    operation: Operation,
    replacement: String,
    options: TransformOptions,
}

impl TransformRequest {
    /// Creates a request over inline source text.
    pub fn for_source(
        language: impl Into<String>,
        source: impl Into<String>,
        query: impl Into<String>,
        operation: Operation,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            source: Some(source.into()),
            file_path: None,
            query: query.into(),
            operation,
            replacement: replacement.into(),
            options: TransformOptions::default(),
        }
    }

    /// Creates a request over a file on disk.
    pub fn for_path(
        language: impl Into<String>,
        file_path: impl Into<String>,
        query: impl Into<String>,
        operation: Operation,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            source: None,
            file_path: Some(file_path.into()),
            query: query.into(),
            operation,
            replacement: replacement.into(),
            options: TransformOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the source-XOR-path rule shared by every tool method.
    pub fn validate(&self) -> Result<(), CodemodError> {
        match (&self.source, &self.file_path) {
            (Some(_), Some(_)) => Err(CodemodError::InvalidParams(
                "exactly one of source and path is required, got both".to_string(),
            )),
            (None, None) => Err(CodemodError::InvalidParams(
                "exactly one of source and path is required, got neither".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Serializes the request for durable storage.
    pub fn to_json(&self) -> Result<String, CodemodError> {
        serde_json::to_string(self).map_err(CodemodError::from)
    }

    /// Restores a request from its stored form.
    pub fn from_json(json: &str) -> Result<Self, CodemodError> {
        serde_json::from_str(json).map_err(CodemodError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_xor_path() {
        let by_source =
            TransformRequest::for_source("go", "package main", "function:main", Operation::Delete, "");
        assert!(by_source.validate().is_ok());

        let by_path =
            TransformRequest::for_path("go", "main.go", "function:main", Operation::Delete, "");
        assert!(by_path.validate().is_ok());

        let mut both = by_source.clone();
        both.file_path = Some("main.go".to_string());
        assert!(both.validate().is_err());

        let mut neither = by_path;
        neither.file_path = None;
        assert!(neither.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let request = TransformRequest::for_source(
            "go",
            "package main\nfunc main() {}\n",
            "function:main",
            Operation::Replace,
            "func renamed() {}",
        )
        .with_options(TransformOptions::new().with_fuzz(true));
        let json = request.to_json().unwrap();
        assert_eq!(TransformRequest::from_json(&json).unwrap(), request);
    }
}
