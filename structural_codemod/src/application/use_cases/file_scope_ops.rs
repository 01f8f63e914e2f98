// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File-Scope Use Cases
//!
//! Scoped query and transform over a directory tree, delegating to the
//! file processor service.

use std::sync::Arc;

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::value_objects::{Operation, TransformOptions};
use structural_codemod_domain::CodemodError;

use crate::application::services::file_processor::{
    BatchOptions, FileProcessor, FileQueryReport, FileScope, FileTransformReport,
};
use crate::infrastructure::logging::ObservabilityService;

pub struct FileQueryUseCase {
    processor: Arc<FileProcessor>,
    observability: Arc<ObservabilityService>,
}

impl FileQueryUseCase {
    pub fn new(processor: Arc<FileProcessor>, observability: Arc<ObservabilityService>) -> Self {
        Self {
            processor,
            observability,
        }
    }

    pub async fn execute(
        &self,
        scope: FileScope,
        query: String,
        options: TransformOptions,
        batch: BatchOptions,
        token: CancellationToken,
    ) -> Result<FileQueryReport, CodemodError> {
        self.observability.operation_started("file_query").await;
        let result = self
            .processor
            .query(&scope, &query, &options, &batch, &token)
            .await;
        self.observability
            .operation_completed("file_query", result.is_ok())
            .await;
        result
    }
}

pub struct FileTransformUseCase {
    processor: Arc<FileProcessor>,
    observability: Arc<ObservabilityService>,
}

impl FileTransformUseCase {
    pub fn new(processor: Arc<FileProcessor>, observability: Arc<ObservabilityService>) -> Self {
        Self {
            processor,
            observability,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        scope: FileScope,
        query: String,
        operation: Operation,
        replacement: String,
        options: TransformOptions,
        batch: BatchOptions,
        token: CancellationToken,
    ) -> Result<FileTransformReport, CodemodError> {
        self.observability.operation_started("file_transform").await;
        let result = self
            .processor
            .transform(&scope, &query, operation, &replacement, &options, &batch, &token)
            .await;
        self.observability
            .operation_completed("file_transform", result.is_ok())
            .await;
        result
    }
}
