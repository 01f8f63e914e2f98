// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transform Use Case
//!
//! Single-buffer transformation. In direct mode the outcome is returned
//! (and written back when the input was a path and the transform is not
//! a dry run); in staging mode the transformation is recorded as a
//! pending stage instead and nothing touches the filesystem until apply.

use std::sync::Arc;

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::entities::TransformRequest;
use structural_codemod_domain::value_objects::{PipelineOutcome, SessionId, StageId};
use structural_codemod_domain::CodemodError;

use crate::application::services::staging_service::StagingService;
use crate::infrastructure::logging::ObservabilityService;
use crate::infrastructure::pipeline::TransformPipeline;

pub struct TransformSourceUseCase {
    pipeline: Arc<TransformPipeline>,
    staging: Arc<StagingService>,
    observability: Arc<ObservabilityService>,
}

impl TransformSourceUseCase {
    pub fn new(
        pipeline: Arc<TransformPipeline>,
        staging: Arc<StagingService>,
        observability: Arc<ObservabilityService>,
    ) -> Self {
        Self {
            pipeline,
            staging,
            observability,
        }
    }

    /// Runs the transform directly, writing the file back for path
    /// inputs unless dry-run.
    pub async fn execute_direct(
        &self,
        request: TransformRequest,
        token: CancellationToken,
    ) -> Result<PipelineOutcome, CodemodError> {
        self.observability.operation_started("transform").await;

        let pipeline = self.pipeline.clone();
        let exec_request = request.clone();
        let exec_token = token.clone();
        let result = tokio::task::spawn_blocking(move || pipeline.execute(&exec_request, &exec_token))
            .await
            .map_err(|e| CodemodError::InternalError(format!("transform task failed: {}", e)))?;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.observability.operation_completed("transform", false).await;
                return Err(e);
            }
        };

        self.observability.metrics().record_transform(outcome.status(), outcome.stats());

        let succeeded = outcome.is_success();
        if succeeded && !request.options().dry_run {
            if let Some(path) = request.file_path() {
                tokio::fs::write(path, outcome.output()).await.map_err(|e| {
                    CodemodError::FileSystemError(format!("write {} failed: {}", path, e))
                })?;
            }
        }

        self.observability.operation_completed("transform", succeeded).await;
        Ok(outcome)
    }

    /// Records the transform as a pending stage.
    pub async fn execute_staged(
        &self,
        session_id: SessionId,
        request: TransformRequest,
    ) -> Result<StageId, CodemodError> {
        self.observability.operation_started("stage").await;
        let notify = self.staging.create_stage(session_id, request).await;
        let result = notify.await.unwrap_or_else(|_| {
            Err(CodemodError::InternalError(
                "stage creation worker dropped its notification".to_string(),
            ))
        });
        self.observability
            .operation_completed("stage", result.is_ok())
            .await;
        result
    }
}
