// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Apply Use Case
//!
//! Applies staged transformations by id, all, or latest (the default).
//! The selector exclusivity rule lives at the tool boundary; this use
//! case receives an already-resolved target.

use std::sync::Arc;

use structural_codemod_domain::CodemodError;

use crate::application::services::staging_service::{ApplyOutcome, ApplyTarget, StagingService};

pub struct ApplyStageUseCase {
    staging: Arc<StagingService>,
}

impl ApplyStageUseCase {
    pub fn new(staging: Arc<StagingService>) -> Self {
        Self { staging }
    }

    pub async fn execute(
        &self,
        target: ApplyTarget,
        auto_applied: bool,
        applied_by: &str,
    ) -> Result<Vec<ApplyOutcome>, CodemodError> {
        self.staging.apply(target, auto_applied, applied_by).await
    }
}
