// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Audit record left behind when a stage is applied.
//!
//! Applied stages are deleted from the store; this record is the durable
//! trail of what was applied, by whom, and when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ApplyId, StageId};

/// Record of a single stage application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRecord {
    id: ApplyId,
    stage_id: StageId,
    auto_applied: bool,
    applied_by: String,
    applied_at: DateTime<Utc>,
}

impl ApplyRecord {
    pub fn new(stage_id: StageId, auto_applied: bool, applied_by: impl Into<String>) -> Self {
        Self {
            id: ApplyId::new(),
            stage_id,
            auto_applied,
            applied_by: applied_by.into(),
            applied_at: Utc::now(),
        }
    }

    /// Restores a record from persisted fields (repository use).
    pub fn from_parts(
        id: ApplyId,
        stage_id: StageId,
        auto_applied: bool,
        applied_by: String,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            stage_id,
            auto_applied,
            applied_by,
            applied_at,
        }
    }

    pub fn id(&self) -> ApplyId {
        self.id
    }

    pub fn stage_id(&self) -> StageId {
        self.stage_id
    }

    pub fn auto_applied(&self) -> bool {
        self.auto_applied
    }

    pub fn applied_by(&self) -> &str {
        &self.applied_by
    }

    pub fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }
}
