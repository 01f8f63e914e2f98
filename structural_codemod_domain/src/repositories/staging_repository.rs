// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Staging Repository Port
//!
//! Persistence contract for the staging store. The domain owns the
//! lifecycle rules; implementations own the storage technology. Apply's
//! delete-stage-insert-audit step must be transactional in the
//! implementation so a crash can never leave both or neither record.

use async_trait::async_trait;

use crate::entities::{ApplyRecord, Session, Stage};
use crate::value_objects::{SessionId, StageId};
use crate::CodemodError;

/// Persistence port for sessions, stages, and apply records.
#[async_trait]
pub trait StagingRepository: Send + Sync {
    /// Persists a session.
    async fn save_session(&self, session: &Session) -> Result<(), CodemodError>;

    /// Persists a new stage.
    async fn save_stage(&self, stage: &Stage) -> Result<(), CodemodError>;

    /// Fetches a stage by id.
    ///
    /// Expired stages are swept lazily here: a stage whose TTL has passed
    /// is removed and reported as absent.
    async fn find_stage(&self, id: StageId) -> Result<Option<Stage>, CodemodError>;

    /// Lists pending stages for a session, oldest first.
    async fn list_pending(&self, session_id: SessionId) -> Result<Vec<Stage>, CodemodError>;

    /// Lists pending stages across all sessions, oldest first.
    async fn list_all_pending(&self) -> Result<Vec<Stage>, CodemodError>;

    /// Most recent pending stage across all sessions, if any.
    async fn latest_pending(&self) -> Result<Option<Stage>, CodemodError>;

    /// Marks a stage rejected.
    async fn reject_stage(&self, id: StageId) -> Result<(), CodemodError>;

    /// Atomically deletes the stage and inserts its apply record.
    async fn complete_apply(&self, stage_id: StageId, record: &ApplyRecord) -> Result<(), CodemodError>;

    /// Removes stages whose TTL passed; returns how many were swept.
    async fn sweep_expired(&self) -> Result<u64, CodemodError>;

    /// Total pending stages across all sessions.
    async fn count_pending(&self) -> Result<u64, CodemodError>;
}
