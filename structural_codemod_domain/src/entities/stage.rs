// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Entity
//!
//! A proposed transformation awaiting review. Stages are the unit of work
//! in staging mode: the pipeline plans and hashes a transformation, the
//! stage records everything needed to replay it, and Apply is the only
//! path that mutates the filesystem.
//!
//! ## Lifecycle
//!
//! ```text
//! pending ──apply──▶ applied (stage row deleted; ApplyRecord remains)
//!    │
//!    ├──reject──▶ rejected
//!    └──(ExpiresAt passes)──▶ expired (swept lazily; fetch → not found)
//! ```
//!
//! The only legal transitions out of `pending` are `applied` and
//! `rejected`; the entity enforces this.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::transform_request::TransformRequest;
use crate::value_objects::{ConfidenceLevel, ContentHash, NodeKind, Operation, SessionId, StageId};
use crate::CodemodError;

/// Default stage time-to-live before expiry.
pub const DEFAULT_STAGE_TTL_HOURS: i64 = 24;

/// Lifecycle state of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Applied,
    Rejected,
    Expired,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Applied => "applied",
            StageStatus::Rejected => "rejected",
            StageStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CodemodError> {
        match s {
            "pending" => Ok(StageStatus::Pending),
            "applied" => Ok(StageStatus::Applied),
            "rejected" => Ok(StageStatus::Rejected),
            "expired" => Ok(StageStatus::Expired),
            other => Err(CodemodError::InvalidParams(format!(
                "unknown stage status: '{}'",
                other
            ))),
        }
    }
}

impl Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A durable proposed transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    id: StageId,
    session_id: SessionId,
    operation: Operation,
    target_kind: NodeKind,
    target_name: String,
    confidence_level: ConfidenceLevel,
    confidence_score: f64,
    status: StageStatus,
    request: TransformRequest,
    /// SHA-256 the replayed transformation must reproduce on apply.
    expected_hash: ContentHash,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Stage {
    /// Creates a new pending stage with the default TTL.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        operation: Operation,
        target_kind: NodeKind,
        target_name: impl Into<String>,
        confidence_score: f64,
        request: TransformRequest,
        expected_hash: ContentHash,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: StageId::new(),
            session_id,
            operation,
            target_kind,
            target_name: target_name.into(),
            confidence_level: ConfidenceLevel::from_score(confidence_score),
            confidence_score,
            status: StageStatus::Pending,
            request,
            expected_hash,
            created_at,
            expires_at: created_at + Duration::hours(DEFAULT_STAGE_TTL_HOURS),
        }
    }

    /// Restores a stage from persisted fields (repository use).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: StageId,
        session_id: SessionId,
        operation: Operation,
        target_kind: NodeKind,
        target_name: String,
        confidence_score: f64,
        status: StageStatus,
        request: TransformRequest,
        expected_hash: ContentHash,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            operation,
            target_kind,
            target_name,
            confidence_level: ConfidenceLevel::from_score(confidence_score),
            confidence_score,
            status,
            request,
            expected_hash,
            created_at,
            expires_at,
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn target_kind(&self) -> NodeKind {
        self.target_kind
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.confidence_level
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn status(&self) -> StageStatus {
        self.status
    }

    pub fn request(&self) -> &TransformRequest {
        &self.request
    }

    pub fn expected_hash(&self) -> &ContentHash {
        &self.expected_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.expires_at = self.created_at + ttl;
        self
    }

    /// Whether the stage's TTL has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Transitions pending → applied.
    ///
    /// # Errors
    ///
    /// Any other source state is an `InvalidParams` error; the staging
    /// lifecycle permits no other transitions into `applied`.
    pub fn mark_applied(&mut self) -> Result<(), CodemodError> {
        if self.status != StageStatus::Pending {
            return Err(CodemodError::InvalidParams(format!(
                "stage {} cannot transition {} -> applied",
                self.id, self.status
            )));
        }
        self.status = StageStatus::Applied;
        Ok(())
    }

    /// Transitions pending → rejected.
    pub fn mark_rejected(&mut self) -> Result<(), CodemodError> {
        if self.status != StageStatus::Pending {
            return Err(CodemodError::InvalidParams(format!(
                "stage {} cannot transition {} -> rejected",
                self.id, self.status
            )));
        }
        self.status = StageStatus::Rejected;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Operation;

    fn sample_stage() -> Stage {
        let request = TransformRequest::for_source(
            "go",
            "package main\nfunc main() {}\n",
            "function:main",
            Operation::Replace,
            "func renamed() {}",
        );
        let hash = ContentHash::of(b"package main\nfunc renamed() {}\n");
        Stage::new(
            SessionId::new(),
            Operation::Replace,
            NodeKind::Function,
            "main",
            0.95,
            request,
            hash,
        )
    }

    #[test]
    fn test_new_stage_is_pending() {
        let stage = sample_stage();
        assert_eq!(stage.status(), StageStatus::Pending);
        assert_eq!(stage.confidence_level(), ConfidenceLevel::High);
        assert!(stage.expires_at() > stage.created_at());
    }

    #[test]
    fn test_legal_transitions() {
        let mut stage = sample_stage();
        stage.mark_applied().unwrap();
        assert_eq!(stage.status(), StageStatus::Applied);

        let mut stage = sample_stage();
        stage.mark_rejected().unwrap();
        assert_eq!(stage.status(), StageStatus::Rejected);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut stage = sample_stage();
        stage.mark_applied().unwrap();
        assert!(stage.mark_applied().is_err());
        assert!(stage.mark_rejected().is_err());
    }

    #[test]
    fn test_expiry() {
        let stage = sample_stage().with_ttl(Duration::hours(1));
        assert!(!stage.is_expired_at(stage.created_at()));
        assert!(stage.is_expired_at(stage.created_at() + Duration::hours(2)));
    }
}
