// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Staging Repository
//!
//! Durable implementation of the staging persistence port. Stage rows
//! carry the complete serialized transform request so Apply can replay
//! the transformation and verify the stored hash before touching any
//! file.
//!
//! Expiry is lazy: fetching an expired stage deletes it and reports
//! absence; `sweep_expired` bulk-removes the backlog. The
//! delete-stage-insert-audit step of Apply runs in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use structural_codemod_domain::entities::{ApplyRecord, Session, Stage, StageStatus, TransformRequest};
use structural_codemod_domain::repositories::StagingRepository;
use structural_codemod_domain::value_objects::{ContentHash, NodeKind, Operation, SessionId, StageId};
use structural_codemod_domain::CodemodError;

use super::schema;

/// SQLite-backed staging store.
pub struct SqliteStagingRepository {
    pool: SqlitePool,
}

impl SqliteStagingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to (creating and migrating as needed) a database file.
    pub async fn from_url(database_url: &str) -> Result<Self, CodemodError> {
        let pool = schema::initialize_database(database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Fresh in-memory store, used by tests and ephemeral sessions.
    pub async fn in_memory() -> Result<Self, CodemodError> {
        let pool = schema::initialize_in_memory().await.map_err(db_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn stage_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Stage, CodemodError> {
        let id: String = row.get("id");
        let session_id: String = row.get("session_id");
        let operation: String = row.get("operation");
        let target_kind: String = row.get("target_kind");
        let target_name: String = row.get("target_name");
        let confidence_score: f64 = row.get("confidence_score");
        let status: String = row.get("status");
        let request_json: String = row.get("request_json");
        let expected_hash: String = row.get("expected_hash");
        let created_at: String = row.get("created_at");
        let expires_at: String = row.get("expires_at");

        Ok(Stage::from_parts(
            StageId::from_string(&id)?,
            SessionId::from_string(&session_id)?,
            Operation::parse(&operation)?,
            parse_kind(&target_kind)?,
            target_name,
            confidence_score,
            StageStatus::parse(&status)?,
            TransformRequest::from_json(&request_json)?,
            ContentHash::from_hex(&expected_hash)?,
            parse_datetime(&created_at)?,
            parse_datetime(&expires_at)?,
        ))
    }
}

#[async_trait]
impl StagingRepository for SqliteStagingRepository {
    async fn save_session(&self, session: &Session) -> Result<(), CodemodError> {
        sqlx::query("INSERT OR IGNORE INTO sessions (id, created_at) VALUES (?, ?)")
            .bind(session.id().to_string())
            .bind(session.created_at().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn save_stage(&self, stage: &Stage) -> Result<(), CodemodError> {
        sqlx::query(
            "INSERT INTO stages (id, session_id, operation, target_kind, target_name, \
             confidence_level, confidence_score, status, request_json, expected_hash, \
             file_path, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(stage.id().to_string())
        .bind(stage.session_id().to_string())
        .bind(stage.operation().as_str())
        .bind(stage.target_kind().as_str())
        .bind(stage.target_name())
        .bind(stage.confidence_level().as_str())
        .bind(stage.confidence_score())
        .bind(stage.status().as_str())
        .bind(stage.request().to_json()?)
        .bind(stage.expected_hash().as_str())
        .bind(stage.request().file_path())
        .bind(stage.created_at().to_rfc3339())
        .bind(stage.expires_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        debug!("stage {} saved for session {}", stage.id(), stage.session_id());
        Ok(())
    }

    async fn find_stage(&self, id: StageId) -> Result<Option<Stage>, CodemodError> {
        let row = sqlx::query("SELECT * FROM stages WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        let Some(row) = row else { return Ok(None) };
        let stage = Self::stage_from_row(&row)?;

        // Lazy expiry sweep: an expired stage is removed on fetch.
        if stage.is_expired_at(Utc::now()) {
            sqlx::query("DELETE FROM stages WHERE id = ?")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
            debug!("stage {} expired; swept on fetch", id);
            return Ok(None);
        }
        Ok(Some(stage))
    }

    async fn list_pending(&self, session_id: SessionId) -> Result<Vec<Stage>, CodemodError> {
        let rows = sqlx::query(
            "SELECT * FROM stages WHERE session_id = ? AND status = 'pending' \
             AND expires_at > ? ORDER BY created_at ASC",
        )
        .bind(session_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::stage_from_row).collect()
    }

    async fn list_all_pending(&self) -> Result<Vec<Stage>, CodemodError> {
        let rows = sqlx::query(
            "SELECT * FROM stages WHERE status = 'pending' AND expires_at > ? \
             ORDER BY created_at ASC",
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::stage_from_row).collect()
    }

    async fn latest_pending(&self) -> Result<Option<Stage>, CodemodError> {
        let row = sqlx::query(
            "SELECT * FROM stages WHERE status = 'pending' AND expires_at > ? \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(Self::stage_from_row).transpose()
    }

    async fn reject_stage(&self, id: StageId) -> Result<(), CodemodError> {
        let result = sqlx::query("UPDATE stages SET status = 'rejected' WHERE id = ? AND status = 'pending'")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(CodemodError::StageNotFound(format!(
                "no pending stage with id {}",
                id
            )));
        }
        Ok(())
    }

    async fn complete_apply(&self, stage_id: StageId, record: &ApplyRecord) -> Result<(), CodemodError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let deleted = sqlx::query("DELETE FROM stages WHERE id = ? AND status = 'pending'")
            .bind(stage_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        if deleted.rows_affected() == 0 {
            return Err(CodemodError::StageNotFound(format!(
                "no pending stage with id {}",
                stage_id
            )));
        }

        sqlx::query(
            "INSERT INTO applies (id, stage_id, auto_applied, applied_by, applied_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id().to_string())
        .bind(record.stage_id().to_string())
        .bind(record.auto_applied())
        .bind(record.applied_by())
        .bind(record.applied_at().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        debug!("stage {} applied and deleted; audit record {}", stage_id, record.id());
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, CodemodError> {
        let result = sqlx::query("DELETE FROM stages WHERE status = 'pending' AND expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn count_pending(&self) -> Result<u64, CodemodError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stages WHERE status = 'pending' AND expires_at > ?",
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(count as u64)
    }
}

fn db_error(e: sqlx::Error) -> CodemodError {
    CodemodError::DatabaseError(e.to_string())
}

fn parse_kind(s: &str) -> Result<NodeKind, CodemodError> {
    NodeKind::ALL
        .iter()
        .copied()
        .find(|k| k.as_str() == s)
        .ok_or_else(|| CodemodError::SerializationError(format!("unknown node kind in store: '{}'", s)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CodemodError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CodemodError::SerializationError(format!("bad timestamp '{}': {}", s, e)))
}
