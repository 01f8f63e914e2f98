// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Staging lifecycle scenarios through the engine: create, list, apply,
//! audit trail, expiry.

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use structural_codemod_domain::entities::{StageStatus, TransformRequest};
use structural_codemod_domain::value_objects::Operation;

use structural_codemod::application::services::staging_service::ApplyTarget;
use structural_codemod::CodemodEngine;

fn write_go_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("main.go");
    fs::write(&path, "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n").unwrap();
    path
}

fn replace_request(path: &std::path::Path) -> TransformRequest {
    TransformRequest::for_path(
        "go",
        path.to_string_lossy(),
        "function:main",
        Operation::Replace,
        "func main() {\n\tprintln(\"bye\")\n}",
    )
}

/// Scenario: create a stage for a replace; list pending -> 1 stage;
/// apply(stageId) -> file written, audit record created, stage removed,
/// list pending -> 0 stages.
#[tokio::test]
async fn test_staging_round_trip_through_engine() {
    let engine = Arc::new(CodemodEngine::in_memory().await.unwrap());
    let dir = TempDir::new().unwrap();
    let path = write_go_file(&dir);
    let session_id = engine.session().id();

    let notify = engine
        .staging()
        .create_stage(session_id, replace_request(&path))
        .await;
    let stage_id = notify.await.unwrap().unwrap();

    let pending = engine.staging().list_pending(session_id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status(), StageStatus::Pending);
    assert_eq!(pending[0].target_name(), "main");
    // The pipeline never writes files in staging mode.
    assert!(fs::read_to_string(&path).unwrap().contains("println(\"hi\")"));

    let outcomes = engine
        .staging()
        .apply(ApplyTarget::Id(stage_id), false, "integration")
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    outcomes[0].result.as_ref().unwrap();

    // File written, stage removed.
    assert!(fs::read_to_string(&path).unwrap().contains("println(\"bye\")"));
    assert!(engine.staging().list_pending(session_id).await.unwrap().is_empty());
    assert!(engine.staging().get_stage(stage_id).await.unwrap().is_none());
}

/// `apply latest` with several pending stages picks the newest.
#[tokio::test]
async fn test_apply_latest_picks_newest() {
    let engine = Arc::new(CodemodEngine::in_memory().await.unwrap());
    let dir = TempDir::new().unwrap();
    let first = write_go_file(&dir);
    let second_path = dir.path().join("other.go");
    fs::write(&second_path, "package main\n\nfunc other() {}\n").unwrap();
    let session_id = engine.session().id();

    // Created strictly in order so "latest" is unambiguous.
    let first_notify = engine
        .staging()
        .create_stage(session_id, replace_request(&first))
        .await;
    first_notify.await.unwrap().unwrap();
    let second_notify = engine
        .staging()
        .create_stage(
            session_id,
            TransformRequest::for_path(
                "go",
                second_path.to_string_lossy(),
                "function:other",
                Operation::Delete,
                "",
            ),
        )
        .await;
    second_notify.await.unwrap().unwrap();

    let outcomes = engine
        .staging()
        .apply(ApplyTarget::Latest, true, "auto")
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    outcomes[0].result.as_ref().unwrap();

    // Only the newest (delete) applied.
    assert!(!fs::read_to_string(&second_path).unwrap().contains("func other"));
    assert!(fs::read_to_string(&first).unwrap().contains("println(\"hi\")"));
    assert_eq!(engine.staging().list_pending(session_id).await.unwrap().len(), 1);
}

/// `apply --all` drains every pending stage.
#[tokio::test]
async fn test_apply_all() {
    let engine = Arc::new(CodemodEngine::in_memory().await.unwrap());
    let dir = TempDir::new().unwrap();
    let a = write_go_file(&dir);
    let b = dir.path().join("b.go");
    fs::write(&b, "package main\n\nfunc b() {}\n").unwrap();
    let session_id = engine.session().id();

    engine
        .staging()
        .create_batch(
            session_id,
            vec![
                replace_request(&a),
                TransformRequest::for_path(
                    "go",
                    b.to_string_lossy(),
                    "function:b",
                    Operation::Delete,
                    "",
                ),
            ],
        )
        .await;

    let outcomes = engine
        .staging()
        .apply(ApplyTarget::All, false, "integration")
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));
    assert!(engine.staging().list_pending(session_id).await.unwrap().is_empty());
}

/// Rejected stages leave the pending listing but are not applied.
#[tokio::test]
async fn test_reject_stage() {
    let engine = Arc::new(CodemodEngine::in_memory().await.unwrap());
    let dir = TempDir::new().unwrap();
    let path = write_go_file(&dir);
    let session_id = engine.session().id();

    let notify = engine
        .staging()
        .create_stage(session_id, replace_request(&path))
        .await;
    let stage_id = notify.await.unwrap().unwrap();

    engine.staging().reject(stage_id).await.unwrap();
    assert!(engine.staging().list_pending(session_id).await.unwrap().is_empty());
    assert!(fs::read_to_string(&path).unwrap().contains("println(\"hi\")"));
}

/// Stage creation reports per-stage errors for unmatchable targets.
#[tokio::test]
async fn test_create_error_reported_per_stage() {
    let engine = Arc::new(CodemodEngine::in_memory().await.unwrap());
    let dir = TempDir::new().unwrap();
    let path = write_go_file(&dir);
    let session_id = engine.session().id();

    let results = engine
        .staging()
        .create_batch(
            session_id,
            vec![
                replace_request(&path),
                TransformRequest::for_path(
                    "go",
                    path.to_string_lossy(),
                    "function:missing",
                    Operation::Delete,
                    "",
                ),
            ],
        )
        .await;
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(engine.staging().list_pending(session_id).await.unwrap().len(), 1);
}
