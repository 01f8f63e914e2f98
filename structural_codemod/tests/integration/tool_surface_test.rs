// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Tool-surface scenarios: staged transforms applied through the method
//! table, file-scoped methods, and error-code mapping.

use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use structural_codemod::presentation::rpc::{ProgressSink, ToolService};
use structural_codemod::CodemodEngine;

async fn service() -> ToolService {
    ToolService::new(Arc::new(CodemodEngine::in_memory().await.unwrap()))
}

/// A staged replace round-trips through the `apply` method.
#[tokio::test]
async fn test_stage_then_apply_via_tools() {
    let service = service().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.go");
    fs::write(&path, "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n").unwrap();

    let staged = service
        .dispatch(
            "replace",
            json!({
                "path": path.display().to_string(),
                "target": {"type": "function", "name": "main"},
                "replacement": "func main() {\n\tprintln(\"bye\")\n}",
                "stage": true,
            }),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap();
    assert_eq!(staged["staged"], true);
    let stage_id = staged["stage_id"].as_str().unwrap().to_string();
    // Staging never writes.
    assert!(fs::read_to_string(&path).unwrap().contains("println(\"hi\")"));

    let applied = service
        .dispatch("apply", json!({"id": stage_id}), &ProgressSink::disabled())
        .await
        .unwrap();
    assert_eq!(applied["applied"].as_array().unwrap().len(), 1);
    assert!(fs::read_to_string(&path).unwrap().contains("println(\"bye\")"));

    // Nothing left to apply.
    let empty = service
        .dispatch("apply", json!({"latest": true}), &ProgressSink::disabled())
        .await
        .unwrap();
    assert_eq!(empty["applied"].as_array().unwrap().len(), 0);
}

/// `file_replace` reports files scanned/modified and per-file diffs.
#[tokio::test]
async fn test_file_replace_via_tools() {
    let service = service().await;
    let dir = TempDir::new().unwrap();
    for name in ["a.go", "b.go"] {
        fs::write(
            dir.path().join(name),
            "package main\n\nfunc target() int {\n\treturn 1\n}\n",
        )
        .unwrap();
    }

    let result = service
        .dispatch(
            "file_replace",
            json!({
                "scope": {"root": dir.path().display().to_string(), "include": ["*.go"]},
                "target": {"type": "function", "name": "target"},
                "replacement": "func target() int {\n\treturn 2\n}",
            }),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap();

    assert_eq!(result["files_scanned"], 2);
    assert_eq!(result["files_modified"], 2);
    assert_eq!(result["total_matches"], 2);
    let per_file = result["per_file"].as_array().unwrap();
    assert_eq!(per_file.len(), 2);
    assert!(per_file.iter().all(|f| f["diff"].is_string()));
}

/// `file_delete` honors dry-run.
#[tokio::test]
async fn test_file_delete_dry_run_via_tools() {
    let service = service().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.go");
    let content = "package main\n\nfunc doomed() {}\n";
    fs::write(&path, content).unwrap();

    let result = service
        .dispatch(
            "file_delete",
            json!({
                "scope": {"root": dir.path().display().to_string()},
                "target": {"type": "function", "name": "doomed"},
                "dry_run": true,
            }),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap();

    assert_eq!(result["files_modified"], 0);
    assert_eq!(result["total_matches"], 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}

/// Unknown-language and unknown-alias failures carry their documented
/// codes.
#[tokio::test]
async fn test_error_codes() {
    let service = service().await;

    let err = service
        .dispatch(
            "query",
            json!({"language": "fortran", "source": "x", "query": "function:*"}),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, -32002);

    let err = service
        .dispatch(
            "query",
            json!({"language": "go", "source": "package main", "query": "lambda:*"}),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, -32602);

    let err = service
        .dispatch(
            "delete",
            json!({
                "language": "go",
                "path": "/nonexistent/definitely/missing.go",
                "target": {"type": "function", "name": "x"},
            }),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, -32001);
}

/// Hierarchical query depth is capped at one `>` separator.
#[tokio::test]
async fn test_triple_hierarchy_rejected() {
    let service = service().await;
    let err = service
        .dispatch(
            "query",
            json!({
                "language": "go",
                "source": "package main",
                "query": "class:A > class:B > class:C > function:d",
            }),
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, -32602);
}
