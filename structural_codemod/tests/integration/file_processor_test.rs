// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! File-scoped query and transform scenarios.

use std::fs;
use tempfile::TempDir;

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::value_objects::{Operation, TransformOptions};

use structural_codemod::application::services::file_processor::{
    BatchOptions, FileProcessor, FileScope,
};
use structural_codemod::infrastructure::config::FileProcessorSettings;

use crate::common::fresh_pipeline;

fn processor() -> FileProcessor {
    FileProcessor::new(fresh_pipeline(), FileProcessorSettings::default())
}

/// Scenario: a root with `main.go` and `util.go`, both holding a
/// top-level func declaration; `func:*` over `*.go` yields 2 matches
/// across 2 files with a per-file breakdown.
#[tokio::test]
async fn test_scoped_query_two_go_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("main.go"),
        "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("util.go"),
        "package main\n\nfunc utilOne() int {\n\treturn 1\n}\n",
    )
    .unwrap();

    let scope = FileScope::new(dir.path()).with_include(vec!["*.go".to_string()]);
    let report = processor()
        .query(
            &scope,
            "func:*",
            &TransformOptions::default(),
            &BatchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.total_matches, 2);
    assert_eq!(report.per_file.len(), 2);
    for file in &report.per_file {
        assert_eq!(file.matches.len(), 1, "{}", file.path.display());
    }
}

/// Recursive `**` include semantics reach nested directories; the plain
/// single-level glob does not.
#[tokio::test]
async fn test_recursive_glob_semantics() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pkg/inner")).unwrap();
    fs::write(dir.path().join("top.go"), "package main\nfunc top() {}\n").unwrap();
    fs::write(
        dir.path().join("pkg/inner/deep.go"),
        "package inner\nfunc deep() {}\n",
    )
    .unwrap();

    let flat = FileScope::new(dir.path()).with_include(vec!["*.go".to_string()]);
    assert_eq!(processor().enumerate(&flat).unwrap().len(), 1);

    let recursive = FileScope::new(dir.path()).with_include(vec!["**/*.go".to_string()]);
    assert_eq!(processor().enumerate(&recursive).unwrap().len(), 2);
}

/// Per-file transforms aggregate match counts and write only in
/// non-dry-run mode.
#[tokio::test]
async fn test_scoped_delete_parallel() {
    let dir = TempDir::new().unwrap();
    for name in ["a.go", "b.go", "c.go"] {
        fs::write(
            dir.path().join(name),
            "package main\n\nfunc target() {}\n\nfunc keep() {}\n",
        )
        .unwrap();
    }

    let scope = FileScope::new(dir.path()).with_include(vec!["*.go".to_string()]);
    let report = processor()
        .transform(
            &scope,
            "function:target",
            Operation::Delete,
            "",
            &TransformOptions::default(),
            &BatchOptions {
                parallel: true,
                ..BatchOptions::default()
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_modified, 3);
    assert_eq!(report.total_matches, 3);
    for name in ["a.go", "b.go", "c.go"] {
        let content = fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(!content.contains("target"), "{}", name);
        assert!(content.contains("keep"), "{}", name);
    }
}

/// A cancelled token aborts between files without failing the batch
/// call.
#[tokio::test]
async fn test_cancellation_between_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.go"), "package main\nfunc a() {}\n").unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let scope = FileScope::new(dir.path());
    let report = processor()
        .query(
            &scope,
            "func:*",
            &TransformOptions::default(),
            &BatchOptions::default(),
            &token,
        )
        .await
        .unwrap();
    assert_eq!(report.total_matches, 0);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.message().contains("cancelled")));
}
