// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end pipeline scenarios: replace, fuzzy resolution, overlap
//! conflicts, and the determinism guarantees.

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::entities::TransformRequest;
use structural_codemod_domain::services::QueryParser;
use structural_codemod_domain::value_objects::{NodeKind, Operation, Status, TransformOptions};

use crate::common::{calculate_sha256, fresh_pipeline, GO_MAIN};

/// Replacing a Go function: output contains the new declaration, one
/// match, success status, non-empty diff, stable hash.
#[test]
fn test_replace_go_function_end_to_end() {
    let pipeline = fresh_pipeline();
    let request = TransformRequest::for_source(
        "go",
        GO_MAIN,
        "function:main",
        Operation::Replace,
        "func newMain() {\n\tprintln(\"hi\")\n}",
    );

    let outcome = pipeline.execute(&request, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.status(), Status::Success);
    assert!(outcome.output().contains("func newMain()"));
    assert_eq!(outcome.stats().matches_found, 1);
    assert!(outcome.diff().is_some());

    // The reported hash is the SHA-256 of the output bytes.
    assert_eq!(
        outcome.hash().as_str(),
        calculate_sha256(outcome.output().as_bytes())
    );

    // Stable across invocations and pipeline instances.
    let again = fresh_pipeline()
        .execute(&request, &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.output(), again.output());
    assert_eq!(outcome.hash(), again.hash());
}

/// Fuzzy resolution: `function:NewUser` resolves onto `newUser` with the
/// case-insensitive heuristic contributing and confidence above 0.5.
#[test]
fn test_fuzzy_resolution_end_to_end() {
    let pipeline = fresh_pipeline();
    let source = "package main\nfunc newUser() {\n\tprintln(\"x\")\n}\n";
    let request = TransformRequest::for_source(
        "go",
        source,
        "function:NewUser",
        Operation::Replace,
        "func newUser() {\n\tprintln(\"y\")\n}",
    )
    .with_options(TransformOptions::new().with_fuzz(true).with_max_fuzz_distance(3));

    let outcome = pipeline.execute(&request, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.status(), Status::Success);

    let fuzzy = outcome.fuzzy();
    assert!(fuzzy.used);
    assert!(fuzzy.resolved_query.contains("newUser"));
    assert!(fuzzy.heuristics.contains(&"case_insensitive".to_string()));
    assert!(fuzzy.confidence > 0.5, "confidence {}", fuzzy.confidence);
    assert_eq!(outcome.stats().matches_found, 1);
}

/// Fuzzy determinism: two invocations with identical inputs resolve the
/// same query and the same anchors.
#[test]
fn test_fuzzy_determinism() {
    let source = "package main\nfunc getUserName() string {\n\treturn \"x\"\n}\n";
    let request = TransformRequest::for_source(
        "go",
        source,
        "function:username",
        Operation::Delete,
        "",
    )
    .with_options(TransformOptions::new().with_fuzz(true).with_max_fuzz_distance(12));

    let first = fresh_pipeline()
        .execute(&request, &CancellationToken::new())
        .unwrap();
    let second = fresh_pipeline()
        .execute(&request, &CancellationToken::new())
        .unwrap();
    assert_eq!(first.fuzzy(), second.fuzzy());
    assert_eq!(first.output(), second.output());
}

/// Overlap conflict: two edits whose ranges cover the same bytes fail
/// with at least one detected overlap and the original source intact.
#[test]
fn test_overlap_conflict_end_to_end() {
    let pipeline = fresh_pipeline();
    let source = "package main\nfunc main() {\n\tif x {\n\t\ty()\n\t}\n}\n";
    let request = TransformRequest::for_source(
        "go",
        source,
        "function:main | condition:*",
        Operation::Replace,
        "replaced",
    )
    .with_options(TransformOptions {
        skip_validation: true,
        ..TransformOptions::default()
    });

    let outcome = pipeline.execute(&request, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.status(), Status::Error);
    assert!(outcome.stats().overlaps_detected >= 1);
    assert_eq!(outcome.output(), source);
}

/// DSL aliases: `def:test*`, `fn:test*`, `function:test*`, `func:test*`
/// all produce the same structure with raw preserved.
#[test]
fn test_dsl_alias_equivalence() {
    let parser = QueryParser::new();
    let queries: Vec<_> = ["def:test*", "fn:test*", "function:test*", "func:test*"]
        .iter()
        .map(|input| (input, parser.parse(input).unwrap()))
        .collect();

    for (input, query) in &queries {
        assert_eq!(query.kind().as_node().unwrap(), NodeKind::Function);
        assert_eq!(query.pattern(), "test*");
        assert_eq!(query.raw(), **input);
    }
}

/// Empty source returns zero matches, not an error.
#[test]
fn test_empty_source_zero_matches() {
    let pipeline = fresh_pipeline();
    let provider = pipeline.resolve_provider(Some("go"), None).unwrap();
    let matches = pipeline
        .query_matches(
            provider.as_ref(),
            "",
            "function:*",
            &TransformOptions::default(),
        )
        .unwrap();
    assert!(matches.is_empty());
}

/// Replace with the matched text itself is the identity on bytes, and
/// delete leaves the rest of the file untouched.
#[test]
fn test_identity_and_delete_round_trips() {
    let pipeline = fresh_pipeline();
    let source = "package main\n\nfunc gone() {}\n\nfunc keep() {}\n";

    let identity = TransformRequest::for_source(
        "go",
        source,
        "function:keep",
        Operation::Replace,
        "func keep() {}",
    );
    let outcome = pipeline.execute(&identity, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.output(), source);
    assert!(outcome.diff().is_none());

    let delete = TransformRequest::for_source("go", source, "function:gone", Operation::Delete, "");
    let deleted = pipeline.execute(&delete, &CancellationToken::new()).unwrap();
    assert!(!deleted.output().contains("gone"));
    assert!(deleted.output().contains("func keep() {}"));
}

/// Case-only pattern differences match only through the fuzzy resolver
/// (or a wildcard pattern); exact matching stays case-sensitive.
#[test]
fn test_case_only_difference_requires_fuzz() {
    let pipeline = fresh_pipeline();
    let source = "package main\nfunc newUser() {}\n";

    let exact = TransformRequest::for_source("go", source, "function:newuser", Operation::Delete, "");
    let outcome = pipeline.execute(&exact, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.status(), Status::Error);

    let fuzzed = exact
        .clone()
        .with_options(TransformOptions::new().with_fuzz(true));
    let outcome = pipeline.execute(&fuzzed, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.status(), Status::Success);
    assert!(outcome.fuzzy().used);
}
