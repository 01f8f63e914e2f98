// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Tool Method Table
//!
//! One method per operation, JSON arguments in, JSON results out. The
//! wire transport is a host concern; this table owns argument
//! validation, dispatch into the use cases, progress notification, and
//! the error envelope.
//!
//! ## Methods
//!
//! | Method | Required arguments |
//! |---|---|
//! | `query` | language?, source XOR path, query |
//! | `file_query` | scope, query |
//! | `replace` | language?, source XOR path, target, replacement |
//! | `delete` | language?, source XOR path, target |
//! | `insert_before` / `insert_after` | language?, source XOR path, target, content |
//! | `append` | language?, source XOR path, content (may be empty), target? |
//! | `file_replace` / `file_delete` | scope, target, replacement?, dry_run?, backup? |
//! | `apply` | exactly one of id / all / latest (latest default) |
//!
//! Validation rules shared across methods: exactly one of `source` and
//! `path`; targets are `{type, name}`; conflicting apply selectors are
//! `InvalidParams`.

use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use structural_codemod_domain::entities::TransformRequest;
use structural_codemod_domain::value_objects::{
    Operation, PipelineOutcome, Status, TransformOptions,
};
use structural_codemod_domain::CodemodError;

use super::errors::{RpcError, SYNTAX_ERROR, TRANSFORM_FAILED};
use super::progress::{ProgressSink, ProgressStage};
use crate::application::services::file_processor::{BatchOptions, FileScope};
use crate::application::services::staging_service::ApplyTarget;
use crate::application::use_cases::{
    ApplyStageUseCase, FileQueryUseCase, FileTransformUseCase, QueryConfig, QuerySourceUseCase,
    TransformSourceUseCase,
};
use crate::engine::CodemodEngine;
use structural_codemod_domain::value_objects::StageId;

/// Structural target: `{type, name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetArg {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl TargetArg {
    fn to_query(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    language: Option<String>,
    source: Option<String>,
    path: Option<String>,
    query: String,
    #[serde(default)]
    options: TransformOptions,
}

#[derive(Debug, Deserialize)]
struct TransformArgs {
    language: Option<String>,
    source: Option<String>,
    path: Option<String>,
    target: TargetArg,
    #[serde(default)]
    replacement: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    options: TransformOptions,
    /// Record a pending stage instead of transforming directly.
    #[serde(default)]
    stage: bool,
}

#[derive(Debug, Deserialize)]
struct AppendArgs {
    language: Option<String>,
    source: Option<String>,
    path: Option<String>,
    /// Optional; append lands at end-of-file without one.
    target: Option<TargetArg>,
    /// May be empty.
    #[serde(default)]
    content: String,
    #[serde(default)]
    options: TransformOptions,
}

#[derive(Debug, Deserialize)]
struct ScopeArg {
    root: String,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
    language: Option<String>,
    max_files: Option<usize>,
    #[serde(default)]
    parallel: bool,
}

impl ScopeArg {
    fn to_scope(&self) -> FileScope {
        FileScope {
            root: PathBuf::from(&self.root),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            language: self.language.clone(),
            max_files: self.max_files,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileQueryArgs {
    scope: ScopeArg,
    query: String,
    #[serde(default)]
    options: TransformOptions,
}

#[derive(Debug, Deserialize)]
struct FileTransformArgs {
    scope: ScopeArg,
    target: TargetArg,
    #[serde(default)]
    replacement: Option<String>,
    #[serde(default)]
    dry_run: bool,
    #[serde(default)]
    backup: bool,
    #[serde(default)]
    options: TransformOptions,
}

#[derive(Debug, Deserialize, Default)]
struct ApplyArgs {
    id: Option<String>,
    #[serde(default)]
    all: bool,
    #[serde(default)]
    latest: bool,
}

/// The JSON-RPC-style tool service.
pub struct ToolService {
    engine: Arc<CodemodEngine>,
}

impl ToolService {
    pub fn new(engine: Arc<CodemodEngine>) -> Self {
        Self { engine }
    }

    /// Dispatches one tool call.
    pub async fn dispatch(
        &self,
        method: &str,
        params: Value,
        progress: &ProgressSink,
    ) -> Result<Value, RpcError> {
        match method {
            "query" => self.query(params, progress).await,
            "file_query" => self.file_query(params, progress).await,
            "replace" => self.transform(method, params, progress, Operation::Replace).await,
            "delete" => self.transform(method, params, progress, Operation::Delete).await,
            "insert_before" => {
                self.transform(method, params, progress, Operation::InsertBefore).await
            }
            "insert_after" => {
                self.transform(method, params, progress, Operation::InsertAfter).await
            }
            "append" => self.append(params, progress).await,
            "file_replace" => self.file_transform(method, params, progress, Operation::Replace).await,
            "file_delete" => self.file_transform(method, params, progress, Operation::Delete).await,
            "apply" => self.apply(params, progress).await,
            other => Err(RpcError::invalid_params(format!("unknown method '{}'", other))),
        }
    }

    async fn query(&self, params: Value, progress: &ProgressSink) -> Result<Value, RpcError> {
        progress.notify("query", ProgressStage::Validation);
        let args: QueryArgs = parse_args(params)?;
        validate_source_xor_path(&args.source, &args.path)?;

        progress.notify("query", ProgressStage::Load);
        progress.notify("query", ProgressStage::Provider);

        let use_case = QuerySourceUseCase::new(self.engine.pipeline());
        progress.notify("query", ProgressStage::Transform);
        let matches = use_case.execute(QueryConfig {
            language: args.language,
            source: args.source,
            path: args.path.map(PathBuf::from),
            query: args.query,
            options: args.options,
        })?;

        progress.notify("query", ProgressStage::Finalize);
        let text = matches
            .iter()
            .map(|m| format!("{} {} at {}", m.kind(), m.name(), m.location()))
            .collect::<Vec<_>>()
            .join("\n");
        let match_count = matches.len();
        Ok(json!({
            "content": [{"type": "text", "text": text}],
            "matches": matches,
            "match_count": match_count,
        }))
    }

    async fn transform(
        &self,
        method: &str,
        params: Value,
        progress: &ProgressSink,
        operation: Operation,
    ) -> Result<Value, RpcError> {
        progress.notify(method, ProgressStage::Validation);
        let args: TransformArgs = parse_args(params)?;
        validate_source_xor_path(&args.source, &args.path)?;

        let replacement = args
            .replacement
            .or(args.content)
            .unwrap_or_default();
        if operation == Operation::Replace && replacement.is_empty() {
            return Err(RpcError::invalid_params("replace requires a replacement"));
        }

        progress.notify(method, ProgressStage::Load);
        let request = build_request(
            args.language,
            args.source,
            args.path,
            args.target.to_query(),
            operation,
            replacement,
            args.options,
        );
        progress.notify(method, ProgressStage::Provider);

        let use_case = TransformSourceUseCase::new(
            self.engine.pipeline(),
            self.engine.staging(),
            self.engine.observability(),
        );

        progress.notify(method, ProgressStage::Transform);
        if args.stage {
            let stage_id = use_case
                .execute_staged(self.engine.session().id(), request)
                .await?;
            progress.notify(method, ProgressStage::Finalize);
            return Ok(json!({
                "content": [{"type": "text", "text": format!("staged as {}", stage_id)}],
                "staged": true,
                "stage_id": stage_id.to_string(),
                "session_id": self.engine.session().id().to_string(),
            }));
        }

        let outcome = use_case.execute_direct(request, self.engine.token()).await?;
        progress.notify(method, ProgressStage::Finalize);
        outcome_to_result(outcome)
    }

    async fn append(&self, params: Value, progress: &ProgressSink) -> Result<Value, RpcError> {
        progress.notify("append", ProgressStage::Validation);
        let args: AppendArgs = parse_args(params)?;
        validate_source_xor_path(&args.source, &args.path)?;

        progress.notify("append", ProgressStage::Load);
        progress.notify("append", ProgressStage::Provider);
        progress.notify("append", ProgressStage::Transform);

        let outcome = match args.target {
            Some(target) => {
                let request = build_request(
                    args.language,
                    args.source,
                    args.path,
                    target.to_query(),
                    Operation::AppendToBody,
                    args.content,
                    args.options,
                );
                let use_case = TransformSourceUseCase::new(
                    self.engine.pipeline(),
                    self.engine.staging(),
                    self.engine.observability(),
                );
                use_case.execute_direct(request, self.engine.token()).await?
            }
            None => {
                // No target: append at end-of-file.
                let request = build_request(
                    args.language,
                    args.source,
                    args.path.clone(),
                    "block:*".to_string(),
                    Operation::AppendToBody,
                    args.content,
                    args.options,
                );
                let pipeline = self.engine.pipeline();
                let token = self.engine.token();
                let outcome = tokio::task::spawn_blocking(move || pipeline.append_eof(&request, &token))
                    .await
                    .map_err(|e| RpcError::from(CodemodError::InternalError(e.to_string())))??;
                if outcome.is_success() {
                    if let Some(path) = &args.path {
                        tokio::fs::write(path, outcome.output()).await.map_err(|e| {
                            RpcError::from(CodemodError::FileSystemError(format!(
                                "write {} failed: {}",
                                path, e
                            )))
                        })?;
                    }
                }
                outcome
            }
        };

        progress.notify("append", ProgressStage::Finalize);
        outcome_to_result(outcome)
    }

    async fn file_query(&self, params: Value, progress: &ProgressSink) -> Result<Value, RpcError> {
        progress.notify("file_query", ProgressStage::Validation);
        let args: FileQueryArgs = parse_args(params)?;

        progress.notify("file_query", ProgressStage::Load);
        progress.notify("file_query", ProgressStage::Provider);
        progress.notify("file_query", ProgressStage::Transform);

        let use_case =
            FileQueryUseCase::new(self.engine.file_processor(), self.engine.observability());
        let batch = BatchOptions {
            parallel: args.scope.parallel,
            ..BatchOptions::default()
        };
        let report = use_case
            .execute(
                args.scope.to_scope(),
                args.query,
                args.options,
                batch,
                self.engine.token(),
            )
            .await?;

        progress.notify("file_query", ProgressStage::Finalize);
        let per_file: Vec<Value> = report
            .per_file
            .iter()
            .map(|f| {
                json!({
                    "path": f.path.display().to_string(),
                    "matches": f.matches,
                    "match_count": f.matches.len(),
                })
            })
            .collect();
        Ok(json!({
            "content": [{"type": "text", "text": format!(
                "{} matches across {} files", report.total_matches, report.per_file.len()
            )}],
            "files_scanned": report.files_scanned,
            "total_matches": report.total_matches,
            "per_file": per_file,
            "diagnostics": report.diagnostics,
        }))
    }

    async fn file_transform(
        &self,
        method: &str,
        params: Value,
        progress: &ProgressSink,
        operation: Operation,
    ) -> Result<Value, RpcError> {
        progress.notify(method, ProgressStage::Validation);
        let args: FileTransformArgs = parse_args(params)?;
        let replacement = args.replacement.unwrap_or_default();
        if operation == Operation::Replace && replacement.is_empty() {
            return Err(RpcError::invalid_params("file_replace requires a replacement"));
        }

        progress.notify(method, ProgressStage::Load);
        progress.notify(method, ProgressStage::Provider);
        progress.notify(method, ProgressStage::Transform);

        let use_case =
            FileTransformUseCase::new(self.engine.file_processor(), self.engine.observability());
        let batch = BatchOptions {
            parallel: args.scope.parallel,
            dry_run: args.dry_run,
            backup: args.backup,
        };
        let report = use_case
            .execute(
                args.scope.to_scope(),
                args.target.to_query(),
                operation,
                replacement,
                args.options,
                batch,
                self.engine.token(),
            )
            .await?;

        progress.notify(method, ProgressStage::Finalize);
        let per_file: Vec<Value> = report
            .per_file
            .iter()
            .map(|f| {
                json!({
                    "path": f.path.display().to_string(),
                    "status": f.status.to_string(),
                    "matches": f.matches_found,
                    "modified": f.modified,
                    "diff": f.diff,
                })
            })
            .collect();
        Ok(json!({
            "content": [{"type": "text", "text": format!(
                "{} of {} files modified, {} matches",
                report.files_modified, report.files_scanned, report.total_matches
            )}],
            "files_scanned": report.files_scanned,
            "files_modified": report.files_modified,
            "total_matches": report.total_matches,
            "per_file": per_file,
            "diagnostics": report.diagnostics,
        }))
    }

    async fn apply(&self, params: Value, progress: &ProgressSink) -> Result<Value, RpcError> {
        progress.notify("apply", ProgressStage::Validation);
        let args: ApplyArgs = if params.is_null() {
            ApplyArgs::default()
        } else {
            parse_args(params)?
        };

        let target = match (args.id, args.all, args.latest) {
            (Some(id), false, false) => ApplyTarget::Id(
                StageId::from_string(&id).map_err(RpcError::from)?,
            ),
            (None, true, false) => ApplyTarget::All,
            (None, false, _) => ApplyTarget::Latest,
            _ => {
                return Err(RpcError::invalid_params(
                    "pass at most one of id, all, latest",
                ));
            }
        };

        progress.notify("apply", ProgressStage::Load);
        progress.notify("apply", ProgressStage::Provider);
        progress.notify("apply", ProgressStage::Transform);

        let use_case = ApplyStageUseCase::new(self.engine.staging());
        let outcomes = use_case.execute(target, false, "tool").await?;

        progress.notify("apply", ProgressStage::Finalize);
        let applied: Vec<String> = outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.stage_id.to_string())
            .collect();
        let detail: Vec<Value> = outcomes
            .iter()
            .map(|o| {
                json!({
                    "stage_id": o.stage_id.to_string(),
                    "ok": o.result.is_ok(),
                    "error": o.result.as_ref().err().map(|e| e.to_string()),
                })
            })
            .collect();
        Ok(json!({
            "content": [{"type": "text", "text": format!("{} stages applied", applied.len())}],
            "applied": applied,
            "outcomes": detail,
        }))
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(e.to_string()))
}

fn validate_source_xor_path(
    source: &Option<String>,
    path: &Option<String>,
) -> Result<(), RpcError> {
    match (source, path) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(RpcError::invalid_params(
            "exactly one of source and path is required",
        )),
    }
}

fn build_request(
    language: Option<String>,
    source: Option<String>,
    path: Option<String>,
    query: String,
    operation: Operation,
    replacement: String,
    options: TransformOptions,
) -> TransformRequest {
    let language = language.unwrap_or_default();
    let request = match (source, path) {
        (Some(source), _) => {
            TransformRequest::for_source(language, source, query, operation, replacement)
        }
        (None, Some(path)) => {
            TransformRequest::for_path(language, path, query, operation, replacement)
        }
        (None, None) => TransformRequest::for_source(language, "", query, operation, replacement),
    };
    request.with_options(options)
}

/// Maps a finished pipeline outcome into the tool result envelope.
///
/// Error status becomes a JSON-RPC error (syntax failures keep their own
/// code); success and partial return a success envelope whose `status`
/// field distinguishes them.
fn outcome_to_result(outcome: PipelineOutcome) -> Result<Value, RpcError> {
    if outcome.status() == Status::Error {
        let code = if outcome.diagnostics().iter().any(|d| d.source() == "parse") {
            SYNTAX_ERROR
        } else {
            TRANSFORM_FAILED
        };
        let message = outcome
            .diagnostics()
            .first()
            .map(|d| d.message().to_string())
            .unwrap_or_else(|| "transform failed".to_string());
        return Err(RpcError::new(code, message)
            .with_data(json!({"diagnostics": outcome.diagnostics()})));
    }

    let confidence = if outcome.fuzzy().used {
        outcome.fuzzy().confidence
    } else {
        1.0
    };
    let summary = outcome
        .diff()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no changes".to_string());
    Ok(json!({
        "content": [{"type": "text", "text": summary}],
        "status": outcome.status().to_string(),
        "modified_source": outcome.output(),
        "diff": outcome.diff(),
        "confidence": confidence,
        "match_count": outcome.stats().matches_found,
        "hash": outcome.hash().to_string(),
        "fuzzy": outcome.fuzzy(),
        "diagnostics": outcome.diagnostics(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> ToolService {
        ToolService::new(Arc::new(CodemodEngine::in_memory().await.unwrap()))
    }

    const GO_SOURCE: &str = "package main\nfunc main() {\n\tprintln(\"hi\")\n}\n";

    #[tokio::test]
    async fn test_query_method() {
        let service = service().await;
        let result = service
            .dispatch(
                "query",
                json!({"language": "go", "source": GO_SOURCE, "query": "function:main"}),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap();
        assert_eq!(result["match_count"], 1);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("main"));
    }

    #[tokio::test]
    async fn test_source_and_path_rejected_uniformly() {
        let service = service().await;
        for method in ["query", "replace", "delete", "insert_before", "insert_after", "append"] {
            let mut params = json!({
                "language": "go",
                "source": GO_SOURCE,
                "path": "main.go",
                "query": "function:main",
                "target": {"type": "function", "name": "main"},
                "replacement": "func x() {}",
                "content": "x",
            });
            if method == "append" {
                params["target"] = Value::Null;
            }
            let err = service
                .dispatch(method, params, &ProgressSink::disabled())
                .await
                .unwrap_err();
            assert_eq!(err.code, super::super::errors::INVALID_PARAMS, "method {}", method);
        }
    }

    #[tokio::test]
    async fn test_replace_method_returns_modified_source() {
        let service = service().await;
        let result = service
            .dispatch(
                "replace",
                json!({
                    "language": "go",
                    "source": GO_SOURCE,
                    "target": {"type": "function", "name": "main"},
                    "replacement": "func renamed() {\n\tprintln(\"hi\")\n}",
                }),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap();
        assert_eq!(result["status"], "success");
        assert!(result["modified_source"].as_str().unwrap().contains("func renamed()"));
        assert_eq!(result["match_count"], 1);
        assert_eq!(result["confidence"], 1.0);
    }

    #[tokio::test]
    async fn test_append_allows_empty_content() {
        let service = service().await;
        let result = service
            .dispatch(
                "append",
                json!({"language": "go", "source": GO_SOURCE, "content": ""}),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["modified_source"], GO_SOURCE);
    }

    #[tokio::test]
    async fn test_append_without_target_appends_at_eof() {
        let service = service().await;
        let result = service
            .dispatch(
                "append",
                json!({"language": "go", "source": GO_SOURCE, "content": "func tail() {}"}),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap();
        let output = result["modified_source"].as_str().unwrap();
        assert!(output.ends_with("func tail() {}\n"));
    }

    #[tokio::test]
    async fn test_apply_conflicting_selectors() {
        let service = service().await;
        let err = service
            .dispatch(
                "apply",
                json!({"all": true, "latest": true}),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, super::super::errors::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_apply_defaults_to_latest_on_empty_store() {
        let service = service().await;
        let result = service
            .dispatch("apply", json!({}), &ProgressSink::disabled())
            .await
            .unwrap();
        assert_eq!(result["applied"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let service = service().await;
        let err = service
            .dispatch("rename_symbol", json!({}), &ProgressSink::disabled())
            .await
            .unwrap_err();
        assert_eq!(err.code, super::super::errors::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_progress_checkpoints_emitted() {
        let service = service().await;
        let (sink, mut receiver) = ProgressSink::channel();
        service
            .dispatch(
                "query",
                json!({"language": "go", "source": GO_SOURCE, "query": "func:*"}),
                &sink,
            )
            .await
            .unwrap();
        let mut percents = Vec::new();
        while let Ok(notification) = receiver.try_recv() {
            percents.push(notification.percent);
        }
        assert_eq!(percents, vec![5, 15, 25, 70, 90]);
    }

    #[tokio::test]
    async fn test_transform_error_is_rpc_error_with_diagnostics() {
        let service = service().await;
        let err = service
            .dispatch(
                "delete",
                json!({
                    "language": "go",
                    "source": GO_SOURCE,
                    "target": {"type": "function", "name": "absent"},
                }),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, TRANSFORM_FAILED);
        assert!(err.data.is_some());
    }
}
