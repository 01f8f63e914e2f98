// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Processor Service
//!
//! Applies a query or transformation across every file in a scope:
//! enumerate (include/exclude globs, language filter, max-files),
//! dispatch each file through the pipeline - on a bounded worker pool
//! when parallel - and aggregate per-file results. Per-file failures
//! become diagnostics; they never abort the batch.
//!
//! Include globs use full recursive `**` semantics (globset defaults):
//! `*.go` matches only at the scope root, `**/*.go` matches recursively.
//!
//! Writes happen here and only here in direct (non-staging) mode: backup
//! writes a sibling `.bak` first, dry-run skips writing entirely.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::entities::TransformRequest;
use structural_codemod_domain::value_objects::{
    Diagnostic, MatchResult, Operation, Status, TransformOptions,
};
use structural_codemod_domain::CodemodError;

use crate::infrastructure::config::FileProcessorSettings;
use crate::infrastructure::pipeline::TransformPipeline;

/// The set of files an operation ranges over.
#[derive(Debug, Clone)]
pub struct FileScope {
    pub root: PathBuf,
    /// Include globs; empty accepts every file.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Restrict to files whose resolved provider is this language.
    pub language: Option<String>,
    /// Stop enumerating after this many files when positive.
    pub max_files: Option<usize>,
}

impl FileScope {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            language: None,
            max_files: None,
        }
    }

    pub fn with_include(mut self, globs: Vec<String>) -> Self {
        self.include = globs;
        self
    }

    pub fn with_exclude(mut self, globs: Vec<String>) -> Self {
        self.exclude = globs;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }
}

/// Execution knobs for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub parallel: bool,
    pub dry_run: bool,
    pub backup: bool,
}

/// Per-file matches from a scoped query.
#[derive(Debug, Clone)]
pub struct FileMatches {
    pub path: PathBuf,
    pub matches: Vec<MatchResult>,
}

/// Aggregated result of a scoped query.
#[derive(Debug, Clone, Default)]
pub struct FileQueryReport {
    pub files_scanned: usize,
    pub total_matches: usize,
    pub per_file: Vec<FileMatches>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-file outcome of a scoped transformation.
#[derive(Debug, Clone)]
pub struct FileTransformOutcome {
    pub path: PathBuf,
    pub status: Status,
    pub matches_found: u64,
    pub diff: Option<String>,
    pub modified: bool,
}

/// Aggregated result of a scoped transformation.
#[derive(Debug, Clone, Default)]
pub struct FileTransformReport {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub total_matches: usize,
    pub per_file: Vec<FileTransformOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Concurrent scope walker and per-file dispatcher.
pub struct FileProcessor {
    pipeline: Arc<TransformPipeline>,
    settings: FileProcessorSettings,
}

impl FileProcessor {
    pub fn new(pipeline: Arc<TransformPipeline>, settings: FileProcessorSettings) -> Self {
        Self { pipeline, settings }
    }

    /// Enumerates the files in scope, in deterministic (sorted) order.
    pub fn enumerate(&self, scope: &FileScope) -> Result<Vec<PathBuf>, CodemodError> {
        let include = build_globset(&scope.include)?;
        let exclude = build_globset(&scope.exclude)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&scope.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("walk error under {}: {}", scope.root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&scope.root)
                .unwrap_or(entry.path());

            if let Some(include) = &include {
                if !include.is_match(relative) {
                    continue;
                }
            }
            if let Some(exclude) = &exclude {
                if exclude.is_match(relative) {
                    continue;
                }
            }
            if let Some(language) = &scope.language {
                match self.pipeline.registry().resolve_by_path(entry.path()) {
                    Ok(provider) if provider.language_name() == language.to_lowercase() => {}
                    _ => continue,
                }
            }
            files.push(entry.path().to_path_buf());
            if let Some(max) = scope.max_files {
                if files.len() >= max {
                    break;
                }
            }
        }
        debug!("scope {} enumerated {} files", scope.root.display(), files.len());
        Ok(files)
    }

    /// Runs a structural query across the scope.
    pub async fn query(
        &self,
        scope: &FileScope,
        query: &str,
        options: &TransformOptions,
        batch: &BatchOptions,
        token: &CancellationToken,
    ) -> Result<FileQueryReport, CodemodError> {
        let files = self.enumerate(scope)?;
        let mut report = FileQueryReport {
            files_scanned: files.len(),
            ..FileQueryReport::default()
        };
        let timeout = Duration::from_secs(self.settings.query_timeout_secs);

        let results = self
            .for_each_file(files, batch.parallel, token, {
                let pipeline = self.pipeline.clone();
                let query = query.to_string();
                let options = options.clone();
                let token = token.clone();
                move |path: PathBuf| {
                    let pipeline = pipeline.clone();
                    let query = query.clone();
                    let options = options.clone();
                    let token = token.clone();
                    async move {
                        run_query_on_file(pipeline, path, query, options, timeout, token).await
                    }
                }
            })
            .await;

        for result in results {
            match result {
                Ok(file_matches) => {
                    report.total_matches += file_matches.matches.len();
                    if !file_matches.matches.is_empty() {
                        report.per_file.push(file_matches);
                    }
                }
                Err((path, e)) => {
                    report
                        .diagnostics
                        .push(Diagnostic::warning(
                            format!("{}: {}", path.display(), e),
                            "file_processor",
                        ));
                }
            }
        }
        if token.is_cancelled() {
            report
                .diagnostics
                .push(Diagnostic::error("cancelled", "file_processor"));
        }
        Ok(report)
    }

    /// Runs a transformation across the scope.
    pub async fn transform(
        &self,
        scope: &FileScope,
        query: &str,
        operation: Operation,
        replacement: &str,
        options: &TransformOptions,
        batch: &BatchOptions,
        token: &CancellationToken,
    ) -> Result<FileTransformReport, CodemodError> {
        let files = self.enumerate(scope)?;
        let mut report = FileTransformReport {
            files_scanned: files.len(),
            ..FileTransformReport::default()
        };
        let timeout = Duration::from_secs(self.settings.transform_timeout_secs);

        let results = self
            .for_each_file(files, batch.parallel, token, {
                let pipeline = self.pipeline.clone();
                let query = query.to_string();
                let replacement = replacement.to_string();
                let options = options.clone();
                let batch = batch.clone();
                let token = token.clone();
                move |path: PathBuf| {
                    let pipeline = pipeline.clone();
                    let query = query.clone();
                    let replacement = replacement.clone();
                    let options = options.clone();
                    let batch = batch.clone();
                    let token = token.clone();
                    async move {
                        run_transform_on_file(
                            pipeline, path, query, operation, replacement, options, batch, timeout,
                            token,
                        )
                        .await
                    }
                }
            })
            .await;

        for result in results {
            match result {
                Ok(outcome) => {
                    report.total_matches += outcome.matches_found as usize;
                    if outcome.modified {
                        report.files_modified += 1;
                    }
                    report.per_file.push(outcome);
                }
                Err((path, e)) => {
                    report.diagnostics.push(Diagnostic::warning(
                        format!("{}: {}", path.display(), e),
                        "file_processor",
                    ));
                }
            }
        }
        if token.is_cancelled() {
            report
                .diagnostics
                .push(Diagnostic::error("cancelled", "file_processor"));
        }
        Ok(report)
    }

    /// Fan-out helper: sequential, or a worker pool bounded by the
    /// available parallelism. Cancellation is observed between files.
    async fn for_each_file<T, F, Fut>(
        &self,
        files: Vec<PathBuf>,
        parallel: bool,
        token: &CancellationToken,
        work: F,
    ) -> Vec<Result<T, (PathBuf, CodemodError)>>
    where
        T: Send + 'static,
        F: Fn(PathBuf) -> Fut,
        Fut: std::future::Future<Output = Result<T, (PathBuf, CodemodError)>> + Send + 'static,
    {
        if !parallel {
            let mut results = Vec::with_capacity(files.len());
            for path in files {
                if token.is_cancelled() {
                    break;
                }
                results.push(work(path).await);
            }
            return results;
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut join_set: JoinSet<Result<T, (PathBuf, CodemodError)>> = JoinSet::new();

        for path in files {
            if token.is_cancelled() {
                break;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                // acquire_owned fails only after close; this semaphore
                // is never closed.
                Err(_) => break,
            };
            let future = work(path);
            join_set.spawn(async move {
                let _permit = permit;
                future.await
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => warn!("file worker panicked: {}", e),
            }
        }
        results
    }
}

async fn run_query_on_file(
    pipeline: Arc<TransformPipeline>,
    path: PathBuf,
    query: String,
    options: TransformOptions,
    timeout: Duration,
    token: CancellationToken,
) -> Result<FileMatches, (PathBuf, CodemodError)> {
    if token.is_cancelled() {
        return Err((path, CodemodError::Cancelled("file query cancelled".to_string())));
    }
    let work = tokio::task::spawn_blocking({
        let path = path.clone();
        move || {
            let provider = pipeline.resolve_provider(None, Some(&path))?;
            let source = std::fs::read_to_string(&path)
                .map_err(|e| CodemodError::FileSystemError(format!("{}: {}", path.display(), e)))?;
            pipeline.query_matches(provider.as_ref(), &source, &query, &options)
        }
    });
    match tokio::time::timeout(timeout, work).await {
        Ok(Ok(Ok(matches))) => Ok(FileMatches { path, matches }),
        Ok(Ok(Err(e))) => Err((path, e)),
        Ok(Err(join_error)) => Err((path, CodemodError::InternalError(join_error.to_string()))),
        Err(_) => Err((path, CodemodError::Timeout("file query timed out".to_string()))),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_transform_on_file(
    pipeline: Arc<TransformPipeline>,
    path: PathBuf,
    query: String,
    operation: Operation,
    replacement: String,
    options: TransformOptions,
    batch: BatchOptions,
    timeout: Duration,
    token: CancellationToken,
) -> Result<FileTransformOutcome, (PathBuf, CodemodError)> {
    let work = tokio::task::spawn_blocking({
        let path = path.clone();
        move || {
            let original = std::fs::read_to_string(&path)
                .map_err(|e| CodemodError::FileSystemError(format!("{}: {}", path.display(), e)))?;
            let request = TransformRequest::for_path(
                "",
                path.to_string_lossy(),
                &query,
                operation,
                &replacement,
            )
            .with_options(options);
            let outcome = pipeline.execute(&request, &token)?;

            let changed = outcome.is_success() && outcome.output() != original;
            let mut modified = false;
            if changed && !batch.dry_run {
                if batch.backup {
                    let backup_path = sibling_backup_path(&path);
                    std::fs::copy(&path, &backup_path).map_err(|e| {
                        CodemodError::FileSystemError(format!(
                            "backup {} failed: {}",
                            backup_path.display(),
                            e
                        ))
                    })?;
                }
                std::fs::write(&path, outcome.output()).map_err(|e| {
                    CodemodError::FileSystemError(format!("write {} failed: {}", path.display(), e))
                })?;
                modified = true;
            }

            Ok(FileTransformOutcome {
                path: path.clone(),
                status: outcome.status(),
                matches_found: outcome.stats().matches_found,
                diff: outcome.diff().map(|d| d.to_string()),
                modified,
            })
        }
    });
    match tokio::time::timeout(timeout, work).await {
        Ok(Ok(Ok(outcome))) => Ok(outcome),
        Ok(Ok(Err(e))) => Err((path, e)),
        Ok(Err(join_error)) => Err((path, CodemodError::InternalError(join_error.to_string()))),
        Err(_) => Err((path, CodemodError::Timeout("file transform timed out".to_string()))),
    }
}

fn sibling_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

fn build_globset(globs: &[String]) -> Result<Option<GlobSet>, CodemodError> {
    if globs.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        builder.add(
            Glob::new(glob)
                .map_err(|e| CodemodError::InvalidParams(format!("bad glob '{}': {}", glob, e)))?,
        );
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| CodemodError::InvalidParams(format!("bad glob set: {}", e)))
}
