// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # structural_codemod binary
//!
//! Thin bridge between the bootstrap layer and the engine: parse and
//! validate the CLI, build the engine, run the selected command, print
//! the result, map the outcome to an exit code (0 success/partial,
//! 2 invalid arguments, 3 transform failed).

use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

use structural_codemod_bootstrap::cli::{
    ApplySelector, ScopeArgs, SourceInput, ValidatedCli, ValidatedCommand,
};
use structural_codemod_bootstrap::{
    bootstrap_cli, init_tracing, outcome_to_exit_code, signals, AppOutcome, ShutdownCoordinator,
};
use structural_codemod_domain::entities::TransformRequest;
use structural_codemod_domain::value_objects::{Operation, Status, TransformOptions};
use structural_codemod_domain::CodemodError;

use structural_codemod::application::services::file_processor::{BatchOptions, FileScope};
use structural_codemod::application::services::staging_service::ApplyTarget;
use structural_codemod::application::use_cases::{
    ApplyStageUseCase, FileQueryUseCase, FileTransformUseCase, QueryConfig, QuerySourceUseCase,
    TransformSourceUseCase,
};
use structural_codemod::infrastructure::config::CodemodConfig;
use structural_codemod::CodemodEngine;

fn main() -> ExitCode {
    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {}", e);
            return outcome_to_exit_code(AppOutcome::InvalidArguments);
        }
    };

    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to start runtime: {}", e);
            return outcome_to_exit_code(AppOutcome::Failed);
        }
    };

    let outcome = runtime.block_on(run(cli));
    outcome_to_exit_code(outcome)
}

async fn run(cli: ValidatedCli) -> AppOutcome {
    let mut config = match CodemodConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return AppOutcome::InvalidArguments;
        }
    };
    if let Some(database) = &cli.database {
        config.database_url = database.clone();
    }

    let coordinator = ShutdownCoordinator::default();
    signals::install_signal_handlers(coordinator.clone());

    let engine = match CodemodEngine::new(config, coordinator.token()).await {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("failed to build engine: {}", e);
            return AppOutcome::Failed;
        }
    };

    let result = dispatch(&engine, cli.command).await;
    engine.shutdown();

    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {}", e);
            match e {
                CodemodError::InvalidParams(_) => AppOutcome::InvalidArguments,
                _ => AppOutcome::Failed,
            }
        }
    }
}

async fn dispatch(engine: &Arc<CodemodEngine>, command: ValidatedCommand) -> Result<AppOutcome, CodemodError> {
    match command {
        ValidatedCommand::Query { language, input, query } => {
            let (source, path) = split_input(input);
            let use_case = QuerySourceUseCase::new(engine.pipeline());
            let matches = use_case.execute(QueryConfig {
                language,
                source,
                path,
                query,
                options: TransformOptions::default(),
            })?;
            for m in &matches {
                println!("{}\t{}\t{}", m.kind(), m.name(), m.location());
            }
            println!("{} matches", matches.len());
            Ok(AppOutcome::Success)
        }

        ValidatedCommand::Transform {
            operation,
            language,
            input,
            target,
            content,
            fuzz,
            dry_run,
        } => run_transform(engine, operation, language, input, target, content, fuzz, dry_run).await,

        ValidatedCommand::FileQuery { scope, query } => {
            let use_case = FileQueryUseCase::new(engine.file_processor(), engine.observability());
            let parallel = scope.parallel;
            let report = use_case
                .execute(
                    to_scope(scope),
                    query,
                    TransformOptions::default(),
                    BatchOptions {
                        parallel,
                        ..BatchOptions::default()
                    },
                    engine.token(),
                )
                .await?;
            for file in &report.per_file {
                println!("{}: {} matches", file.path.display(), file.matches.len());
            }
            println!(
                "{} matches across {} of {} files",
                report.total_matches,
                report.per_file.len(),
                report.files_scanned
            );
            Ok(AppOutcome::Success)
        }

        ValidatedCommand::FileTransform {
            operation,
            scope,
            target,
            replacement,
            dry_run,
            backup,
        } => {
            let operation = Operation::parse(&operation)?;
            let use_case = FileTransformUseCase::new(engine.file_processor(), engine.observability());
            let parallel = scope.parallel;
            let report = use_case
                .execute(
                    to_scope(scope),
                    target,
                    operation,
                    replacement,
                    TransformOptions::default(),
                    BatchOptions {
                        parallel,
                        dry_run,
                        backup,
                    },
                    engine.token(),
                )
                .await?;
            for file in &report.per_file {
                if let Some(diff) = &file.diff {
                    println!("--- {}\n{}", file.path.display(), diff);
                }
            }
            println!(
                "{} of {} files modified, {} matches",
                report.files_modified, report.files_scanned, report.total_matches
            );
            Ok(AppOutcome::Success)
        }

        ValidatedCommand::Stages { session } => {
            let session_id =
                structural_codemod_domain::value_objects::SessionId::from_string(&session)?;
            let stages = engine.staging().list_pending(session_id).await?;
            for stage in &stages {
                println!(
                    "{}\t{}\t{}:{}\t{}\t{}",
                    stage.id(),
                    stage.operation(),
                    stage.target_kind(),
                    stage.target_name(),
                    stage.confidence_level(),
                    stage.expires_at().to_rfc3339()
                );
            }
            println!("{} pending stages", stages.len());
            Ok(AppOutcome::Success)
        }

        ValidatedCommand::Apply { selector } => {
            let target = match selector {
                ApplySelector::Id(id) => ApplyTarget::Id(
                    structural_codemod_domain::value_objects::StageId::from_string(&id)?,
                ),
                ApplySelector::All => ApplyTarget::All,
                ApplySelector::Latest => ApplyTarget::Latest,
            };
            let use_case = ApplyStageUseCase::new(engine.staging());
            let outcomes = use_case.execute(target, false, "cli").await?;
            let mut failed = 0usize;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(()) => println!("applied {}", outcome.stage_id),
                    Err(e) => {
                        failed += 1;
                        eprintln!("failed {}: {}", outcome.stage_id, e);
                    }
                }
            }
            println!("{} applied, {} failed", outcomes.len() - failed, failed);
            if failed > 0 {
                Ok(AppOutcome::Failed)
            } else {
                Ok(AppOutcome::Success)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_transform(
    engine: &Arc<CodemodEngine>,
    operation: String,
    language: Option<String>,
    input: SourceInput,
    target: Option<String>,
    content: String,
    fuzz: bool,
    dry_run: bool,
) -> Result<AppOutcome, CodemodError> {
    let options = TransformOptions::new().with_fuzz(fuzz).with_dry_run(dry_run);
    let (source, path) = split_input(input);
    let language = language.unwrap_or_default();

    let use_case = TransformSourceUseCase::new(
        engine.pipeline(),
        engine.staging(),
        engine.observability(),
    );

    // `append` without a target goes straight to end-of-file.
    let outcome = if operation == "append" && target.is_none() {
        let request = build_request(language, source, path, "block:*".into(), Operation::AppendToBody, content)
            .with_options(options);
        let pipeline = engine.pipeline();
        let token = engine.token();
        let exec_request = request.clone();
        let outcome =
            tokio::task::spawn_blocking(move || pipeline.append_eof(&exec_request, &token))
                .await
                .map_err(|e| CodemodError::InternalError(e.to_string()))??;
        if outcome.is_success() && !dry_run {
            if let Some(path) = request.file_path() {
                tokio::fs::write(path, outcome.output())
                    .await
                    .map_err(|e| CodemodError::FileSystemError(e.to_string()))?;
            }
        }
        outcome
    } else {
        let operation = match operation.as_str() {
            "append" => Operation::AppendToBody,
            other => Operation::parse(other)?,
        };
        let target = target.ok_or_else(|| {
            CodemodError::InvalidParams("target query required".to_string())
        })?;
        let request =
            build_request(language, source, path, target, operation, content).with_options(options);
        use_case.execute_direct(request, engine.token()).await?
    };

    debug!("transform finished: {}", outcome.status());
    if let Some(diff) = outcome.diff() {
        println!("{}", diff);
    }
    for diagnostic in outcome.diagnostics() {
        eprintln!("{}", diagnostic);
    }
    println!(
        "status={} matches={} hash={}",
        outcome.status(),
        outcome.stats().matches_found,
        outcome.hash()
    );

    match outcome.status() {
        Status::Success | Status::Partial => Ok(AppOutcome::Success),
        _ => Ok(AppOutcome::Failed),
    }
}

fn split_input(input: SourceInput) -> (Option<String>, Option<std::path::PathBuf>) {
    match input {
        SourceInput::Inline(source) => (Some(source), None),
        SourceInput::Path(path) => (None, Some(path)),
    }
}

fn build_request(
    language: String,
    source: Option<String>,
    path: Option<std::path::PathBuf>,
    query: String,
    operation: Operation,
    replacement: String,
) -> TransformRequest {
    match (source, path) {
        (Some(source), _) => {
            TransformRequest::for_source(language, source, query, operation, replacement)
        }
        (None, Some(path)) => TransformRequest::for_path(
            language,
            path.to_string_lossy(),
            query,
            operation,
            replacement,
        ),
        (None, None) => TransformRequest::for_source(language, "", query, operation, replacement),
    }
}

fn to_scope(scope: ScopeArgs) -> FileScope {
    FileScope {
        root: scope.root,
        include: scope.include,
        exclude: scope.exclude,
        language: scope.language,
        max_files: scope.max_files,
    }
}
