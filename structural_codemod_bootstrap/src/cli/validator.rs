// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Validator
//!
//! Turns the raw clap structs into `ValidatedCli`. Validation failures
//! here exit with code 2 before the engine does any work: source XOR
//! path, non-empty targets, and the mutually exclusive apply selectors
//! are all checked up front so the application layer can assume clean
//! input.

use std::path::PathBuf;
use thiserror::Error;

use super::parser::{Cli, Commands};

/// Validation errors surfaced before the application runs.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("exactly one of --source and --path is required")]
    SourceXorPath,

    #[error("--language is required with --source (nothing to infer from)")]
    LanguageRequired,

    #[error("target query must not be empty")]
    EmptyTarget,

    #[error("conflicting selectors: pass at most one of --id, --all, --latest")]
    ConflictingApplySelector,

    #[error("invalid argument: {0}")]
    Invalid(String),
}

/// Validated top-level CLI.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub database: Option<String>,
}

/// Input location for single-buffer commands.
#[derive(Debug, Clone)]
pub enum SourceInput {
    Inline(String),
    Path(PathBuf),
}

/// Stage selector for `apply`.
#[derive(Debug, Clone)]
pub enum ApplySelector {
    Id(String),
    All,
    Latest,
}

/// File-scope arguments shared by the file-* commands.
#[derive(Debug, Clone)]
pub struct ScopeArgs {
    pub root: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub language: Option<String>,
    pub max_files: Option<usize>,
    pub parallel: bool,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Query {
        language: Option<String>,
        input: SourceInput,
        query: String,
    },
    Transform {
        operation: String,
        language: Option<String>,
        input: SourceInput,
        target: Option<String>,
        content: String,
        fuzz: bool,
        dry_run: bool,
    },
    FileQuery {
        scope: ScopeArgs,
        query: String,
    },
    FileTransform {
        operation: String,
        scope: ScopeArgs,
        target: String,
        replacement: String,
        dry_run: bool,
        backup: bool,
    },
    Stages {
        session: String,
    },
    Apply {
        selector: ApplySelector,
    },
}

/// Parses and validates process arguments in one call.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate_cli(super::parser::parse_cli())
}

pub fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let command = match cli.command {
        Commands::Query {
            language,
            source,
            path,
            query,
        } => {
            let input = source_input(source, path, &language)?;
            require_nonempty(&query)?;
            ValidatedCommand::Query { language, input, query }
        }
        Commands::Replace {
            language,
            source,
            path,
            target,
            replacement,
            fuzz,
            dry_run,
        } => transform(
            "replace", language, source, path, Some(target), replacement, fuzz, dry_run,
        )?,
        Commands::Delete {
            language,
            source,
            path,
            target,
            fuzz,
            dry_run,
        } => transform("delete", language, source, path, Some(target), String::new(), fuzz, dry_run)?,
        Commands::InsertBefore {
            language,
            source,
            path,
            target,
            content,
            fuzz,
            dry_run,
        } => transform(
            "insert_before", language, source, path, Some(target), content, fuzz, dry_run,
        )?,
        Commands::InsertAfter {
            language,
            source,
            path,
            target,
            content,
            fuzz,
            dry_run,
        } => transform(
            "insert_after", language, source, path, Some(target), content, fuzz, dry_run,
        )?,
        Commands::Append {
            language,
            source,
            path,
            target,
            content,
        } => {
            let input = source_input(source, path, &language)?;
            // Empty content is permitted for append.
            ValidatedCommand::Transform {
                operation: "append".to_string(),
                language,
                input,
                target,
                content,
                fuzz: false,
                dry_run: false,
            }
        }
        Commands::FileQuery {
            root,
            query,
            include,
            exclude,
            language,
            max_files,
            parallel,
        } => {
            require_nonempty(&query)?;
            ValidatedCommand::FileQuery {
                scope: ScopeArgs {
                    root,
                    include,
                    exclude,
                    language,
                    max_files,
                    parallel,
                },
                query,
            }
        }
        Commands::FileReplace {
            root,
            target,
            replacement,
            include,
            exclude,
            language,
            max_files,
            parallel,
            dry_run,
            backup,
        } => {
            require_nonempty(&target)?;
            ValidatedCommand::FileTransform {
                operation: "replace".to_string(),
                scope: ScopeArgs {
                    root,
                    include,
                    exclude,
                    language,
                    max_files,
                    parallel,
                },
                target,
                replacement,
                dry_run,
                backup,
            }
        }
        Commands::FileDelete {
            root,
            target,
            include,
            exclude,
            language,
            max_files,
            parallel,
            dry_run,
            backup,
        } => {
            require_nonempty(&target)?;
            ValidatedCommand::FileTransform {
                operation: "delete".to_string(),
                scope: ScopeArgs {
                    root,
                    include,
                    exclude,
                    language,
                    max_files,
                    parallel,
                },
                target,
                replacement: String::new(),
                dry_run,
                backup,
            }
        }
        Commands::Stages { session } => {
            require_nonempty(&session)?;
            ValidatedCommand::Stages { session }
        }
        Commands::Apply { id, all, latest } => {
            let selector = match (id, all, latest) {
                (Some(id), false, false) => ApplySelector::Id(id),
                (None, true, false) => ApplySelector::All,
                // Defaults to latest when nothing is passed.
                (None, false, _) => ApplySelector::Latest,
                _ => return Err(ParseError::ConflictingApplySelector),
            };
            ValidatedCommand::Apply { selector }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config: cli.config,
        database: cli.database,
    })
}

#[allow(clippy::too_many_arguments)]
fn transform(
    operation: &str,
    language: Option<String>,
    source: Option<String>,
    path: Option<PathBuf>,
    target: Option<String>,
    content: String,
    fuzz: bool,
    dry_run: bool,
) -> Result<ValidatedCommand, ParseError> {
    let input = source_input(source, path, &language)?;
    if let Some(ref t) = target {
        require_nonempty(t)?;
    }
    Ok(ValidatedCommand::Transform {
        operation: operation.to_string(),
        language,
        input,
        target,
        content,
        fuzz,
        dry_run,
    })
}

fn source_input(
    source: Option<String>,
    path: Option<PathBuf>,
    language: &Option<String>,
) -> Result<SourceInput, ParseError> {
    match (source, path) {
        (Some(source), None) => {
            if language.is_none() {
                return Err(ParseError::LanguageRequired);
            }
            Ok(SourceInput::Inline(source))
        }
        (None, Some(path)) => Ok(SourceInput::Path(path)),
        _ => Err(ParseError::SourceXorPath),
    }
}

fn require_nonempty(value: &str) -> Result<(), ParseError> {
    if value.trim().is_empty() {
        return Err(ParseError::EmptyTarget);
    }
    Ok(())
}
