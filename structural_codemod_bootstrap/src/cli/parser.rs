// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Clap derive definitions for the `structural_codemod` binary. Parsing
//! only; the validator in the sibling module turns the raw clap structs
//! into a `ValidatedCli` the application layer accepts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Structural code transformation engine.
#[derive(Debug, Parser)]
#[command(name = "structural_codemod", version, about)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database URL for the staging store
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find structural matches without transforming
    Query {
        /// Language name or alias (inferred from --path when omitted)
        #[arg(short, long)]
        language: Option<String>,
        /// Inline source text (exclusive with --path)
        #[arg(short, long)]
        source: Option<String>,
        /// Source file path (exclusive with --source)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// DSL query, e.g. 'function:main'
        query: String,
    },

    /// Replace matched nodes
    Replace {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// DSL target query
        target: String,
        /// Replacement source text
        replacement: String,
        /// Enable fuzzy anchor resolution
        #[arg(long)]
        fuzz: bool,
        /// Plan without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete matched nodes
    Delete {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
        target: String,
        #[arg(long)]
        fuzz: bool,
        #[arg(long)]
        dry_run: bool,
    },

    /// Insert content before matched nodes
    InsertBefore {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
        target: String,
        content: String,
        #[arg(long)]
        fuzz: bool,
        #[arg(long)]
        dry_run: bool,
    },

    /// Insert content after matched nodes
    InsertAfter {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
        target: String,
        content: String,
        #[arg(long)]
        fuzz: bool,
        #[arg(long)]
        dry_run: bool,
    },

    /// Append content to a node body (end of file when no target)
    Append {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Optional DSL target query
        #[arg(short, long)]
        target: Option<String>,
        /// Content to append (may be empty)
        #[arg(default_value = "")]
        content: String,
    },

    /// Query every file in a scope
    FileQuery {
        /// Scope root directory
        root: PathBuf,
        /// DSL query
        query: String,
        /// Include globs (full recursive `**` semantics)
        #[arg(long)]
        include: Vec<String>,
        /// Exclude globs
        #[arg(long)]
        exclude: Vec<String>,
        /// Restrict to one language
        #[arg(long)]
        language: Option<String>,
        /// Stop after this many files
        #[arg(long)]
        max_files: Option<usize>,
        /// Process files on a worker pool
        #[arg(long)]
        parallel: bool,
    },

    /// Replace across every file in a scope
    FileReplace {
        root: PathBuf,
        target: String,
        replacement: String,
        #[arg(long)]
        include: Vec<String>,
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        max_files: Option<usize>,
        #[arg(long)]
        parallel: bool,
        #[arg(long)]
        dry_run: bool,
        /// Write sibling .bak copies before modifying
        #[arg(long)]
        backup: bool,
    },

    /// Delete across every file in a scope
    FileDelete {
        root: PathBuf,
        target: String,
        #[arg(long)]
        include: Vec<String>,
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        max_files: Option<usize>,
        #[arg(long)]
        parallel: bool,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        backup: bool,
    },

    /// List pending stages for a session
    Stages {
        /// Session id
        session: String,
    },

    /// Apply staged transformations
    Apply {
        /// Apply one stage by id
        #[arg(long)]
        id: Option<String>,
        /// Apply every pending stage
        #[arg(long)]
        all: bool,
        /// Apply the most recent pending stage (default)
        #[arg(long)]
        latest: bool,
    },
}

/// Parses process arguments. Clap handles --help/--version itself.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
