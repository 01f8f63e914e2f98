// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Layer
//!
//! Everything that must happen before (and around) the application:
//! CLI parsing and validation, logger initialization, exit-code mapping,
//! and cooperative shutdown. This crate knows nothing about queries,
//! providers, or staging - it hands the application a `ValidatedCli` and
//! a cancellation token and maps the outcome back to an exit code.

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod shutdown;
pub mod signals;

// Re-export commonly used types
pub use cli::{parse_and_validate, ApplySelector, ParseError, ValidatedCli, ValidatedCommand};
pub use exit_code::{outcome_to_exit_code, AppOutcome, ExitCode};
pub use logger::{init_tracing, BootstrapLogger, ConsoleLogger, NoOpLogger};
pub use shutdown::{CancellationToken, ShutdownCoordinator, DEFAULT_GRACE_PERIOD_SECS};

/// Bootstrap and parse CLI arguments.
///
/// Clap handles `--help` and `--version` itself; validation failures map
/// to exit code 2 in the caller.
pub fn bootstrap_cli() -> Result<ValidatedCli, ParseError> {
    cli::parse_and_validate()
}
