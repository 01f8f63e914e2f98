// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! Maps application outcomes onto process exit codes:
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | success, including partial transforms |
//! | 2 | invalid arguments |
//! | 3 | transform failed |
//!
//! Partial results exit 0 deliberately: the transform produced usable
//! output and surfaced its warnings as diagnostics; scripting callers
//! should not treat that as failure.

use std::process::ExitCode as ProcessExitCode;

/// Application exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InvalidArguments,
    TransformFailed,
}

impl ExitCode {
    pub fn code(&self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArguments => 2,
            ExitCode::TransformFailed => 3,
        }
    }
}

impl From<ExitCode> for ProcessExitCode {
    fn from(code: ExitCode) -> Self {
        ProcessExitCode::from(code.code())
    }
}

/// Classification the application layer reports for exit mapping.
///
/// The bootstrap crate cannot depend on the domain error enum, so the
/// application maps its error into this coarse outcome first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppOutcome {
    /// Clean success or a partial transform with diagnostics.
    Success,
    /// Bad arguments detected before any work.
    InvalidArguments,
    /// Any pipeline, staging, or I/O failure after argument validation.
    Failed,
}

/// Maps an application outcome to its process exit code.
pub fn outcome_to_exit_code(outcome: AppOutcome) -> ProcessExitCode {
    let code = match outcome {
        AppOutcome::Success => ExitCode::Success,
        AppOutcome::InvalidArguments => ExitCode::InvalidArguments,
        AppOutcome::Failed => ExitCode::TransformFailed,
    };
    code.into()
}
