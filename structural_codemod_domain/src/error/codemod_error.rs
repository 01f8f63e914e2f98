// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Codemod Error
//!
//! Domain error type for the structural codemod engine. Every fallible
//! operation in the domain, application, and infrastructure layers returns
//! `CodemodError`; `anyhow` is reserved for the binary boundary.
//!
//! ## Error Categories
//!
//! Errors are grouped along the failure modes of the transformation
//! pipeline and its collaborators:
//!
//! - **Argument errors**: `InvalidParams` - rejected before any work starts
//! - **Parse errors**: `SyntaxError` - the grammar could not parse the input
//! - **Resolution errors**: `LanguageNotFound`, `FuzzyExhausted`
//! - **Transformation errors**: `TransformFailed`, `OverlapConflict`
//! - **Environment errors**: `FileSystemError`, `DatabaseError`,
//!   `SerializationError`
//! - **Control-flow errors**: `Cancelled`, `Timeout`
//!
//! Each variant carries a human-readable message; `code()` maps the variant
//! onto the JSON-RPC error code exposed by the tool surface.

use thiserror::Error;

/// Domain-specific errors for the structural transformation system.
///
/// Each variant represents a specific failure mode and is designed to
/// provide clear information about what went wrong and potentially how to
/// fix it.
///
/// ## Design Principles
///
/// - **Specific**: Each error type represents a specific failure mode
/// - **Actionable**: Error messages provide enough context for debugging
/// - **Categorized**: Errors are grouped by type for systematic handling
/// - **Recoverable**: Some errors indicate retry-able conditions
#[derive(Error, Debug, Clone)]
pub enum CodemodError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Language not found: {0}")]
    LanguageNotFound(String),

    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("File system error: {0}")]
    FileSystemError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Overlap conflict: {0}")]
    OverlapConflict(String),

    #[error("Fuzzy resolution exhausted: {0}")]
    FuzzyExhausted(String),

    #[error("Stage not found: {0}")]
    StageNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Integrity check failed: {0}")]
    IntegrityError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CodemodError {
    /// Creates a new invalid-params error
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Creates a new syntax error
    pub fn syntax_error(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    /// Creates a new language-not-found error
    pub fn language_not_found(msg: impl Into<String>) -> Self {
        Self::LanguageNotFound(msg.into())
    }

    /// Creates a new transform-failed error
    pub fn transform_failed(msg: impl Into<String>) -> Self {
        Self::TransformFailed(msg.into())
    }

    /// Creates a new file system error
    pub fn file_system_error(msg: impl Into<String>) -> Self {
        Self::FileSystemError(msg.into())
    }

    /// Creates a new cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Creates a new timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a new overlap-conflict error
    pub fn overlap_conflict(msg: impl Into<String>) -> Self {
        Self::OverlapConflict(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Maps the error onto the JSON-RPC error code exposed by the tool
    /// surface.
    ///
    /// Codes follow the JSON-RPC 2.0 reserved range for `InvalidParams`
    /// and an implementation-defined range for the rest:
    ///
    /// | Variant | Code |
    /// |---|---|
    /// | `InvalidParams` | -32602 |
    /// | `FileSystemError` | -32001 |
    /// | `LanguageNotFound` | -32002 |
    /// | `SyntaxError` | -32003 |
    /// | everything else | -32004 (transform failed) |
    pub fn code(&self) -> i32 {
        match self {
            CodemodError::InvalidParams(_) => -32602,
            CodemodError::FileSystemError(_) => -32001,
            CodemodError::LanguageNotFound(_) => -32002,
            CodemodError::SyntaxError(_) => -32003,
            _ => -32004,
        }
    }

    /// Checks if the error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CodemodError::Timeout(_) | CodemodError::FileSystemError(_) | CodemodError::DatabaseError(_)
        )
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            CodemodError::InvalidParams(_) => "params",
            CodemodError::SyntaxError(_) => "syntax",
            CodemodError::LanguageNotFound(_) => "language",
            CodemodError::TransformFailed(_) => "transform",
            CodemodError::FileSystemError(_) => "io",
            CodemodError::Cancelled(_) => "cancelled",
            CodemodError::Timeout(_) => "timeout",
            CodemodError::OverlapConflict(_) => "overlap",
            CodemodError::FuzzyExhausted(_) => "fuzzy",
            CodemodError::StageNotFound(_) => "staging",
            CodemodError::DatabaseError(_) => "database",
            CodemodError::SerializationError(_) => "serialization",
            CodemodError::IntegrityError(_) => "integrity",
            CodemodError::InternalError(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for CodemodError {
    fn from(err: serde_json::Error) -> Self {
        CodemodError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that each variant maps onto its documented JSON-RPC code.
    #[test]
    fn test_error_codes() {
        assert_eq!(CodemodError::invalid_params("x").code(), -32602);
        assert_eq!(CodemodError::file_system_error("x").code(), -32001);
        assert_eq!(CodemodError::language_not_found("x").code(), -32002);
        assert_eq!(CodemodError::syntax_error("x").code(), -32003);
        assert_eq!(CodemodError::transform_failed("x").code(), -32004);
        assert_eq!(CodemodError::overlap_conflict("x").code(), -32004);
        assert_eq!(CodemodError::cancelled("x").code(), -32004);
    }

    /// Tests the recoverability classification.
    #[test]
    fn test_is_recoverable() {
        assert!(CodemodError::timeout("slow parse").is_recoverable());
        assert!(CodemodError::file_system_error("EBUSY").is_recoverable());
        assert!(!CodemodError::invalid_params("missing target").is_recoverable());
        assert!(!CodemodError::overlap_conflict("2 edits collide").is_recoverable());
    }

    /// Tests that error messages carry their context through Display.
    #[test]
    fn test_display_includes_context() {
        let err = CodemodError::syntax_error("unexpected token at byte 14");
        assert_eq!(err.to_string(), "Syntax error: unexpected token at byte 14");
        assert_eq!(err.category(), "syntax");
    }
}
