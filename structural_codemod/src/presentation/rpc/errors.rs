// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Tool Error Envelope
//!
//! JSON-RPC-style error records returned by the tool surface. Codes:
//!
//! | Code | Meaning |
//! |---|---|
//! | -32602 | InvalidParams |
//! | -32001 | FileSystemError |
//! | -32002 | LanguageNotFound |
//! | -32003 | SyntaxError |
//! | -32004 | TransformFailed |

use serde::{Deserialize, Serialize};

use structural_codemod_domain::CodemodError;

pub const INVALID_PARAMS: i32 = -32602;
pub const FILE_SYSTEM_ERROR: i32 = -32001;
pub const LANGUAGE_NOT_FOUND: i32 = -32002;
pub const SYNTAX_ERROR: i32 = -32003;
pub const TRANSFORM_FAILED: i32 = -32004;

/// Machine-readable tool error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<CodemodError> for RpcError {
    fn from(err: CodemodError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let rpc: RpcError = CodemodError::language_not_found("zig").into();
        assert_eq!(rpc.code, LANGUAGE_NOT_FOUND);

        let rpc: RpcError = CodemodError::syntax_error("bad token").into();
        assert_eq!(rpc.code, SYNTAX_ERROR);

        let rpc: RpcError = CodemodError::overlap_conflict("2 edits").into();
        assert_eq!(rpc.code, TRANSFORM_FAILED);
    }
}
