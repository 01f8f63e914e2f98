// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transform Operation
//!
//! The mutating operations the pipeline knows how to plan. The read path
//! (query) is deliberately not an `Operation`: queries never reach the
//! edit planner, so Phase 2 of the pipeline accepts exactly these five
//! values and rejects everything else.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::CodemodError;

/// Mutating operation resolved in pipeline Phase 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    InsertBefore,
    InsertAfter,
    Replace,
    Delete,
    AppendToBody,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::InsertBefore => "insert_before",
            Operation::InsertAfter => "insert_after",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::AppendToBody => "append_to_body",
        }
    }

    /// Resolves an external operation name.
    ///
    /// # Errors
    ///
    /// Any value outside the five supported operations is an
    /// `InvalidParams` error (pipeline Phase 2 contract).
    pub fn parse(s: &str) -> Result<Self, CodemodError> {
        match s {
            "insert_before" => Ok(Operation::InsertBefore),
            "insert_after" => Ok(Operation::InsertAfter),
            "replace" => Ok(Operation::Replace),
            "delete" => Ok(Operation::Delete),
            "append_to_body" => Ok(Operation::AppendToBody),
            other => Err(CodemodError::InvalidParams(format!(
                "unsupported operation: '{}'",
                other
            ))),
        }
    }

    /// True for operations that add new material (subject to the
    /// adjacent-bytes dedupe guard).
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            Operation::InsertBefore | Operation::InsertAfter | Operation::AppendToBody
        )
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_operations() {
        assert_eq!(Operation::parse("replace").unwrap(), Operation::Replace);
        assert_eq!(Operation::parse("append_to_body").unwrap(), Operation::AppendToBody);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Operation::parse("query").is_err());
        assert!(Operation::parse("REPLACE").is_err());
        assert!(Operation::parse("").is_err());
    }

    #[test]
    fn test_insertion_classification() {
        assert!(Operation::InsertBefore.is_insertion());
        assert!(Operation::AppendToBody.is_insertion());
        assert!(!Operation::Delete.is_insertion());
        assert!(!Operation::Replace.is_insertion());
    }
}
