// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Hierarchical scope regions used to anchor queries.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::CodemodError;

/// Region of a source file a query can be constrained to.
///
/// Closed enum; providers map each scope onto their grammar's container
/// node types (a Go `package` scope is the source file, a Python `class`
/// scope is the class body, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    File,
    Class,
    Function,
    Block,
    Namespace,
    Package,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::File => "file",
            ScopeType::Class => "class",
            ScopeType::Function => "function",
            ScopeType::Block => "block",
            ScopeType::Namespace => "namespace",
            ScopeType::Package => "package",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CodemodError> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(ScopeType::File),
            "class" => Ok(ScopeType::Class),
            "function" => Ok(ScopeType::Function),
            "block" => Ok(ScopeType::Block),
            "namespace" => Ok(ScopeType::Namespace),
            "package" => Ok(ScopeType::Package),
            other => Err(CodemodError::InvalidParams(format!("unknown scope type: '{}'", other))),
        }
    }
}

impl Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for scope in [
            ScopeType::File,
            ScopeType::Class,
            ScopeType::Function,
            ScopeType::Block,
            ScopeType::Namespace,
            ScopeType::Package,
        ] {
            assert_eq!(ScopeType::parse(scope.as_str()).unwrap(), scope);
        }
        assert!(ScopeType::parse("module").is_err());
    }
}
