// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Universal Node Kind
//!
//! The closed vocabulary of structural concepts the engine understands.
//! Queries select nodes by universal kind; each language provider maps the
//! kind onto its grammar's concrete node types.
//!
//! ## Alias Vocabulary
//!
//! Users write queries in the idiom of whatever language they think in:
//! `def:` for Python, `fn:` for Rust, `func:` for Go. Every alias below is
//! accepted case-insensitively; nothing else parses as a kind.
//!
//! | Kind | Aliases |
//! |---|---|
//! | function | function, func, def, fn, sub, procedure |
//! | method | method |
//! | variable | variable, var, let |
//! | constant | const, constant, final, readonly, immutable |
//! | class | class, cls, struct |
//! | type | type |
//! | interface | interface, protocol, trait |
//! | enum | enum, enumeration |
//! | import | import, require, include, use, using, from |
//! | field | field, property, attribute, member, slot |
//! | call | call, invoke, apply, execute |
//! | assignment | assignment, assign, set |
//! | condition | condition, if, switch, case, when, match |
//! | loop | loop, for, while, do, foreach, repeat |
//! | block | block, scope, begin, end |
//! | comment | comment, doc, documentation |
//! | decorator | decorator, annotation |
//! | try_catch | try, catch, except, rescue, finally |
//! | return | return, yield |
//! | throw | throw, raise, panic |
//! | parameter | parameter, param, argument, arg |
//!
//! Providers must be total over this enum: a kind the grammar cannot
//! express yields zero matches, never an error.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::CodemodError;

/// Universal AST node kind.
///
/// A closed enum: adding a kind is a breaking change to every provider, so
/// the set is deliberately small and language-neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Function,
    Method,
    Variable,
    Constant,
    Class,
    Interface,
    Enum,
    Type,
    Import,
    Field,
    Call,
    Assignment,
    Condition,
    Loop,
    Block,
    Comment,
    Decorator,
    Parameter,
    Return,
    Throw,
    TryCatch,
}

impl NodeKind {
    /// All kinds, in declaration order.
    ///
    /// Providers iterate this to prove totality in their mapping tables.
    pub const ALL: [NodeKind; 21] = [
        NodeKind::Function,
        NodeKind::Method,
        NodeKind::Variable,
        NodeKind::Constant,
        NodeKind::Class,
        NodeKind::Interface,
        NodeKind::Enum,
        NodeKind::Type,
        NodeKind::Import,
        NodeKind::Field,
        NodeKind::Call,
        NodeKind::Assignment,
        NodeKind::Condition,
        NodeKind::Loop,
        NodeKind::Block,
        NodeKind::Comment,
        NodeKind::Decorator,
        NodeKind::Parameter,
        NodeKind::Return,
        NodeKind::Throw,
        NodeKind::TryCatch,
    ];

    /// Resolves a user-written alias (case-insensitive) to its universal
    /// kind.
    ///
    /// # Errors
    ///
    /// Returns `CodemodError::InvalidParams` with an "unsupported node
    /// kind" message for anything outside the normative alias table.
    pub fn from_alias(alias: &str) -> Result<Self, CodemodError> {
        let kind = match alias.to_ascii_lowercase().as_str() {
            "function" | "func" | "def" | "fn" | "sub" | "procedure" => NodeKind::Function,
            "method" => NodeKind::Method,
            "variable" | "var" | "let" => NodeKind::Variable,
            "const" | "constant" | "final" | "readonly" | "immutable" => NodeKind::Constant,
            "class" | "cls" | "struct" => NodeKind::Class,
            "type" => NodeKind::Type,
            "interface" | "protocol" | "trait" => NodeKind::Interface,
            "enum" | "enumeration" => NodeKind::Enum,
            "import" | "require" | "include" | "use" | "using" | "from" => NodeKind::Import,
            "field" | "property" | "attribute" | "member" | "slot" => NodeKind::Field,
            "call" | "invoke" | "apply" | "execute" => NodeKind::Call,
            "assignment" | "assign" | "set" => NodeKind::Assignment,
            "condition" | "if" | "switch" | "case" | "when" | "match" => NodeKind::Condition,
            "loop" | "for" | "while" | "do" | "foreach" | "repeat" => NodeKind::Loop,
            "block" | "scope" | "begin" | "end" => NodeKind::Block,
            "comment" | "doc" | "documentation" => NodeKind::Comment,
            "decorator" | "annotation" => NodeKind::Decorator,
            "try" | "catch" | "except" | "rescue" | "finally" => NodeKind::TryCatch,
            "return" | "yield" => NodeKind::Return,
            "throw" | "raise" | "panic" => NodeKind::Throw,
            "parameter" | "param" | "argument" | "arg" => NodeKind::Parameter,
            other => {
                return Err(CodemodError::InvalidParams(format!(
                    "unsupported node kind: '{}'",
                    other
                )));
            }
        };
        Ok(kind)
    }

    /// Canonical (universal) name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Variable => "variable",
            NodeKind::Constant => "constant",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Enum => "enum",
            NodeKind::Type => "type",
            NodeKind::Import => "import",
            NodeKind::Field => "field",
            NodeKind::Call => "call",
            NodeKind::Assignment => "assignment",
            NodeKind::Condition => "condition",
            NodeKind::Loop => "loop",
            NodeKind::Block => "block",
            NodeKind::Comment => "comment",
            NodeKind::Decorator => "decorator",
            NodeKind::Parameter => "parameter",
            NodeKind::Return => "return",
            NodeKind::Throw => "throw",
            NodeKind::TryCatch => "try_catch",
        }
    }

    /// Kinds that anchor at statement/declaration granularity.
    ///
    /// Block-level anchors get blank-line wrapping and re-indentation when
    /// material is inserted before or after them.
    pub fn is_block_level(&self) -> bool {
        matches!(
            self,
            NodeKind::Function
                | NodeKind::Method
                | NodeKind::Class
                | NodeKind::Interface
                | NodeKind::Enum
                | NodeKind::Type
                | NodeKind::Import
                | NodeKind::Condition
                | NodeKind::Loop
                | NodeKind::Block
                | NodeKind::TryCatch
        )
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that every alias in the normative table resolves, including
    /// mixed-case spellings.
    #[test]
    fn test_alias_table_complete() {
        let cases = [
            ("function", NodeKind::Function),
            ("func", NodeKind::Function),
            ("def", NodeKind::Function),
            ("fn", NodeKind::Function),
            ("sub", NodeKind::Function),
            ("procedure", NodeKind::Function),
            ("method", NodeKind::Method),
            ("var", NodeKind::Variable),
            ("let", NodeKind::Variable),
            ("const", NodeKind::Constant),
            ("final", NodeKind::Constant),
            ("readonly", NodeKind::Constant),
            ("immutable", NodeKind::Constant),
            ("class", NodeKind::Class),
            ("cls", NodeKind::Class),
            ("struct", NodeKind::Class),
            ("type", NodeKind::Type),
            ("protocol", NodeKind::Interface),
            ("trait", NodeKind::Interface),
            ("enumeration", NodeKind::Enum),
            ("require", NodeKind::Import),
            ("use", NodeKind::Import),
            ("using", NodeKind::Import),
            ("from", NodeKind::Import),
            ("property", NodeKind::Field),
            ("slot", NodeKind::Field),
            ("invoke", NodeKind::Call),
            ("execute", NodeKind::Call),
            ("assign", NodeKind::Assignment),
            ("set", NodeKind::Assignment),
            ("if", NodeKind::Condition),
            ("switch", NodeKind::Condition),
            ("when", NodeKind::Condition),
            ("match", NodeKind::Condition),
            ("foreach", NodeKind::Loop),
            ("repeat", NodeKind::Loop),
            ("begin", NodeKind::Block),
            ("end", NodeKind::Block),
            ("doc", NodeKind::Comment),
            ("annotation", NodeKind::Decorator),
            ("except", NodeKind::TryCatch),
            ("rescue", NodeKind::TryCatch),
            ("finally", NodeKind::TryCatch),
            ("yield", NodeKind::Return),
            ("raise", NodeKind::Throw),
            ("panic", NodeKind::Throw),
            ("param", NodeKind::Parameter),
            ("arg", NodeKind::Parameter),
        ];
        for (alias, expected) in cases {
            assert_eq!(NodeKind::from_alias(alias).unwrap(), expected, "alias {}", alias);
            let upper = alias.to_ascii_uppercase();
            assert_eq!(NodeKind::from_alias(&upper).unwrap(), expected, "alias {}", upper);
        }
    }

    /// Tests that unknown aliases are rejected rather than guessed.
    #[test]
    fn test_unknown_alias_rejected() {
        for bad in ["funcion", "lambda", "", "defn", "fun"] {
            let err = NodeKind::from_alias(bad).unwrap_err();
            assert!(err.to_string().contains("unsupported node kind"), "{}", bad);
        }
    }

    /// Tests the canonical-name round trip for every kind.
    ///
    /// `try_catch` is the one canonical name that is not itself an alias
    /// (users write `try`, `catch`, ...), so it is checked separately.
    #[test]
    fn test_canonical_round_trip() {
        for kind in NodeKind::ALL {
            if kind == NodeKind::TryCatch {
                assert_eq!(NodeKind::from_alias("try").unwrap(), kind);
                continue;
            }
            assert_eq!(NodeKind::from_alias(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&NodeKind::TryCatch).unwrap();
        assert_eq!(json, "\"try_catch\"");
    }
}
