// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Language Provider Contract
//!
//! The capability set every language adapter implements. Providers own
//! all grammar knowledge: node mappings from universal kinds to concrete
//! node types, query translation, anchor selection, snippet validation,
//! import organization, formatting, and quick checks.
//!
//! ## Totality
//!
//! Providers are total over [`NodeKind`]: a kind the grammar cannot
//! express returns an empty mapping list and anchor selection yields zero
//! matches, never an error.
//!
//! ## Statelessness
//!
//! Providers are immutable after construction. Internal caches (compiled
//! grammar queries, mapping tables) are populated once and shared; the
//! engine never mutates provider-owned objects.

use crate::value_objects::{Anchor, Diagnostic, NodeKind, NodeMapping, Query};
use crate::CodemodError;

/// Language-specific adapter contract.
pub trait LanguageProvider: Send + Sync {
    /// Canonical language name, e.g. `"go"`.
    fn language_name(&self) -> &str;

    /// Accepted aliases, e.g. `["golang"]`.
    fn aliases(&self) -> &[&str];

    /// File extensions without the leading dot, e.g. `["go"]`.
    fn file_extensions(&self) -> &[&str];

    /// Whether the provider carries a grammar handle.
    ///
    /// Test doubles return false; the pipeline then skips parsing and
    /// anchor selection returns empty.
    fn has_grammar(&self) -> bool;

    /// Declared mappings for a universal kind; empty when unsupported.
    fn node_mappings(&self, kind: NodeKind) -> &[NodeMapping];

    /// Translates a [`Query`] into the provider's grammar query syntax.
    ///
    /// Returns one rendered grammar query per applicable node mapping.
    fn translate_query(&self, query: &Query) -> Result<Vec<String>, CodemodError>;

    /// Parses `source` and returns the anchors selected by `query`, in
    /// tree order.
    ///
    /// # Errors
    ///
    /// `SyntaxError` when the grammar cannot parse `source`. An empty
    /// anchor list is a normal result, not an error.
    fn select_anchors(&self, source: &str, query: &Query) -> Result<Vec<Anchor>, CodemodError>;

    /// Validates that `snippet` is plausible source material for this
    /// language.
    fn validate_snippet(&self, snippet: &str) -> Result<(), CodemodError>;

    /// Normalizes import ordering. Idempotent:
    /// `organize(organize(s)) == organize(s)`.
    fn organize_imports(&self, source: &str) -> Result<String, CodemodError>;

    /// Applies lightweight formatting (trailing whitespace, final
    /// newline). Idempotent.
    fn format_source(&self, source: &str) -> Result<String, CodemodError>;

    /// Cheap diagnostics over the transformed output. Error severity
    /// downgrades the pipeline result to partial.
    fn quick_check(&self, source: &str) -> Vec<Diagnostic>;

    /// Byte offset where append-to-body inserts inside `anchor`.
    ///
    /// # Errors
    ///
    /// `TransformFailed` when the anchor has no body to append into.
    fn append_point(&self, anchor: &Anchor, source: &str) -> Result<usize, CodemodError>;
}

/// Converts a name glob into an anchored regex.
///
/// Escapes `.+^$()[]{}|`, converts `*` to `.*` and `?` to `.`, and
/// anchors the result with `^...$`.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 4);
    out.push('^');
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '.' | '+' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    out
}

/// Whether a glob matches every name (so constraints can be skipped).
pub fn glob_matches_all(glob: &str) -> bool {
    glob == "*" || glob.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_to_regex_wildcards() {
        assert_eq!(glob_to_regex("test*"), "^test.*$");
        assert_eq!(glob_to_regex("ha?dle"), "^ha.dle$");
        assert_eq!(glob_to_regex("*"), "^.*$");
    }

    #[test]
    fn test_glob_to_regex_escapes_metacharacters() {
        assert_eq!(glob_to_regex("a.b+c"), "^a\\.b\\+c$");
        assert_eq!(glob_to_regex("f(x)[y]{z}|w"), "^f\\(x\\)\\[y\\]\\{z\\}\\|w$");
        assert_eq!(glob_to_regex("^$"), "^\\^\\$$");
    }

    #[test]
    fn test_glob_matches_all() {
        assert!(glob_matches_all("*"));
        assert!(glob_matches_all(""));
        assert!(!glob_matches_all("main*"));
    }

    #[test]
    fn test_converted_regex_semantics() {
        let re = regex::Regex::new(&glob_to_regex("test*")).unwrap();
        assert!(re.is_match("testOne"));
        assert!(re.is_match("test"));
        assert!(!re.is_match("mytest"));

        let re = regex::Regex::new(&glob_to_regex("save?")).unwrap();
        assert!(re.is_match("saveA"));
        assert!(!re.is_match("save"));
    }
}
