// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Matcher Cache
//!
//! Process-wide map from a rule-configuration fingerprint to its compiled
//! matcher. Compilation happens once per distinct configuration; both
//! successes and failures are cached so a bad pattern cannot cause a
//! compile storm across requests.
//!
//! Readers share a lock; a miss takes the write lock and re-checks before
//! building (double-check idiom). There is no eviction - the cache is
//! bounded by the number of distinct configurations seen in a run.
//!
//! One shared immutable representation: every caller gets the same
//! `Arc<CompiledMatcher>` for a fingerprint until process exit.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use structural_codemod_domain::services::language_provider::glob_to_regex;

/// Rule configuration a matcher is compiled from.
///
/// Every field participates in the fingerprint, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    pub rule_id: String,
    pub use_ast: bool,
    pub pattern: String,
    pub multiline: bool,
    pub dot_all: bool,
    pub literal_pattern: bool,
    pub normalize_whitespace: bool,
    pub language: String,
}

impl MatcherConfig {
    /// Glob-style name matcher configuration for a language.
    pub fn name_glob(rule_id: impl Into<String>, pattern: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            use_ast: false,
            pattern: pattern.into(),
            multiline: false,
            dot_all: false,
            literal_pattern: false,
            normalize_whitespace: false,
            language: language.into(),
        }
    }

    /// Deterministic fingerprint over all configuration fields.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.rule_id,
            self.use_ast,
            self.pattern,
            self.multiline,
            self.dot_all,
            self.literal_pattern,
            self.normalize_whitespace,
            self.language
        )
    }
}

/// Compiled artifact stored per fingerprint.
#[derive(Debug)]
pub enum CompiledMatcher {
    /// Compiled regex matcher (glob or literal patterns).
    Regex(regex::Regex),
    /// Grammar-level query text, compiled downstream by the provider.
    AstQuery(String),
    /// Build failure, cached to avoid repeated compiles.
    Failed(String),
}

impl CompiledMatcher {
    pub fn is_failed(&self) -> bool {
        matches!(self, CompiledMatcher::Failed(_))
    }

    /// Convenience for regex matchers.
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            CompiledMatcher::Regex(re) => re.is_match(candidate),
            _ => false,
        }
    }
}

/// Shared matcher cache.
#[derive(Default)]
pub struct MatcherCache {
    entries: RwLock<HashMap<String, Arc<CompiledMatcher>>>,
}

impl MatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared matcher for `config`, building it on first use.
    pub fn get_or_build(&self, config: &MatcherConfig) -> Arc<CompiledMatcher> {
        let fingerprint = config.fingerprint();

        if let Some(found) = self.entries.read().get(&fingerprint) {
            return found.clone();
        }

        let mut write = self.entries.write();
        if let Some(found) = write.get(&fingerprint) {
            return found.clone();
        }

        let built = Arc::new(Self::build(config));
        write.insert(fingerprint, built.clone());
        built
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn build(config: &MatcherConfig) -> CompiledMatcher {
        if config.use_ast {
            // AST matchers carry the pattern through; providers compile
            // the grammar query themselves.
            return CompiledMatcher::AstQuery(config.pattern.clone());
        }

        let body = if config.literal_pattern {
            regex::escape(&config.pattern)
        } else {
            glob_to_regex(&config.pattern)
        };

        let mut builder = regex::RegexBuilder::new(&body);
        builder.multi_line(config.multiline);
        builder.dot_matches_new_line(config.dot_all);
        match builder.build() {
            Ok(re) => CompiledMatcher::Regex(re),
            Err(e) => CompiledMatcher::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_config_shares_one_matcher() {
        let cache = MatcherCache::new();
        let config = MatcherConfig::name_glob("r1", "test*", "go");
        let a = cache.get_or_build(&config);
        let b = cache.get_or_build(&config);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_flags_distinct_entries() {
        let cache = MatcherCache::new();
        let mut a = MatcherConfig::name_glob("r1", "test*", "go");
        let mut b = a.clone();
        b.multiline = true;
        assert_ne!(a.fingerprint(), b.fingerprint());
        cache.get_or_build(&a);
        cache.get_or_build(&b);
        assert_eq!(cache.len(), 2);
        a.language = "rust".to_string();
        cache.get_or_build(&a);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_glob_semantics() {
        let cache = MatcherCache::new();
        let matcher = cache.get_or_build(&MatcherConfig::name_glob("r1", "handle*", "go"));
        assert!(matcher.is_match("handleRequest"));
        assert!(!matcher.is_match("unhandled"));
    }

    #[test]
    fn test_literal_pattern_escapes() {
        let cache = MatcherCache::new();
        let mut config = MatcherConfig::name_glob("r1", "a.b*", "go");
        config.literal_pattern = true;
        let matcher = cache.get_or_build(&config);
        assert!(matcher.is_match("a.b*"));
        assert!(!matcher.is_match("axb"));
    }

    #[test]
    fn test_ast_matcher_carries_query_text() {
        let cache = MatcherCache::new();
        let mut config = MatcherConfig::name_glob("r1", "((function_declaration) @node)", "go");
        config.use_ast = true;
        let matcher = cache.get_or_build(&config);
        match matcher.as_ref() {
            CompiledMatcher::AstQuery(text) => {
                assert!(text.contains("function_declaration"));
            }
            other => panic!("expected AstQuery, got {:?}", other),
        }
        // The same fingerprint returns the same artifact.
        assert!(Arc::ptr_eq(&matcher, &cache.get_or_build(&config)));
    }
}
