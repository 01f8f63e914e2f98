// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Fuzzy Anchor Resolver
//!
//! Deterministic fallback for queries whose exact pattern matched
//! nothing. The resolver generates pattern variations (case conversions,
//! affix stripping, wildcard wrapping, abbreviations), lets the caller
//! probe which variations produce anchors, and ranks the viable ones with
//! weighted similarity heuristics.
//!
//! ## Heuristics
//!
//! | Heuristic | Weight | Score |
//! |---|---|---|
//! | exact_match | 1.0 | 1.0 iff strings equal |
//! | case_insensitive | 0.9 | 1.0 iff lowercase equal; distance = case differences |
//! | levenshtein | 0.8 | `1 - d/max(len)` |
//! | substring | 0.7 | `min(len)/max(len)` iff one contains the other |
//! | prefix | 0.6 | `lcp/max(len)` |
//! | suffix | 0.6 | `lcs/max(len)` |
//! | camel_case | 0.5 | size-ratio iff variant is the camel abbreviation |
//! | acronym | 0.4 | size-ratio iff variant is the acronym |
//!
//! A heuristic contributes `score x weight` only when its distance is
//! within the configured bound; the variant's score is the weighted mean
//! over contributing heuristics and its distance is the minimum over
//! them. Ranking is fully deterministic: score descending, distance
//! ascending, variant string ascending.

use serde::{Deserialize, Serialize};

use super::case_convert::{
    acronym, camel_abbrev, to_camel_case, to_pascal_case, to_snake_case, to_title_case,
};
use crate::value_objects::DEFAULT_MAX_FUZZ_DISTANCE;

/// Verb prefixes stripped when generating variations.
const STRIP_PREFIXES: [&str; 10] = [
    "get", "set", "is", "has", "can", "should", "will", "do", "make", "create",
];

/// Suffixes stripped when generating variations.
const STRIP_SUFFIXES: [&str; 8] = ["er", "ed", "ing", "s", "es", "ies", "tion", "sion"];

/// A ranked pattern variation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVariant {
    pub variant: String,
    /// Weighted mean over contributing heuristics.
    pub score: f64,
    /// Minimum distance over contributing heuristics.
    pub distance: u32,
    /// Names of the heuristics that contributed.
    pub heuristics: Vec<String>,
}

impl ScoredVariant {
    /// `score * (1 - distance/(max_distance + 1))`.
    pub fn confidence(&self, max_distance: u32) -> f64 {
        self.score * (1.0 - f64::from(self.distance) / f64::from(max_distance + 1))
    }
}

/// Deterministic heuristic-weighted pattern resolver.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyResolver {
    max_distance: u32,
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FUZZ_DISTANCE)
    }
}

impl FuzzyResolver {
    pub fn new(max_distance: u32) -> Self {
        Self { max_distance }
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Generates pattern variations in a fixed order.
    ///
    /// The identity variant is always first; duplicates are removed
    /// preserving first occurrence.
    pub fn variations(&self, pattern: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |candidate: String| {
            if !candidate.is_empty() && !out.contains(&candidate) {
                out.push(candidate);
            }
        };

        push(pattern.to_string());

        push(pattern.to_lowercase());
        push(pattern.to_uppercase());
        push(to_title_case(pattern));

        push(to_camel_case(pattern));
        push(to_pascal_case(pattern));
        push(to_snake_case(pattern));

        for prefix in STRIP_PREFIXES {
            if pattern.len() > prefix.len() && pattern.to_lowercase().starts_with(prefix) {
                push(pattern[prefix.len()..].to_string());
            }
        }

        for suffix in STRIP_SUFFIXES {
            if pattern.len() > suffix.len() && pattern.to_lowercase().ends_with(suffix) {
                push(pattern[..pattern.len() - suffix.len()].to_string());
            }
        }

        push(format!("*{}*", pattern));
        push(format!("{}*", pattern));
        push(format!("*{}", pattern));

        push(camel_abbrev(pattern));
        push(acronym(pattern));

        out
    }

    /// Scores one variant against the original pattern.
    ///
    /// Returns `None` when no heuristic contributes within the distance
    /// bound.
    pub fn score(&self, original: &str, variant: &str) -> Option<ScoredVariant> {
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        let mut min_distance = u32::MAX;
        let mut heuristics = Vec::new();

        let mut contribute = |name: &str, weight: f64, score: f64, distance: u32| {
            if score > 0.0 && distance <= self.max_distance {
                weighted_sum += score * weight;
                weight_sum += weight;
                min_distance = min_distance.min(distance);
                heuristics.push(name.to_string());
            }
        };

        let max_len = original.chars().count().max(variant.chars().count());
        let min_len = original.chars().count().min(variant.chars().count());
        if max_len == 0 {
            return None;
        }
        let len_delta = (max_len - min_len) as u32;

        // exact_match
        if original == variant {
            contribute("exact_match", 1.0, 1.0, 0);
        }

        // case_insensitive
        if original.to_lowercase() == variant.to_lowercase() {
            let case_diffs = original
                .chars()
                .zip(variant.chars())
                .filter(|(a, b)| a != b)
                .count() as u32;
            contribute("case_insensitive", 0.9, 1.0, case_diffs);
        }

        // levenshtein
        let lev = levenshtein(original, variant);
        if lev > 0 {
            let score = 1.0 - (lev as f64) / (max_len as f64);
            contribute("levenshtein", 0.8, score, lev as u32);
        }

        // substring
        if original.contains(variant) || variant.contains(original) {
            let score = (min_len as f64) / (max_len as f64);
            contribute("substring", 0.7, score, len_delta);
        }

        // prefix
        let lcp = common_prefix_len(original, variant);
        if lcp > 0 {
            contribute("prefix", 0.6, (lcp as f64) / (max_len as f64), (max_len - lcp) as u32);
        }

        // suffix
        let lcs = common_suffix_len(original, variant);
        if lcs > 0 {
            contribute("suffix", 0.6, (lcs as f64) / (max_len as f64), (max_len - lcs) as u32);
        }

        // camel_case: the original is the camel abbreviation of the variant
        let abbrev = camel_abbrev(variant);
        if !abbrev.is_empty() && original.eq_ignore_ascii_case(&abbrev) {
            contribute("camel_case", 0.5, (min_len as f64) / (max_len as f64), len_delta);
        }

        // acronym: the original is the acronym of the variant
        let acro = acronym(variant);
        if !acro.is_empty() && original.eq_ignore_ascii_case(&acro) {
            contribute("acronym", 0.4, (min_len as f64) / (max_len as f64), len_delta);
        }

        if weight_sum == 0.0 {
            return None;
        }

        Some(ScoredVariant {
            variant: variant.to_string(),
            score: weighted_sum / weight_sum,
            distance: min_distance,
            heuristics,
        })
    }

    /// Ranks the viable variants and returns the winner.
    ///
    /// Ordering is score descending, then distance ascending, then
    /// variant string ascending, so identical inputs always select the
    /// same variant.
    pub fn select_best(&self, original: &str, viable: &[String]) -> Option<ScoredVariant> {
        let mut scored: Vec<ScoredVariant> = viable
            .iter()
            .filter_map(|v| self.score(original, v))
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.distance.cmp(&b.distance))
                .then(a.variant.cmp(&b.variant))
        });
        scored.into_iter().next()
    }

    /// Full resolution loop: probes each variation with `has_anchors`
    /// and ranks the ones that matched.
    ///
    /// The identity variant participates too: exact matching already
    /// failed when the resolver runs, so identity only survives when the
    /// caller probes it with relaxed (e.g. case-insensitive) semantics.
    pub fn resolve<F>(&self, pattern: &str, mut has_anchors: F) -> Option<ScoredVariant>
    where
        F: FnMut(&str) -> bool,
    {
        let viable: Vec<String> = self
            .variations(pattern)
            .into_iter()
            .filter(|v| has_anchors(v))
            .collect();
        self.select_best(pattern, &viable)
    }
}

/// Character-level edit distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_variations_identity_first_and_deduped() {
        let resolver = FuzzyResolver::default();
        let vars = resolver.variations("newUser");
        assert_eq!(vars[0], "newUser");
        let unique: std::collections::HashSet<&String> = vars.iter().collect();
        assert_eq!(unique.len(), vars.len(), "duplicates in {:?}", vars);
    }

    #[test]
    fn test_variations_cover_documented_families() {
        let resolver = FuzzyResolver::default();
        let vars = resolver.variations("getUserName");
        assert!(vars.contains(&"getusername".to_string()));
        assert!(vars.contains(&"GETUSERNAME".to_string()));
        assert!(vars.contains(&"get_user_name".to_string()));
        assert!(vars.contains(&"GetUserName".to_string()));
        // Verb prefix stripped
        assert!(vars.contains(&"UserName".to_string()));
        // Wildcard wraps
        assert!(vars.contains(&"*getUserName*".to_string()));
        assert!(vars.contains(&"getUserName*".to_string()));
        assert!(vars.contains(&"*getUserName".to_string()));
        // Abbreviations
        assert!(vars.contains(&"gUN".to_string()));
        assert!(vars.contains(&"gun".to_string()));
    }

    #[test]
    fn test_suffix_stripping() {
        let resolver = FuzzyResolver::default();
        let vars = resolver.variations("handler");
        assert!(vars.contains(&"handl".to_string()));
    }

    /// Snake-case variation of PascalCase has no leading underscore.
    #[test]
    fn test_snake_variation_no_leading_underscore() {
        let resolver = FuzzyResolver::default();
        let vars = resolver.variations("NewUser");
        assert!(vars.contains(&"new_user".to_string()));
        assert!(!vars.iter().any(|v| v.starts_with('_')));
    }

    #[test]
    fn test_score_case_only_difference() {
        let resolver = FuzzyResolver::default();
        let scored = resolver.score("NewUser", "newUser").unwrap();
        assert!(scored.heuristics.contains(&"case_insensitive".to_string()));
        assert_eq!(scored.distance, 1);
        assert!(scored.score > 0.8, "score {}", scored.score);
        assert!(scored.confidence(3) > 0.5);
    }

    #[test]
    fn test_score_exact_match() {
        let resolver = FuzzyResolver::default();
        let scored = resolver.score("main", "main").unwrap();
        assert!(scored.heuristics.contains(&"exact_match".to_string()));
        assert_eq!(scored.distance, 0);
        assert!((scored.score - 1.0).abs() < 1e-9);
        assert!((scored.confidence(3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_unrelated_strings() {
        let resolver = FuzzyResolver::default();
        // Nothing within distance 3 relates these.
        assert!(resolver.score("main", "xyzzyplugh").is_none());
    }

    #[test]
    fn test_acronym_heuristic() {
        let resolver = FuzzyResolver::new(16);
        let scored = resolver.score("nun", "new_user_name").unwrap();
        assert!(scored.heuristics.contains(&"acronym".to_string()));
    }

    #[test]
    fn test_selection_deterministic() {
        let resolver = FuzzyResolver::default();
        let viable = vec!["newuser".to_string(), "newUser".to_string()];
        let a = resolver.select_best("NewUser", &viable).unwrap();
        let reversed = vec!["newUser".to_string(), "newuser".to_string()];
        let b = resolver.select_best("NewUser", &reversed).unwrap();
        assert_eq!(a, b);
    }

    /// Scenario: `NewUser` resolves to `newUser` when only the camelCase
    /// spelling exists.
    #[test]
    fn test_resolve_new_user() {
        let resolver = FuzzyResolver::default();
        let resolved = resolver
            .resolve("NewUser", |candidate| candidate == "newUser")
            .unwrap();
        assert_eq!(resolved.variant, "newUser");
        assert!(resolved.heuristics.contains(&"case_insensitive".to_string()));
        assert!(resolved.confidence(3) > 0.5);
    }

    #[test]
    fn test_resolve_nothing_viable() {
        let resolver = FuzzyResolver::default();
        assert!(resolver.resolve("NewUser", |_| false).is_none());
    }
}
