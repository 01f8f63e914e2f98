// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Identifier Case Conversion
//!
//! Word-splitting and case-conversion helpers used by the fuzzy resolver
//! to generate pattern variations. All functions are pure and total.
//!
//! `to_snake_case("PascalCase")` is `"pascal_case"` - no leading
//! underscore; the variation tests freeze this behavior.

/// Splits an identifier into words at `_`, `-`, whitespace, and camel
/// boundaries.
///
/// Runs of uppercase letters are kept together until a lowercase letter
/// follows: `HTTPServer` splits into `HTTP` + `Server`.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = input.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `someName` / `SomeName` / `some-name` → `some_name`.
pub fn to_snake_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `some_name` / `SomeName` → `someName`.
pub fn to_camel_case(input: &str) -> String {
    let words = split_words(input);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `some_name` / `someName` → `SomeName`.
pub fn to_pascal_case(input: &str) -> String {
    split_words(input).iter().map(|w| capitalize(w)).collect()
}

/// Uppercases the first character, leaving the rest unchanged.
pub fn to_title_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First character plus each embedded uppercase character:
/// `getUserName` → `gUN`.
pub fn camel_abbrev(input: &str) -> String {
    let mut out = String::new();
    for (i, c) in input.chars().enumerate() {
        if i == 0 {
            out.push(c);
        } else if c.is_uppercase() {
            out.push(c);
        }
    }
    out
}

/// First character of each word, lowercased: `new_user_name` → `nun`.
pub fn acronym(input: &str) -> String {
    split_words(input)
        .iter()
        .filter_map(|w| w.chars().next())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
