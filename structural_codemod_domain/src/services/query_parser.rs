// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Query DSL Parser
//!
//! Translates external query strings into [`Query`] records. The DSL is
//! deliberately forgiving about vocabulary - every alias a user might
//! write in the idiom of a supported language resolves to the same
//! universal kind - and deliberately strict about shape: one operator per
//! level, binary logical operators, single-level hierarchy.
//!
//! ## Grammar (informal)
//!
//! ```text
//! simple      = kind ":" pattern { " " attribute }
//! logical     = query op query          ; op ∈ & && and | || or
//! hierarchy   = parent " > " child
//! negation    = "!" query | "not " query
//! ```
//!
//! The first attribute after the pattern is stored as `type`; subsequent
//! ones as `constraint_1`, `constraint_2`, ... Operators normalize to
//! AND/OR/NOT/HIERARCHY; the original string is preserved in `raw`.
//!
//! ## Failure Modes
//!
//! - empty input → "empty query string"
//! - unknown kind alias → "unsupported node kind"
//! - more than one `>` separator → error
//! - more than one logical operator per level → error
//! - `kind pattern` without a colon → error

use crate::value_objects::{NodeKind, Query, QueryOperator};
use crate::CodemodError;

/// Stateless DSL parser.
///
/// Construction is free; the parser holds no state between calls, so a
/// single instance may be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a DSL query string into a validated [`Query`].
    pub fn parse(&self, input: &str) -> Result<Query, CodemodError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CodemodError::InvalidParams("empty query string".to_string()));
        }
        let mut query = self.parse_expression(trimmed)?;
        query.set_raw(input);
        query.validate()?;
        Ok(query)
    }

    fn parse_expression(&self, input: &str) -> Result<Query, CodemodError> {
        let trimmed = input.trim();

        // Negation binds the whole rest of the expression, so `!a | b`
        // negates the disjunction rather than its first operand.
        if let Some(rest) = trimmed.strip_prefix('!') {
            return Query::negated(self.parse_expression(rest)?);
        }
        if let Some(prefix) = trimmed.get(..4) {
            if prefix.eq_ignore_ascii_case("not ") {
                return Query::negated(self.parse_expression(&trimmed[4..])?);
            }
        }

        let tokens = tokenize(trimmed);

        let operator_positions: Vec<(usize, QueryOperator)> = tokens
            .iter()
            .enumerate()
            .filter_map(|(i, t)| logical_operator(t).map(|op| (i, op)))
            .collect();

        match operator_positions.len() {
            0 => {}
            1 => {
                let (pos, operator) = operator_positions[0];
                if pos == 0 || pos == tokens.len() - 1 {
                    return Err(CodemodError::InvalidParams(format!(
                        "logical query requires exactly two operands: '{}'",
                        trimmed
                    )));
                }
                let left = self.parse_expression(&tokens[..pos].join(" "))?;
                let right = self.parse_expression(&tokens[pos + 1..].join(" "))?;
                let mut query = Query::logical(operator, left, right)?;
                query.set_raw(trimmed);
                return Ok(query);
            }
            n => {
                return Err(CodemodError::InvalidParams(format!(
                    "logical query requires exactly two operands, found {} operators: '{}'",
                    n, trimmed
                )));
            }
        }

        let hierarchy_positions: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.as_str() == ">")
            .map(|(i, _)| i)
            .collect();

        match hierarchy_positions.len() {
            0 => {}
            1 => {
                let pos = hierarchy_positions[0];
                if pos == 0 || pos == tokens.len() - 1 {
                    return Err(CodemodError::InvalidParams(format!(
                        "hierarchical query requires a parent and a child: '{}'",
                        trimmed
                    )));
                }
                let parent = self.parse_simple(&tokens[..pos])?;
                let child = self.parse_simple(&tokens[pos + 1..])?;
                let mut query = Query::hierarchical(child, parent)?;
                query.set_raw(trimmed);
                return Ok(query);
            }
            n => {
                return Err(CodemodError::InvalidParams(format!(
                    "hierarchical query supports a single '>' separator, found {}: '{}'",
                    n, trimmed
                )));
            }
        }

        let mut query = self.parse_simple(&tokens)?;
        query.set_raw(trimmed);
        Ok(query)
    }

    fn parse_simple(&self, tokens: &[String]) -> Result<Query, CodemodError> {
        let head = tokens.first().ok_or_else(|| {
            CodemodError::InvalidParams("empty query string".to_string())
        })?;

        let (alias, pattern) = head.split_once(':').ok_or_else(|| {
            CodemodError::InvalidParams(format!(
                "malformed query '{}': expected kind:pattern",
                head
            ))
        })?;

        let kind = NodeKind::from_alias(alias)?;
        let mut query = Query::simple(kind, pattern);
        for attribute in &tokens[1..] {
            query.push_attribute(attribute.clone());
        }
        Ok(query)
    }
}

/// Splits on whitespace, detaching the `&`, `|`, and `>` operator symbols
/// into tokens of their own so that `a&b` and `a & b` tokenize alike.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '&' | '|' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                // Collapse doubled symbols (&&, ||) into one token.
                if chars.peek() == Some(&c) {
                    chars.next();
                }
                tokens.push(c.to_string());
            }
            '>' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push('>'.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn logical_operator(token: &str) -> Option<QueryOperator> {
    match token.to_ascii_lowercase().as_str() {
        "&" | "and" => Some(QueryOperator::And),
        "|" | "or" => Some(QueryOperator::Or),
        _ => None,
    }
}
