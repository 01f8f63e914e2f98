// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Structural Query
//!
//! The parsed form of a DSL query string: what to select (kind + name
//! pattern + attributes), how to combine selections (logical and
//! hierarchical operators), and where to look (scope).
//!
//! ## Structural Invariants
//!
//! The constructors enforce the shape rules the pipeline relies on:
//!
//! - A **simple** query has no children and no operator.
//! - A **logical** query (AND/OR) has exactly two children and the
//!   reserved `logical` kind.
//! - A **hierarchical** query carries the child's kind/pattern on the
//!   outer record and exactly one child: the parent context.
//! - A **NOT** query either wraps a simple query in place (kind/pattern
//!   on the outer record, no children) or wraps a compound query via a
//!   single child.
//!
//! `validate()` re-checks the invariants on queries assembled manually or
//! deserialized from stored transform requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

use super::node_kind::NodeKind;
use super::scope_type::ScopeType;
use crate::CodemodError;

/// What the outer record of a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// A universal node kind.
    Node(NodeKind),
    /// Reserved marker for logical (AND/OR) combinators, which select
    /// nothing themselves.
    Logical,
}

impl QueryKind {
    pub fn as_node(&self) -> Option<NodeKind> {
        match self {
            QueryKind::Node(kind) => Some(*kind),
            QueryKind::Logical => None,
        }
    }
}

/// Combinator carried by a query record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryOperator {
    And,
    Or,
    Not,
    Hierarchy,
    /// Simple query; no combinator.
    #[default]
    None,
}

impl Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryOperator::And => "AND",
            QueryOperator::Or => "OR",
            QueryOperator::Not => "NOT",
            QueryOperator::Hierarchy => "HIERARCHY",
            QueryOperator::None => "",
        };
        write!(f, "{}", s)
    }
}

/// Parsed structural selector.
///
/// Value record: owned by whoever parsed or built it, cheap to clone,
/// serialized inside stored transform requests so staged work replays
/// against the exact query that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    kind: QueryKind,
    pattern: String,
    attributes: BTreeMap<String, String>,
    operator: QueryOperator,
    children: Vec<Query>,
    scope: Option<ScopeType>,
    raw: String,
}

impl Query {
    /// Creates a simple `kind:pattern` query.
    pub fn simple(kind: NodeKind, pattern: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Node(kind),
            pattern: pattern.into(),
            attributes: BTreeMap::new(),
            operator: QueryOperator::None,
            children: Vec::new(),
            scope: None,
            raw: String::new(),
        }
    }

    /// Creates a logical AND/OR combinator over exactly two operands.
    pub fn logical(operator: QueryOperator, left: Query, right: Query) -> Result<Self, CodemodError> {
        if !matches!(operator, QueryOperator::And | QueryOperator::Or) {
            return Err(CodemodError::InvalidParams(format!(
                "logical queries require AND or OR, got {}",
                operator
            )));
        }
        Ok(Self {
            kind: QueryKind::Logical,
            pattern: String::new(),
            attributes: BTreeMap::new(),
            operator,
            children: vec![left, right],
            scope: None,
            raw: String::new(),
        })
    }

    /// Creates a hierarchical query: `child` constrained to appear inside
    /// `parent`. The outer record carries the child's own selection.
    pub fn hierarchical(child: Query, parent: Query) -> Result<Self, CodemodError> {
        let child_kind = child.kind.as_node().ok_or_else(|| {
            CodemodError::InvalidParams("hierarchical child must be a simple query".to_string())
        })?;
        if child.pattern.is_empty() {
            return Err(CodemodError::InvalidParams(
                "hierarchical query requires a non-empty child pattern".to_string(),
            ));
        }
        Ok(Self {
            kind: QueryKind::Node(child_kind),
            pattern: child.pattern,
            attributes: child.attributes,
            operator: QueryOperator::Hierarchy,
            children: vec![parent],
            scope: child.scope,
            raw: String::new(),
        })
    }

    /// Negates a query.
    ///
    /// A simple operand is negated in place; a compound operand becomes
    /// the single child of the NOT record. Double negation is rejected.
    pub fn negated(inner: Query) -> Result<Self, CodemodError> {
        if inner.operator == QueryOperator::Not {
            return Err(CodemodError::InvalidParams(
                "double negation is not supported".to_string(),
            ));
        }
        if inner.is_simple() {
            let mut q = inner;
            q.operator = QueryOperator::Not;
            Ok(q)
        } else {
            Ok(Self {
                kind: QueryKind::Logical,
                pattern: String::new(),
                attributes: BTreeMap::new(),
                operator: QueryOperator::Not,
                children: vec![inner],
                scope: None,
                raw: String::new(),
            })
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn operator(&self) -> QueryOperator {
        self.operator
    }

    pub fn children(&self) -> &[Query] {
        &self.children
    }

    pub fn scope(&self) -> Option<ScopeType> {
        self.scope
    }

    /// Original query string, preserved for diagnostics.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// A query with no combinator and no children.
    pub fn is_simple(&self) -> bool {
        self.operator == QueryOperator::None && self.children.is_empty()
    }

    /// Stores the attribute that follows the pattern. The first becomes
    /// `type`; subsequent ones become `constraint_1`, `constraint_2`, ...
    pub fn push_attribute(&mut self, value: impl Into<String>) {
        let key = if self.attributes.contains_key("type") {
            let next = (1..)
                .find(|i| !self.attributes.contains_key(&format!("constraint_{}", i)))
                .unwrap_or(1);
            format!("constraint_{}", next)
        } else {
            "type".to_string()
        };
        self.attributes.insert(key, value.into());
    }

    pub fn set_scope(&mut self, scope: ScopeType) {
        self.scope = Some(scope);
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    /// Replaces the name pattern, preserving everything else.
    ///
    /// The fuzzy resolver uses this to retry the query with generated
    /// pattern variations.
    pub fn with_pattern(&self, pattern: impl Into<String>) -> Self {
        let mut q = self.clone();
        q.pattern = pattern.into();
        q
    }

    /// Re-checks the structural invariants.
    ///
    /// Needed for queries that skipped the constructors: manual assembly
    /// in tests and deserialization from stored transform requests.
    pub fn validate(&self) -> Result<(), CodemodError> {
        match self.operator {
            QueryOperator::None => {
                if !self.children.is_empty() {
                    return Err(CodemodError::InvalidParams(
                        "simple query must not have children".to_string(),
                    ));
                }
                if self.kind == QueryKind::Logical {
                    return Err(CodemodError::InvalidParams(
                        "simple query requires a node kind".to_string(),
                    ));
                }
            }
            QueryOperator::And | QueryOperator::Or => {
                if self.children.len() != 2 {
                    return Err(CodemodError::InvalidParams(format!(
                        "logical query requires exactly two children, found {}",
                        self.children.len()
                    )));
                }
            }
            QueryOperator::Hierarchy => {
                if self.children.len() != 1 {
                    return Err(CodemodError::InvalidParams(format!(
                        "hierarchical query requires exactly one parent, found {}",
                        self.children.len()
                    )));
                }
                if self.kind == QueryKind::Logical || self.pattern.is_empty() {
                    return Err(CodemodError::InvalidParams(
                        "hierarchical query requires a child kind and pattern".to_string(),
                    ));
                }
            }
            QueryOperator::Not => {
                match self.children.len() {
                    0 => {
                        if self.kind == QueryKind::Logical {
                            return Err(CodemodError::InvalidParams(
                                "negated simple query requires a node kind".to_string(),
                            ));
                        }
                    }
                    1 => {
                        if self.children[0].operator == QueryOperator::Not {
                            return Err(CodemodError::InvalidParams(
                                "double negation is not supported".to_string(),
                            ));
                        }
                    }
                    n => {
                        return Err(CodemodError::InvalidParams(format!(
                            "negated query requires at most one child, found {}",
                            n
                        )));
                    }
                }
            }
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    /// Renders the query back into DSL syntax using canonical kind names
    /// and normalized operators.
    ///
    /// `parse(render(q))` recovers the same structure up to operator
    /// normalization; `raw` is not preserved through the round trip.
    pub fn render(&self) -> String {
        match self.operator {
            QueryOperator::None => self.render_simple(),
            QueryOperator::And => format!("{} & {}", self.children[0].render(), self.children[1].render()),
            QueryOperator::Or => format!("{} | {}", self.children[0].render(), self.children[1].render()),
            QueryOperator::Hierarchy => {
                format!("{} > {}", self.children[0].render(), self.render_simple())
            }
            QueryOperator::Not => {
                if self.children.is_empty() {
                    format!("!{}", self.render_simple())
                } else {
                    format!("!{}", self.children[0].render())
                }
            }
        }
    }

    fn render_simple(&self) -> String {
        let kind = match self.kind {
            QueryKind::Node(node) => node.as_str(),
            QueryKind::Logical => "logical",
        };
        let mut out = format!("{}:{}", kind, self.pattern);
        if let Some(ty) = self.attributes.get("type") {
            out.push(' ');
            out.push_str(ty);
        }
        for i in 1.. {
            match self.attributes.get(&format!("constraint_{}", i)) {
                Some(v) => {
                    out.push(' ');
                    out.push_str(v);
                }
                None => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_query_shape() {
        let q = Query::simple(NodeKind::Function, "main");
        assert!(q.is_simple());
        assert!(q.validate().is_ok());
        assert_eq!(q.render(), "function:main");
    }

    #[test]
    fn test_attributes_order() {
        let mut q = Query::simple(NodeKind::Function, "handle*");
        q.push_attribute("public");
        q.push_attribute("static");
        q.push_attribute("async");
        assert_eq!(q.attributes().get("type").unwrap(), "public");
        assert_eq!(q.attributes().get("constraint_1").unwrap(), "static");
        assert_eq!(q.attributes().get("constraint_2").unwrap(), "async");
        assert_eq!(q.render(), "function:handle* public static async");
    }

    #[test]
    fn test_logical_requires_two_children() {
        let left = Query::simple(NodeKind::Function, "a");
        let right = Query::simple(NodeKind::Function, "b");
        let q = Query::logical(QueryOperator::And, left, right).unwrap();
        assert_eq!(q.children().len(), 2);
        assert_eq!(q.kind(), QueryKind::Logical);
        assert!(q.validate().is_ok());

        let mut broken = q.clone();
        broken.children.pop();
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_hierarchy_carries_child_selection() {
        let child = Query::simple(NodeKind::Method, "save");
        let parent = Query::simple(NodeKind::Class, "Repo");
        let q = Query::hierarchical(child, parent).unwrap();
        assert_eq!(q.kind().as_node().unwrap(), NodeKind::Method);
        assert_eq!(q.pattern(), "save");
        assert_eq!(q.children().len(), 1);
        assert_eq!(q.render(), "class:Repo > method:save");
    }

    #[test]
    fn test_double_negation_rejected() {
        let simple = Query::simple(NodeKind::Variable, "tmp");
        let negated = Query::negated(simple).unwrap();
        assert!(Query::negated(negated).is_err());
    }

    #[test]
    fn test_negation_of_compound_wraps_child() {
        let left = Query::simple(NodeKind::Function, "a");
        let right = Query::simple(NodeKind::Function, "b");
        let or = Query::logical(QueryOperator::Or, left, right).unwrap();
        let not = Query::negated(or).unwrap();
        assert_eq!(not.operator(), QueryOperator::Not);
        assert_eq!(not.children().len(), 1);
        assert!(not.validate().is_ok());
        assert_eq!(not.render(), "!function:a | function:b");
    }
}
