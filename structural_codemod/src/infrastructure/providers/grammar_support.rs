// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Grammar Support
//!
//! Shared tree-sitter machinery behind every language provider: parsing,
//! compiled-query caching, mapping execution, the boolean algebra over
//! anchor sets (AND/OR/NOT/HIERARCHY), scope classification, and body
//! location for append-to-body.
//!
//! Each provider is a thin declaration layer - node mapping tables, scope
//! tables, and language-specific import/format passes - composed over
//! this support type.
//!
//! ## Name Capture Convention
//!
//! - `@name` in a template binds a dedicated name node; the anchor is the
//!   `@node` capture.
//! - `@node` as the name capture means the anchor node's own text is its
//!   name (single-token anchors such as Python parameters).
//! - An empty name capture declares a nameless mapping; only the `*`
//!   pattern selects it.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tree_sitter::{Language, Parser, Query as TsQuery, QueryCursor, StreamingIterator, Tree};

use structural_codemod_domain::services::language_provider::{glob_matches_all, glob_to_regex};
use structural_codemod_domain::value_objects::{
    Anchor, NodeKind, NodeMapping, Query, QueryKind, QueryOperator, ScopeType,
};
use structural_codemod_domain::CodemodError;

/// Node-type tables used to classify an anchor's enclosing scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    pub class_nodes: &'static [&'static str],
    pub function_nodes: &'static [&'static str],
    pub block_nodes: &'static [&'static str],
    pub namespace_nodes: &'static [&'static str],
}

impl ScopeTable {
    fn classify(&self, node_type: &str) -> Option<ScopeType> {
        if self.function_nodes.contains(&node_type) {
            Some(ScopeType::Function)
        } else if self.class_nodes.contains(&node_type) {
            Some(ScopeType::Class)
        } else if self.namespace_nodes.contains(&node_type) {
            Some(ScopeType::Namespace)
        } else if self.block_nodes.contains(&node_type) {
            Some(ScopeType::Block)
        } else {
            None
        }
    }
}

/// Shared grammar machinery for one language.
pub struct GrammarSupport {
    language: Language,
    scope_table: ScopeTable,
    /// Body offsets point before the closing delimiter when the grammar
    /// brace-delimits bodies (Go, Rust) and at the body end otherwise
    /// (Python).
    brace_delimited_bodies: bool,
    compiled: RwLock<HashMap<String, Arc<Result<TsQuery, String>>>>,
}

impl GrammarSupport {
    pub fn new(language: Language, scope_table: ScopeTable, brace_delimited_bodies: bool) -> Self {
        Self {
            language,
            scope_table,
            brace_delimited_bodies,
            compiled: RwLock::new(HashMap::new()),
        }
    }

    /// Parses `source`, surfacing grammar failure as `SyntaxError`.
    pub fn parse(&self, source: &str) -> Result<Tree, CodemodError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| CodemodError::InternalError(format!("grammar version mismatch: {}", e)))?;
        parser
            .parse(source, None)
            .ok_or_else(|| CodemodError::SyntaxError("grammar produced no tree".to_string()))
    }

    /// Whether the parsed tree contains syntax errors.
    pub fn has_errors(&self, source: &str) -> bool {
        self.parse(source).map(|t| t.root_node().has_error()).unwrap_or(true)
    }

    /// Compiles a grammar query, caching both successes and failures
    /// under the query text (double-checked read/write).
    fn compiled_query(&self, text: &str) -> Arc<Result<TsQuery, String>> {
        if let Some(found) = self.compiled.read().get(text) {
            return found.clone();
        }
        let mut write = self.compiled.write();
        if let Some(found) = write.get(text) {
            return found.clone();
        }
        let compiled = Arc::new(
            TsQuery::new(&self.language, text).map_err(|e| e.to_string()),
        );
        write.insert(text.to_string(), compiled.clone());
        compiled
    }

    /// Renders the constraint predicate for a mapping, or `None` when the
    /// mapping cannot express the pattern (nameless mapping with a
    /// non-`*` pattern).
    pub fn render_constraint(mapping: &NodeMapping, pattern: &str) -> Option<String> {
        if glob_matches_all(pattern) {
            return Some(String::new());
        }
        if mapping.name_capture().is_empty() {
            return None;
        }
        let regex = glob_to_regex(pattern)
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        Some(format!("(#match? {} \"{}\")", mapping.name_capture(), regex))
    }

    /// Executes one mapping over the tree, returning anchors in tree
    /// order.
    fn run_mapping(
        &self,
        mapping: &NodeMapping,
        tree: &Tree,
        source: &str,
        pattern: &str,
    ) -> Result<Vec<Anchor>, CodemodError> {
        let Some(constraint) = Self::render_constraint(mapping, pattern) else {
            return Ok(Vec::new());
        };
        let text = mapping.render_query(&constraint);
        let compiled = self.compiled_query(&text);
        let query = match compiled.as_ref() {
            Ok(query) => query,
            Err(e) => {
                return Err(CodemodError::InternalError(format!(
                    "grammar query failed to compile: {}",
                    e
                )));
            }
        };

        let node_index = query.capture_index_for_name("node");
        let name_index = query.capture_index_for_name("name");

        let mut anchors = Vec::new();
        let mut cursor = QueryCursor::new();
        let root = tree.root_node();
        let mut matches = cursor.matches(query, root, source.as_bytes());
        while let Some(m) = matches.next() {
            let anchor_node = node_index
                .and_then(|idx| m.captures.iter().find(|c| c.index == idx))
                .map(|c| c.node);
            let Some(node) = anchor_node else { continue };

            let name = match mapping.name_capture() {
                "" => String::new(),
                "@node" => source[node.byte_range()].to_string(),
                _ => name_index
                    .and_then(|idx| m.captures.iter().find(|c| c.index == idx))
                    .map(|c| source[c.node.byte_range()].to_string())
                    .unwrap_or_default(),
            };

            let scope = self.enclosing_scope(node);
            let mut anchor = Anchor::new(mapping.kind(), name, node.start_byte(), node.end_byte(), scope);
            if let Some(offset) = self.body_append_offset(node) {
                anchor = anchor.with_body_append_offset(offset);
            }
            anchors.push(anchor);
        }
        Ok(anchors)
    }

    fn enclosing_scope(&self, node: tree_sitter::Node<'_>) -> ScopeType {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if let Some(scope) = self.scope_table.classify(ancestor.kind()) {
                return scope;
            }
            current = ancestor.parent();
        }
        ScopeType::File
    }

    /// Byte offset where append-to-body inserts for `node`, when it has a
    /// body.
    fn body_append_offset(&self, node: tree_sitter::Node<'_>) -> Option<usize> {
        let body = node.child_by_field_name("body")?;
        if self.brace_delimited_bodies {
            Some(body.end_byte().saturating_sub(1))
        } else {
            Some(body.end_byte())
        }
    }

    /// Selects anchors for a (possibly compound) query.
    ///
    /// Mappings are consulted in descending priority; results are merged
    /// in tree order with range-deduplication, so a node matched by two
    /// mappings surfaces once under the higher-priority one.
    pub fn select(
        &self,
        mappings: &HashMap<NodeKind, Vec<NodeMapping>>,
        source: &str,
        query: &Query,
    ) -> Result<Vec<Anchor>, CodemodError> {
        let tree = self.parse(source)?;
        if tree.root_node().has_error() {
            return Err(CodemodError::SyntaxError(format!(
                "source does not parse at {}",
                first_error_position(&tree)
            )));
        }
        self.select_in_tree(mappings, &tree, source, query)
    }

    fn select_in_tree(
        &self,
        mappings: &HashMap<NodeKind, Vec<NodeMapping>>,
        tree: &Tree,
        source: &str,
        query: &Query,
    ) -> Result<Vec<Anchor>, CodemodError> {
        match query.operator() {
            QueryOperator::None => self.select_simple(mappings, tree, source, query),
            QueryOperator::And => {
                let left = self.select_in_tree(mappings, tree, source, &query.children()[0])?;
                let right = self.select_in_tree(mappings, tree, source, &query.children()[1])?;
                Ok(intersect(left, &right))
            }
            QueryOperator::Or => {
                let left = self.select_in_tree(mappings, tree, source, &query.children()[0])?;
                let right = self.select_in_tree(mappings, tree, source, &query.children()[1])?;
                Ok(merge(left, right))
            }
            QueryOperator::Not => {
                if query.children().is_empty() {
                    // Negated simple query: same kinds, complement pattern.
                    let universe = self.select_simple(
                        mappings,
                        tree,
                        source,
                        &query.with_pattern("*"),
                    )?;
                    let matched = self.select_simple(mappings, tree, source, query)?;
                    Ok(subtract(universe, &matched))
                } else {
                    let inner = &query.children()[0];
                    let universe = self.universe_of(mappings, tree, source, inner)?;
                    let matched = self.select_in_tree(mappings, tree, source, inner)?;
                    Ok(subtract(universe, &matched))
                }
            }
            QueryOperator::Hierarchy => {
                let parents = self.select_in_tree(mappings, tree, source, &query.children()[0])?;
                // The outer record carries the child's own selection.
                let children = self.select_simple(mappings, tree, source, query)?;
                Ok(children
                    .into_iter()
                    .filter(|child| {
                        parents.iter().any(|parent| {
                            parent.start_byte() < child.start_byte()
                                && child.end_byte() <= parent.end_byte()
                        })
                    })
                    .collect())
            }
        }
    }

    fn select_simple(
        &self,
        mappings: &HashMap<NodeKind, Vec<NodeMapping>>,
        tree: &Tree,
        source: &str,
        query: &Query,
    ) -> Result<Vec<Anchor>, CodemodError> {
        let Some(kind) = query.kind().as_node() else {
            return Ok(Vec::new());
        };
        let mut ordered: Vec<&NodeMapping> = mappings
            .get(&kind)
            .map(|m| m.iter().collect())
            .unwrap_or_default();
        ordered.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let mut anchors: Vec<Anchor> = Vec::new();
        for mapping in ordered {
            for anchor in self.run_mapping(mapping, tree, source, query.pattern())? {
                if !anchors
                    .iter()
                    .any(|a| a.start_byte() == anchor.start_byte() && a.end_byte() == anchor.end_byte())
                {
                    anchors.push(anchor);
                }
            }
        }
        anchors.sort_by_key(|a| (a.start_byte(), a.end_byte()));

        if let Some(scope) = query.scope() {
            anchors.retain(|a| a.scope() == scope);
        }
        Ok(anchors)
    }

    /// All anchors of every kind mentioned by `query`, used as the
    /// complement universe for NOT over compound queries.
    fn universe_of(
        &self,
        mappings: &HashMap<NodeKind, Vec<NodeMapping>>,
        tree: &Tree,
        source: &str,
        query: &Query,
    ) -> Result<Vec<Anchor>, CodemodError> {
        let mut kinds = Vec::new();
        collect_kinds(query, &mut kinds);
        let mut universe: Vec<Anchor> = Vec::new();
        for kind in kinds {
            let probe = Query::simple(kind, "*");
            universe = merge(universe, self.select_simple(mappings, tree, source, &probe)?);
        }
        Ok(universe)
    }
}

/// Renders the grammar queries a [`Query`] expands to: one per applicable
/// mapping of every simple sub-query, in priority order.
pub fn translate_query(
    mappings: &HashMap<NodeKind, Vec<NodeMapping>>,
    query: &Query,
) -> Result<Vec<String>, CodemodError> {
    let mut rendered = Vec::new();
    translate_into(mappings, query, &mut rendered);
    Ok(rendered)
}

fn translate_into(
    mappings: &HashMap<NodeKind, Vec<NodeMapping>>,
    query: &Query,
    out: &mut Vec<String>,
) {
    if let QueryKind::Node(kind) = query.kind() {
        let mut ordered: Vec<&NodeMapping> = mappings
            .get(&kind)
            .map(|m| m.iter().collect())
            .unwrap_or_default();
        ordered.sort_by(|a, b| b.priority().cmp(&a.priority()));
        for mapping in ordered {
            if let Some(constraint) = GrammarSupport::render_constraint(mapping, query.pattern()) {
                out.push(mapping.render_query(&constraint));
            }
        }
    }
    for child in query.children() {
        translate_into(mappings, child, out);
    }
}

fn collect_kinds(query: &Query, out: &mut Vec<NodeKind>) {
    if let QueryKind::Node(kind) = query.kind() {
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    for child in query.children() {
        collect_kinds(child, out);
    }
}

fn same_range(a: &Anchor, b: &Anchor) -> bool {
    a.start_byte() == b.start_byte() && a.end_byte() == b.end_byte()
}

fn intersect(left: Vec<Anchor>, right: &[Anchor]) -> Vec<Anchor> {
    left.into_iter()
        .filter(|a| right.iter().any(|b| same_range(a, b)))
        .collect()
}

fn subtract(universe: Vec<Anchor>, matched: &[Anchor]) -> Vec<Anchor> {
    universe
        .into_iter()
        .filter(|a| !matched.iter().any(|b| same_range(a, b)))
        .collect()
}

fn merge(left: Vec<Anchor>, right: Vec<Anchor>) -> Vec<Anchor> {
    let mut merged = left;
    for anchor in right {
        if !merged.iter().any(|a| same_range(a, &anchor)) {
            merged.push(anchor);
        }
    }
    merged.sort_by_key(|a| (a.start_byte(), a.end_byte()));
    merged
}

fn first_error_position(tree: &Tree) -> String {
    let mut cursor = tree.walk();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!("line {}, column {}", pos.row + 1, pos.column + 1);
        }
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    "unknown position".to_string()
}

/// Trims trailing whitespace per line and normalizes the final newline.
/// Idempotent; shared by every provider's formatting pass.
pub fn normalize_whitespace(source: &str) -> String {
    let mut out: String = source
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    if !source.is_empty() {
        out.push('\n');
    }
    out
}

/// Collects error/missing nodes as quick-check findings.
pub fn syntax_findings(support: &GrammarSupport, source: &str) -> Vec<(usize, usize, String)> {
    let Ok(tree) = support.parse(source) else {
        return vec![(0, 0, "grammar produced no tree".to_string())];
    };
    let mut findings = Vec::new();
    let mut cursor = tree.walk();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            findings.push((node.start_byte(), node.end_byte(), "syntax error".to_string()));
        } else if node.is_missing() {
            findings.push((
                node.start_byte(),
                node.end_byte(),
                format!("missing {}", node.kind()),
            ));
        }
        if findings.len() >= 16 {
            break;
        }
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    findings.sort_by_key(|f| f.0);
    findings
}
