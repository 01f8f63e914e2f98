// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Rust Language Provider
//!
//! Maps the universal node vocabulary onto the tree-sitter Rust grammar.
//! `class` selects structs (per the alias table, `struct` is a class
//! alias); `method` selects functions declared inside `impl` blocks.

use std::collections::HashMap;
use std::sync::OnceLock;

use structural_codemod_domain::services::LanguageProvider;
use structural_codemod_domain::value_objects::{Anchor, Diagnostic, Location, NodeKind, NodeMapping, Query};
use structural_codemod_domain::CodemodError;

use super::grammar_support::{
    normalize_whitespace, syntax_findings, translate_query, GrammarSupport, ScopeTable,
};

const SCOPE_TABLE: ScopeTable = ScopeTable {
    class_nodes: &["struct_item", "enum_item", "trait_item", "impl_item", "union_item"],
    function_nodes: &["function_item", "closure_expression"],
    block_nodes: &["block"],
    namespace_nodes: &["mod_item"],
};

/// Rust provider over tree-sitter-rust.
pub struct RustProvider {
    support: GrammarSupport,
}

impl RustProvider {
    pub fn new() -> Self {
        Self {
            support: GrammarSupport::new(tree_sitter_rust::LANGUAGE.into(), SCOPE_TABLE, true),
        }
    }

    fn mappings() -> &'static HashMap<NodeKind, Vec<NodeMapping>> {
        static MAPPINGS: OnceLock<HashMap<NodeKind, Vec<NodeMapping>>> = OnceLock::new();
        MAPPINGS.get_or_init(|| {
            let mut table: HashMap<NodeKind, Vec<NodeMapping>> = HashMap::new();
            for kind in NodeKind::ALL {
                table.insert(kind, Vec::new());
            }

            let mut add = |kind: NodeKind, types: &[&str], name: &str, template: &str, priority: u32| {
                table.entry(kind).or_default().push(NodeMapping::new(
                    kind,
                    types.iter().map(|t| t.to_string()).collect(),
                    name,
                    template,
                    priority,
                ));
            };

            add(
                NodeKind::Function,
                &["function_item"],
                "@name",
                "((function_item name: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Method,
                &["function_item"],
                "@name",
                "((impl_item body: (declaration_list (function_item name: (identifier) @name) @node)) %s)",
                10,
            );
            add(
                NodeKind::Variable,
                &["let_declaration"],
                "@name",
                "((let_declaration pattern: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Constant,
                &["const_item"],
                "@name",
                "((const_item name: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Constant,
                &["static_item"],
                "@name",
                "((static_item name: (identifier) @name) @node %s)",
                5,
            );
            add(
                NodeKind::Class,
                &["struct_item"],
                "@name",
                "((struct_item name: (type_identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Interface,
                &["trait_item"],
                "@name",
                "((trait_item name: (type_identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Enum,
                &["enum_item"],
                "@name",
                "((enum_item name: (type_identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Type,
                &["type_item"],
                "@name",
                "((type_item name: (type_identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Import,
                &["use_declaration"],
                "@name",
                "((use_declaration argument: (_) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Field,
                &["field_declaration"],
                "@name",
                "((field_declaration name: (field_identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Call,
                &["call_expression"],
                "@name",
                "((call_expression function: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Call,
                &["call_expression"],
                "@name",
                "((call_expression function: (field_expression field: (field_identifier) @name)) @node %s)",
                5,
            );
            add(
                NodeKind::Assignment,
                &["assignment_expression"],
                "",
                "((assignment_expression) @node %s)",
                10,
            );
            add(
                NodeKind::Condition,
                &["if_expression"],
                "",
                "((if_expression) @node %s)",
                10,
            );
            add(
                NodeKind::Condition,
                &["match_expression"],
                "",
                "((match_expression) @node %s)",
                5,
            );
            add(NodeKind::Loop, &["for_expression"], "", "((for_expression) @node %s)", 10);
            add(NodeKind::Loop, &["while_expression"], "", "((while_expression) @node %s)", 5);
            add(NodeKind::Loop, &["loop_expression"], "", "((loop_expression) @node %s)", 3);
            add(NodeKind::Block, &["block"], "", "((block) @node %s)", 10);
            add(NodeKind::Comment, &["line_comment"], "", "((line_comment) @node %s)", 10);
            add(NodeKind::Comment, &["block_comment"], "", "((block_comment) @node %s)", 5);
            add(
                NodeKind::Decorator,
                &["attribute_item"],
                "",
                "((attribute_item) @node %s)",
                10,
            );
            add(
                NodeKind::Parameter,
                &["parameter"],
                "@name",
                "((parameter pattern: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Return,
                &["return_expression"],
                "",
                "((return_expression) @node %s)",
                10,
            );
            // Throw and try_catch: no Rust counterpart (errors are values).

            table
        })
    }
}

impl Default for RustProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageProvider for RustProvider {
    fn language_name(&self) -> &str {
        "rust"
    }

    fn aliases(&self) -> &[&str] {
        &["rs"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["rs"]
    }

    fn has_grammar(&self) -> bool {
        true
    }

    fn node_mappings(&self, kind: NodeKind) -> &[NodeMapping] {
        Self::mappings().get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn translate_query(&self, query: &Query) -> Result<Vec<String>, CodemodError> {
        translate_query(Self::mappings(), query)
    }

    fn select_anchors(&self, source: &str, query: &Query) -> Result<Vec<Anchor>, CodemodError> {
        self.support.select(Self::mappings(), source, query)
    }

    fn validate_snippet(&self, snippet: &str) -> Result<(), CodemodError> {
        if snippet.trim().is_empty() {
            return Ok(());
        }
        if self.support.has_errors(snippet) {
            return Err(CodemodError::SyntaxError(
                "replacement is not valid Rust".to_string(),
            ));
        }
        Ok(())
    }

    /// Sorts each contiguous run of top-level `use` lines.
    fn organize_imports(&self, source: &str) -> Result<String, CodemodError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut run: Vec<&str> = Vec::new();

        for line in &lines {
            if line.starts_with("use ") {
                run.push(line);
            } else {
                flush_use_run(&mut run, &mut out);
                out.push(line.to_string());
            }
        }
        flush_use_run(&mut run, &mut out);

        let mut organized = out.join("\n");
        if source.ends_with('\n') {
            organized.push('\n');
        }
        Ok(organized)
    }

    fn format_source(&self, source: &str) -> Result<String, CodemodError> {
        Ok(normalize_whitespace(source))
    }

    fn quick_check(&self, source: &str) -> Vec<Diagnostic> {
        syntax_findings(&self.support, source)
            .into_iter()
            .map(|(start, end, message)| {
                Diagnostic::error(message, "quick_check")
                    .with_location(Location::from_byte_range(source, start, end))
            })
            .collect()
    }

    fn append_point(&self, anchor: &Anchor, _source: &str) -> Result<usize, CodemodError> {
        anchor.body_append_offset().ok_or_else(|| {
            CodemodError::TransformFailed(format!(
                "{} '{}' has no body to append into",
                anchor.kind(),
                anchor.name()
            ))
        })
    }
}

fn flush_use_run(run: &mut Vec<&str>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let mut sorted: Vec<&str> = run.drain(..).collect();
    sorted.sort_unstable();
    out.extend(sorted.iter().map(|l| l.to_string()));
}
