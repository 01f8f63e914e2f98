// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Go Language Provider
//!
//! Maps the universal node vocabulary onto the tree-sitter Go grammar.
//! Kinds Go cannot express (enum, decorator, try_catch, throw) declare
//! empty mapping lists and therefore match nothing, per the totality
//! contract.

use std::collections::HashMap;
use std::sync::OnceLock;

use structural_codemod_domain::services::LanguageProvider;
use structural_codemod_domain::value_objects::{Anchor, Diagnostic, Location, NodeKind, NodeMapping, Query};
use structural_codemod_domain::CodemodError;

use super::grammar_support::{
    normalize_whitespace, syntax_findings, translate_query, GrammarSupport, ScopeTable,
};

const SCOPE_TABLE: ScopeTable = ScopeTable {
    class_nodes: &[],
    function_nodes: &["function_declaration", "method_declaration", "func_literal"],
    block_nodes: &["block"],
    namespace_nodes: &[],
};

/// Go provider over tree-sitter-go.
pub struct GoProvider {
    support: GrammarSupport,
}

impl GoProvider {
    pub fn new() -> Self {
        Self {
            support: GrammarSupport::new(tree_sitter_go::LANGUAGE.into(), SCOPE_TABLE, true),
        }
    }

    fn mappings() -> &'static HashMap<NodeKind, Vec<NodeMapping>> {
        static MAPPINGS: OnceLock<HashMap<NodeKind, Vec<NodeMapping>>> = OnceLock::new();
        MAPPINGS.get_or_init(|| {
            let mut table: HashMap<NodeKind, Vec<NodeMapping>> = HashMap::new();
            // Every kind gets an entry so the provider is visibly total.
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
                &["function_declaration"],
                "@name",
                "((function_declaration name: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Method,
                &["method_declaration"],
                "@name",
                "((method_declaration name: (field_identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Variable,
                &["var_declaration"],
                "@name",
                "((var_declaration (var_spec name: (identifier) @name)) @node %s)",
                10,
            );
            add(
                NodeKind::Variable,
                &["short_var_declaration"],
                "@name",
                "((short_var_declaration left: (expression_list (identifier) @name)) @node %s)",
                5,
            );
            add(
                NodeKind::Constant,
                &["const_declaration"],
                "@name",
                "((const_declaration (const_spec name: (identifier) @name)) @node %s)",
                10,
            );
            add(
                NodeKind::Class,
                &["type_declaration"],
                "@name",
                "((type_declaration (type_spec name: (type_identifier) @name type: (struct_type))) @node %s)",
                10,
            );
            add(
                NodeKind::Interface,
                &["type_declaration"],
                "@name",
                "((type_declaration (type_spec name: (type_identifier) @name type: (interface_type))) @node %s)",
                10,
            );
            add(
                NodeKind::Type,
                &["type_declaration"],
                "@name",
                "((type_declaration (type_spec name: (type_identifier) @name)) @node %s)",
                5,
            );
            add(
                NodeKind::Import,
                &["import_spec"],
                "@name",
                "((import_spec path: (interpreted_string_literal) @name) @node %s)",
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
                "((call_expression function: (selector_expression field: (field_identifier) @name)) @node %s)",
                5,
            );
            add(
                NodeKind::Assignment,
                &["assignment_statement"],
                "",
                "((assignment_statement) @node %s)",
                10,
            );
            add(
                NodeKind::Condition,
                &["if_statement"],
                "",
                "((if_statement) @node %s)",
                10,
            );
            add(
                NodeKind::Condition,
                &["expression_switch_statement"],
                "",
                "((expression_switch_statement) @node %s)",
                5,
            );
            add(NodeKind::Loop, &["for_statement"], "", "((for_statement) @node %s)", 10);
            add(NodeKind::Block, &["block"], "", "((block) @node %s)", 10);
            add(NodeKind::Comment, &["comment"], "", "((comment) @node %s)", 10);
            add(
                NodeKind::Parameter,
                &["parameter_declaration"],
                "@name",
                "((parameter_declaration name: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Return,
                &["return_statement"],
                "",
                "((return_statement) @node %s)",
                10,
            );
            // Enum, decorator, throw, try_catch: no Go counterpart.

            table
        })
    }
}

impl Default for GoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageProvider for GoProvider {
    fn language_name(&self) -> &str {
        "go"
    }

    fn aliases(&self) -> &[&str] {
        &["golang"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["go"]
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
                "replacement is not valid Go".to_string(),
            ));
        }
        Ok(())
    }

    /// Sorts the specs inside a grouped `import ( ... )` block. Single
    /// imports and files without an import block pass through unchanged.
    fn organize_imports(&self, source: &str) -> Result<String, CodemodError> {
        let lines: Vec<&str> = source.lines().collect();
        let Some(open) = lines.iter().position(|l| l.trim_start().starts_with("import (")) else {
            return Ok(source.to_string());
        };
        let Some(close_rel) = lines[open + 1..].iter().position(|l| l.trim() == ")") else {
            return Ok(source.to_string());
        };
        let close = open + 1 + close_rel;

        let mut specs: Vec<&str> = lines[open + 1..close]
            .iter()
            .copied()
            .filter(|l| !l.trim().is_empty())
            .collect();
        specs.sort_by_key(|l| l.trim().to_string());

        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        out.extend(lines[..=open].iter().map(|l| l.to_string()));
        out.extend(specs.iter().map(|l| l.to_string()));
        out.extend(lines[close..].iter().map(|l| l.to_string()));
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

#[cfg(test)]
mod tests {
    use super::*;
    use structural_codemod_domain::services::QueryParser;

    const SAMPLE: &str = "package main\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n\nfunc helper(n int) int {\n\treturn n + 1\n}\n";

    fn query(input: &str) -> Query {
        QueryParser::new().parse(input).unwrap()
    }

    #[test]
    fn test_select_function_by_name() {
        let provider = GoProvider::new();
        let anchors = provider.select_anchors(SAMPLE, &query("function:main")).unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name(), "main");
        assert!(anchors[0].snippet(SAMPLE).starts_with("func main()"));
    }

    #[test]
    fn test_select_function_wildcard() {
        let provider = GoProvider::new();
        let anchors = provider.select_anchors(SAMPLE, &query("func:*")).unwrap();
        assert_eq!(anchors.len(), 2);
        // Tree order.
        assert_eq!(anchors[0].name(), "main");
        assert_eq!(anchors[1].name(), "helper");
    }

    #[test]
    fn test_unsupported_kind_matches_nothing() {
        let provider = GoProvider::new();
        let anchors = provider.select_anchors(SAMPLE, &query("enum:*")).unwrap();
        assert!(anchors.is_empty());
        assert!(provider.node_mappings(NodeKind::Enum).is_empty());
    }

    #[test]
    fn test_empty_source_zero_matches() {
        let provider = GoProvider::new();
        let anchors = provider.select_anchors("", &query("function:*")).unwrap();
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_body_append_offset_before_closing_brace() {
        let provider = GoProvider::new();
        let anchors = provider.select_anchors(SAMPLE, &query("function:helper")).unwrap();
        let point = provider.append_point(&anchors[0], SAMPLE).unwrap();
        assert_eq!(&SAMPLE[point..point + 1], "}");
    }

    #[test]
    fn test_organize_imports_sorts_block() {
        let provider = GoProvider::new();
        let organized = provider.organize_imports(SAMPLE).unwrap();
        let fmt_pos = organized.find("\"fmt\"").unwrap();
        let os_pos = organized.find("\"os\"").unwrap();
        assert!(fmt_pos < os_pos);
        // Idempotent.
        assert_eq!(provider.organize_imports(&organized).unwrap(), organized);
    }

    #[test]
    fn test_validate_snippet() {
        let provider = GoProvider::new();
        assert!(provider.validate_snippet("func ok() {}\n").is_ok());
        assert!(provider.validate_snippet("func broken( {").is_err());
    }

    #[test]
    fn test_quick_check_reports_errors() {
        let provider = GoProvider::new();
        assert!(provider.quick_check(SAMPLE).is_empty());
        assert!(!provider.quick_check("func broken( {").is_empty());
    }
}
