// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Python Language Provider
//!
//! Maps the universal node vocabulary onto the tree-sitter Python
//! grammar. Python bodies are indentation-delimited, so append-to-body
//! offsets land at the end of the body rather than before a closing
//! brace.

use std::collections::HashMap;
use std::sync::OnceLock;

use structural_codemod_domain::services::LanguageProvider;
use structural_codemod_domain::value_objects::{Anchor, Diagnostic, Location, NodeKind, NodeMapping, Query};
use structural_codemod_domain::CodemodError;

use super::grammar_support::{
    normalize_whitespace, syntax_findings, translate_query, GrammarSupport, ScopeTable,
};

const SCOPE_TABLE: ScopeTable = ScopeTable {
    class_nodes: &["class_definition"],
    function_nodes: &["function_definition", "lambda"],
    block_nodes: &[],
    namespace_nodes: &[],
};

/// Python provider over tree-sitter-python.
pub struct PythonProvider {
    support: GrammarSupport,
}

impl PythonProvider {
    pub fn new() -> Self {
        Self {
            support: GrammarSupport::new(tree_sitter_python::LANGUAGE.into(), SCOPE_TABLE, false),
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
                &["function_definition"],
                "@name",
                "((function_definition name: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Method,
                &["function_definition"],
                "@name",
                "((class_definition body: (block (function_definition name: (identifier) @name) @node)) %s)",
                10,
            );
            add(
                NodeKind::Class,
                &["class_definition"],
                "@name",
                "((class_definition name: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Variable,
                &["assignment"],
                "@name",
                "((assignment left: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Import,
                &["import_statement"],
                "@name",
                "((import_statement name: (dotted_name) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Import,
                &["import_from_statement"],
                "@name",
                "((import_from_statement module_name: (dotted_name) @name) @node %s)",
                5,
            );
            add(
                NodeKind::Call,
                &["call"],
                "@name",
                "((call function: (identifier) @name) @node %s)",
                10,
            );
            add(
                NodeKind::Call,
                &["call"],
                "@name",
                "((call function: (attribute attribute: (identifier) @name)) @node %s)",
                5,
            );
            add(
                NodeKind::Assignment,
                &["assignment"],
                "",
                "((assignment) @node %s)",
                10,
            );
            add(
                NodeKind::Condition,
                &["if_statement"],
                "",
                "((if_statement) @node %s)",
                10,
            );
            add(NodeKind::Loop, &["for_statement"], "", "((for_statement) @node %s)", 10);
            add(NodeKind::Loop, &["while_statement"], "", "((while_statement) @node %s)", 5);
            add(NodeKind::Block, &["block"], "", "((block) @node %s)", 10);
            add(NodeKind::Comment, &["comment"], "", "((comment) @node %s)", 10);
            add(NodeKind::Decorator, &["decorator"], "", "((decorator) @node %s)", 10);
            add(
                NodeKind::Parameter,
                &["identifier"],
                "@node",
                "((parameters (identifier) @node) %s)",
                10,
            );
            add(
                NodeKind::Return,
                &["return_statement"],
                "",
                "((return_statement) @node %s)",
                10,
            );
            add(
                NodeKind::Throw,
                &["raise_statement"],
                "",
                "((raise_statement) @node %s)",
                10,
            );
            add(
                NodeKind::TryCatch,
                &["try_statement"],
                "",
                "((try_statement) @node %s)",
                10,
            );
            // Constant, interface, enum, type, field: no direct Python
            // counterpart at the grammar level.

            table
        })
    }
}

impl Default for PythonProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageProvider for PythonProvider {
    fn language_name(&self) -> &str {
        "python"
    }

    fn aliases(&self) -> &[&str] {
        &["py", "python3"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
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
                "replacement is not valid Python".to_string(),
            ));
        }
        Ok(())
    }

    /// Sorts each contiguous run of top-level import lines.
    fn organize_imports(&self, source: &str) -> Result<String, CodemodError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut run: Vec<&str> = Vec::new();

        for line in &lines {
            if line.starts_with("import ") || line.starts_with("from ") {
                run.push(line);
            } else {
                flush_import_run(&mut run, &mut out);
                out.push(line.to_string());
            }
        }
        flush_import_run(&mut run, &mut out);

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

fn flush_import_run(run: &mut Vec<&str>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let mut sorted: Vec<&str> = run.drain(..).collect();
    sorted.sort_unstable();
    out.extend(sorted.iter().map(|l| l.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use structural_codemod_domain::services::QueryParser;

    const SAMPLE: &str = "import os\nimport json\n\nclass Greeter:\n    def greet(self, name):\n        return f\"hi {name}\"\n\ndef main():\n    g = Greeter()\n    print(g.greet(\"world\"))\n";

    fn query(input: &str) -> Query {
        QueryParser::new().parse(input).unwrap()
    }

    #[test]
    fn test_def_alias_selects_functions() {
        let provider = PythonProvider::new();
        let anchors = provider.select_anchors(SAMPLE, &query("def:*")).unwrap();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].name(), "greet");
        assert_eq!(anchors[1].name(), "main");
    }

    #[test]
    fn test_method_scoped_to_class() {
        let provider = PythonProvider::new();
        let anchors = provider.select_anchors(SAMPLE, &query("method:*")).unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name(), "greet");
    }

    #[test]
    fn test_hierarchy_class_to_method() {
        let provider = PythonProvider::new();
        let anchors = provider
            .select_anchors(SAMPLE, &query("class:Greeter > def:greet"))
            .unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name(), "greet");
    }

    #[test]
    fn test_try_alias_selects_try_statement() {
        let provider = PythonProvider::new();
        let source = "try:\n    risky()\nexcept ValueError:\n    pass\n";
        let anchors = provider.select_anchors(source, &query("try:*")).unwrap();
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn test_organize_imports_idempotent() {
        let provider = PythonProvider::new();
        let organized = provider.organize_imports(SAMPLE).unwrap();
        let json_pos = organized.find("import json").unwrap();
        let os_pos = organized.find("import os").unwrap();
        assert!(json_pos < os_pos);
        assert_eq!(provider.organize_imports(&organized).unwrap(), organized);
    }
}
