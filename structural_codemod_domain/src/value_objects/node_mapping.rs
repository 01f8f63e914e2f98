// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Node Mapping
//!
//! A provider's declaration of how one universal [`NodeKind`] maps onto
//! its grammar. The pipeline never sees grammar node type names directly;
//! it asks the provider for mappings and the provider renders grammar
//! queries from the templates declared here.
//!
//! The query template carries a single `%s` placeholder where name
//! constraints (`#match?` predicates built from the query's glob pattern)
//! are substituted. A `*` pattern substitutes the empty string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::node_kind::NodeKind;

/// Declaration of one universal-kind-to-grammar mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMapping {
    kind: NodeKind,
    /// Grammar-specific node type names this mapping covers.
    node_types: Vec<String>,
    /// Capture token that binds the node's name, e.g. `@name`.
    name_capture: String,
    /// Optional capture token that binds the node's type annotation.
    type_capture: Option<String>,
    /// Grammar query template with a single `%s` constraint placeholder.
    query_template: String,
    /// Extra attributes a query may constrain on.
    attributes: BTreeMap<String, String>,
    /// Higher priority wins when multiple mappings match the same node.
    priority: u32,
}

impl NodeMapping {
    pub fn new(
        kind: NodeKind,
        node_types: Vec<String>,
        name_capture: impl Into<String>,
        query_template: impl Into<String>,
        priority: u32,
    ) -> Self {
        Self {
            kind,
            node_types,
            name_capture: name_capture.into(),
            type_capture: None,
            query_template: query_template.into(),
            attributes: BTreeMap::new(),
            priority,
        }
    }

    pub fn with_type_capture(mut self, capture: impl Into<String>) -> Self {
        self.type_capture = Some(capture.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn node_types(&self) -> &[String] {
        &self.node_types
    }

    pub fn name_capture(&self) -> &str {
        &self.name_capture
    }

    pub fn type_capture(&self) -> Option<&str> {
        self.type_capture.as_deref()
    }

    pub fn query_template(&self) -> &str {
        &self.query_template
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Renders the grammar query by substituting `constraint` into the
    /// template's `%s` placeholder.
    pub fn render_query(&self, constraint: &str) -> String {
        self.query_template.replacen("%s", constraint, 1)
    }
}
