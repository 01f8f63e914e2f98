// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Anchor
//!
//! An AST node selected by a query: the reference point every edit is
//! planned against. Anchors are produced by language providers in tree
//! order and identified by their byte range over the original source;
//! the grammar node itself never crosses the provider boundary.

use serde::{Deserialize, Serialize};

use super::node_kind::NodeKind;
use super::scope_type::ScopeType;

/// A selected AST node, detached from its grammar tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    kind: NodeKind,
    name: String,
    start_byte: usize,
    end_byte: usize,
    scope: ScopeType,
    /// Byte offset just inside the closing delimiter of the node's body,
    /// when the node has one. Used by append-to-body planning.
    body_append_offset: Option<usize>,
}

impl Anchor {
    pub fn new(
        kind: NodeKind,
        name: impl Into<String>,
        start_byte: usize,
        end_byte: usize,
        scope: ScopeType,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            start_byte,
            end_byte,
            scope,
            body_append_offset: None,
        }
    }

    pub fn with_body_append_offset(mut self, offset: usize) -> Self {
        self.body_append_offset = Some(offset);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_byte(&self) -> usize {
        self.start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.end_byte
    }

    pub fn scope(&self) -> ScopeType {
        self.scope
    }

    pub fn body_append_offset(&self) -> Option<usize> {
        self.body_append_offset
    }

    /// Matched source text.
    pub fn snippet<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start_byte..self.end_byte).unwrap_or("")
    }
}
