// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A single query match returned by the read path.

use serde::{Deserialize, Serialize};

use super::location::Location;
use super::node_kind::NodeKind;
use super::scope_type::ScopeType;

/// One matched anchor, decorated for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    kind: NodeKind,
    name: String,
    location: Location,
    /// Matched source text, truncated by the presenter when long.
    snippet: String,
    scope: ScopeType,
}

impl MatchResult {
    pub fn new(
        kind: NodeKind,
        name: impl Into<String>,
        location: Location,
        snippet: impl Into<String>,
        scope: ScopeType,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            location,
            snippet: snippet.into(),
            scope,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn scope(&self) -> ScopeType {
        self.scope
    }
}
