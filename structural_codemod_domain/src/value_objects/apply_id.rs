// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Type-safe identifier for apply audit records.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::CodemodError;

/// Apply-record identifier.
///
/// Apply records outlive the stages they reference (applied stages are
/// deleted), so the audit trail needs identity of its own.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ApplyId(GenericId<ApplyMarker>);

/// Marker type for Apply records
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ApplyMarker;

impl IdCategory for ApplyMarker {
    fn category_name() -> &'static str {
        "apply"
    }
}

impl ApplyId {
    pub fn new() -> Self {
        Self(GenericId::new())
    }

    pub fn from_string(s: &str) -> Result<Self, CodemodError> {
        Ok(Self(GenericId::from_string(s)?))
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, CodemodError> {
        Ok(Self(GenericId::from_ulid(ulid)?))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0.as_ulid()
    }
}

impl Default for ApplyId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ApplyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
