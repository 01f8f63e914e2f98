// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Identifier
//!
//! Type-safe identifier for staged transformations. ULID-backed, so stage
//! ids sort chronologically - which is exactly the order `apply latest`
//! wants.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::CodemodError;

/// Stage entity identifier.
///
/// A strongly-typed wrapper so stage ids cannot be confused with session or
/// apply ids in function signatures or the staging store.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct StageId(GenericId<StageMarker>);

/// Marker type for Stage entities
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct StageMarker;

impl IdCategory for StageMarker {
    fn category_name() -> &'static str {
        "stage"
    }
}

impl StageId {
    /// Creates a new stage id with the current timestamp.
    pub fn new() -> Self {
        Self(GenericId::new())
    }

    /// Parses a stage id from its ULID string representation.
    pub fn from_string(s: &str) -> Result<Self, CodemodError> {
        Ok(Self(GenericId::from_string(s)?))
    }

    /// Creates a stage id from an existing ULID.
    pub fn from_ulid(ulid: Ulid) -> Result<Self, CodemodError> {
        Ok(Self(GenericId::from_ulid(ulid)?))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0.as_ulid()
    }

    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        self.0.datetime()
    }
}

impl Default for StageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
