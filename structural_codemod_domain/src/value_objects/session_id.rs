// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Type-safe identifier for staging sessions.
//!
//! Sessions scope pending-stage listings: every stage belongs to exactly
//! one session, and hosts list their own pending work by session id.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::CodemodError;

/// Session identifier grouping stages by originator.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SessionId(GenericId<SessionMarker>);

/// Marker type for Session entities
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SessionMarker;

impl IdCategory for SessionMarker {
    fn category_name() -> &'static str {
        "session"
    }
}

impl SessionId {
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

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
