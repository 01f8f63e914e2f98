// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Session entity grouping stages by originator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::SessionId;

/// A host session owning zero or more stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
        }
    }

    pub fn from_parts(id: SessionId, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
