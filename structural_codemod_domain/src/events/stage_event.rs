// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Lifecycle Events
//!
//! Domain events emitted as stages move through their lifecycle. Events
//! are immutable records of things that already happened; subscribers
//! (metrics, observability) consume them without coupling to the staging
//! coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::value_objects::{SessionId, StageId};

/// Envelope shared by all domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<T> {
    pub event_id: Ulid,
    pub payload: T,
    pub occurred_at: DateTime<Utc>,
}

impl<T> DomainEvent<T> {
    pub fn new(payload: T) -> Self {
        Self {
            event_id: Ulid::new(),
            payload,
            occurred_at: Utc::now(),
        }
    }
}

/// Stage lifecycle occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StageEvent {
    StageCreated {
        stage_id: StageId,
        session_id: SessionId,
    },
    StageApplied {
        stage_id: StageId,
        auto_applied: bool,
    },
    StageRejected {
        stage_id: StageId,
    },
    StageExpired {
        stage_id: StageId,
    },
}

impl StageEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            StageEvent::StageCreated { .. } => "stage_created",
            StageEvent::StageApplied { .. } => "stage_applied",
            StageEvent::StageRejected { .. } => "stage_rejected",
            StageEvent::StageExpired { .. } => "stage_expired",
        }
    }
}
