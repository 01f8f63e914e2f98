// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value Objects
//!
//! Immutable, identity-free domain concepts. Each value object validates
//! its own business rules at construction; two instances with the same
//! attributes are equal.
//!
//! The universal contracts live here: node kinds, scopes, operations,
//! queries, edits, and the records the pipeline produces.

pub mod anchor;
pub mod apply_id;
pub mod confidence;
pub mod content_hash;
pub mod diagnostic;
pub mod edit;
pub mod fuzzy_match;
pub mod generic_id;
pub mod location;
pub mod match_result;
pub mod node_kind;
pub mod node_mapping;
pub mod operation;
pub mod pipeline_outcome;
pub mod query;
pub mod scope_type;
pub mod session_id;
pub mod stage_id;
pub mod transform_options;
pub mod transform_stats;

pub use anchor::Anchor;
pub use apply_id::ApplyId;
pub use confidence::ConfidenceLevel;
pub use content_hash::ContentHash;
pub use diagnostic::{Diagnostic, Severity};
pub use edit::{apply_edits, count_conflicts, Edit};
pub use fuzzy_match::FuzzyMatch;
pub use generic_id::{GenericId, IdCategory};
pub use location::Location;
pub use match_result::MatchResult;
pub use node_kind::NodeKind;
pub use node_mapping::NodeMapping;
pub use operation::Operation;
pub use pipeline_outcome::{EngineMetadata, PipelineOutcome, Status};
pub use query::{Query, QueryKind, QueryOperator};
pub use scope_type::ScopeType;
pub use session_id::SessionId;
pub use stage_id::StageId;
pub use transform_options::{TransformOptions, DEFAULT_MAX_FUZZ_DISTANCE};
pub use transform_stats::TransformStats;
