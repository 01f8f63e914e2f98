// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Codemod Domain
//!
//! The domain layer of the structural codemod engine: the universal
//! contracts shared by every language, the query DSL, the fuzzy anchor
//! resolver, and the staging lifecycle - pure business logic with no I/O,
//! no runtime, and no grammar bindings.
//!
//! ## Module Structure
//!
//! - `value_objects` - immutable universal contracts: node kinds, scopes,
//!   operations, queries, edits, anchors, results, typed ids
//! - `entities` - identity-bearing records: stages, sessions, apply audit
//!   records, transform requests
//! - `services` - stateless domain logic: DSL parser, fuzzy resolver,
//!   language-provider contract
//! - `repositories` - persistence ports implemented by infrastructure
//! - `events` - stage lifecycle domain events
//! - `error` - the `CodemodError` enum every layer returns
//!
//! ## Layering Rules
//!
//! This crate depends on nothing above it. Grammar parsing (tree-sitter),
//! persistence (SQLite), and orchestration (tokio) all live in the main
//! crate and reach the domain only through the traits declared here.

pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::CodemodError;
