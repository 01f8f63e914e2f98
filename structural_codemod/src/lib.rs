// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Structural Codemod
//!
//! Structural code-transformation engine: given source text in a
//! supported language, a structural target, and an operation (query,
//! replace, delete, insert-before, insert-after, append-to-body), it
//! produces matches or a modified source plus a unified diff, content
//! hash, and confidence score. Transformations operate on AST nodes, not
//! text regions, with deterministic conflict detection, optional fuzzy
//! anchor resolution, and a durable staging layer.
//!
//! ## Layers
//!
//! - `engine` - the long-lived composition root every surface holds
//! - `application` - use cases, file processor, staging coordinator
//! - `infrastructure` - tree-sitter providers, matcher cache, pipeline,
//!   SQLite persistence, config, metrics, observability
//! - `presentation` - the JSON-RPC-style tool method table
//!
//! Domain types (queries, edits, anchors, stages) live in
//! `structural_codemod_domain`; process bootstrap (CLI, exit codes,
//! shutdown) lives in `structural_codemod_bootstrap`.

pub mod application;
pub mod engine;
pub mod infrastructure;
pub mod presentation;

pub use engine::CodemodEngine;
