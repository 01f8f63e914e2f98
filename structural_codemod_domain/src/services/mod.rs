// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services
//!
//! Stateless business logic that doesn't belong to one entity or value
//! object: the query DSL parser, the fuzzy anchor resolver and its case
//! helpers, and the language-provider capability contract.
//!
//! All services here are synchronous. Async belongs to infrastructure
//! ports (see `repositories`).

pub mod case_convert;
pub mod fuzzy_resolver;
pub mod language_provider;
pub mod query_parser;

pub use fuzzy_resolver::{FuzzyResolver, ScoredVariant};
pub use language_provider::{glob_matches_all, glob_to_regex, LanguageProvider};
pub use query_parser::QueryParser;
