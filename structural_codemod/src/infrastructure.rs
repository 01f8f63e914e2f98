// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete technology behind the domain's ports: tree-sitter language
//! providers, the matcher cache, the transformation pipeline, SQLite
//! persistence, configuration, observability, and metrics.

pub mod config;
pub mod logging;
pub mod matchers;
pub mod metrics;
pub mod pipeline;
pub mod providers;
pub mod repositories;
pub mod services;
