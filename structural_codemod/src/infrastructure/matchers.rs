// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Compiled-matcher caching.

pub mod matcher_cache;

pub use matcher_cache::{CompiledMatcher, MatcherCache, MatcherConfig};
