// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed persistence for the staging store.

pub mod schema;
pub mod sqlite_staging_repository;

pub use sqlite_staging_repository::SqliteStagingRepository;
