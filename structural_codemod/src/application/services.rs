// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services: batch file processing and staging coordination.

pub mod file_processor;
pub mod staging_service;

pub use file_processor::{
    BatchOptions, FileMatches, FileProcessor, FileQueryReport, FileScope, FileTransformOutcome,
    FileTransformReport,
};
pub use staging_service::{ApplyOutcome, ApplyTarget, StagingService};
