// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! JSON-RPC-style tool surface: method table, error envelope, progress.

pub mod errors;
pub mod methods;
pub mod progress;

pub use errors::RpcError;
pub use methods::{TargetArg, ToolService};
pub use progress::{ProgressNotification, ProgressSink, ProgressStage, ResourceUpdateType};
