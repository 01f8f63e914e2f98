// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation Layer
//!
//! External surfaces over the application layer: the JSON-RPC-style tool
//! method table consumed by hosts and agents. CLI parsing lives in the
//! bootstrap crate; `main.rs` bridges the two.

pub mod rpc;
