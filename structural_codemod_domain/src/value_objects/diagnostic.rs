// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Diagnostics attached to pipeline results and file-processor batches.
//!
//! Severity drives status downgrades: an `Error` quick-check diagnostic
//! downgrades a transform to partial; `Warning` and `Info` attach without
//! affecting status.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::location::Location;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    /// Producing subsystem: "pipeline", "quick_check", "file_processor", ...
    source: String,
    location: Option<Location>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            source: source.into(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, source)
    }

    pub fn warning(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message, source)
    }

    pub fn info(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(Severity::Info, message, source)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "[{}] {} at {}: {}", self.severity, self.source, loc, self.message),
            None => write!(f, "[{}] {}: {}", self.severity, self.source, self.message),
        }
    }
}
