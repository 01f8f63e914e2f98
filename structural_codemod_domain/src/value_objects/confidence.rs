// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Confidence levels derived from fuzzy-resolution scores.
//!
//! Hosts use the level to decide whether a staged transformation may be
//! auto-applied or needs review.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Qualitative banding of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    None,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Bands a score: high >= 0.9, medium >= 0.7, low >= 0.5, else none.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ConfidenceLevel::High
        } else if score >= 0.7 {
            ConfidenceLevel::Medium
        } else if score >= 0.5 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::None => "none",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(ConfidenceLevel::None),
            "low" => Some(ConfidenceLevel::Low),
            "medium" => Some(ConfidenceLevel::Medium),
            "high" => Some(ConfidenceLevel::High),
            _ => None,
        }
    }
}

impl Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banding_boundaries() {
        assert_eq!(ConfidenceLevel::from_score(1.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.89), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.7), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.49), ConfidenceLevel::None);
    }

    #[test]
    fn test_ordering() {
        assert!(ConfidenceLevel::High > ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Low > ConfidenceLevel::None);
    }
}
