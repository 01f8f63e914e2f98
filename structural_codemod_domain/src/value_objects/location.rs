// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Source location of a matched node: byte range plus 1-based line and
//! column coordinates derived from the source text.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Byte range and human-readable position of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    start_byte: usize,
    end_byte: usize,
    start_line: usize,
    start_column: usize,
    end_line: usize,
    end_column: usize,
}

impl Location {
    pub fn new(
        start_byte: usize,
        end_byte: usize,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start_byte,
            end_byte,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Derives line/column coordinates (1-based) for a byte range over
    /// `source`.
    ///
    /// Offsets past the end of `source` clamp to the final position.
    pub fn from_byte_range(source: &str, start_byte: usize, end_byte: usize) -> Self {
        let (start_line, start_column) = line_col_at(source, start_byte);
        let (end_line, end_column) = line_col_at(source, end_byte);
        Self {
            start_byte,
            end_byte,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn start_byte(&self) -> usize {
        self.start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.end_byte
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn start_column(&self) -> usize {
        self.start_column
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn end_column(&self) -> usize {
        self.end_column
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

fn line_col_at(source: &str, byte_offset: usize) -> (usize, usize) {
    let clamped = byte_offset.min(source.len());
    let prefix = &source.as_bytes()[..clamped];
    let line = prefix.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = prefix
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    (line, clamped - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_coordinates() {
        let loc = Location::from_byte_range("hello world", 6, 11);
        assert_eq!(loc.start_line(), 1);
        assert_eq!(loc.start_column(), 7);
        assert_eq!(loc.end_column(), 12);
    }

    #[test]
    fn test_multiline_coordinates() {
        let source = "package main\nfunc main() {\n}\n";
        let offset = source.find("func").unwrap();
        let loc = Location::from_byte_range(source, offset, offset + 4);
        assert_eq!(loc.start_line(), 2);
        assert_eq!(loc.start_column(), 1);
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let loc = Location::from_byte_range("ab", 5, 9);
        assert_eq!(loc.start_line(), 1);
        assert_eq!(loc.start_column(), 3);
    }
}
