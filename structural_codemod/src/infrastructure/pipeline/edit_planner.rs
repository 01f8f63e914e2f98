// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Edit Planner
//!
//! Phase 4 of the pipeline: turns anchors into edits. One edit per
//! anchor, priority equal to the anchor's discovery order.
//!
//! | Operation | Range | Text |
//! |---|---|---|
//! | insert_before | `[start,start)` | replacement |
//! | insert_after | `[end,end)` | replacement |
//! | replace | `[start,end)` | replacement |
//! | delete | `[start,end)` | empty |
//! | append_to_body | `[p,p)` at the provider's append point | replacement |
//!
//! Block-level anchors get blank-line wrapping and re-indentation for
//! inserts; a dedupe guard suppresses inserts whose text already sits
//! adjacent to the insertion point in the original bytes.

use structural_codemod_domain::services::LanguageProvider;
use structural_codemod_domain::value_objects::{Anchor, Edit, Operation};
use structural_codemod_domain::CodemodError;

/// Plans one edit per anchor for `operation`.
pub fn plan_edits(
    source: &str,
    anchors: &[Anchor],
    operation: Operation,
    replacement: &str,
    provider: &dyn LanguageProvider,
) -> Result<Vec<Edit>, CodemodError> {
    let mut edits = Vec::with_capacity(anchors.len());

    for (priority, anchor) in anchors.iter().enumerate() {
        // Empty insertion content is a permitted no-op (append's contract);
        // empty replacement text still means replace-with-nothing.
        if operation.is_insertion() && replacement.is_empty() {
            continue;
        }
        let edit = match operation {
            Operation::Replace => Edit::new(
                anchor.start_byte(),
                anchor.end_byte(),
                replacement,
                operation,
                priority,
            )?,
            Operation::Delete => {
                Edit::new(anchor.start_byte(), anchor.end_byte(), "", operation, priority)?
            }
            Operation::InsertBefore => {
                let position = anchor.start_byte();
                let text = if anchor.kind().is_block_level() {
                    let indent = line_indent_at(source, position);
                    format!("{}\n\n", reindent(replacement, &indent))
                } else {
                    replacement.to_string()
                };
                if insert_is_duplicate(source, position, replacement) {
                    continue;
                }
                Edit::insertion(position, text, operation, priority)
            }
            Operation::InsertAfter => {
                let position = anchor.end_byte();
                let text = if anchor.kind().is_block_level() {
                    let indent = line_indent_at(source, position);
                    format!("\n\n{}", reindent(replacement, &indent))
                } else {
                    replacement.to_string()
                };
                if insert_is_duplicate(source, position, replacement) {
                    continue;
                }
                Edit::insertion(position, text, operation, priority)
            }
            Operation::AppendToBody => {
                let position = provider.append_point(anchor, source)?;
                if position > source.len() {
                    return Err(CodemodError::TransformFailed(format!(
                        "append point {} exceeds source length {}",
                        position,
                        source.len()
                    )));
                }
                if insert_is_duplicate(source, position, replacement) {
                    continue;
                }
                let indent = body_indent(source, anchor);
                let body_line = reindent(replacement, &indent);
                // Keep a brace that follows the append point on its own
                // line; indentation-delimited bodies take a leading break
                // instead.
                let text = if source[..position].ends_with('\n') {
                    format!("{}\n", body_line)
                } else {
                    format!("\n{}", body_line)
                };
                Edit::insertion(position, text, operation, priority)
            }
        };
        edits.push(edit);
    }

    Ok(edits)
}

/// Indentation (leading spaces/tabs) of the line containing `position`.
fn line_indent_at(source: &str, position: usize) -> String {
    let clamped = position.min(source.len());
    let line_start = source[..clamped].rfind('\n').map(|p| p + 1).unwrap_or(0);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// Indentation for content appended inside an anchor's body: the first
/// body line's indentation when the body has one, otherwise one tab past
/// the anchor's own line.
fn body_indent(source: &str, anchor: &Anchor) -> String {
    let snippet = anchor.snippet(source);
    for line in snippet.lines().skip(1) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed != "}" {
            return line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        }
    }
    let own = line_indent_at(source, anchor.start_byte());
    format!("{}\t", own)
}

/// Prefixes every non-empty line of `text` with `indent`.
fn reindent(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when the insert's bytes already occur adjacent to the insertion
/// point, ignoring surrounding whitespace.
fn insert_is_duplicate(source: &str, position: usize, replacement: &str) -> bool {
    let needle = replacement.trim();
    if needle.is_empty() {
        return false;
    }
    let before = source[..position.min(source.len())].trim_end();
    let after = source[position.min(source.len())..].trim_start();
    before.ends_with(needle) || after.starts_with(needle)
}
