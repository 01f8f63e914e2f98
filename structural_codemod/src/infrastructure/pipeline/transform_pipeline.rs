// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transform Pipeline
//!
//! The eight-phase deterministic transformation procedure:
//!
//! 1. **Parse** - build the syntax tree via the provider's grammar
//! 2. **Resolve operation** - only the five mutating operations pass
//! 3. **Select anchors** - run the query; fall back to the fuzzy
//!    resolver when exact matching finds nothing and `fuzz` is on
//! 4. **Plan edits** - one edit per anchor (see `edit_planner`)
//! 5. **Detect overlaps** - any adjacent-pair range intersection fails
//!    the transform before the source is touched
//! 6. **Apply** - splice edits in descending start order
//! 7. **Post-process** - organize imports, format, quick-check
//! 8. **Finalize** - unified diff, SHA-256 hash, stats, metadata
//!
//! Determinism contract: identical (source, query, operation,
//! replacement, options) yield byte-identical output and hash across runs
//! and processes. Phase 1-5 failures return status=error with the
//! original source as output; phase 6-8 failures downgrade to partial
//! with best-effort output.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::entities::TransformRequest;
use structural_codemod_domain::services::{FuzzyResolver, LanguageProvider, QueryParser};
use structural_codemod_domain::value_objects::{
    apply_edits, count_conflicts, Anchor, Diagnostic, EngineMetadata, FuzzyMatch, Location,
    MatchResult, Operation, PipelineOutcome, Query, Severity, Status, TransformOptions,
    TransformStats,
};
use structural_codemod_domain::CodemodError;

use super::edit_planner::plan_edits;
use crate::infrastructure::matchers::matcher_cache::{MatcherCache, MatcherConfig};
use crate::infrastructure::providers::ProviderRegistry;
use crate::infrastructure::services::diff_service::DiffService;

/// Stateless (beyond the shared matcher cache) transformation engine.
///
/// One instance is owned by the engine handle and invoked concurrently
/// from independent callers on disjoint inputs.
pub struct TransformPipeline {
    registry: Arc<ProviderRegistry>,
    matcher_cache: Arc<MatcherCache>,
    diff_service: DiffService,
    query_parser: QueryParser,
}

/// Anchor selection result, with the fuzzy record when the resolver ran.
struct Selection {
    anchors: Vec<Anchor>,
    fuzzy: FuzzyMatch,
}

impl TransformPipeline {
    pub fn new(registry: Arc<ProviderRegistry>, matcher_cache: Arc<MatcherCache>) -> Self {
        Self {
            registry,
            matcher_cache,
            diff_service: DiffService::new(),
            query_parser: QueryParser::new(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolves the provider for an explicit language or a file path.
    pub fn resolve_provider(
        &self,
        language: Option<&str>,
        path: Option<&Path>,
    ) -> Result<Arc<dyn LanguageProvider>, CodemodError> {
        match (language, path) {
            (Some(name), _) => self.registry.resolve_by_name(name),
            (None, Some(path)) => self.registry.resolve_by_path(path),
            (None, None) => Err(CodemodError::InvalidParams(
                "language or path required to resolve a provider".to_string(),
            )),
        }
    }

    /// Read path: phases 1-3 only, returning decorated matches.
    pub fn query_matches(
        &self,
        provider: &dyn LanguageProvider,
        source: &str,
        query_text: &str,
        options: &TransformOptions,
    ) -> Result<Vec<MatchResult>, CodemodError> {
        let query = self.query_parser.parse(query_text)?;
        let selection = self.select_anchors(provider, source, &query, options)?;
        Ok(selection
            .anchors
            .iter()
            .map(|anchor| {
                MatchResult::new(
                    anchor.kind(),
                    anchor.name(),
                    Location::from_byte_range(source, anchor.start_byte(), anchor.end_byte()),
                    anchor.snippet(source),
                    anchor.scope(),
                )
            })
            .collect())
    }

    /// Executes the full eight-phase transformation.
    ///
    /// # Errors
    ///
    /// `Err` is reserved for pre-pipeline failures: invalid request
    /// shape, unknown language, unreadable path, unparsable query.
    /// In-pipeline failures return `Ok` with status error/partial and
    /// diagnostics attached.
    pub fn execute(
        &self,
        request: &TransformRequest,
        token: &CancellationToken,
    ) -> Result<PipelineOutcome, CodemodError> {
        let started = Instant::now();
        request.validate()?;

        let provider = self.resolve_provider(
            Some(request.language()).filter(|l| !l.is_empty()),
            request.file_path().map(Path::new),
        )?;

        let source = match request.source() {
            Some(source) => source.to_string(),
            None => {
                let path = request.file_path().unwrap_or_default();
                std::fs::read_to_string(path).map_err(|e| {
                    CodemodError::FileSystemError(format!("failed to read {}: {}", path, e))
                })?
            }
        };

        let query = self.query_parser.parse(request.query())?;
        let operation = request.operation();
        let options = request.options();

        debug!(
            "pipeline start: provider={} operation={} query={}",
            provider.language_name(),
            operation,
            request.query()
        );

        let mut stats = TransformStats {
            bytes_processed: source.len() as u64,
            lines_processed: source.lines().count() as u64,
            ..TransformStats::default()
        };

        let fail = |status: Status, diagnostics: Vec<Diagnostic>, stats: TransformStats, fuzzy: FuzzyMatch| {
            Ok(self.finalize(
                status,
                request,
                &provider,
                &source,
                source.clone(),
                diagnostics,
                stats,
                fuzzy,
                started,
            ))
        };

        if token.is_cancelled() {
            return fail(
                Status::Error,
                vec![Diagnostic::error("cancelled", "pipeline")],
                stats,
                FuzzyMatch::unused(),
            );
        }

        // Phases 1-3: parse and select anchors. Grammar failures surface
        // here as SyntaxError.
        let selection = match self.select_anchors(provider.as_ref(), &source, &query, options) {
            Ok(selection) => selection,
            Err(e @ CodemodError::SyntaxError(_)) => {
                return fail(
                    Status::Error,
                    vec![Diagnostic::error(e.to_string(), "parse")],
                    stats,
                    FuzzyMatch::unused(),
                );
            }
            Err(e) => return Err(e),
        };
        stats.matches_found = selection.anchors.len() as u64;

        if selection.anchors.is_empty() {
            let message = if options.fuzz {
                format!(
                    "no anchors matched query '{}' (fuzzy resolution exhausted)",
                    request.query()
                )
            } else {
                format!("no anchors matched query '{}'", request.query())
            };
            return fail(
                Status::Error,
                vec![Diagnostic::error(message, "select")],
                stats,
                selection.fuzzy,
            );
        }

        if token.is_cancelled() {
            return fail(
                Status::Error,
                vec![Diagnostic::error("cancelled", "pipeline")],
                stats,
                selection.fuzzy,
            );
        }

        // Replacement snippets must themselves be plausible source.
        if !options.skip_validation && !request.replacement().is_empty() {
            if let Err(e) = provider.validate_snippet(request.replacement()) {
                return fail(
                    Status::Error,
                    vec![Diagnostic::error(e.to_string(), "validate")],
                    stats,
                    selection.fuzzy,
                );
            }
        }

        // Phase 4: plan edits.
        let edits = match plan_edits(
            &source,
            &selection.anchors,
            operation,
            request.replacement(),
            provider.as_ref(),
        ) {
            Ok(edits) => edits,
            Err(e) => {
                return fail(
                    Status::Error,
                    vec![Diagnostic::error(e.to_string(), "plan")],
                    stats,
                    selection.fuzzy,
                );
            }
        };

        // Phase 5: overlap detection.
        let conflicts = count_conflicts(&edits);
        stats.overlaps_detected = conflicts as u64;
        if conflicts > 0 {
            return fail(
                Status::Error,
                vec![Diagnostic::error(
                    format!("{} overlapping edits detected", conflicts),
                    "overlap",
                )],
                stats,
                selection.fuzzy,
            );
        }

        // Phase 6: apply in descending start order.
        let applied = match apply_edits(&source, &edits) {
            Ok(applied) => applied,
            Err(e) => {
                return Ok(self.finalize(
                    Status::Partial,
                    request,
                    &provider,
                    &source,
                    source.clone(),
                    vec![Diagnostic::error(e.to_string(), "apply")],
                    stats,
                    selection.fuzzy,
                    started,
                ));
            }
        };
        stats.edits_applied = edits.len() as u64;

        // Phase 7: post-process. Error-severity quick-check findings
        // downgrade to partial and leave the unformatted result in place.
        let mut diagnostics: Vec<Diagnostic> = provider.quick_check(&applied);
        let has_errors = diagnostics.iter().any(|d| d.severity() == Severity::Error);
        let (status, processed) = if has_errors {
            (Status::Partial, applied)
        } else {
            let mut processed = applied;
            if !options.skip_imports {
                match provider.organize_imports(&processed) {
                    Ok(organized) => processed = organized,
                    Err(e) => diagnostics.push(Diagnostic::warning(e.to_string(), "imports")),
                }
            }
            if !options.skip_format {
                match provider.format_source(&processed) {
                    Ok(formatted) => processed = formatted,
                    Err(e) => diagnostics.push(Diagnostic::warning(e.to_string(), "format")),
                }
            }
            (Status::Success, processed)
        };

        // Phase 8: finalize.
        Ok(self.finalize(
            status,
            request,
            &provider,
            &source,
            processed,
            diagnostics,
            stats,
            selection.fuzzy,
            started,
        ))
    }

    /// Append with no target: the anchor is the file itself and the
    /// append point is end-of-file. Runs phases 6-8 over a single edit.
    pub fn append_eof(
        &self,
        request: &TransformRequest,
        token: &CancellationToken,
    ) -> Result<PipelineOutcome, CodemodError> {
        use structural_codemod_domain::value_objects::Edit;

        let started = Instant::now();
        request.validate()?;
        let provider = self.resolve_provider(
            Some(request.language()).filter(|l| !l.is_empty()),
            request.file_path().map(Path::new),
        )?;
        let source = match request.source() {
            Some(source) => source.to_string(),
            None => {
                let path = request.file_path().unwrap_or_default();
                std::fs::read_to_string(path).map_err(|e| {
                    CodemodError::FileSystemError(format!("failed to read {}: {}", path, e))
                })?
            }
        };

        let mut stats = TransformStats {
            bytes_processed: source.len() as u64,
            lines_processed: source.lines().count() as u64,
            ..TransformStats::default()
        };

        if token.is_cancelled() {
            return Ok(self.finalize(
                Status::Error,
                request,
                &provider,
                &source,
                source.clone(),
                vec![Diagnostic::error("cancelled", "pipeline")],
                stats,
                FuzzyMatch::unused(),
                started,
            ));
        }

        // Empty content is permitted; the transform is then the identity.
        let output = if request.replacement().is_empty() {
            source.clone()
        } else {
            let mut text = String::new();
            if !source.is_empty() && !source.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(request.replacement());
            if !text.ends_with('\n') {
                text.push('\n');
            }
            let edit = Edit::insertion(source.len(), text, Operation::AppendToBody, 0);
            match apply_edits(&source, &[edit]) {
                Ok(applied) => {
                    stats.edits_applied = 1;
                    applied
                }
                Err(e) => {
                    return Ok(self.finalize(
                        Status::Partial,
                        request,
                        &provider,
                        &source,
                        source.clone(),
                        vec![Diagnostic::error(e.to_string(), "apply")],
                        stats,
                        FuzzyMatch::unused(),
                        started,
                    ));
                }
            }
        };

        let diagnostics = provider.quick_check(&output);
        let has_errors = diagnostics.iter().any(|d| d.severity() == Severity::Error);
        let status = if has_errors { Status::Partial } else { Status::Success };

        Ok(self.finalize(
            status,
            request,
            &provider,
            &source,
            output,
            diagnostics,
            stats,
            FuzzyMatch::unused(),
            started,
        ))
    }

    /// Phases 1-3 with the deterministic fuzzy fallback.
    fn select_anchors(
        &self,
        provider: &dyn LanguageProvider,
        source: &str,
        query: &Query,
        options: &TransformOptions,
    ) -> Result<Selection, CodemodError> {
        let exact = provider.select_anchors(source, query)?;
        if !exact.is_empty() || !options.fuzz {
            return Ok(Selection {
                anchors: exact,
                fuzzy: FuzzyMatch::unused(),
            });
        }

        // Exact matching failed; probe pattern variations against the
        // universe of same-kind anchors. Matchers are shared through the
        // process-wide cache.
        let universe = provider.select_anchors(source, &query.with_pattern("*"))?;
        if universe.is_empty() {
            return Ok(Selection {
                anchors: Vec::new(),
                fuzzy: FuzzyMatch::unused(),
            });
        }

        // Variant matching is relaxed to the lowercased name as well, so
        // case-only differences resolve through the identity variant.
        let name_matches = |matcher: &crate::infrastructure::matchers::CompiledMatcher, name: &str| {
            matcher.is_match(name) || matcher.is_match(&name.to_lowercase())
        };

        let resolver = FuzzyResolver::new(options.max_fuzz_distance);
        let resolved = resolver.resolve(query.pattern(), |variant| {
            let matcher = self.matcher_cache.get_or_build(&MatcherConfig::name_glob(
                "fuzzy-anchor",
                variant,
                provider.language_name(),
            ));
            universe.iter().any(|anchor| name_matches(&matcher, anchor.name()))
        });

        let Some(winner) = resolved else {
            return Ok(Selection {
                anchors: Vec::new(),
                fuzzy: FuzzyMatch::unused(),
            });
        };

        let matcher = self.matcher_cache.get_or_build(&MatcherConfig::name_glob(
            "fuzzy-anchor",
            &winner.variant,
            provider.language_name(),
        ));
        let anchors: Vec<Anchor> = universe
            .into_iter()
            .filter(|anchor| name_matches(&matcher, anchor.name()))
            .collect();

        let resolved_query = query.with_pattern(&winner.variant);
        debug!(
            "fuzzy resolution: '{}' -> '{}' (score {:.3}, distance {})",
            query.pattern(),
            winner.variant,
            winner.score,
            winner.distance
        );

        let fuzzy = FuzzyMatch {
            used: true,
            original_query: query.render(),
            resolved_query: resolved_query.render(),
            confidence: winner.confidence(options.max_fuzz_distance),
            score: winner.score,
            distance: winner.distance,
            heuristics: winner.heuristics.clone(),
        };

        Ok(Selection { anchors, fuzzy })
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        status: Status,
        request: &TransformRequest,
        provider: &Arc<dyn LanguageProvider>,
        original: &str,
        output: String,
        diagnostics: Vec<Diagnostic>,
        mut stats: TransformStats,
        fuzzy: FuzzyMatch,
        started: Instant,
    ) -> PipelineOutcome {
        let label = request.file_path().unwrap_or("source");
        let diff = self.diff_service.unified_diff(original, &output, label);
        stats.duration_ms = started.elapsed().as_millis() as u64;

        let metadata = EngineMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            provider: provider.language_name().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        PipelineOutcome::new(
            status,
            request.operation(),
            output,
            diff,
            stats,
            diagnostics,
            metadata,
            fuzzy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structural_codemod_domain::value_objects::Operation;

    fn pipeline() -> TransformPipeline {
        TransformPipeline::new(
            Arc::new(ProviderRegistry::with_builtin_providers()),
            Arc::new(MatcherCache::new()),
        )
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    const GO_SOURCE: &str = "package main\nfunc main() {\n\tprintln(\"hi\")\n}\n";

    /// Scenario: replacing a Go function by name.
    #[test]
    fn test_replace_go_function() {
        let request = TransformRequest::for_source(
            "go",
            GO_SOURCE,
            "function:main",
            Operation::Replace,
            "func newMain() {\n\tprintln(\"hi\")\n}",
        );
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Success);
        assert!(outcome.output().contains("func newMain()"));
        assert_eq!(outcome.stats().matches_found, 1);
        assert!(outcome.diff().is_some());
    }

    /// Hash determinism: identical inputs, identical output bytes and
    /// hash.
    #[test]
    fn test_hash_determinism() {
        let request = TransformRequest::for_source(
            "go",
            GO_SOURCE,
            "function:main",
            Operation::Replace,
            "func renamed() {\n\tprintln(\"hi\")\n}",
        );
        let p = pipeline();
        let first = p.execute(&request, &token()).unwrap();
        let second = p.execute(&request, &token()).unwrap();
        assert_eq!(first.output(), second.output());
        assert_eq!(first.hash(), second.hash());
    }

    #[test]
    fn test_no_matches_is_error_status() {
        let request = TransformRequest::for_source(
            "go",
            GO_SOURCE,
            "function:nonexistent",
            Operation::Delete,
            "",
        );
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Error);
        assert_eq!(outcome.output(), GO_SOURCE);
        assert_eq!(outcome.stats().matches_found, 0);
    }

    /// Scenario: fuzzy resolution of `NewUser` onto `newUser`.
    #[test]
    fn test_fuzzy_resolution() {
        let source = "package main\nfunc newUser() {\n\tprintln(\"x\")\n}\n";
        let request = TransformRequest::for_source(
            "go",
            source,
            "function:NewUser",
            Operation::Replace,
            "func newUser() {\n\tprintln(\"y\")\n}",
        )
        .with_options(TransformOptions::new().with_fuzz(true));
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Success);
        let fuzzy = outcome.fuzzy();
        assert!(fuzzy.used);
        assert!(fuzzy.resolved_query.contains("newUser"));
        assert!(fuzzy.heuristics.contains(&"case_insensitive".to_string()));
        assert!(fuzzy.confidence > 0.5);
        assert_eq!(outcome.stats().matches_found, 1);
    }

    #[test]
    fn test_fuzz_disabled_no_fallback() {
        let source = "package main\nfunc newUser() {}\n";
        let request =
            TransformRequest::for_source("go", source, "function:NewUser", Operation::Delete, "");
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Error);
        assert!(!outcome.fuzzy().used);
    }

    /// Scenario: overlapping edits fail before mutating the source.
    #[test]
    fn test_overlap_conflict() {
        // `function:*` and the hierarchy-free wildcard both match `main`
        // and `helper`; replacing functions while deleting blocks makes
        // the ranges collide. Simpler: two replaces over nested anchors.
        let source = "package main\nfunc main() {\n\tif x {\n\t\ty()\n\t}\n}\n";
        let request = TransformRequest::for_source(
            "go",
            source,
            "function:main | condition:*",
            Operation::Replace,
            "replaced",
        )
        .with_options(TransformOptions {
            skip_validation: true,
            ..TransformOptions::default()
        });
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Error);
        assert!(outcome.stats().overlaps_detected >= 1);
        assert_eq!(outcome.output(), source);
    }

    #[test]
    fn test_delete_removes_anchor() {
        let source = "package main\n\nfunc main() {}\n\nfunc helper() {}\n";
        let request =
            TransformRequest::for_source("go", source, "function:helper", Operation::Delete, "");
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Success);
        assert!(!outcome.output().contains("helper"));
        assert!(outcome.output().contains("func main()"));
    }

    #[test]
    fn test_insert_before_block_level() {
        let request = TransformRequest::for_source(
            "go",
            "package main\n\nfunc main() {}\n",
            "function:main",
            Operation::InsertBefore,
            "func setup() {}",
        );
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Success);
        let output = outcome.output();
        let setup = output.find("func setup()").unwrap();
        let main = output.find("func main()").unwrap();
        assert!(setup < main);
        assert!(output.contains("func setup() {}\n\nfunc main()"));
    }

    #[test]
    fn test_append_to_body() {
        let request = TransformRequest::for_source(
            "go",
            GO_SOURCE,
            "function:main",
            Operation::AppendToBody,
            "println(\"bye\")",
        );
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Success);
        assert!(outcome.output().contains("println(\"hi\")\n\tprintln(\"bye\")"));
    }

    #[test]
    fn test_cancelled_token_reports_error() {
        let cancelled = CancellationToken::new();
        cancelled.cancel();
        let request = TransformRequest::for_source(
            "go",
            GO_SOURCE,
            "function:main",
            Operation::Delete,
            "",
        );
        let outcome = pipeline().execute(&request, &cancelled).unwrap();
        assert_eq!(outcome.status(), Status::Error);
        assert!(outcome
            .diagnostics()
            .iter()
            .any(|d| d.message().contains("cancelled")));
    }

    #[test]
    fn test_unknown_language_is_err() {
        let request = TransformRequest::for_source(
            "cobol",
            GO_SOURCE,
            "function:main",
            Operation::Delete,
            "",
        );
        let err = pipeline().execute(&request, &token()).unwrap_err();
        assert_eq!(err.code(), -32002);
    }

    /// Replace with the original matched text is the identity on bytes.
    #[test]
    fn test_replace_identity_round_trip() {
        let source = "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n";
        let matched = "func main() {\n\tprintln(\"hi\")\n}";
        let request = TransformRequest::for_source(
            "go",
            source,
            "function:main",
            Operation::Replace,
            matched,
        );
        let outcome = pipeline().execute(&request, &token()).unwrap();
        assert_eq!(outcome.status(), Status::Success);
        assert_eq!(outcome.output(), source);
        assert!(outcome.diff().is_none());
    }
}
