// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics Service
//!
//! Prometheus counters and histograms for the engine: transforms run,
//! matches found, edits applied, conflicts detected, and the staging
//! lifecycle. The registry is owned here and exposed for scraping by
//! whatever endpoint the host wires up.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

use structural_codemod_domain::value_objects::{Status, TransformStats};
use structural_codemod_domain::CodemodError;

#[derive(Clone)]
pub struct MetricsService {
    registry: Arc<Registry>,

    transforms_total: IntCounter,
    transform_errors_total: IntCounter,
    transform_partials_total: IntCounter,
    transform_duration: Histogram,
    matches_found_total: IntCounter,
    edits_applied_total: IntCounter,
    overlap_conflicts_total: IntCounter,

    stages_created_total: IntCounter,
    stages_applied_total: IntCounter,
    stages_rejected_total: IntCounter,
    pending_stages: IntGauge,
}

impl MetricsService {
    pub fn new() -> Result<Self, CodemodError> {
        let registry = Registry::new();

        let metrics_error =
            |name: &str, e: prometheus::Error| CodemodError::InternalError(format!("failed to create {} metric: {}", name, e));

        let transforms_total = IntCounter::with_opts(
            Opts::new("transforms_total", "Total transformations executed").namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("transforms_total", e))?;

        let transform_errors_total = IntCounter::with_opts(
            Opts::new("transform_errors_total", "Transformations that ended in error")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("transform_errors_total", e))?;

        let transform_partials_total = IntCounter::with_opts(
            Opts::new("transform_partials_total", "Transformations that ended partial")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("transform_partials_total", e))?;

        let transform_duration = Histogram::with_opts(
            HistogramOpts::new("transform_duration_seconds", "Time spent in the pipeline")
                .namespace("structural_codemod")
                .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0]),
        )
        .map_err(|e| metrics_error("transform_duration", e))?;

        let matches_found_total = IntCounter::with_opts(
            Opts::new("matches_found_total", "Anchors matched across all queries")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("matches_found_total", e))?;

        let edits_applied_total = IntCounter::with_opts(
            Opts::new("edits_applied_total", "Edits applied across all transforms")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("edits_applied_total", e))?;

        let overlap_conflicts_total = IntCounter::with_opts(
            Opts::new("overlap_conflicts_total", "Overlap conflicts detected")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("overlap_conflicts_total", e))?;

        let stages_created_total = IntCounter::with_opts(
            Opts::new("stages_created_total", "Stages recorded in the staging store")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("stages_created_total", e))?;

        let stages_applied_total = IntCounter::with_opts(
            Opts::new("stages_applied_total", "Stages applied to the filesystem")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("stages_applied_total", e))?;

        let stages_rejected_total = IntCounter::with_opts(
            Opts::new("stages_rejected_total", "Stages rejected before apply")
                .namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("stages_rejected_total", e))?;

        let pending_stages = IntGauge::with_opts(
            Opts::new("pending_stages", "Currently pending stages").namespace("structural_codemod"),
        )
        .map_err(|e| metrics_error("pending_stages", e))?;

        for collector in [
            Box::new(transforms_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(transform_errors_total.clone()),
            Box::new(transform_partials_total.clone()),
            Box::new(transform_duration.clone()),
            Box::new(matches_found_total.clone()),
            Box::new(edits_applied_total.clone()),
            Box::new(overlap_conflicts_total.clone()),
            Box::new(stages_created_total.clone()),
            Box::new(stages_applied_total.clone()),
            Box::new(stages_rejected_total.clone()),
            Box::new(pending_stages.clone()),
        ] {
            registry
                .register(collector)
                .map_err(|e| CodemodError::InternalError(format!("failed to register metric: {}", e)))?;
        }

        Ok(Self {
            registry: Arc::new(registry),
            transforms_total,
            transform_errors_total,
            transform_partials_total,
            transform_duration,
            matches_found_total,
            edits_applied_total,
            overlap_conflicts_total,
            stages_created_total,
            stages_applied_total,
            stages_rejected_total,
            pending_stages,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Records one finished pipeline run.
    pub fn record_transform(&self, status: Status, stats: &TransformStats) {
        self.transforms_total.inc();
        match status {
            Status::Error => self.transform_errors_total.inc(),
            Status::Partial => self.transform_partials_total.inc(),
            _ => {}
        }
        self.transform_duration
            .observe(stats.duration_ms as f64 / 1000.0);
        self.matches_found_total.inc_by(stats.matches_found);
        self.edits_applied_total.inc_by(stats.edits_applied);
        self.overlap_conflicts_total.inc_by(stats.overlaps_detected);
    }

    pub fn record_stage_created(&self) {
        self.stages_created_total.inc();
        self.pending_stages.inc();
    }

    pub fn record_stage_applied(&self) {
        self.stages_applied_total.inc();
        self.pending_stages.dec();
    }

    pub fn record_stage_rejected(&self) {
        self.stages_rejected_total.inc();
        self.pending_stages.dec();
    }

    /// Seeds the pending-stage gauge from the store at start-up.
    pub fn set_pending_stages(&self, count: u64) {
        self.pending_stages.set(count as i64);
    }
}
