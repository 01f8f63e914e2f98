// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Observability Service
//!
//! Tracks in-flight and completed operations and derives a coarse system
//! health snapshot from error rates. Sits beside the metrics service:
//! metrics export raw counters; this service answers "is the engine
//! healthy right now" for hosts and health endpoints.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::infrastructure::metrics::MetricsService;

/// Rolling operation counters.
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    pub active_operations: u32,
    pub total_operations: u64,
    pub failed_operations: u64,
    pub last_update: Instant,
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self {
            active_operations: 0,
            total_operations: 0,
            failed_operations: 0,
            last_update: Instant::now(),
        }
    }
}

/// Health classification exposed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// Point-in-time health snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub active_operations: u32,
    pub total_operations: u64,
    pub error_rate_percent: f64,
}

/// Tracks operations and derives health.
#[derive(Clone)]
pub struct ObservabilityService {
    metrics: Arc<MetricsService>,
    tracker: Arc<RwLock<PerformanceTracker>>,
    max_error_rate_percent: f64,
}

impl ObservabilityService {
    pub fn new(metrics: Arc<MetricsService>) -> Self {
        Self {
            metrics,
            tracker: Arc::new(RwLock::new(PerformanceTracker::default())),
            max_error_rate_percent: 5.0,
        }
    }

    pub fn metrics(&self) -> &MetricsService {
        &self.metrics
    }

    pub async fn operation_started(&self, operation: &str) {
        let mut tracker = self.tracker.write().await;
        tracker.active_operations += 1;
        tracker.last_update = Instant::now();
        debug!("operation started: {}", operation);
    }

    pub async fn operation_completed(&self, operation: &str, succeeded: bool) {
        let mut tracker = self.tracker.write().await;
        tracker.active_operations = tracker.active_operations.saturating_sub(1);
        tracker.total_operations += 1;
        if !succeeded {
            tracker.failed_operations += 1;
            warn!("operation failed: {}", operation);
        }
        tracker.last_update = Instant::now();
    }

    /// Current health, classified by error rate against the threshold.
    pub async fn system_health(&self) -> SystemHealth {
        let tracker = self.tracker.read().await;
        let error_rate = if tracker.total_operations == 0 {
            0.0
        } else {
            (tracker.failed_operations as f64 / tracker.total_operations as f64) * 100.0
        };
        let status = if error_rate > self.max_error_rate_percent * 4.0 {
            HealthStatus::Critical
        } else if error_rate > self.max_error_rate_percent {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        };
        SystemHealth {
            status,
            active_operations: tracker.active_operations,
            total_operations: tracker.total_operations,
            error_rate_percent: error_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_tracks_error_rate() {
        let metrics = Arc::new(MetricsService::new().unwrap());
        let service = ObservabilityService::new(metrics);

        for _ in 0..9 {
            service.operation_started("transform").await;
            service.operation_completed("transform", true).await;
        }
        service.operation_started("transform").await;
        service.operation_completed("transform", false).await;

        let health = service.system_health().await;
        assert_eq!(health.total_operations, 10);
        assert!((health.error_rate_percent - 10.0).abs() < 1e-9);
        assert_eq!(health.status, HealthStatus::Warning);
        assert_eq!(health.active_operations, 0);
    }
}
