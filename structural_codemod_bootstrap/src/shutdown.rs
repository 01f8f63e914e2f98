// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cooperative Shutdown
//!
//! The cancellation token threaded through every pipeline, file-processor,
//! and staging call, plus the coordinator that turns a shutdown signal
//! into token cancellation with a bounded grace period.
//!
//! Nothing here forces termination: cancellation is observed at the
//! engine's suspension points (parse, file I/O, channel sends) and each
//! operation returns a cancelled diagnostic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 5;

/// Cloneable cancellation flag with async notification.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves when the token is cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Coordinates graceful shutdown across subsystems.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    grace_period: Duration,
    shutdown_initiated: Arc<AtomicBool>,
    shutdown_complete: Arc<Notify>,
}

impl ShutdownCoordinator {
    pub fn new(grace_period: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            grace_period,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
            shutdown_complete: Arc::new(Notify::new()),
        }
    }

    /// The token subsystems watch.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Cancels the token once; later calls are no-ops.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tracing::info!("Initiating graceful shutdown (grace period: {:?})", self.grace_period);
            self.token.cancel();
        }
    }

    /// Waits for subsystems to finish, bounded by the grace period.
    ///
    /// Returns true when shutdown completed gracefully.
    pub async fn wait_for_shutdown(&self) -> bool {
        if !self.is_shutting_down() {
            tracing::warn!("wait_for_shutdown called but shutdown not initiated");
            return true;
        }

        tokio::select! {
            _ = self.shutdown_complete.notified() => {
                tracing::info!("Shutdown completed gracefully");
                true
            }
            _ = tokio::time::sleep(self.grace_period) => {
                tracing::warn!("Shutdown grace period expired, forcing shutdown");
                false
            }
        }
    }

    /// Signals that subsystem teardown has finished.
    pub fn complete_shutdown(&self) {
        self.shutdown_complete.notify_waiters();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_cancellation_is_observable() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        // Already-cancelled tokens resolve immediately.
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_initiate_shutdown_cancels_token() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(50));
        let token = coordinator.token();
        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutting_down());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_grace_period_expires() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(10));
        coordinator.initiate_shutdown();
        // Nothing calls complete_shutdown, so the grace period lapses.
        assert!(!coordinator.wait_for_shutdown().await);
    }
}
