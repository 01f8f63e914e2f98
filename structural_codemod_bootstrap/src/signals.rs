// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Wires OS signals into the shutdown coordinator.

use crate::shutdown::ShutdownCoordinator;

/// Spawns a task that initiates shutdown on Ctrl-C (and SIGTERM on unix).
pub fn install_signal_handlers(coordinator: ShutdownCoordinator) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl-C");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM");
                }
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to await Ctrl-C: {}", e);
                return;
            }
            tracing::info!("Received Ctrl-C");
        }
        coordinator.initiate_shutdown();
    });
}
