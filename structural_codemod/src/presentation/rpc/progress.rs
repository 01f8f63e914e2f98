// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Progress Notifications
//!
//! Every tool call accepts an optional progress channel and reports the
//! same five checkpoints: validation 5%, load 15%, provider resolution
//! 25%, transform 70%, finalize 90%. Watchable resources additionally
//! emit [`ResourceUpdateType`] events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Fixed progress checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    Validation,
    Load,
    Provider,
    Transform,
    Finalize,
}

impl ProgressStage {
    pub fn percent(&self) -> u8 {
        match self {
            ProgressStage::Validation => 5,
            ProgressStage::Load => 15,
            ProgressStage::Provider => 25,
            ProgressStage::Transform => 70,
            ProgressStage::Finalize => 90,
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressNotification {
    pub stage: ProgressStage,
    pub percent: u8,
    pub method: String,
}

/// Events emitted for watchable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceUpdateType {
    Updated,
    Removed,
    ListChanged,
}

/// Optional progress sink threaded through tool calls.
#[derive(Clone, Default)]
pub struct ProgressSink {
    sender: Option<mpsc::UnboundedSender<ProgressNotification>>,
}

impl ProgressSink {
    /// A sink that drops every notification.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// A sink writing into the returned channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn notify(&self, method: &str, stage: ProgressStage) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(ProgressNotification {
                stage,
                percent: stage.percent(),
                method: method.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_percentages() {
        assert_eq!(ProgressStage::Validation.percent(), 5);
        assert_eq!(ProgressStage::Load.percent(), 15);
        assert_eq!(ProgressStage::Provider.percent(), 25);
        assert_eq!(ProgressStage::Transform.percent(), 70);
        assert_eq!(ProgressStage::Finalize.percent(), 90);
    }

    #[tokio::test]
    async fn test_sink_delivers_in_order() {
        let (sink, mut receiver) = ProgressSink::channel();
        sink.notify("replace", ProgressStage::Validation);
        sink.notify("replace", ProgressStage::Finalize);
        assert_eq!(receiver.recv().await.unwrap().percent, 5);
        assert_eq!(receiver.recv().await.unwrap().percent, 90);
    }

    #[test]
    fn test_disabled_sink_is_silent() {
        ProgressSink::disabled().notify("replace", ProgressStage::Load);
    }
}
