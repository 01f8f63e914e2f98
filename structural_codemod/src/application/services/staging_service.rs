// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Staging Service
//!
//! Durable queue of proposed transformations. Creation runs the pipeline
//! once (without writing) to capture the expected output hash, then
//! persists the stage; Apply replays the stored request and refuses to
//! write unless the replayed hash matches.
//!
//! ## Creation Path
//!
//! Create requests are dispatched onto a worker pool through a bounded
//! request channel. When the channel is full the request falls back to
//! synchronous in-caller execution, so callers never block indefinitely
//! and no stage is silently dropped. Every create returns a single-shot
//! notification channel carrying the result.
//!
//! Apply is the only path through which files change in staging mode.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::entities::{ApplyRecord, Session, Stage, TransformRequest};
use structural_codemod_domain::events::{DomainEvent, StageEvent};
use structural_codemod_domain::repositories::StagingRepository;
use structural_codemod_domain::value_objects::{NodeKind, SessionId, StageId};
use structural_codemod_domain::CodemodError;

use crate::infrastructure::config::StagingSettings;
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::pipeline::TransformPipeline;

/// Stage selector for apply.
#[derive(Debug, Clone)]
pub enum ApplyTarget {
    Id(StageId),
    All,
    Latest,
}

/// Per-stage apply outcome.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub stage_id: StageId,
    pub result: Result<(), CodemodError>,
}

struct CreateRequest {
    session_id: SessionId,
    request: TransformRequest,
    done: oneshot::Sender<Result<StageId, CodemodError>>,
}

/// Worker-pool staging coordinator.
pub struct StagingService {
    repository: Arc<dyn StagingRepository>,
    pipeline: Arc<TransformPipeline>,
    metrics: Arc<MetricsService>,
    settings: StagingSettings,
    sender: mpsc::Sender<CreateRequest>,
    events: broadcast::Sender<DomainEvent<StageEvent>>,
    token: CancellationToken,
}

impl StagingService {
    /// Builds the service and spawns its worker pool.
    pub fn new(
        repository: Arc<dyn StagingRepository>,
        pipeline: Arc<TransformPipeline>,
        metrics: Arc<MetricsService>,
        settings: StagingSettings,
        token: CancellationToken,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel::<CreateRequest>(settings.queue_capacity);
        let (events, _) = broadcast::channel(64);
        let service = Arc::new(Self {
            repository,
            pipeline,
            metrics,
            settings,
            sender,
            events,
            token,
        });

        let receiver = Arc::new(Mutex::new(receiver));
        for worker_id in 0..service.settings.workers {
            let service = service.clone();
            let receiver = receiver.clone();
            tokio::spawn(async move {
                loop {
                    let request = {
                        let mut receiver = receiver.lock().await;
                        tokio::select! {
                            _ = service.token.cancelled() => None,
                            request = receiver.recv() => request,
                        }
                    };
                    let Some(request) = request else {
                        debug!("staging worker {} stopping", worker_id);
                        break;
                    };
                    let result = service
                        .build_and_save(request.session_id, request.request)
                        .await;
                    // The caller may have dropped its notification end.
                    let _ = request.done.send(result);
                }
            });
        }

        service
    }

    /// Ensures the session exists in the store.
    pub async fn open_session(&self) -> Result<Session, CodemodError> {
        let session = Session::new();
        self.repository.save_session(&session).await?;
        Ok(session)
    }

    /// Subscribes to stage lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent<StageEvent>> {
        self.events.subscribe()
    }

    /// Removes stages whose TTL passed; returns how many were swept.
    pub async fn sweep_expired(&self) -> Result<u64, CodemodError> {
        self.repository.sweep_expired().await
    }

    /// Total pending stages across all sessions.
    pub async fn count_pending(&self) -> Result<u64, CodemodError> {
        self.repository.count_pending().await
    }

    /// Queues an async stage creation.
    ///
    /// Returns the single-shot notification channel. When the bounded
    /// queue is full, creation runs synchronously in the caller and the
    /// channel resolves before this method returns.
    pub async fn create_stage(
        &self,
        session_id: SessionId,
        request: TransformRequest,
    ) -> oneshot::Receiver<Result<StageId, CodemodError>> {
        let (done, notify) = oneshot::channel();

        // Degenerate requests fail fast without touching the queue.
        if let Err(e) = request.validate() {
            let _ = done.send(Err(e));
            return notify;
        }

        match self.sender.try_send(CreateRequest {
            session_id,
            request,
            done,
        }) {
            Ok(()) => notify,
            Err(mpsc::error::TrySendError::Full(create)) => {
                warn!("staging queue full; falling back to synchronous creation");
                let result = self.build_and_save(create.session_id, create.request).await;
                let _ = create.done.send(result);
                notify
            }
            Err(mpsc::error::TrySendError::Closed(create)) => {
                let result = self.build_and_save(create.session_id, create.request).await;
                let _ = create.done.send(result);
                notify
            }
        }
    }

    /// Issues N async creates and waits for every notification, returning
    /// per-stage results in input order.
    pub async fn create_batch(
        &self,
        session_id: SessionId,
        requests: Vec<TransformRequest>,
    ) -> Vec<Result<StageId, CodemodError>> {
        let mut notifications = Vec::with_capacity(requests.len());
        for request in requests {
            notifications.push(self.create_stage(session_id, request).await);
        }

        let mut results = Vec::with_capacity(notifications.len());
        for notify in notifications {
            results.push(notify.await.unwrap_or_else(|_| {
                Err(CodemodError::InternalError(
                    "stage creation worker dropped its notification".to_string(),
                ))
            }));
        }
        results
    }

    pub async fn get_stage(&self, id: StageId) -> Result<Option<Stage>, CodemodError> {
        self.repository.find_stage(id).await
    }

    pub async fn list_pending(&self, session_id: SessionId) -> Result<Vec<Stage>, CodemodError> {
        self.repository.list_pending(session_id).await
    }

    pub async fn reject(&self, id: StageId) -> Result<(), CodemodError> {
        self.repository.reject_stage(id).await?;
        self.metrics.record_stage_rejected();
        let _ = self
            .events
            .send(DomainEvent::new(StageEvent::StageRejected { stage_id: id }));
        Ok(())
    }

    /// Applies staged work.
    ///
    /// `Latest` applies the most recent pending stage; `All` applies every
    /// pending stage across sessions; `Id` applies one. Per-stage failures
    /// are reported individually and never abort the rest.
    pub async fn apply(&self, target: ApplyTarget, auto_applied: bool, applied_by: &str) -> Result<Vec<ApplyOutcome>, CodemodError> {
        let stages: Vec<Stage> = match target {
            ApplyTarget::Id(id) => match self.repository.find_stage(id).await? {
                Some(stage) => vec![stage],
                None => {
                    return Err(CodemodError::StageNotFound(format!(
                        "no pending stage with id {}",
                        id
                    )));
                }
            },
            ApplyTarget::Latest => match self.repository.latest_pending().await? {
                Some(stage) => vec![stage],
                None => Vec::new(),
            },
            ApplyTarget::All => self.repository.list_all_pending().await?,
        };

        let mut outcomes = Vec::with_capacity(stages.len());
        for stage in stages {
            let stage_id = stage.id();
            let result = self.apply_one(stage, auto_applied, applied_by).await;
            outcomes.push(ApplyOutcome { stage_id, result });
        }
        Ok(outcomes)
    }

    /// Cancels the worker pool. Queued creations drain through the
    /// synchronous fallback of later callers.
    pub fn shutdown(&self) {
        info!("staging service shutting down");
        self.token.cancel();
    }

    async fn build_and_save(
        &self,
        session_id: SessionId,
        request: TransformRequest,
    ) -> Result<StageId, CodemodError> {
        let pipeline = self.pipeline.clone();
        let token = self.token.clone();
        let exec_request = request.clone();
        let outcome = tokio::task::spawn_blocking(move || pipeline.execute(&exec_request, &token))
            .await
            .map_err(|e| CodemodError::InternalError(format!("stage build task failed: {}", e)))??;

        if !outcome.is_success() {
            let detail = outcome
                .diagnostics()
                .first()
                .map(|d| d.message().to_string())
                .unwrap_or_else(|| "transformation failed".to_string());
            return Err(CodemodError::TransformFailed(detail));
        }

        let (target_kind, target_name) = target_of(&request);
        let confidence = if outcome.fuzzy().used {
            outcome.fuzzy().confidence
        } else {
            1.0
        };

        let stage = Stage::new(
            session_id,
            request.operation(),
            target_kind,
            target_name,
            confidence,
            request,
            outcome.hash().clone(),
        )
        .with_ttl(chrono::Duration::hours(self.settings.stage_ttl_hours));

        self.repository.save_stage(&stage).await?;
        self.metrics.record_stage_created();
        let _ = self.events.send(DomainEvent::new(StageEvent::StageCreated {
            stage_id: stage.id(),
            session_id,
        }));
        debug!("stage {} created (confidence {:.2})", stage.id(), confidence);
        Ok(stage.id())
    }

    async fn apply_one(
        &self,
        stage: Stage,
        auto_applied: bool,
        applied_by: &str,
    ) -> Result<(), CodemodError> {
        // The entity enforces the pending -> applied transition before
        // anything touches the filesystem.
        let mut stage = stage;
        stage.mark_applied()?;

        // Replay the stored request to confirm determinism.
        let pipeline = self.pipeline.clone();
        let token = self.token.clone();
        let request = stage.request().clone();
        let outcome = tokio::task::spawn_blocking(move || pipeline.execute(&request, &token))
            .await
            .map_err(|e| CodemodError::InternalError(format!("stage replay task failed: {}", e)))??;

        if !outcome.hash().matches(stage.expected_hash()) {
            return Err(CodemodError::IntegrityError(format!(
                "stage {} replay hash {} does not match stored hash {}",
                stage.id(),
                outcome.hash(),
                stage.expected_hash()
            )));
        }

        // The only filesystem mutation in staging mode.
        if let Some(path) = stage.request().file_path() {
            tokio::fs::write(path, outcome.output())
                .await
                .map_err(|e| CodemodError::FileSystemError(format!("write {} failed: {}", path, e)))?;
        }

        let record = ApplyRecord::new(stage.id(), auto_applied, applied_by);
        self.repository.complete_apply(stage.id(), &record).await?;
        self.metrics.record_stage_applied();
        let _ = self.events.send(DomainEvent::new(StageEvent::StageApplied {
            stage_id: stage.id(),
            auto_applied,
        }));
        info!("stage {} applied by {}", stage.id(), applied_by);
        Ok(())
    }
}

fn target_of(request: &TransformRequest) -> (NodeKind, String) {
    use structural_codemod_domain::services::QueryParser;
    use structural_codemod_domain::value_objects::QueryKind;

    match QueryParser::new().parse(request.query()) {
        Ok(query) => {
            let kind = match query.kind() {
                QueryKind::Node(kind) => kind,
                QueryKind::Logical => NodeKind::Block,
            };
            (kind, query.pattern().to_string())
        }
        Err(_) => (NodeKind::Block, request.query().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::infrastructure::matchers::MatcherCache;
    use crate::infrastructure::providers::ProviderRegistry;
    use crate::infrastructure::repositories::SqliteStagingRepository;
    use structural_codemod_domain::value_objects::Operation;

    async fn service() -> (Arc<StagingService>, Session) {
        let repository = Arc::new(SqliteStagingRepository::in_memory().await.unwrap());
        let pipeline = Arc::new(TransformPipeline::new(
            Arc::new(ProviderRegistry::with_builtin_providers()),
            Arc::new(MatcherCache::new()),
        ));
        let metrics = Arc::new(MetricsService::new().unwrap());
        let service = StagingService::new(
            repository,
            pipeline,
            metrics,
            StagingSettings::default(),
            CancellationToken::new(),
        );
        let session = service.open_session().await.unwrap();
        (service, session)
    }

    fn go_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("main.go");
        fs::write(&path, "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n").unwrap();
        path
    }

    fn replace_request(path: &std::path::Path) -> TransformRequest {
        TransformRequest::for_path(
            "go",
            path.to_string_lossy(),
            "function:main",
            Operation::Replace,
            "func main() {\n\tprintln(\"bye\")\n}",
        )
    }

    /// Scenario: create, list pending, apply, stage removed.
    #[tokio::test]
    async fn test_staging_round_trip() {
        let (service, session) = service().await;
        let dir = TempDir::new().unwrap();
        let path = go_file(&dir);

        let notify = service.create_stage(session.id(), replace_request(&path)).await;
        let stage_id = notify.await.unwrap().unwrap();

        let pending = service.list_pending(session.id()).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), stage_id);
        // Creation never touches the file.
        assert!(fs::read_to_string(&path).unwrap().contains("println(\"hi\")"));

        let outcomes = service
            .apply(ApplyTarget::Id(stage_id), false, "tester")
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        outcomes[0].result.as_ref().unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains("println(\"bye\")"));
        assert!(service.list_pending(session.id()).await.unwrap().is_empty());
        assert!(service.get_stage(stage_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_returns_results_in_input_order() {
        let (service, session) = service().await;
        let dir = TempDir::new().unwrap();
        let path = go_file(&dir);

        let bad = TransformRequest::for_path(
            "go",
            path.to_string_lossy(),
            "function:missing",
            Operation::Delete,
            "",
        );
        let results = service
            .create_batch(session.id(), vec![replace_request(&path), bad])
            .await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn test_apply_detects_drifted_file() {
        let (service, session) = service().await;
        let dir = TempDir::new().unwrap();
        let path = go_file(&dir);

        let notify = service.create_stage(session.id(), replace_request(&path)).await;
        let stage_id = notify.await.unwrap().unwrap();

        // The file grows a new declaration underneath the stage; replay
        // produces a different hash, so apply must refuse to write.
        fs::write(
            &path,
            "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n\nfunc drifted() {}\n",
        )
        .unwrap();

        let outcomes = service
            .apply(ApplyTarget::Id(stage_id), false, "tester")
            .await
            .unwrap();
        assert!(outcomes[0].result.is_err());
        assert!(fs::read_to_string(&path).unwrap().contains("func drifted()"));
        // The stage survives the failed apply.
        assert!(service.get_stage(stage_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_apply_latest_with_empty_store() {
        let (service, _session) = service().await;
        let outcomes = service.apply(ApplyTarget::Latest, true, "auto").await.unwrap();
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_fails_fast() {
        let (service, session) = service().await;
        // Neither source nor path.
        let mut request = TransformRequest::for_source("go", "x", "function:*", Operation::Delete, "");
        request = TransformRequest::from_json(
            &request.to_json().unwrap().replace("\"source\":\"x\"", "\"source\":null"),
        )
        .unwrap();
        let notify = service.create_stage(session.id(), request).await;
        assert!(notify.await.unwrap().is_err());
    }
}
