// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Engine Handle
//!
//! The long-lived composition root: explicitly constructed registry,
//! matcher cache, pipeline, file processor, staging service, metrics,
//! and observability, wired once and shared by the tool surface and the
//! CLI. Tests construct fresh engines for isolation; nothing here is
//! process-global.
//!
//! The staging service and the file processor both reference the
//! pipeline; the pipeline references neither, which keeps the dependency
//! graph acyclic.

use std::sync::Arc;

use structural_codemod_bootstrap::CancellationToken;
use structural_codemod_domain::entities::Session;
use structural_codemod_domain::CodemodError;

use crate::application::services::file_processor::FileProcessor;
use crate::application::services::staging_service::StagingService;
use crate::infrastructure::config::CodemodConfig;
use crate::infrastructure::logging::ObservabilityService;
use crate::infrastructure::matchers::MatcherCache;
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::pipeline::TransformPipeline;
use crate::infrastructure::providers::ProviderRegistry;
use crate::infrastructure::repositories::SqliteStagingRepository;

/// Wired engine shared by every surface.
pub struct CodemodEngine {
    config: CodemodConfig,
    pipeline: Arc<TransformPipeline>,
    matcher_cache: Arc<MatcherCache>,
    file_processor: Arc<FileProcessor>,
    staging: Arc<StagingService>,
    metrics: Arc<MetricsService>,
    observability: Arc<ObservabilityService>,
    session: Session,
    token: CancellationToken,
}

impl CodemodEngine {
    /// Builds an engine against the configured staging database (an
    /// in-memory store when `database_url` is empty).
    pub async fn new(config: CodemodConfig, token: CancellationToken) -> Result<Self, CodemodError> {
        let registry = Arc::new(ProviderRegistry::with_builtin_providers());
        let matcher_cache = Arc::new(MatcherCache::new());
        let pipeline = Arc::new(TransformPipeline::new(registry, matcher_cache.clone()));

        let metrics = Arc::new(MetricsService::new()?);
        let observability = Arc::new(ObservabilityService::new(metrics.clone()));

        let repository = if config.database_url.is_empty() {
            Arc::new(SqliteStagingRepository::in_memory().await?)
        } else {
            Arc::new(SqliteStagingRepository::from_url(&config.database_url).await?)
        };

        let staging = StagingService::new(
            repository,
            pipeline.clone(),
            metrics.clone(),
            config.staging.clone(),
            token.clone(),
        );
        let session = staging.open_session().await?;

        // Expired stages are swept lazily on fetch; clearing the backlog
        // here keeps the pending gauge honest from the first scrape.
        let swept = staging.sweep_expired().await?;
        if swept > 0 {
            tracing::info!("swept {} expired stages at start-up", swept);
        }
        metrics.set_pending_stages(staging.count_pending().await?);

        let file_processor = Arc::new(FileProcessor::new(
            pipeline.clone(),
            config.file_processor.clone(),
        ));

        Ok(Self {
            config,
            pipeline,
            matcher_cache,
            file_processor,
            staging,
            metrics,
            observability,
            session,
            token,
        })
    }

    /// In-memory engine with default settings, for tests and embedding.
    pub async fn in_memory() -> Result<Self, CodemodError> {
        Self::new(CodemodConfig::default(), CancellationToken::new()).await
    }

    pub fn config(&self) -> &CodemodConfig {
        &self.config
    }

    pub fn pipeline(&self) -> Arc<TransformPipeline> {
        self.pipeline.clone()
    }

    pub fn matcher_cache(&self) -> Arc<MatcherCache> {
        self.matcher_cache.clone()
    }

    pub fn file_processor(&self) -> Arc<FileProcessor> {
        self.file_processor.clone()
    }

    pub fn staging(&self) -> Arc<StagingService> {
        self.staging.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsService> {
        self.metrics.clone()
    }

    pub fn observability(&self) -> Arc<ObservabilityService> {
        self.observability.clone()
    }

    /// The engine's default session for staged work.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        self.staging.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_engines_are_isolated() {
        let a = CodemodEngine::in_memory().await.unwrap();
        let b = CodemodEngine::in_memory().await.unwrap();
        assert_ne!(a.session().id(), b.session().id());
        assert!(a.staging().list_pending(a.session().id()).await.unwrap().is_empty());
        assert!(b.staging().list_pending(b.session().id()).await.unwrap().is_empty());
    }
}
