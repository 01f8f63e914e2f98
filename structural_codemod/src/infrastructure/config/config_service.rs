// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Configuration Service
//!
//! Loads and validates `CodemodConfig` from (in precedence order) an
//! explicit TOML file, `STRUCTURAL_CODEMOD_*` environment overrides, and
//! built-in defaults. The loaded record is immutable for the lifetime of
//! the engine handle.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use structural_codemod_domain::CodemodError;

/// Staging coordinator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagingSettings {
    /// Worker-pool size for async stage creation.
    pub workers: usize,
    /// Bounded request-channel capacity; a full channel falls back to
    /// synchronous in-caller creation.
    pub queue_capacity: usize,
    /// Stage time-to-live in hours.
    pub stage_ttl_hours: i64,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_capacity: 100,
            stage_ttl_hours: 24,
        }
    }
}

/// File-processor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileProcessorSettings {
    /// Per-file query timeout in seconds.
    pub query_timeout_secs: u64,
    /// Per-file transform timeout in seconds.
    pub transform_timeout_secs: u64,
}

impl Default for FileProcessorSettings {
    fn default() -> Self {
        Self {
            query_timeout_secs: 30,
            transform_timeout_secs: 60,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CodemodConfig {
    /// SQLite URL of the staging store, e.g. `sqlite://./codemod.db`.
    /// Empty selects an in-memory store.
    pub database_url: String,
    pub staging: StagingSettings,
    pub file_processor: FileProcessorSettings,
}

impl CodemodConfig {
    /// Loads configuration with the documented precedence.
    pub fn load(config_path: Option<&Path>) -> Result<Self, CodemodError> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("STRUCTURAL_CODEMOD").separator("__"),
        );

        let settings = builder
            .build()
            .map_err(|e| CodemodError::InvalidParams(format!("failed to load config: {}", e)))?;

        let config: CodemodConfig = settings
            .try_deserialize()
            .map_err(|e| CodemodError::InvalidParams(format!("invalid config: {}", e)))?;
        config.validate()?;
        debug!("loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CodemodError> {
        if self.staging.workers == 0 {
            return Err(CodemodError::InvalidParams(
                "staging.workers must be at least 1".to_string(),
            ));
        }
        if self.staging.queue_capacity == 0 {
            return Err(CodemodError::InvalidParams(
                "staging.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.staging.stage_ttl_hours <= 0 {
            return Err(CodemodError::InvalidParams(
                "staging.stage_ttl_hours must be positive".to_string(),
            ));
        }
        if self.file_processor.query_timeout_secs == 0 || self.file_processor.transform_timeout_secs == 0 {
            return Err(CodemodError::InvalidParams(
                "file_processor timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CodemodConfig::default();
        assert_eq!(config.staging.workers, 10);
        assert_eq!(config.staging.queue_capacity, 100);
        assert_eq!(config.file_processor.query_timeout_secs, 30);
        assert_eq!(config.file_processor.transform_timeout_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "database_url = \"sqlite://./stages.db\"\n[staging]\nworkers = 4\nqueue_capacity = 16\nstage_ttl_hours = 2\n"
        )
        .unwrap();
        let config = CodemodConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database_url, "sqlite://./stages.db");
        assert_eq!(config.staging.workers, 4);
        assert_eq!(config.staging.queue_capacity, 16);
        // Unset sections keep defaults.
        assert_eq!(config.file_processor.query_timeout_secs, 30);
    }

    #[test]
    fn test_validation_rejects_zero_workers() {
        let mut config = CodemodConfig::default();
        config.staging.workers = 0;
        assert!(config.validate().is_err());
    }
}
