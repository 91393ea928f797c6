//! Configuration management for chunkcp
//!
//! Settings are layered: built-in defaults, then an optional YAML, TOML or
//! JSON file, then `CHUNKCP__SECTION__KEY` environment variables. The result is
//! validated before it is handed out.
//!
//! # Examples
//!
//! ```rust
//! use chunkcp_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("chunkcp.yaml")
//!     .add_env_prefix("CHUNKCP")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Chunk size: {}", config.transfer.chunk_size.get());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use chunkcp_types::{
    ChunkSize, DigestAlgorithm, TransferJob, TransferMode, WorkerCount, DEFAULT_MAX_RETRIES,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for chunkcp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How files are copied
    #[serde(default)]
    pub transfer: TransferConfig,
    /// How copies are checked
    #[serde(default)]
    pub verification: VerificationConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Build a job from every configured setting, digest algorithm included
    pub fn job(&self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> TransferJob {
        self.transfer
            .job(source, destination)
            .with_algorithm(self.verification.algorithm)
    }
}

/// Transfer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Partition strategy
    pub mode: TransferMode,
    /// Workers used by the parallel modes
    pub workers: WorkerCount,
    /// Bytes per chunk
    pub chunk_size: ChunkSize,
    /// Extra copy attempts per mismatched chunk
    pub max_retries: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            mode: TransferMode::default(),
            workers: WorkerCount::default(),
            chunk_size: ChunkSize::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl TransferConfig {
    /// Build a job carrying these settings
    pub fn job(&self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> TransferJob {
        self.apply(TransferJob::new(source, destination))
    }

    /// Overwrite the transfer settings of an existing job, keeping its paths and id
    pub fn apply(&self, job: TransferJob) -> TransferJob {
        job.with_mode(self.mode)
            .with_workers(self.workers)
            .with_chunk_size(self.chunk_size)
            .with_max_retries(self.max_retries)
    }
}

/// Whole-file verification settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Strong digest algorithm
    pub algorithm: DigestAlgorithm,
    /// Bytes read per step while digesting
    pub block_size: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            block_size: 1024 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.transfer.mode, TransferMode::Sequential);
        assert_eq!(config.transfer.workers.get(), 2);
        assert_eq!(config.transfer.chunk_size.get(), 1024 * 1024);
        assert_eq!(config.transfer.max_retries, 3);
        assert_eq!(config.verification.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_job_carries_settings() {
        let mut config = Config::default();
        config.transfer.mode = TransferMode::SharedCounter;
        config.transfer.workers = WorkerCount::new(6).unwrap();
        config.transfer.max_retries = 1;
        config.verification.algorithm = DigestAlgorithm::Blake3;

        let job = config.job("in.bin", "out/in.bin");
        assert_eq!(job.mode(), TransferMode::SharedCounter);
        assert_eq!(job.workers().get(), 6);
        assert_eq!(job.max_retries(), 1);
        assert_eq!(job.algorithm(), DigestAlgorithm::Blake3);
        assert_eq!(job.destination(), std::path::Path::new("out/in.bin"));

        // The transfer section alone keeps the default algorithm.
        let job = config.transfer.job("in.bin", "out.bin");
        assert_eq!(job.algorithm(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_types_serialize_through_the_serde_feature() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("mode: sequential"), "{}", yaml);
        assert!(yaml.contains("workers: 2"), "{}", yaml);
        assert!(yaml.contains("chunk_size: 1048576"), "{}", yaml);
        assert!(yaml.contains("algorithm: sha256"), "{}", yaml);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("transfer:\n  mode: fixed-split\n").unwrap();
        assert_eq!(config.transfer.mode, TransferMode::FixedSplit);
        assert_eq!(config.transfer.max_retries, 3);
        assert_eq!(config.verification, VerificationConfig::default());
    }
}
