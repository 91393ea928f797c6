//! JSON output for scripted use

use chunkcp_io::FileComparison;
use chunkcp_types::{TransferJob, TransferOutcome};
use serde::Serialize;

/// Result of `chunkcp transfer --json`
#[derive(Debug, Serialize)]
pub struct TransferResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Partition mode name
    pub mode: &'static str,
    /// Workers the mode ran with
    pub workers: usize,
    /// Chunk size in bytes
    pub chunk_size: usize,
    /// Verification outcome and counters
    pub outcome: TransferOutcome,
}

/// Result of `chunkcp verify --json`
#[derive(Debug, Serialize)]
pub struct VerifyResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Source digest as hex
    pub source_checksum: String,
    /// Destination digest as hex
    pub destination_checksum: String,
    /// Whether the digests match
    pub matched: bool,
}

/// Operation metadata
#[derive(Debug, Serialize)]
pub struct OperationMetadata {
    /// chunkcp version
    pub version: &'static str,
    /// Operation type
    pub operation: &'static str,
    /// Timestamp when the result was produced
    pub timestamp: String,
    /// Source path
    pub source_path: String,
    /// Destination path
    pub destination_path: String,
    /// Digest algorithm
    pub algorithm: String,
}

impl OperationMetadata {
    fn new(operation: &'static str, source: &str, destination: &str, algorithm: String) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            operation,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source_path: source.to_string(),
            destination_path: destination.to_string(),
            algorithm,
        }
    }
}

impl TransferResultJson {
    /// Wrap a finished transfer
    pub fn new(job: &TransferJob, outcome: TransferOutcome) -> Self {
        Self {
            metadata: OperationMetadata::new(
                "transfer",
                &job.source().display().to_string(),
                &job.destination().display().to_string(),
                job.algorithm().to_string(),
            ),
            mode: job.mode().name(),
            workers: job.mode().effective_workers(job.workers()).get(),
            chunk_size: job.chunk_size().get(),
            outcome,
        }
    }
}

impl VerifyResultJson {
    /// Wrap a standalone comparison
    pub fn new(source: &str, destination: &str, algorithm: String, comparison: &FileComparison) -> Self {
        Self {
            metadata: OperationMetadata::new("verify", source, destination, algorithm),
            source_checksum: comparison.source.to_hex(),
            destination_checksum: comparison.destination.to_hex(),
            matched: comparison.matched,
        }
    }
}

/// Serialize for stdout
pub fn to_pretty_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkcp_types::{FileDigest, TransferMode, WorkerReport};
    use std::time::Duration;

    #[test]
    fn test_transfer_json_shape() {
        let job = TransferJob::new("in.bin", "out/in.bin").with_mode(TransferMode::SharedCounter);
        let outcome = TransferOutcome {
            transfer_id: job.id(),
            elapsed: Duration::from_millis(1500),
            source_digest: FileDigest::new(vec![0xab; 4]),
            destination_digest: FileDigest::new(vec![0xab; 4]),
            success: true,
            file_size: 42,
            report: WorkerReport::default(),
            completed_at: chrono::Utc::now(),
        };

        let json = to_pretty_json(&TransferResultJson::new(&job, outcome)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["operation"], "transfer");
        assert_eq!(value["metadata"]["algorithm"], "sha256");
        assert_eq!(value["mode"], "shared-counter");
        assert_eq!(value["workers"], 2);
        assert_eq!(value["outcome"]["success"], true);
        assert_eq!(value["outcome"]["file_size"], 42);
    }
}
