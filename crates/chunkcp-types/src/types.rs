//! Core data types for chunkcp
//!
//! This module provides the transfer job description, the partition and digest
//! value types, and the final transfer outcome.

use crate::{ChunkSize, Error, Result, WorkerCount};
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Unique identifier for a transfer, used to correlate log lines
pub type TransferId = uuid::Uuid;

/// Default number of extra copy attempts per mismatched chunk
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Partition strategy requested for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TransferMode {
    /// One worker covers the whole file
    #[default]
    Sequential,
    /// Static contiguous ranges, one per worker
    FixedSplit,
    /// Workers draw chunk offsets from a shared allocator
    SharedCounter,
}

impl TransferMode {
    /// All modes in menu order
    pub const ALL: [TransferMode; 3] = [Self::Sequential, Self::FixedSplit, Self::SharedCounter];

    /// Stable name used in configuration files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::FixedSplit => "fixed-split",
            Self::SharedCounter => "shared-counter",
        }
    }

    /// Human readable menu label
    pub fn describe(self, workers: WorkerCount) -> String {
        match self {
            Self::Sequential => "Sequential (1 worker)".to_string(),
            Self::FixedSplit => format!("Fixed split ({} workers)", workers.get()),
            Self::SharedCounter => format!("Shared offset counter ({} workers)", workers.get()),
        }
    }

    /// Resolve a 1-based menu choice
    pub fn from_choice(choice: u32) -> Result<Self> {
        match choice {
            1 => Ok(Self::Sequential),
            2 => Ok(Self::FixedSplit),
            3 => Ok(Self::SharedCounter),
            other => Err(Error::invalid_mode(other.to_string())),
        }
    }

    /// Number of workers this mode actually runs with
    pub fn effective_workers(self, requested: WorkerCount) -> WorkerCount {
        match self {
            Self::Sequential => WorkerCount::one(),
            Self::FixedSplit | Self::SharedCounter => requested,
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransferMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "1" | "sequential" | "default" => Ok(Self::Sequential),
            "2" | "fixed-split" | "multithreaded" => Ok(Self::FixedSplit),
            "3" | "shared-counter" | "multithreaded-with-counter" => Ok(Self::SharedCounter),
            _ => Err(Error::invalid_mode(s.trim())),
        }
    }
}

/// Strong digest used for the whole-file comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DigestAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// BLAKE3
    Blake3,
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
            Self::Blake3 => f.write_str("blake3"),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(Error::config(format!("unknown digest algorithm '{}'", other))),
        }
    }
}

/// Immutable description of one file transfer
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransferJob {
    id: TransferId,
    source: PathBuf,
    destination: PathBuf,
    chunk_size: ChunkSize,
    max_retries: u32,
    mode: TransferMode,
    workers: WorkerCount,
    algorithm: DigestAlgorithm,
}

impl TransferJob {
    /// Create a sequential job copying `source` to the destination file path
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            id: TransferId::new_v4(),
            source: source.into(),
            destination: destination.into(),
            chunk_size: ChunkSize::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            mode: TransferMode::default(),
            workers: WorkerCount::default(),
            algorithm: DigestAlgorithm::default(),
        }
    }

    /// Create a job that copies `source` into `directory` under the same file name
    pub fn into_directory(source: impl Into<PathBuf>, directory: impl AsRef<Path>) -> Result<Self> {
        let source = source.into();
        let name = source.file_name().ok_or_else(|| Error::SourceUnreadable {
            path: source.clone(),
            message: "path has no file name".to_string(),
        })?;
        let destination = directory.as_ref().join(name);
        Ok(Self::new(source, destination))
    }

    /// Set the chunk size
    pub fn with_chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of extra attempts for a mismatched chunk
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the transfer mode
    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the worker count used by the concurrent modes
    pub fn with_workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    /// Set the whole-file digest algorithm
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Transfer identifier
    pub fn id(&self) -> TransferId {
        self.id
    }

    /// Source file path
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination file path
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Chunk size
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// Extra attempts allowed per mismatched chunk
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Requested transfer mode
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// Requested worker count; see [`TransferMode::effective_workers`]
    pub fn workers(&self) -> WorkerCount {
        self.workers
    }

    /// Whole-file digest algorithm
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

/// Half-open byte interval `[start, start + length)` assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkRange {
    /// First byte of the range
    pub start: u64,
    /// Number of bytes in the range
    pub length: u64,
}

impl WorkRange {
    /// Create a new range
    pub const fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    /// One past the last byte
    pub const fn end(&self) -> u64 {
        self.start + self.length
    }

    /// Whether the range covers no bytes
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Fast 128-bit content digest of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkDigest(pub u128);

impl fmt::Display for ChunkDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Strong digest of a whole file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileDigest(Vec<u8>);

impl FileDigest {
    /// Wrap raw digest bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Result of one copy-and-verify attempt on a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkResult {
    /// Byte offset of the chunk
    pub offset: u64,
    /// Number of bytes read from the source
    pub bytes_read: usize,
    /// Digest of the source bytes
    pub source_digest: ChunkDigest,
    /// Digest of the bytes read back from the destination
    pub destination_digest: ChunkDigest,
    /// Whether both digests are equal
    pub matched: bool,
}

/// What a single worker did before it finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkerReport {
    /// Chunks processed
    pub chunks: u64,
    /// Bytes copied
    pub bytes: u64,
    /// Extra copy attempts caused by mismatches
    pub retries: u64,
    /// Chunks still mismatched after the last retry
    pub unresolved: u64,
}

impl WorkerReport {
    /// Merge another worker's report into this one
    pub fn merge(&mut self, other: &WorkerReport) {
        self.chunks += other.chunks;
        self.bytes += other.bytes;
        self.retries += other.retries;
        self.unresolved += other.unresolved;
    }
}

/// Final result of a transfer
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransferOutcome {
    /// Transfer identifier
    pub transfer_id: TransferId,
    /// Wall-clock time from start until all workers joined
    pub elapsed: Duration,
    /// Strong digest of the source file
    pub source_digest: FileDigest,
    /// Strong digest of the destination file
    pub destination_digest: FileDigest,
    /// Whether the two digests match
    pub success: bool,
    /// Source file size in bytes
    pub file_size: u64,
    /// Aggregated worker statistics
    pub report: WorkerReport,
    /// When verification finished
    pub completed_at: DateTime<Utc>,
}

impl TransferOutcome {
    /// Elapsed transfer time in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Transfer throughput in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.file_size as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sequential", TransferMode::Sequential)]
    #[case("1", TransferMode::Sequential)]
    #[case("Fixed_Split", TransferMode::FixedSplit)]
    #[case(" 2 ", TransferMode::FixedSplit)]
    #[case("shared-counter", TransferMode::SharedCounter)]
    #[case("3", TransferMode::SharedCounter)]
    fn test_mode_parsing(#[case] input: &str, #[case] expected: TransferMode) {
        assert_eq!(input.parse::<TransferMode>().unwrap(), expected);
    }

    #[rstest]
    #[case("4")]
    #[case("")]
    #[case("parallel")]
    fn test_invalid_mode(#[case] input: &str) {
        let error = input.parse::<TransferMode>().unwrap_err();
        assert!(matches!(error, Error::InvalidMode { .. }));
    }

    #[test]
    fn test_mode_choice() {
        assert_eq!(TransferMode::from_choice(3).unwrap(), TransferMode::SharedCounter);
        assert!(matches!(TransferMode::from_choice(0), Err(Error::InvalidMode { .. })));
    }

    #[test]
    fn test_sequential_runs_one_worker() {
        let workers = WorkerCount::new(8).unwrap();
        assert_eq!(TransferMode::Sequential.effective_workers(workers).get(), 1);
        assert_eq!(TransferMode::SharedCounter.effective_workers(workers).get(), 8);
    }

    #[test]
    fn test_job_defaults() {
        let job = TransferJob::new("a.bin", "b.bin");
        assert_eq!(job.chunk_size().get(), 1024 * 1024);
        assert_eq!(job.max_retries(), 3);
        assert_eq!(job.mode(), TransferMode::Sequential);
        assert_eq!(job.workers().get(), 2);
        assert_eq!(job.algorithm(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_job_into_directory() {
        let job = TransferJob::into_directory("/data/in/video.mkv", "/backup").unwrap();
        assert_eq!(job.destination(), Path::new("/backup/video.mkv"));

        let error = TransferJob::into_directory("/", "/backup").unwrap_err();
        assert!(matches!(error, Error::SourceUnreadable { .. }));
    }

    #[test]
    fn test_digest_hex() {
        assert_eq!(ChunkDigest(0xabc).to_string().len(), 32);
        assert!(ChunkDigest(0xabc).to_string().ends_with("abc"));
        assert_eq!(FileDigest::new(vec![0x00, 0xff, 0x10]).to_hex(), "00ff10");
    }

    #[test]
    fn test_work_range() {
        let range = WorkRange::new(10, 5);
        assert_eq!(range.end(), 15);
        assert!(!range.is_empty());
        assert!(WorkRange::new(7, 0).is_empty());
    }
}
