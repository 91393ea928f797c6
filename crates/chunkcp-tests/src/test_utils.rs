//! Unified test utilities for chunkcp tests

use chunkcp_types::{ChunkDigest, ChunkResult, TransferObserver, TransferOutcome};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Test data generation patterns
#[derive(Debug, Clone, Copy)]
pub enum TestDataPattern {
    /// All zeros
    Zeros,
    /// Deterministic pseudo-random bytes
    Random,
    /// Each byte is its offset modulo a prime, so shifted chunks never collide
    Sequence,
}

/// Generate `size` bytes following `pattern`
pub fn generate_test_data(size: usize, pattern: TestDataPattern) -> Vec<u8> {
    match pattern {
        TestDataPattern::Zeros => vec![0u8; size],
        TestDataPattern::Random => {
            // xorshift64, seeded for reproducible files
            let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
            (0..size)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state >> 24) as u8
                })
                .collect()
        }
        TestDataPattern::Sequence => (0..size).map(|i| (i % 251) as u8).collect(),
    }
}

/// Create a file in `temp_dir` holding `size` bytes of `pattern`
pub fn create_test_file(
    temp_dir: &TempDir,
    name: &str,
    size: usize,
    pattern: TestDataPattern,
) -> PathBuf {
    let file_path = temp_dir.path().join(name);
    let data = generate_test_data(size, pattern);
    fs::write(&file_path, data).expect("Failed to write test file");
    file_path
}

/// File sizes that exercise chunk and range boundaries
pub struct CommonFileSizes;

impl CommonFileSizes {
    /// Empty file
    pub const EMPTY: usize = 0;
    /// Single byte
    pub const ONE: usize = 1;
    /// One byte past a 4 KiB chunk
    pub const ODD: usize = 4 * 1024 + 1;
    /// A few chunks with a short tail
    pub const MEDIUM: usize = 257 * 1024 + 13;
    /// 10 MiB
    pub const XLARGE: usize = 10 * 1024 * 1024;

    /// Sizes small enough for every-mode matrices
    pub fn boundaries() -> Vec<(&'static str, usize)> {
        vec![
            ("empty", Self::EMPTY),
            ("one", Self::ONE),
            ("odd", Self::ODD),
            ("medium", Self::MEDIUM),
        ]
    }
}

/// Observer that records every event for later assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    verified: Mutex<Vec<(u64, usize)>>,
    retries: Mutex<Vec<(u64, u32)>>,
    unresolved: Mutex<Vec<u64>>,
    completed: Mutex<Vec<Duration>>,
    outcomes: Mutex<Vec<bool>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Offsets of verified chunks, sorted
    pub fn verified_offsets(&self) -> Vec<u64> {
        let mut offsets: Vec<u64> = lock(&self.verified).iter().map(|(o, _)| *o).collect();
        offsets.sort_unstable();
        offsets
    }

    /// How many times each offset was reported as verified
    pub fn verified_counts(&self) -> HashMap<u64, usize> {
        let mut counts = HashMap::new();
        for (offset, _) in lock(&self.verified).iter() {
            *counts.entry(*offset).or_insert(0) += 1;
        }
        counts
    }

    /// Total bytes across verified chunks
    pub fn verified_bytes(&self) -> u64 {
        lock(&self.verified).iter().map(|(_, b)| *b as u64).sum()
    }

    /// Number of retry events
    pub fn retry_count(&self) -> usize {
        lock(&self.retries).len()
    }

    /// Number of unresolved chunks
    pub fn unresolved_count(&self) -> usize {
        lock(&self.unresolved).len()
    }

    /// Number of transfer-completed notifications
    pub fn completed_count(&self) -> usize {
        lock(&self.completed).len()
    }

    /// Success flags of every completion event
    pub fn outcomes(&self) -> Vec<bool> {
        lock(&self.outcomes).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().expect("recorder poisoned")
}

impl TransferObserver for RecordingObserver {
    fn on_chunk_verified(&self, offset: u64, bytes: usize, _digest: ChunkDigest) {
        lock(&self.verified).push((offset, bytes));
    }

    fn on_chunk_retry(&self, offset: u64, attempt: u32) {
        lock(&self.retries).push((offset, attempt));
    }

    fn on_chunk_unresolved(&self, result: &ChunkResult) {
        lock(&self.unresolved).push(result.offset);
    }

    fn on_transfer_completed(&self, elapsed: Duration) {
        lock(&self.completed).push(elapsed);
    }

    fn on_complete(&self, outcome: &TransferOutcome) {
        lock(&self.outcomes).push(outcome.success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_test_data_patterns() {
        let size = 1024;

        let zeros = generate_test_data(size, TestDataPattern::Zeros);
        assert_eq!(zeros.len(), size);
        assert!(zeros.iter().all(|&b| b == 0));

        let random = generate_test_data(size, TestDataPattern::Random);
        assert_eq!(random, generate_test_data(size, TestDataPattern::Random));
        assert!(random.iter().any(|&b| b != random[0]));

        let sequence = generate_test_data(size, TestDataPattern::Sequence);
        assert_eq!(sequence[251], 0);
        assert_eq!(sequence[252], 1);
    }

    #[test]
    fn test_create_test_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(&temp_dir, "test.dat", 1024, TestDataPattern::Zeros);

        assert!(file_path.exists());
        assert_eq!(fs::metadata(&file_path).unwrap().len(), 1024);
    }

    #[test]
    fn test_recording_observer_counts() {
        let recorder = RecordingObserver::new();
        recorder.on_chunk_verified(8, 4, ChunkDigest(0));
        recorder.on_chunk_verified(0, 8, ChunkDigest(0));
        recorder.on_chunk_verified(8, 4, ChunkDigest(0));

        assert_eq!(recorder.verified_offsets(), vec![0, 8, 8]);
        assert_eq!(recorder.verified_counts()[&8], 2);
        assert_eq!(recorder.verified_bytes(), 16);
    }
}
