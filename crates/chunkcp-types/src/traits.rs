//! Core traits for chunkcp operations
//!
//! The transfer engine reports progress only through [`TransferObserver`], so it
//! stays independent of any particular presentation layer.

use crate::{ChunkDigest, ChunkResult, TransferOutcome};
use std::time::Duration;

/// Receives transfer events as they happen
///
/// Every method has a no-op default. Chunk events are raised from worker
/// threads concurrently, so implementations must be `Send + Sync`.
pub trait TransferObserver: Send + Sync {
    /// A chunk was copied and its read-back digest matched the source
    fn on_chunk_verified(&self, offset: u64, bytes: usize, digest: ChunkDigest) {
        let _ = (offset, bytes, digest);
    }

    /// A chunk failed verification and is about to be copied again
    fn on_chunk_retry(&self, offset: u64, attempt: u32) {
        let _ = (offset, attempt);
    }

    /// A chunk was still mismatched after the last retry
    fn on_chunk_unresolved(&self, result: &ChunkResult) {
        let _ = result;
    }

    /// All workers joined; whole-file verification is next
    fn on_transfer_completed(&self, elapsed: Duration) {
        let _ = elapsed;
    }

    /// Whole-file verification finished
    fn on_complete(&self, outcome: &TransferOutcome) {
        let _ = outcome;
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TransferObserver for NoopObserver {}
