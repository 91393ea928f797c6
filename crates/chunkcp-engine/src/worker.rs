//! Chunk worker: the copy, verify and retry loop

use crate::allocator::SharedOffsetAllocator;
use chunkcp_io::ChunkChannel;
use chunkcp_types::{ChunkSize, Result, TransferObserver, WorkRange, WorkerReport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs the copy-verify-retry loop over one partition
///
/// A worker owns its channel (and with it its own file handles). It either
/// walks a static [`WorkRange`] or keeps drawing offsets from a
/// [`SharedOffsetAllocator`] until the allocator is exhausted.
pub struct ChunkWorker<C: ChunkChannel> {
    id: usize,
    channel: C,
    chunk_size: ChunkSize,
    max_retries: u32,
    observer: Arc<dyn TransferObserver>,
}

impl<C: ChunkChannel> ChunkWorker<C> {
    /// Create a worker
    pub fn new(
        id: usize,
        channel: C,
        chunk_size: ChunkSize,
        max_retries: u32,
        observer: Arc<dyn TransferObserver>,
    ) -> Self {
        Self {
            id,
            channel,
            chunk_size,
            max_retries,
            observer,
        }
    }

    /// Copy `[range.start, range.end())` in increasing offset order
    ///
    /// Chunks are clamped to the range end, so nothing outside the range is
    /// written. Stops early if the source yields no more data.
    pub fn run_range(&mut self, range: WorkRange) -> Result<WorkerReport> {
        debug!(
            "Worker {} covering [{}, {})",
            self.id,
            range.start,
            range.end()
        );

        let mut report = WorkerReport::default();
        let mut offset = range.start;
        let end = range.end();

        while offset < end {
            let max_len = (end - offset).min(self.chunk_size.as_u64()) as usize;
            let copied = self.process_chunk(offset, max_len, &mut report)?;
            if copied == 0 {
                debug!("Worker {} hit end of data at offset {}", self.id, offset);
                break;
            }
            offset += copied as u64;
        }

        debug!("Worker {} finished range: {:?}", self.id, report);
        Ok(report)
    }

    /// Draw full-chunk claims from `allocator` until it is exhausted
    pub fn run_shared(&mut self, allocator: &SharedOffsetAllocator) -> Result<WorkerReport> {
        let mut report = WorkerReport::default();

        while let Some(offset) = allocator.next() {
            // The last claim may extend past end of file; the short read handles it.
            self.process_chunk(offset, self.chunk_size.get(), &mut report)?;
        }

        debug!("Worker {} finished shared draws: {:?}", self.id, report);
        Ok(report)
    }

    /// Copy and verify one chunk, retrying up to `max_retries` extra times on mismatch
    ///
    /// Returns the number of bytes copied. An unresolved mismatch is logged and
    /// counted but not returned as an error.
    pub fn process_chunk(
        &mut self,
        offset: u64,
        max_len: usize,
        report: &mut WorkerReport,
    ) -> Result<usize> {
        let mut chunk = self.channel.transfer(offset, max_len)?;
        if chunk.is_empty() {
            return Ok(0);
        }

        let mut result = self.channel.verify(&chunk, offset)?;
        let mut attempt = 0;

        while !result.matched && attempt < self.max_retries {
            attempt += 1;
            debug!(
                "Worker {} chunk at {} mismatched, retry {}/{}",
                self.id, offset, attempt, self.max_retries
            );
            self.observer.on_chunk_retry(offset, attempt);

            chunk = self.channel.transfer(offset, max_len)?;
            result = self.channel.verify(&chunk, offset)?;
        }

        report.chunks += 1;
        report.bytes += chunk.len() as u64;
        report.retries += u64::from(attempt);

        if result.matched {
            debug!("position = {}, hash = {}", offset / 1024, result.source_digest);
            self.observer
                .on_chunk_verified(offset, chunk.len(), result.source_digest);
        } else {
            warn!(
                "Worker {} chunk at {} still mismatched after {} retries (source {}, destination {})",
                self.id, offset, self.max_retries, result.source_digest, result.destination_digest
            );
            report.unresolved += 1;
            self.observer.on_chunk_unresolved(&result);
        }

        Ok(chunk.len())
    }
}
