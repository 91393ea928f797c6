//! Transfer coordinator: partitions a job, runs its workers and verifies the result

use crate::allocator::SharedOffsetAllocator;
use crate::partition::PartitionPlan;
use crate::worker::ChunkWorker;
use chunkcp_io::{
    inspect_source, prepare_destination, FileChunkChannel, WholeFileVerifier, DEFAULT_BLOCK_SIZE,
};
use chunkcp_types::{
    Error, NoopObserver, Result, TransferJob, TransferObserver, TransferOutcome, WorkRange,
    WorkerReport,
};
use chrono::Utc;
use futures::future::join_all;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// Runs transfer jobs end to end
///
/// One coordinator can run any number of jobs, one after another or
/// concurrently; it holds no per-transfer state.
#[derive(Clone)]
pub struct TransferCoordinator {
    observer: Arc<dyn TransferObserver>,
    verify_block_size: usize,
}

impl std::fmt::Debug for TransferCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferCoordinator")
            .field("verify_block_size", &self.verify_block_size)
            .finish_non_exhaustive()
    }
}

impl TransferCoordinator {
    /// Create a coordinator that reports to no one
    pub fn new() -> Self {
        Self {
            observer: Arc::new(NoopObserver),
            verify_block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Report events to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Block size used when streaming files through the strong digest
    pub fn with_verify_block_size(mut self, block_size: usize) -> Self {
        self.verify_block_size = block_size.max(1);
        self
    }

    /// Copy `job.source()` to `job.destination()` and verify the result
    ///
    /// A digest mismatch is not an error: the outcome comes back with
    /// `success == false`. Worker failures are returned only after every
    /// worker has stopped.
    pub async fn transfer(&self, job: &TransferJob) -> Result<TransferOutcome> {
        let file_size = inspect_source(job.source()).await?;
        let plan = PartitionPlan::for_job(job, file_size);

        info!(
            "Transfer {}: {} -> {} ({} bytes, {}, chunk size {})",
            job.id(),
            job.source().display(),
            job.destination().display(),
            file_size,
            job.mode().describe(job.workers()),
            job.chunk_size().get()
        );

        prepare_destination(job.destination(), file_size).await?;

        let start = Instant::now();
        let report = self.run_plan(job, plan).await?;
        let elapsed = start.elapsed();

        info!(
            "Transfer {} copied {} bytes in {} chunks ({} retries, {} unresolved)",
            job.id(),
            report.bytes,
            report.chunks,
            report.retries,
            report.unresolved
        );
        self.observer.on_transfer_completed(elapsed);

        let verifier =
            WholeFileVerifier::new(job.algorithm()).with_block_size(self.verify_block_size);
        let comparison = verifier.compare(job.source(), job.destination()).await?;

        if !comparison.matched {
            warn!("Transfer {}: checksums don't match", job.id());
        }

        let outcome = TransferOutcome {
            transfer_id: job.id(),
            elapsed,
            source_digest: comparison.source,
            destination_digest: comparison.destination,
            success: comparison.matched,
            file_size,
            report,
            completed_at: Utc::now(),
        };

        self.observer.on_complete(&outcome);
        Ok(outcome)
    }

    async fn run_plan(&self, job: &TransferJob, plan: PartitionPlan) -> Result<WorkerReport> {
        match plan {
            PartitionPlan::Ranges(ranges) => {
                let handles = ranges
                    .into_iter()
                    .enumerate()
                    .map(|(id, range)| self.spawn_range_worker(job, id, range))
                    .collect();
                collect_reports(handles).await
            }
            PartitionPlan::Shared { workers, bound } => {
                let allocator = Arc::new(SharedOffsetAllocator::new(bound, job.chunk_size()));
                let handles = (0..workers)
                    .map(|id| self.spawn_shared_worker(job, id, Arc::clone(&allocator)))
                    .collect();
                let report = collect_reports(handles).await;

                debug!(
                    "Allocator issued {} of {} offsets (step {}, bound {})",
                    allocator.issued(),
                    allocator.expected_claims(),
                    allocator.step(),
                    allocator.bound()
                );
                allocator.reset();
                report
            }
        }
    }

    fn spawn_range_worker(
        &self,
        job: &TransferJob,
        id: usize,
        range: WorkRange,
    ) -> JoinHandle<Result<WorkerReport>> {
        let source = job.source().to_path_buf();
        let destination = job.destination().to_path_buf();
        let chunk_size = job.chunk_size();
        let max_retries = job.max_retries();
        let observer = Arc::clone(&self.observer);

        tokio::task::spawn_blocking(move || {
            let channel = FileChunkChannel::open(&source, &destination, chunk_size)?;
            ChunkWorker::new(id, channel, chunk_size, max_retries, observer).run_range(range)
        })
    }

    fn spawn_shared_worker(
        &self,
        job: &TransferJob,
        id: usize,
        allocator: Arc<SharedOffsetAllocator>,
    ) -> JoinHandle<Result<WorkerReport>> {
        let source = job.source().to_path_buf();
        let destination = job.destination().to_path_buf();
        let chunk_size = job.chunk_size();
        let max_retries = job.max_retries();
        let observer = Arc::clone(&self.observer);

        tokio::task::spawn_blocking(move || {
            let channel = FileChunkChannel::open(&source, &destination, chunk_size)?;
            ChunkWorker::new(id, channel, chunk_size, max_retries, observer).run_shared(&allocator)
        })
    }
}

impl Default for TransferCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for every worker, then merge their reports or return the first failure
async fn collect_reports(
    handles: Vec<JoinHandle<Result<WorkerReport>>>,
) -> Result<WorkerReport> {
    let mut total = WorkerReport::default();
    let mut failure = None;

    for (worker, joined) in join_all(handles).await.into_iter().enumerate() {
        let error = match joined {
            Ok(Ok(report)) => {
                total.merge(&report);
                continue;
            }
            Ok(Err(source)) => Error::WorkerFailed {
                worker,
                source: Box::new(source),
            },
            Err(join_error) => Error::WorkerPanicked {
                worker,
                message: panic_message(join_error),
            },
        };

        warn!("{}", error);
        if failure.is_none() {
            failure = Some(error);
        }
    }

    match failure {
        Some(error) => Err(error),
        None => Ok(total),
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload: Box<dyn Any + Send> = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
