//! Partition strategies: how a file is divided among workers

use chunkcp_types::{TransferJob, TransferMode, WorkRange, WorkerCount};

/// How the workers of one transfer find their chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionPlan {
    /// One static range per worker
    Ranges(Vec<WorkRange>),
    /// `workers` workers drawing from one shared allocator over `[0, bound)`
    Shared {
        /// Number of workers
        workers: usize,
        /// Allocator upper bound (the file size)
        bound: u64,
    },
}

impl PartitionPlan {
    /// Plan the transfer of a `file_size`-byte file according to the job's mode
    pub fn for_job(job: &TransferJob, file_size: u64) -> Self {
        Self::for_mode(job.mode(), job.workers(), file_size)
    }

    /// Plan for an explicit mode and worker count
    pub fn for_mode(mode: TransferMode, workers: WorkerCount, file_size: u64) -> Self {
        match mode {
            TransferMode::Sequential => Self::Ranges(vec![WorkRange::new(0, file_size)]),
            TransferMode::FixedSplit => Self::Ranges(split_ranges(file_size, workers)),
            TransferMode::SharedCounter => Self::Shared {
                workers: workers.get(),
                bound: file_size,
            },
        }
    }

    /// Number of workers the plan calls for, empty ranges included
    pub fn worker_count(&self) -> usize {
        match self {
            Self::Ranges(ranges) => ranges.len(),
            Self::Shared { workers, .. } => *workers,
        }
    }
}

/// Split `[0, file_size)` into `workers` contiguous ranges
///
/// Every range gets `floor(file_size / workers)` bytes and the last one also
/// takes the remainder, so the ranges tile the file exactly.
pub fn split_ranges(file_size: u64, workers: WorkerCount) -> Vec<WorkRange> {
    let n = workers.get() as u64;
    let base = file_size / n;

    (0..n)
        .map(|i| {
            let start = i * base;
            let length = if i == n - 1 { file_size - start } else { base };
            WorkRange::new(start, length)
        })
        .collect()
}
