//! Chunked transfer engine for chunkcp
//!
//! This crate turns a [`TransferJob`](chunkcp_types::TransferJob) into copied,
//! verified bytes:
//!
//! - **Partitioning**: one range, N fixed ranges, or a shared offset allocator
//! - **Workers**: one blocking thread per partition running the
//!   copy-verify-retry loop over its own file handles
//! - **Coordination**: preparing the destination, joining every worker and
//!   running whole-file verification
//! - **Events**: progress reported through a
//!   [`TransferObserver`](chunkcp_types::TransferObserver)
//!
//! # Examples
//!
//! ```rust,no_run
//! use chunkcp_engine::TransferCoordinator;
//! use chunkcp_types::{TransferJob, TransferMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let job = TransferJob::new("source.bin", "backup/source.bin")
//!     .with_mode(TransferMode::SharedCounter);
//! let outcome = TransferCoordinator::new().transfer(&job).await?;
//! println!("copied in {:.3} seconds", outcome.elapsed_seconds());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod allocator;
pub mod coordinator;
pub mod events;
pub mod partition;
pub mod worker;

pub use allocator::SharedOffsetAllocator;
pub use coordinator::TransferCoordinator;
pub use events::{ChannelObserver, CompositeObserver, TracingObserver, TransferEvent};
pub use partition::{split_ranges, PartitionPlan};
pub use worker::ChunkWorker;
