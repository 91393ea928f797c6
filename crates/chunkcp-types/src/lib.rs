//! Core type system and error handling for chunkcp
//!
//! This crate provides the foundational types shared by every chunkcp crate:
//!
//! - **Error handling**: the fatal error taxonomy of a transfer
//! - **Core types**: transfer jobs, partition ranges, digests and outcomes
//! - **Traits**: the observer interface the engine reports through
//! - **Configuration**: validated chunk size and worker count values
//!
//! # Features
//!
//! - `serde`: Serialize and deserialize the public types
//!
//! # Examples
//!
//! ```rust
//! use chunkcp_types::{ChunkSize, TransferJob, TransferMode, WorkerCount};
//!
//! let job = TransferJob::new("image.iso", "/mnt/backup/image.iso")
//!     .with_mode(TransferMode::SharedCounter)
//!     .with_workers(WorkerCount::new(4).unwrap())
//!     .with_chunk_size(ChunkSize::new(4 * 1024 * 1024).unwrap());
//!
//! assert_eq!(job.max_retries(), 3);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{ChunkSize, WorkerCount};
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::*;
pub use types::*;
