//! Chunk-level I/O and verification for chunkcp
//!
//! This crate holds the byte-moving pieces of a transfer:
//!
//! - **Chunk transport**: positioned read of one chunk from the source and a
//!   positioned write of exactly the bytes read to the destination
//! - **Chunk verification**: read-back of the written bytes and a fast XXH3-128
//!   comparison over zero-padded, chunk-sized buffers
//! - **Channels**: a worker's own pair of file handles behind [`ChunkChannel`]
//! - **Whole-file verification**: streaming SHA-256 or BLAKE3 over both files
//!
//! # Examples
//!
//! ```rust
//! use chunkcp_io::{ChunkBuffer, ChunkTransporter, ChunkVerifier};
//! use chunkcp_types::ChunkSize;
//! use std::io::Cursor;
//!
//! let chunk_size = ChunkSize::new(4).unwrap();
//! let transporter = ChunkTransporter::new(chunk_size);
//! let verifier = ChunkVerifier::new(chunk_size);
//!
//! let mut source = Cursor::new(b"abcdef".to_vec());
//! let mut destination = Cursor::new(Vec::new());
//!
//! let chunk = transporter.read_chunk(&mut source, 4, usize::MAX).unwrap();
//! transporter.write_chunk(&mut destination, 4, &chunk).unwrap();
//! assert!(verifier.verify_chunk(&mut destination, &chunk, 4).unwrap().matched);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod chunk;
pub mod fs;
pub mod verify;

pub use channel::{ChunkChannel, FileChunkChannel};
pub use chunk::{chunk_digest, read_full, ChunkBuffer, ChunkTransporter, ChunkVerifier};
pub use fs::{inspect_source, open_destination, open_source, prepare_destination};
pub use verify::{FileComparison, WholeFileVerifier, DEFAULT_BLOCK_SIZE};
