//! A worker's pair of file handles, seen as a chunk copy/verify channel

use crate::chunk::{ChunkBuffer, ChunkTransporter, ChunkVerifier};
use crate::fs::{open_destination, open_source};
use chunkcp_types::{ChunkResult, ChunkSize, Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Copies and verifies chunks at arbitrary offsets
///
/// The worker loop only talks to this trait, which keeps the retry logic
/// testable without real files.
pub trait ChunkChannel: Send {
    /// Copy up to `max_len` bytes at `offset` from source to destination
    fn transfer(&mut self, offset: u64, max_len: usize) -> Result<ChunkBuffer>;

    /// Read the chunk back from the destination and compare digests
    fn verify(&mut self, chunk: &ChunkBuffer, offset: u64) -> Result<ChunkResult>;
}

/// Channel over one source handle and one destination handle
#[derive(Debug)]
pub struct FileChunkChannel {
    source: File,
    destination: File,
    source_path: PathBuf,
    destination_path: PathBuf,
    transporter: ChunkTransporter,
    verifier: ChunkVerifier,
}

impl FileChunkChannel {
    /// Open independent handles on both files
    pub fn open(source: &Path, destination: &Path, chunk_size: ChunkSize) -> Result<Self> {
        Ok(Self {
            source: open_source(source)?,
            destination: open_destination(destination)?,
            source_path: source.to_path_buf(),
            destination_path: destination.to_path_buf(),
            transporter: ChunkTransporter::new(chunk_size),
            verifier: ChunkVerifier::new(chunk_size),
        })
    }
}

impl ChunkChannel for FileChunkChannel {
    fn transfer(&mut self, offset: u64, max_len: usize) -> Result<ChunkBuffer> {
        let chunk = self
            .transporter
            .read_chunk(&mut self.source, offset, max_len)
            .map_err(|e| Error::SourceUnreadable {
                path: self.source_path.clone(),
                message: format!("read at offset {} failed: {}", offset, e),
            })?;

        if !chunk.is_empty() {
            self.transporter
                .write_chunk(&mut self.destination, offset, &chunk)
                .map_err(|e| Error::destination_write(&self.destination_path, offset, &e))?;
        }

        Ok(chunk)
    }

    fn verify(&mut self, chunk: &ChunkBuffer, offset: u64) -> Result<ChunkResult> {
        self.verifier
            .verify_chunk(&mut self.destination, chunk, offset)
            .map_err(|e| Error::destination_write(&self.destination_path, offset, &e))
    }
}
