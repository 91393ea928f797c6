//! Single-chunk copy and verification
//!
//! Buffers are always allocated at the full chunk size and zero-initialised, so
//! a short final chunk carries identical zero padding on the source and the
//! read-back side. Digesting the padded buffers is then equivalent to digesting
//! the valid prefix.

use chunkcp_types::{ChunkDigest, ChunkResult, ChunkSize};
use std::io::{self, Read, Seek, SeekFrom, Write};
use xxhash_rust::xxh3::xxh3_128;

/// Fast content digest used for per-chunk comparison
pub fn chunk_digest(bytes: &[u8]) -> ChunkDigest {
    ChunkDigest(xxh3_128(bytes))
}

/// Read until `buf` is full or the reader reports end of data
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// A chunk-sized, zero-padded buffer and the number of valid bytes in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    len: usize,
}

impl ChunkBuffer {
    /// Allocate a zeroed buffer of `chunk_size` bytes with no valid data
    pub fn zeroed(chunk_size: ChunkSize) -> Self {
        Self {
            data: vec![0u8; chunk_size.get()],
            len: 0,
        }
    }

    /// Build a buffer from `bytes`, zero-padded to `chunk_size`
    ///
    /// `bytes` longer than the chunk size are truncated.
    pub fn from_bytes(chunk_size: ChunkSize, bytes: &[u8]) -> Self {
        let mut buffer = Self::zeroed(chunk_size);
        let len = bytes.len().min(buffer.data.len());
        buffer.data[..len].copy_from_slice(&bytes[..len]);
        buffer.len = len;
        buffer
    }

    /// Number of valid bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bytes were read
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The whole chunk-sized buffer including zero padding
    pub fn padded(&self) -> &[u8] {
        &self.data
    }

    /// Digest over the padded buffer
    pub fn digest(&self) -> ChunkDigest {
        chunk_digest(&self.data)
    }
}

/// Copies one chunk from a source handle to a destination handle
#[derive(Debug, Clone, Copy)]
pub struct ChunkTransporter {
    chunk_size: ChunkSize,
}

impl ChunkTransporter {
    /// Create a transporter for the given chunk size
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }

    /// Read up to `max_len` bytes (capped at the chunk size) from `source` at `offset`
    pub fn read_chunk<R: Read + Seek + ?Sized>(
        &self,
        source: &mut R,
        offset: u64,
        max_len: usize,
    ) -> io::Result<ChunkBuffer> {
        let mut buffer = ChunkBuffer::zeroed(self.chunk_size);
        let want = max_len.min(self.chunk_size.get());

        source.seek(SeekFrom::Start(offset))?;
        buffer.len = read_full(source, &mut buffer.data[..want])?;
        Ok(buffer)
    }

    /// Write exactly the valid bytes of `chunk` to `destination` at `offset`
    pub fn write_chunk<W: Write + Seek + ?Sized>(
        &self,
        destination: &mut W,
        offset: u64,
        chunk: &ChunkBuffer,
    ) -> io::Result<()> {
        destination.seek(SeekFrom::Start(offset))?;
        destination.write_all(chunk.filled())?;
        destination.flush()
    }
}

/// Re-reads written bytes and compares them with what was read from the source
#[derive(Debug, Clone, Copy)]
pub struct ChunkVerifier {
    chunk_size: ChunkSize,
}

impl ChunkVerifier {
    /// Create a verifier for the given chunk size
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }

    /// Read back `chunk.len()` bytes from `destination` at `offset`
    pub fn read_back<R: Read + Seek + ?Sized>(
        &self,
        destination: &mut R,
        offset: u64,
        len: usize,
    ) -> io::Result<ChunkBuffer> {
        let mut buffer = ChunkBuffer::zeroed(self.chunk_size);
        let want = len.min(self.chunk_size.get());

        destination.seek(SeekFrom::Start(offset))?;
        buffer.len = read_full(destination, &mut buffer.data[..want])?;
        Ok(buffer)
    }

    /// Compare a source chunk with its read-back copy
    pub fn compare(&self, source: &ChunkBuffer, read_back: &ChunkBuffer, offset: u64) -> ChunkResult {
        let source_digest = source.digest();
        let destination_digest = read_back.digest();

        ChunkResult {
            offset,
            bytes_read: source.len(),
            source_digest,
            destination_digest,
            matched: source_digest == destination_digest,
        }
    }

    /// Read back and compare in one step
    pub fn verify_chunk<R: Read + Seek + ?Sized>(
        &self,
        destination: &mut R,
        chunk: &ChunkBuffer,
        offset: u64,
    ) -> io::Result<ChunkResult> {
        let read_back = self.read_back(destination, offset, chunk.len())?;
        Ok(self.compare(chunk, &read_back, offset))
    }
}
