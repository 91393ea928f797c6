//! Whole-file verification with a strong, streaming digest

use chunkcp_types::{DigestAlgorithm, Error, FileDigest, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Default read block size for streaming digests (1MB)
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

enum StrongHasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StrongHasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Sha256(hasher) => hasher.update(bytes),
            Self::Blake3(hasher) => {
                hasher.update(bytes);
            }
        }
    }

    fn finalize(self) -> FileDigest {
        match self {
            Self::Sha256(hasher) => FileDigest::new(hasher.finalize().to_vec()),
            Self::Blake3(hasher) => FileDigest::new(hasher.finalize().as_bytes().to_vec()),
        }
    }
}

/// Digests of both files and whether they match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileComparison {
    /// Digest of the source file
    pub source: FileDigest,
    /// Digest of the destination file
    pub destination: FileDigest,
    /// Whether the digests are byte-for-byte equal
    pub matched: bool,
}

/// Compares two files through a strong digest without loading either into memory
#[derive(Debug, Clone, Copy)]
pub struct WholeFileVerifier {
    algorithm: DigestAlgorithm,
    block_size: usize,
}

impl WholeFileVerifier {
    /// Create a verifier using `algorithm`
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Use a different read block size
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Digest algorithm in use
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Stream `path` through the digest
    pub async fn digest_file<P: AsRef<Path>>(&self, path: P) -> Result<FileDigest> {
        let path = path.as_ref();
        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            Error::io(format!("Failed to open '{}' for digest: {}", path.display(), e))
        })?;

        let mut hasher = StrongHasher::new(self.algorithm);
        let mut buffer = vec![0u8; self.block_size];
        let mut total = 0u64;

        loop {
            let n = file.read(&mut buffer).await.map_err(|e| {
                Error::io(format!("Failed to read '{}' for digest: {}", path.display(), e))
            })?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            total += n as u64;
        }

        let digest = hasher.finalize();
        debug!("{} digest of {} ({} bytes): {}", self.algorithm, path.display(), total, digest);
        Ok(digest)
    }

    /// Digest both files concurrently and compare the results
    pub async fn compare<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        source: S,
        destination: D,
    ) -> Result<FileComparison> {
        let (source, destination) = tokio::try_join!(
            self.digest_file(source.as_ref()),
            self.digest_file(destination.as_ref())
        )?;
        let matched = source.as_bytes() == destination.as_bytes();

        info!("source checksum: {}", source);
        info!("destination checksum: {}", destination);

        Ok(FileComparison {
            source,
            destination,
            matched,
        })
    }
}

impl Default for WholeFileVerifier {
    fn default() -> Self {
        Self::new(DigestAlgorithm::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sha256_known_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        let digest = WholeFileVerifier::default().digest_file(&path).await.unwrap();
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[rstest]
    #[case(DigestAlgorithm::Sha256)]
    #[case(DigestAlgorithm::Blake3)]
    #[tokio::test]
    async fn test_compare(#[case] algorithm: DigestAlgorithm) {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.bin");
        let b = temp_dir.path().join("b.bin");
        let c = temp_dir.path().join("c.bin");
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&a, &data).unwrap();
        std::fs::write(&b, &data).unwrap();
        let mut other = data.clone();
        other[9_999] ^= 1;
        std::fs::write(&c, &other).unwrap();

        // Small blocks force several reads per file.
        let verifier = WholeFileVerifier::new(algorithm).with_block_size(333);

        let same = verifier.compare(&a, &b).await.unwrap();
        assert!(same.matched);
        assert_eq!(same.source, same.destination);
        assert_eq!(same.source.as_bytes().len(), 32);

        let different = verifier.compare(&a, &c).await.unwrap();
        assert!(!different.matched);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = WholeFileVerifier::default()
            .digest_file(temp_dir.path().join("missing"))
            .await;
        assert!(result.is_err());
    }
}
