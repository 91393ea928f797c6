//! Opening and preparing the files a transfer works on

use chunkcp_types::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::debug;

fn source_error(path: &Path, error: &io::Error) -> Error {
    if error.kind() == io::ErrorKind::NotFound {
        Error::SourceNotFound {
            path: path.to_path_buf(),
        }
    } else {
        Error::SourceUnreadable {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Stat and open the source once, returning its size in bytes
pub async fn inspect_source<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| source_error(path, &e))?;

    if !metadata.is_file() {
        return Err(Error::SourceUnreadable {
            path: path.to_path_buf(),
            message: "not a regular file".to_string(),
        });
    }

    tokio::fs::File::open(path)
        .await
        .map_err(|e| source_error(path, &e))?;

    debug!("Source {} is {} bytes", path.display(), metadata.len());
    Ok(metadata.len())
}

/// Create the destination if needed and size it to exactly `file_size` bytes
///
/// Never truncates below `file_size`, so a destination that already holds a
/// full-length copy keeps its bytes until the workers overwrite them.
pub async fn prepare_destination<P: AsRef<Path>>(path: P, file_size: u64) -> Result<()> {
    let path = path.as_ref();
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .map_err(|e| Error::destination_write(path, 0, &e))?;

    file.set_len(file_size)
        .await
        .map_err(|e| Error::destination_write(path, file_size, &e))?;

    debug!("Prepared destination {} at {} bytes", path.display(), file_size);
    Ok(())
}

/// Open a read-only source handle for one worker
pub fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| source_error(path, &e))
}

/// Open a read-write destination handle for one worker
///
/// Open-or-create, never truncate: other workers may already have written.
pub fn open_destination(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::destination_write(path, 0, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_inspect_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.bin");
        std::fs::write(&source, vec![7u8; 1234]).unwrap();

        assert_eq!(inspect_source(&source).await.unwrap(), 1234);

        let missing = inspect_source(temp_dir.path().join("missing.bin")).await;
        assert!(matches!(missing, Err(Error::SourceNotFound { .. })));

        let directory = inspect_source(temp_dir.path()).await;
        assert!(matches!(directory, Err(Error::SourceUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_prepare_destination_sets_exact_length() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("dest.bin");

        prepare_destination(&destination, 4096).await.unwrap();
        assert_eq!(std::fs::metadata(&destination).unwrap().len(), 4096);

        std::fs::write(&destination, vec![1u8; 10_000]).unwrap();
        prepare_destination(&destination, 100).await.unwrap();
        assert_eq!(std::fs::metadata(&destination).unwrap().len(), 100);
    }

    #[test]
    fn test_open_destination_keeps_existing_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("dest.bin");
        std::fs::write(&destination, b"already here").unwrap();

        drop(open_destination(&destination).unwrap());
        assert_eq!(std::fs::read(&destination).unwrap(), b"already here");
    }
}
