//! Error types and handling for chunkcp
//!
//! Chunk-level digest mismatches are deliberately absent from this module: they
//! are retried and then tolerated by the worker loop, and a whole-file mismatch
//! is reported through [`crate::TransferOutcome::success`]. Everything here is
//! fatal for the transfer that raised it.

use std::path::PathBuf;

/// Main error type for chunkcp operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// An unrecognized transfer mode was requested
    #[error("Invalid transfer mode: {mode}")]
    InvalidMode {
        /// The mode string or menu choice that failed to parse
        mode: String,
    },

    /// Source file does not exist
    #[error("Source file not found: {path}")]
    SourceNotFound {
        /// Path to the missing source file
        path: PathBuf,
    },

    /// Source file exists but cannot be read
    #[error("Source file unreadable: {path}: {message}")]
    SourceUnreadable {
        /// Path to the source file
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// Seek, write or read-back on the destination failed
    #[error("Destination write failed at offset {offset} in {path}: {message}")]
    DestinationWrite {
        /// Destination file path
        path: PathBuf,
        /// Byte offset of the chunk being written
        offset: u64,
        /// Underlying failure
        message: String,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// A worker returned an error; reported after all workers joined
    #[error("Worker {worker} failed: {source}")]
    WorkerFailed {
        /// Index of the failing worker
        worker: usize,
        /// The error the worker returned
        #[source]
        source: Box<Error>,
    },

    /// A worker thread panicked
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Index of the failing worker
        worker: usize,
        /// Panic or join failure description
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input rejected before any I/O
    Input,
    /// Source side failures
    Source,
    /// Destination side failures
    Destination,
    /// Other I/O failures
    Io,
    /// Worker failures
    Worker,
    /// Configuration errors
    Config,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMode { .. } => ErrorKind::Input,
            Self::SourceNotFound { .. } | Self::SourceUnreadable { .. } => ErrorKind::Source,
            Self::DestinationWrite { .. } => ErrorKind::Destination,
            Self::Io { .. } => ErrorKind::Io,
            Self::WorkerFailed { .. } | Self::WorkerPanicked { .. } => ErrorKind::Worker,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Check whether the error was raised before any destination byte was written
    pub fn is_pre_transfer(&self) -> bool {
        matches!(self.kind(), ErrorKind::Input | ErrorKind::Source | ErrorKind::Config)
    }

    /// Unwrap a [`Error::WorkerFailed`] down to the error the worker returned
    pub fn root(&self) -> &Error {
        match self {
            Self::WorkerFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Create a new invalid mode error
    pub fn invalid_mode<S: Into<String>>(mode: S) -> Self {
        Self::InvalidMode { mode: mode.into() }
    }

    /// Create a new destination write error
    pub fn destination_write(path: impl Into<PathBuf>, offset: u64, error: &std::io::Error) -> Self {
        Self::DestinationWrite {
            path: path.into(),
            offset,
            message: error.to_string(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_mode("4"), ErrorKind::Input, true)]
    #[case(Error::SourceNotFound { path: "/missing".into() }, ErrorKind::Source, true)]
    #[case(Error::config("chunk size"), ErrorKind::Config, true)]
    #[case(Error::io("disk gone"), ErrorKind::Io, false)]
    #[case(
        Error::WorkerPanicked { worker: 1, message: "boom".into() },
        ErrorKind::Worker,
        false
    )]
    fn test_error_kind(#[case] error: Error, #[case] kind: ErrorKind, #[case] pre_transfer: bool) {
        assert_eq!(error.kind(), kind);
        assert_eq!(error.is_pre_transfer(), pre_transfer);
    }

    #[test]
    fn test_worker_failed_root() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no space left");
        let inner = Error::destination_write("/tmp/dest.bin", 4096, &io);
        let error = Error::WorkerFailed {
            worker: 1,
            source: Box::new(inner),
        };

        assert_eq!(error.kind(), ErrorKind::Worker);
        assert_eq!(error.root().kind(), ErrorKind::Destination);
        assert!(error.to_string().contains("offset 4096"));
        assert!(error.to_string().contains("no space left"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test file");
        let error = Error::from(io_error);

        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(error.to_string().contains("test file"));
    }
}
