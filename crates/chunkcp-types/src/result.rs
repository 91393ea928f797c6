//! Result type alias for chunkcp operations

use crate::Error;

/// Result type alias for chunkcp operations
pub type Result<T> = std::result::Result<T, Error>;
