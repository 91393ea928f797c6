//! chunkcp integration test support
//!
//! Shared fixtures for the cross-crate scenarios in `tests/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Data generators, scratch files and a recording observer used across
/// the integration tests.
pub mod test_utils;
