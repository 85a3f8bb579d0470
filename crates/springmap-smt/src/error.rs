//! Error types for SMT parsing.

use thiserror::Error;

/// Errors that can occur when parsing an SMT file.
///
/// Individual tile-decode failures are not errors; they are recovered
/// locally with opaque-black tiles and reported through
/// [`TileCatalog::failed_tiles`](crate::TileCatalog::failed_tiles).
#[derive(Debug, Error)]
pub enum Error {
    /// The 16-byte magic prefix is not "spring tilefile\0".
    #[error("not a spring tile file: bad magic {actual:?}")]
    NotASpringTileFile { actual: Vec<u8> },

    /// Truncated or malformed reads.
    #[error("{0}")]
    Common(#[from] springmap_common::Error),
}

/// Result type for SMT operations.
pub type Result<T> = std::result::Result<T, Error>;
