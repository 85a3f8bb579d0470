//! Error types for SMF parsing.

use thiserror::Error;

/// Errors that can occur when parsing an SMF file.
#[derive(Debug, Error)]
pub enum Error {
    /// The 16-byte magic prefix is not "spring map file\0".
    #[error("not a spring map file: bad magic {actual:?}")]
    NotASpringMap { actual: Vec<u8> },

    /// Map dimensions must be positive multiples of 128.
    #[error("not a spring map file: invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// A declared region offset points outside the buffer.
    #[error("declared {region} region at offset {offset} (+{len}) exceeds {available}-byte buffer")]
    BadOffset {
        region: &'static str,
        offset: usize,
        len: usize,
        available: usize,
    },

    /// An extra header declares a size smaller than its own fixed fields.
    #[error("malformed extra header: declared size {0}")]
    MalformedExtraHeader(i32),

    /// Truncated or malformed reads.
    #[error("{0}")]
    Common(#[from] springmap_common::Error),

    /// Minimap DXT1 decode failure.
    #[error("minimap decode failed: {0}")]
    Dxt(#[from] springmap_dxt::Error),
}

/// Result type for SMF operations.
pub type Result<T> = std::result::Result<T, Error>;
