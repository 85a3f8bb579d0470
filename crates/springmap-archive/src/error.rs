//! Error types for archive handling.

use thiserror::Error;

/// Errors that can occur when extracting map archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] springmap_common::Error),

    /// The file suffix is neither `.sd7` nor `.sdz`.
    #[error("unrecognized archive suffix: {0:?}")]
    UnrecognizedSuffix(Option<String>),

    /// Invalid ZIP record signature.
    #[error("invalid ZIP signature: expected {expected:#010x}, got {actual:#010x}")]
    InvalidSignature { expected: u32, actual: u32 },

    /// Could not find the end of central directory record.
    #[error("could not find end of central directory record")]
    EocdNotFound,

    /// Unsupported compression method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// An entry path escapes the extraction directory.
    #[error("entry path escapes extraction directory: {0}")]
    UnsafeEntryPath(String),

    /// 7z extraction failure.
    #[error("7z extraction failed: {0}")]
    SevenZip(String),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
