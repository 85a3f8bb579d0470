//! Error types for DDS handling.

use thiserror::Error;

/// Errors that can occur when working with DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (truncation, bad reads).
    #[error("{0}")]
    Common(#[from] springmap_common::Error),

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// The pixel format is not one this crate can decode.
    #[error("unsupported DDS pixel format: {0}")]
    UnsupportedFormat(String),

    /// The file does not contain the six cubemap faces.
    #[error("DDS file is not a six-face cubemap (caps2 = {caps2:#010x})")]
    NotACubemap { caps2: u32 },

    /// A declared face or mip region does not fit in the buffer.
    #[error("DDS data region out of bounds: {offset}+{len} exceeds {available}")]
    RegionOutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    /// DXT1 payload decode failure.
    #[error("DXT1 decode failed: {0}")]
    Dxt(#[from] springmap_dxt::Error),
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
