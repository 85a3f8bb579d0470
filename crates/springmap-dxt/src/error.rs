//! Error types for springmap-dxt.

use thiserror::Error;

/// Errors produced by the DXT1 decoder.
#[derive(Debug, Error)]
pub enum Error {
    /// The compressed stream is shorter than the output dimensions require.
    #[error("DXT1 stream truncated: needed {needed} bytes but only {available} available")]
    Truncated { needed: usize, available: usize },

    /// Output dimensions must be positive multiples of 4.
    #[error("invalid DXT1 output dimensions: {width}x{height}")]
    BadDimensions { width: u32, height: u32 },
}

/// Result type for DXT1 operations.
pub type Result<T> = std::result::Result<T, Error>;
