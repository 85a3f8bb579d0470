//! Error types for metadata parsing.

use thiserror::Error;

/// Errors that can occur when parsing metadata.
#[derive(Debug, Error)]
pub enum Error {
    /// Unrecoverable syntax error (the table structure itself is broken).
    #[error("metadata parse error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The input is not a `return { ... }` table expression.
    #[error("mapinfo is not a table expression")]
    NotATable,
}

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;
