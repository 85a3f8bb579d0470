//! Top-level error type for the parsing pipeline.

use thiserror::Error;

/// Errors surfaced by [`parse_map`](crate::parse_map).
///
/// Two failure classes never appear here because they are recovered
/// locally: single-tile decode failures (opaque-black tile) and metadata
/// parse failures (omitted dictionary). Everything else is surfaced, after
/// the temporary extraction directory has been cleaned up.
#[derive(Debug, Error)]
pub enum Error {
    /// The input path does not carry a `.sd7`/`.sdz` suffix.
    #[error("not a spring map archive: {0}")]
    NotASpringArchive(String),

    /// The archive collaborator failed to extract or walk the archive.
    #[error("archive extraction failed: {0}")]
    Archive(#[from] springmap_archive::Error),

    /// The archive contains no `.smf` map file.
    #[error("archive contains no .smf map file")]
    MissingSmf,

    /// The archive contains no `.smt` tile file.
    #[error("archive contains no .smt tile file")]
    MissingSmt,

    /// SMF parse failure (bad magic, truncation, bad region offsets).
    #[error(transparent)]
    Smf(#[from] springmap_smf::Error),

    /// SMT parse failure (bad magic, truncation).
    #[error(transparent)]
    Smt(#[from] springmap_smt::Error),

    /// Skybox DDS failure (bad magic, unsupported format).
    #[error("skybox: {0}")]
    Dds(#[from] springmap_dds::Error),

    /// I/O error reading extracted files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
