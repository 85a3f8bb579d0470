//! Common utilities for the springmap crates.
//!
//! This crate provides foundational types used across the workspace:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`Raster`] - An owned RGBA8 image buffer with exact-size guarantees
//! - [`Error`] - Shared error kinds for binary parsing

mod error;
mod raster;
mod reader;

pub use error::{Error, Result};
pub use raster::Raster;
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
