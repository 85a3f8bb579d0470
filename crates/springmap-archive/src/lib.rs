//! Spring map archive handling.
//!
//! Map archives come in two containers, told apart by suffix:
//!
//! - `.sdz` - a standard ZIP archive, read by the in-crate [`SdzArchive`]
//!   (store and DEFLATE entries);
//! - `.sd7` - a 7z archive, delegated to the `sevenz-rust` crate.
//!
//! [`extract`] unpacks either kind into a scoped temporary directory whose
//! lifetime guarantees cleanup on every exit path, and [`locate_map_files`]
//! finds the conventional archive contents (one `.smf`, one `.smt`,
//! optional `.smd`, optional `mapinfo.lua`, optional `maps/*.dds`
//! resources) below it.
//!
//! # Example
//!
//! ```no_run
//! use springmap_archive::{extract, locate_map_files};
//!
//! let extracted = extract("maps/red_comet.sd7")?;
//! let files = locate_map_files(extracted.path())?;
//! println!("SMF: {:?}", files.smf);
//! # Ok::<(), springmap_archive::Error>(())
//! ```

mod error;
mod extract;
mod locate;
mod sdz;
pub mod zip;

pub use error::{Error, Result};
pub use extract::{extract, ArchiveKind, ExtractedArchive};
pub use locate::{locate_map_files, MapFiles};
pub use sdz::{SdzArchive, SdzEntry};

#[doc(hidden)]
pub use sdz::testdata;
