//! Spring map metadata parsing.
//!
//! Maps describe themselves in one of two dialects:
//!
//! - `mapinfo.lua`, a `return { ... }` Lua table expression, parsed here by
//!   a small hand-written lexer and recursive-descent parser (no Lua
//!   runtime, no regexes);
//! - the legacy `.smd` format, a loose `Key=Value;` text scanned for pairs.
//!
//! Both produce a [`Value`] dictionary. Parsing is deliberately tolerant:
//! a malformed mapinfo field is skipped, not fatal, because maps in the
//! wild routinely carry small syntax accidents.

mod error;
mod lua;
mod smd;
mod value;

pub use error::{Error, Result};
pub use lua::parse_mapinfo;
pub use smd::parse_smd;
pub use value::Value;
