//! Linking new source files into the target tree.
//!
//! [`place_file`] is the single place a mapping is ever created. It derives
//! the link path from the file's series directory and filename, creates the
//! hardlink and records `(source, target)`. A link that already exists is not
//! an error and neither is losing the race to record the same source: both
//! mean another caller (or an earlier run) already did the work.
//!
//! [`record_file`] puts the store membership check in front, which is what
//! scans and live notifications use.

pub mod error;
mod file;

pub use self::file::{Placement, Record, place_file, record_file};
pub(crate) use self::file::link_into_place;
