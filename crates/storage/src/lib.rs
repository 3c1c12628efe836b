//! Filesystem primitives used to build and repair the link tree.
//!
//! Everything here works on absolute paths on the local filesystem, except
//! [`validate_path`] which checks rendered paths *relative* to the target root
//! before they are joined onto it.

pub mod error;
mod link;
mod ownership;
mod path;
mod walk;

pub use crate::link::{ensure_dir, exists, hard_link};
pub use crate::ownership::Ownership;
pub use crate::path::validate as validate_path;
pub use crate::walk::{Entry, EntryStream, walk};
