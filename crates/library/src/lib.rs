//! Keeping the link tree in step with the source tree.
//!
//! - [`place`] links a single new source file into the target tree and
//!   records the mapping.
//! - [`maintain`] walks every recorded mapping, re-creating links that were
//!   deleted and forgetting files that are gone from both trees.
//! - [`scan`] walks the source tree, subscribing every directory to live
//!   notifications and placing every file not seen before.
//! - [`watch`] owns the set of subscribed directories and turns live
//!   notifications into the same placements a scan would make.
//!
//! Every operation is idempotent. The live watcher and the periodic passes
//! may observe the same file in any order; the mapping store's uniqueness on
//! the source path decides who wins.

pub mod error;
pub mod maintain;
pub mod place;
pub mod scan;
mod template;
#[cfg(test)]
mod testing;
pub mod watch;

pub use crate::template::{MISSING_CHAPTER, NameGenerator, NamingPolicy};
use chapterlink_storage::Ownership;
use std::path::{Path, PathBuf};

/// Everything an operation needs to know besides the store.
#[derive(Debug)]
pub struct Context {
    /// Root of the tree being mirrored.
    pub source_root: PathBuf,
    /// Root that link paths are rendered relative to.
    pub target_root: PathBuf,
    pub names: NameGenerator,
    /// Applied to created series directories and links, best-effort.
    pub ownership: Ownership,
}
impl Context {
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>, names: NameGenerator) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            names,
            ownership: Ownership::default(),
        }
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Whether `path` lies in the link tree, which is never a source of
    /// files even when it sits inside the source tree.
    pub fn in_target(&self, path: &Path) -> bool {
        path.starts_with(&self.target_root)
    }

    /// The subtree a source walk has to leave out, if any.
    pub(crate) fn excluded(&self) -> Option<PathBuf> {
        self.target_root.starts_with(&self.source_root).then(|| self.target_root.clone())
    }
}
