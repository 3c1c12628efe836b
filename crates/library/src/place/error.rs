//! Error types for the [`place`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A placement error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for placement operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a placement failure.
///
/// ### Operational Errors
/// - [`ErrorKind::InvalidSource`]
/// - [`ErrorKind::Template`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Cache`]
/// - [`ErrorKind::Storage`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The source path has no file name, no parent directory, or isn't UTF-8.
    #[display("cannot derive a link name from {}", _0.display())]
    InvalidSource(#[error(not(source))] PathBuf),
    /// The [`NameGenerator`](crate::NameGenerator) could not render a path.
    Template,
    /// A lookup or insert via [`chapterlink_cache::Repository`] failed.
    Cache,
    /// Creating the series directory or the link failed.
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Cache | Self::Storage)
    }
}
