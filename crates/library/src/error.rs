//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Each operation raises its own kind on top of whatever
//! the cache or storage crates reported underneath.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("issue with link name generation from template")]
    Template,
    #[display("could not place file")]
    Place,
    #[display("maintenance failed")]
    Maintenance,
    #[display("scan failed")]
    Scan,
    #[display("could not subscribe to directory changes")]
    Watch,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Every pass starts from scratch, so failed placements and maintenance
    /// are simply retried on the next one.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Place | Self::Maintenance | Self::Scan)
    }
}
