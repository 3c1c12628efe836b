//! Healing and pruning recorded mappings.
//!
//! [`maintenance`] streams one [`Action`] per recorded mapping, decided by
//! which of the two paths still exist:
//!
//! | source  | target  | action                                  |
//! |---------|---------|-----------------------------------------|
//! | exists  | missing | [`Action::Relinked`], the link is rebuilt |
//! | missing | missing | [`Action::Removed`], the row is deleted |
//! | missing | exists  | [`Action::Orphaned`], left alone        |
//! | exists  | exists  | [`Action::Intact`]                      |
//!
//! Running it twice with no filesystem changes in between mutates nothing
//! the second time.

mod file;
mod stream;

pub use self::file::{Action, maintain_mapping};
pub use self::stream::{MaintenanceEvent, maintenance};
