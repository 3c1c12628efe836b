//! SQLite store for source to link path mappings.
//!
//! Every source file that has been linked into the target tree gets exactly
//! one row recording where its link lives. The store is what lets the link
//! tree survive restarts: a file with a row is never processed again, and
//! maintenance passes walk the rows to re-create deleted links or forget
//! files that have vanished entirely.
//!
//! # Concurrency
//! The live watcher and the periodic scan may both try to record the same new
//! file. The primary key on the source path is the final arbiter: the losing
//! insert fails with [`ErrorKind::DuplicateKey`](crate::error::ErrorKind::DuplicateKey),
//! which callers treat as "already handled".

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::Mapping;
pub use crate::repo::Repository;
