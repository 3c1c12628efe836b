//! Walking the source tree.
//!
//! [`scan`] covers whatever live notifications missed: files that appeared
//! while the process wasn't running, or in a directory before its
//! subscription was in place. Every directory found is handed to the
//! [`WatchCoordinator`], and every file goes through
//! [`record_file`](crate::place::record_file).

use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::place::{Placement, Record, record_file};
use crate::watch::WatchCoordinator;
use async_stream::stream;
use chapterlink_cache::Repository;
use chapterlink_storage::{Entry, walk};
use futures::Stream;
use std::path::PathBuf;

/// Progress events emitted by [`scan`].
///
/// [`Started`](Self::Started) comes first and [`Complete`](Self::Complete)
/// last; everything in between follows the walk. Unreadable directories and
/// failed placements are yielded as `Err` items without ending the scan.
#[derive(Debug)]
pub enum ScanEvent {
    Started,
    /// A directory was subscribed to live notifications for the first time.
    Watched(PathBuf),
    /// A file the store didn't know yet was placed.
    Placed(Placement),
    /// A file the store already knew was skipped.
    Known(PathBuf),
    Complete,
}

/// Streams [`ScanEvent`]s while walking the tree under `root`.
///
/// `root` is normally the source root; a newly created directory is scanned
/// on its own so its files don't wait for the next periodic pass. The link
/// tree is skipped when it lives inside the source tree.
pub fn scan<'a>(
    cache: &'a Repository,
    ctx: &'a Context,
    coordinator: &'a WatchCoordinator,
    root: PathBuf,
) -> impl Stream<Item = LibraryResult<ScanEvent>> + 'a {
    stream!({
        tracing::info!(root = %root.display(), "scanning");
        yield Ok(ScanEvent::Started);
        for await entry in walk(root, ctx.excluded()) {
            match entry {
                Ok(Entry::Directory(dir)) => {
                    tracing::debug!(path = %dir.display(), "scanning directory");
                    match coordinator.watch(&dir) {
                        Ok(true) => yield Ok(ScanEvent::Watched(dir)),
                        Ok(false) => {},
                        Err(e) => yield Err(e.raise(LibraryErrorKind::Scan)),
                    }
                },
                Ok(Entry::File(file)) => match record_file(cache, ctx, &file).await {
                    Ok(Record::Placed(placement)) => yield Ok(ScanEvent::Placed(placement)),
                    Ok(Record::Known) => yield Ok(ScanEvent::Known(file)),
                    Err(e) => yield Err(e.raise(LibraryErrorKind::Scan)),
                },
                Err(e) => yield Err(e.raise(LibraryErrorKind::Scan)),
            }
        }
        yield Ok(ScanEvent::Complete);
    })
}
