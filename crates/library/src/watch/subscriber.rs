use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// A notification the rest of the crate cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    FileCreated(PathBuf),
    DirectoryCreated(PathBuf),
}

/// Subscribes single directories to change notifications.
pub trait Subscriber: Send {
    /// Start delivering notifications for direct children of `dir`.
    fn subscribe(&mut self, dir: &Path) -> Result<()>;
    fn unsubscribe(&mut self, dir: &Path) -> Result<()>;
}

/// [`Subscriber`] backed by the platform's native notification API.
///
/// Notifications arrive on a background thread owned by `notify` and are
/// forwarded, already classified, into an unbounded channel.
pub struct NotifySubscriber {
    watcher: RecommendedWatcher,
}
impl NotifySubscriber {
    /// Create the watcher and the receiving end of its notifications.
    pub fn new() -> Result<(Self, UnboundedReceiver<WatchEvent>)> {
        let (tx, rx) = unbounded_channel();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => forward(&tx, event),
            Err(e) => tracing::warn!(error = %e, paths = ?e.paths, "change notification error"),
        })
        .or_raise(|| ErrorKind::Watch)?;
        Ok((Self { watcher }, rx))
    }
}
impl Subscriber for NotifySubscriber {
    fn subscribe(&mut self, dir: &Path) -> Result<()> {
        self.watcher.watch(dir, RecursiveMode::NonRecursive).or_raise(|| ErrorKind::Watch)
    }

    fn unsubscribe(&mut self, dir: &Path) -> Result<()> {
        self.watcher.unwatch(dir).or_raise(|| ErrorKind::Watch)
    }
}

fn forward(tx: &UnboundedSender<WatchEvent>, event: Event) {
    for event in classify(event) {
        // The receiver only goes away on shutdown.
        if tx.send(event).is_err() {
            return;
        }
    }
}

/// Picks creations out of a raw notification.
///
/// Anything moved *into* a watched directory counts as created there. When
/// the backend doesn't say whether a path is a file or a directory, the path
/// is looked at; if it's already gone, it's dropped.
pub(crate) fn classify(event: Event) -> Vec<WatchEvent> {
    let paths = match event.kind {
        EventKind::Create(CreateKind::File) => {
            return event.paths.into_iter().map(WatchEvent::FileCreated).collect();
        },
        EventKind::Create(CreateKind::Folder) => {
            return event.paths.into_iter().map(WatchEvent::DirectoryCreated).collect();
        },
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths,
        // Both old and new path, in that order.
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event.paths.into_iter().last().into_iter().collect(),
        _ => return Vec::new(),
    };
    paths.into_iter().filter_map(by_stat).collect()
}

fn by_stat(path: PathBuf) -> Option<WatchEvent> {
    match std::fs::symlink_metadata(&path) {
        Ok(meta) if meta.is_dir() => Some(WatchEvent::DirectoryCreated(path)),
        Ok(meta) if meta.is_file() => Some(WatchEvent::FileCreated(path)),
        _ => None,
    }
}
