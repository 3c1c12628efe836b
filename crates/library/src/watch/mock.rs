//! Subscriber for tests.

use crate::error::{ErrorKind, Result};
use crate::watch::Subscriber;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// [`Subscriber`] that records subscriptions without touching the OS.
///
/// Nothing is ever delivered; tests push [`WatchEvent`](crate::watch::WatchEvent)s
/// into the listener's channel themselves.
#[derive(Debug, Default)]
pub struct MockSubscriber {
    subscribed: Arc<Mutex<Vec<PathBuf>>>,
    failing: HashSet<PathBuf>,
}
impl MockSubscriber {
    /// The subscriber, and a handle onto the directories it currently has
    /// subscribed, in subscription order.
    pub fn new() -> (Self, Arc<Mutex<Vec<PathBuf>>>) {
        let subscriber = Self::default();
        let subscribed = Arc::clone(&subscriber.subscribed);
        (subscriber, subscribed)
    }

    /// Make subscribing `dir` fail, as if it had been removed.
    pub fn failing_on(mut self, dir: impl Into<PathBuf>) -> Self {
        self.failing.insert(dir.into());
        self
    }

    fn subscribed(&self) -> std::sync::MutexGuard<'_, Vec<PathBuf>> {
        self.subscribed.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
impl Subscriber for MockSubscriber {
    fn subscribe(&mut self, dir: &Path) -> Result<()> {
        if self.failing.contains(dir) {
            exn::bail!(ErrorKind::Watch);
        }
        self.subscribed().push(dir.to_path_buf());
        Ok(())
    }

    fn unsubscribe(&mut self, dir: &Path) -> Result<()> {
        self.subscribed().retain(|d| d != dir);
        Ok(())
    }
}
