use crate::error::Result;
use crate::watch::Subscriber;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct State {
    subscriber: Box<dyn Subscriber>,
    watched: HashSet<PathBuf>,
}

/// Owns the set of directories subscribed to live notifications.
///
/// Directories only ever move from unwatched to watched. The set is shared by
/// the control loop (through scans) and the notification listener, so every
/// method takes `&self`; the lock is never held across an `.await`.
pub struct WatchCoordinator {
    state: Mutex<State>,
}
impl WatchCoordinator {
    pub fn new(subscriber: impl Subscriber + 'static) -> Self {
        Self {
            state: Mutex::new(State { subscriber: Box::new(subscriber), watched: HashSet::new() }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every update is a single insert or drain.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes `dir` unless it already is.
    ///
    /// Returns `true` if the directory was newly subscribed. A failed
    /// subscription leaves it unwatched, so the next scan tries again.
    pub fn watch(&self, dir: &Path) -> Result<bool> {
        let mut state = self.lock();
        if state.watched.contains(dir) {
            return Ok(false);
        }
        state.subscriber.subscribe(dir)?;
        state.watched.insert(dir.to_path_buf());
        tracing::debug!(path = %dir.display(), "watching directory");
        Ok(true)
    }

    pub fn is_watched(&self, dir: &Path) -> bool {
        self.lock().watched.contains(dir)
    }

    /// Every watched directory, sorted.
    pub fn watched(&self) -> Vec<PathBuf> {
        let mut watched: Vec<_> = self.lock().watched.iter().cloned().collect();
        watched.sort();
        watched
    }

    /// Releases every subscription.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        let State { subscriber, watched } = &mut *state;
        for dir in watched.drain() {
            if let Err(e) = subscriber.unsubscribe(&dir) {
                // Usually the directory was deleted, taking its subscription with it.
                tracing::debug!(path = %dir.display(), error = %e, "could not unsubscribe");
            }
        }
        tracing::debug!("released all directory subscriptions");
    }
}
