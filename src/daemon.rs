//! The control loop: a maintenance pass and a scan, on repeat, while live
//! notifications are handled alongside.

use crate::error::{ErrorKind, Result};
use chapterlink_cache::Repository;
use chapterlink_library::Context;
use chapterlink_library::maintain::{Action, MaintenanceEvent, maintenance};
use chapterlink_library::place::Placement;
use chapterlink_library::scan::{ScanEvent, scan};
use chapterlink_library::watch::{NotifySubscriber, Subscriber, WatchCoordinator, WatchEvent, listen};
use exn::ResultExt;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

/// What a single pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub mappings: u64,
    pub relinked: u64,
    pub removed: u64,
    pub orphaned: u64,
    pub placed: u64,
    pub watched: u64,
    pub errors: u64,
}

/// Runs until `token` is cancelled, with native change notifications.
pub async fn run(cache: Repository, ctx: Arc<Context>, interval: Duration, token: CancellationToken) -> Result<()> {
    let (subscriber, rx) = NotifySubscriber::new().or_raise(|| ErrorKind::Watch)?;
    run_with(cache, ctx, subscriber, rx, interval, token).await;
    Ok(())
}

/// The loop behind [`run`], for any subscriber and its notifications.
pub async fn run_with(
    cache: Repository,
    ctx: Arc<Context>,
    subscriber: impl Subscriber + 'static,
    rx: UnboundedReceiver<WatchEvent>,
    interval: Duration,
    token: CancellationToken,
) {
    let coordinator = Arc::new(WatchCoordinator::new(subscriber));
    let listener = tokio::spawn({
        let (cache, ctx, coordinator, token) = (cache.clone(), Arc::clone(&ctx), Arc::clone(&coordinator), token.clone());
        async move { listen(rx, &cache, &ctx, &coordinator, token).await }
    });

    loop {
        pass(&cache, &ctx, &coordinator).await;
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            () = tokio::time::sleep(interval) => {},
        }
    }

    // The listener also stops on its own once its channel closes.
    token.cancel();
    if let Err(e) = listener.await {
        tracing::error!(error = %e, "listener task failed");
    }
    coordinator.shutdown();
    tracing::info!("stopped");
}

/// A single pass without subscribing anything, for one-shot runs.
pub async fn once(cache: &Repository, ctx: &Context) -> Summary {
    let coordinator = WatchCoordinator::new(Unwatched);
    pass(cache, ctx, &coordinator).await
}

/// Maintenance first, so links deleted since the last pass come back before
/// the scan looks for new files.
pub async fn pass(cache: &Repository, ctx: &Context, coordinator: &WatchCoordinator) -> Summary {
    let mut summary = Summary::default();

    let mut events = std::pin::pin!(maintenance(cache, ctx));
    while let Some(event) = events.next().await {
        match event {
            Ok(MaintenanceEvent::DiscoveryComplete(count)) => summary.mappings = count,
            Ok(MaintenanceEvent::Maintained(Action::Relinked(_))) => summary.relinked += 1,
            Ok(MaintenanceEvent::Maintained(Action::Removed(_))) => summary.removed += 1,
            Ok(MaintenanceEvent::Maintained(Action::Orphaned(_))) => summary.orphaned += 1,
            Ok(_) => {},
            Err(e) => {
                summary.errors += 1;
                tracing::error!(error = ?e, "maintenance error");
            },
        }
    }

    let mut events = std::pin::pin!(scan(cache, ctx, coordinator, ctx.source_root.clone()));
    while let Some(event) = events.next().await {
        match event {
            Ok(ScanEvent::Placed(Placement::Linked(_) | Placement::AlreadyLinked(_))) => summary.placed += 1,
            Ok(ScanEvent::Watched(_)) => summary.watched += 1,
            Ok(_) => {},
            Err(e) => {
                summary.errors += 1;
                tracing::error!(error = ?e, "scan error");
            },
        }
    }

    tracing::info!(
        mappings = summary.mappings,
        relinked = summary.relinked,
        removed = summary.removed,
        orphaned = summary.orphaned,
        placed = summary.placed,
        watched = summary.watched,
        errors = summary.errors,
        "pass complete"
    );
    summary
}

/// Accepts every subscription and never delivers anything.
struct Unwatched;
impl Subscriber for Unwatched {
    fn subscribe(&mut self, _: &std::path::Path) -> chapterlink_library::error::Result<()> {
        Ok(())
    }

    fn unsubscribe(&mut self, _: &std::path::Path) -> chapterlink_library::error::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapterlink_cache::Database;
    use chapterlink_library::watch::MockSubscriber;
    use chapterlink_library::{NameGenerator, NamingPolicy};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tokio::sync::mpsc::unbounded_channel;

    struct Trees {
        _dir: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    fn trees() -> Trees {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let (source, target) = (root.join("source"), root.join("target"));
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(&target).unwrap();
        Trees { _dir: dir, source, target }
    }

    fn chapter(source: &Path, series: &str, name: &str) -> PathBuf {
        let path = source.join(series).join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"pages").unwrap();
        path
    }

    async fn setup(trees: &Trees) -> (Repository, Arc<Context>) {
        let db = Database::connect_in_memory().await.unwrap();
        let names = NameGenerator::from_policy(NamingPolicy::default()).unwrap();
        (Repository::from(&db), Arc::new(Context::new(&trees.source, &trees.target, names)))
    }

    #[tokio::test]
    async fn test_passes_heal_and_place() {
        let trees = trees();
        let (cache, ctx) = setup(&trees).await;
        chapter(&trees.source, "Bleach", "Bleach 001.cbz");

        let first = once(&cache, &ctx).await;
        assert_eq!(first, Summary { placed: 1, watched: 2, ..Summary::default() });

        std::fs::remove_file(trees.target.join("Bleach/Bleach Chapter 1.cbz")).unwrap();
        chapter(&trees.source, "Bleach", "Bleach 002.cbz");
        let second = once(&cache, &ctx).await;
        assert_eq!(second, Summary { mappings: 1, relinked: 1, placed: 1, watched: 2, ..Summary::default() });
        assert!(trees.target.join("Bleach/Bleach Chapter 1.cbz").exists());
        assert!(trees.target.join("Bleach/Bleach Chapter 2.cbz").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_loop_handles_notifications_until_cancelled() {
        let trees = trees();
        let (cache, ctx) = setup(&trees).await;
        let (subscriber, subscribed) = MockSubscriber::new();
        let (tx, rx) = unbounded_channel();
        let token = CancellationToken::new();
        let daemon = tokio::spawn(run_with(
            cache.clone(),
            Arc::clone(&ctx),
            subscriber,
            rx,
            Duration::from_secs(3600),
            token.clone(),
        ));

        // Arrives between periodic passes.
        let source = chapter(&trees.source, "Naruto", "Naruto - v01 - c003.cbz");
        tx.send(WatchEvent::FileCreated(source.clone())).unwrap();
        let recorded = tokio::time::timeout(Duration::from_secs(5), async {
            while !cache.exists(&source).await.unwrap() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(recorded.is_ok());
        assert!(trees.target.join("Naruto/Naruto Chapter 3.cbz").exists());

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), daemon).await.unwrap().unwrap();
        // Everything watched was released on the way out.
        assert!(subscribed.lock().unwrap().is_empty());
    }
}
