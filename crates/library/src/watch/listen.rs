use crate::Context;
use crate::place::{Placement, Record, record_file};
use crate::scan::{ScanEvent, scan};
use crate::watch::{WatchCoordinator, WatchEvent};
use chapterlink_cache::Repository;
use futures::StreamExt;
use std::path::Path;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

/// Handles live notifications until `token` is cancelled or every sender is
/// gone.
///
/// A created file goes through the same [`record_file`] step a scan uses. A
/// created directory that isn't watched yet is scanned on its own, which
/// subscribes it and picks up anything written into it before the
/// subscription was in place. Paths inside the link tree are ignored.
///
/// Failures are logged and never end the loop; the next periodic pass
/// covers whatever was missed.
pub async fn listen(
    mut rx: UnboundedReceiver<WatchEvent>,
    cache: &Repository,
    ctx: &Context,
    coordinator: &WatchCoordinator,
    token: CancellationToken,
) {
    tracing::info!("listening for changes");
    loop {
        let event = tokio::select! {
            biased;
            () = token.cancelled() => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        match event {
            WatchEvent::FileCreated(path) => file_created(cache, ctx, &path).await,
            WatchEvent::DirectoryCreated(path) => directory_created(cache, ctx, coordinator, &path).await,
        }
    }
    tracing::info!("stopped listening for changes");
}

async fn file_created(cache: &Repository, ctx: &Context, path: &Path) {
    if ctx.in_target(path) {
        return;
    }
    match record_file(cache, ctx, path).await {
        Ok(Record::Placed(Placement::Linked(target))) => {
            tracing::info!(source = %path.display(), target = %target.display(), "linked new file");
        },
        Ok(Record::Placed(placement)) => {
            tracing::debug!(source = %path.display(), ?placement, "new file already in place");
        },
        Ok(Record::Known) => {},
        Err(e) => tracing::error!(path = %path.display(), error = ?e, "could not place new file"),
    }
}

async fn directory_created(cache: &Repository, ctx: &Context, coordinator: &WatchCoordinator, path: &Path) {
    if ctx.in_target(path) || coordinator.is_watched(path) {
        return;
    }
    let mut events = std::pin::pin!(scan(cache, ctx, coordinator, path.to_path_buf()));
    let mut placed = 0_u64;
    while let Some(event) = events.next().await {
        match event {
            Ok(ScanEvent::Placed(_)) => placed += 1,
            Ok(_) => {},
            Err(e) => tracing::error!(error = ?e, "error scanning new directory"),
        }
    }
    tracing::info!(path = %path.display(), placed, "scanned new directory");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use crate::watch::MockSubscriber;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    fn coordinator() -> WatchCoordinator {
        WatchCoordinator::new(MockSubscriber::new().0)
    }

    /// Feeds `events` through a closed channel, so `listen` returns once
    /// they're all handled.
    async fn feed(fx: &Fixture, coordinator: &WatchCoordinator, events: Vec<WatchEvent>) {
        let (tx, rx) = unbounded_channel();
        for event in events {
            tx.send(event).unwrap();
        }
        drop(tx);
        listen(rx, &fx.cache, &fx.ctx, coordinator, CancellationToken::new()).await;
    }

    #[tokio::test]
    async fn test_duplicate_notifications_record_once() {
        let fx = Fixture::new().await;
        let source = fx.source_file("Bleach", "Bleach 001.cbz");
        let event = WatchEvent::FileCreated(source.clone());
        feed(&fx, &coordinator(), vec![event.clone(), event]).await;

        assert_eq!(fx.cache.count().await.unwrap(), 1);
        assert!(fx.same_file(&source, &fx.target_path("Bleach/Bleach Chapter 1.cbz")));
    }

    #[tokio::test]
    async fn test_new_directory_is_scanned_and_watched() {
        let fx = Fixture::new().await;
        fx.source_file("Naruto", "Naruto c001.cbz");
        fx.source_file("Naruto", "Naruto c002.cbz");
        let dir = fx.source_root().join("Naruto");
        let coordinator = coordinator();
        feed(&fx, &coordinator, vec![WatchEvent::DirectoryCreated(dir.clone())]).await;

        assert!(coordinator.is_watched(&dir));
        assert!(!coordinator.is_watched(fx.source_root()));
        assert_eq!(fx.cache.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_watched_directory_is_not_rescanned() {
        let fx = Fixture::new().await;
        let source = fx.source_file("Naruto", "Naruto c001.cbz");
        let dir = fx.source_root().join("Naruto");
        let coordinator = coordinator();
        coordinator.watch(&dir).unwrap();
        feed(&fx, &coordinator, vec![WatchEvent::DirectoryCreated(dir)]).await;

        assert!(!fx.cache.exists(&source).await.unwrap());
    }

    #[tokio::test]
    async fn test_link_tree_is_ignored() {
        let fx = Fixture::with_target("source/links").await;
        fx.source_file("Bleach", "Bleach 001.cbz");
        let link = fx.target_path("Bleach/Bleach Chapter 1.cbz");
        std::fs::create_dir_all(link.parent().unwrap()).unwrap();
        std::fs::write(&link, b"").unwrap();
        let coordinator = coordinator();
        feed(&fx, &coordinator, vec![
            WatchEvent::DirectoryCreated(fx.target_path("Bleach")),
            WatchEvent::FileCreated(link),
        ])
        .await;

        assert_eq!(fx.cache.count().await.unwrap(), 0);
        assert!(coordinator.watched().is_empty());
    }

    #[tokio::test]
    async fn test_vanished_file_does_not_stop_the_loop() {
        let fx = Fixture::new().await;
        let gone = fx.source_root().join("Bleach/partial.cbz");
        let source = fx.source_file("Bleach", "Bleach 002.cbz");
        feed(&fx, &coordinator(), vec![WatchEvent::FileCreated(gone), WatchEvent::FileCreated(source.clone())]).await;

        assert!(fx.cache.exists(&source).await.unwrap());
        assert_eq!(fx.cache.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancellation_stops_listening() {
        let fx = Arc::new(Fixture::new().await);
        let coordinator = Arc::new(coordinator());
        let token = CancellationToken::new();
        // Keep the sender alive so only the token can end the loop.
        let (_tx, rx) = unbounded_channel();

        let task = tokio::spawn({
            let (fx, coordinator, token) = (Arc::clone(&fx), Arc::clone(&coordinator), token.clone());
            async move { listen(rx, &fx.cache, &fx.ctx, &coordinator, token).await }
        });
        token.cancel();
        let stopped = tokio::time::timeout(Duration::from_secs(5), task).await;
        assert!(matches!(stopped, Ok(Ok(()))));
    }
}
