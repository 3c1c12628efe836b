use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::maintain::file::{Action, maintain_mapping};
use async_stream::stream;
use chapterlink_cache::Repository;
use exn::ResultExt;
use futures::Stream;

/// Progress events emitted by [`maintenance`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of recorded mappings.
/// 3. [`Maintained`](Self::Maintained): once per mapping that didn't fail.
/// 4. [`Complete`](Self::Complete): exactly once.
///
/// A failure to list the mappings ends the stream early, without
/// [`Complete`](Self::Complete). A failure on a single mapping is yielded as
/// an `Err` item and the pass moves on.
#[derive(Debug)]
pub enum MaintenanceEvent {
    Started,
    DiscoveryComplete(u64),
    Maintained(Action),
    Complete,
}

/// Streams [`MaintenanceEvent`]s while checking every recorded mapping.
///
/// Mappings are handled one at a time in source path order. The listing is
/// taken up front, so mappings recorded by the live watcher during the pass
/// are left for the next one.
pub fn maintenance<'a>(
    cache: &'a Repository,
    ctx: &'a Context,
) -> impl Stream<Item = LibraryResult<MaintenanceEvent>> + 'a {
    stream!({
        yield Ok(MaintenanceEvent::Started);
        let mappings = match cache.all().await.or_raise(|| LibraryErrorKind::Maintenance) {
            Ok(m) => m,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(MaintenanceEvent::DiscoveryComplete(u64::try_from(mappings.len()).unwrap_or(0)));
        for mapping in mappings {
            yield maintain_mapping(cache, ctx, mapping).await.map(MaintenanceEvent::Maintained);
        }
        yield Ok(MaintenanceEvent::Complete);
    })
}
