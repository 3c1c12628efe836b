use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::place::error::ErrorKind;
use crate::place::link_into_place;
use chapterlink_cache::{Mapping, Repository};
use chapterlink_storage::exists;
use exn::ResultExt;
use tracing::instrument;

/// What maintenance did with one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The link had been deleted and was created again.
    Relinked(Mapping),
    /// Both files were gone; the mapping was deleted.
    Removed(Mapping),
    /// The source is gone but the link survives; left in place on purpose.
    Orphaned(Mapping),
    /// Both files exist, or the link reappeared before it could be rebuilt.
    Intact(Mapping),
}

/// Brings one mapping back in line with the filesystem.
#[instrument(skip_all, fields(source = %mapping.source.display()))]
pub async fn maintain_mapping(cache: &Repository, ctx: &Context, mapping: Mapping) -> LibraryResult<Action> {
    let source_exists = exists(&mapping.source).await.or_raise(|| LibraryErrorKind::Maintenance)?;
    let target_exists = exists(&mapping.target).await.or_raise(|| LibraryErrorKind::Maintenance)?;
    match (source_exists, target_exists) {
        (true, false) => {
            tracing::info!(target = %mapping.target.display(), "re-creating link");
            let linked = link_into_place(ctx, &mapping.source, &mapping.target)
                .await
                .or_raise(|| LibraryErrorKind::Maintenance)?;
            Ok(match linked {
                true => Action::Relinked(mapping),
                false => Action::Intact(mapping),
            })
        },
        (false, false) => {
            tracing::info!("removing mapping for missing file");
            cache
                .delete(&mapping.source)
                .await
                .or_raise(|| ErrorKind::Cache)
                .or_raise(|| LibraryErrorKind::Maintenance)?;
            Ok(Action::Removed(mapping))
        },
        (false, true) => {
            tracing::debug!(target = %mapping.target.display(), "source is gone, keeping orphaned link");
            Ok(Action::Orphaned(mapping))
        },
        (true, true) => Ok(Action::Intact(mapping)),
    }
}
