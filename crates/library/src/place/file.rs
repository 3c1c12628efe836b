use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::place::error::{ErrorKind, Result};
use chapterlink_cache::error::ErrorKind as CacheErrorKind;
use chapterlink_cache::{Mapping, Repository};
use chapterlink_storage::error::ErrorKind as StorageErrorKind;
use chapterlink_storage::{ensure_dir, hard_link};
use exn::{OptionExt, ResultExt};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The outcome of (successfully) placing a single file.
///
/// Each variant carries the link path that is now recorded for the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// A new hardlink was created and recorded.
    Linked(PathBuf),
    /// Something already occupied the link path. It is assumed to represent
    /// this source, and the mapping was recorded anyway.
    AlreadyLinked(PathBuf),
    /// Another caller recorded this source first; nothing was written.
    AlreadyRecorded(PathBuf),
}
impl Placement {
    pub fn target(&self) -> &Path {
        match self {
            Self::Linked(p) | Self::AlreadyLinked(p) | Self::AlreadyRecorded(p) => p,
        }
    }
}

/// The outcome of offering a candidate source file via [`record_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// The store already had a mapping; [`place_file`] was not called.
    Known,
    Placed(Placement),
}

/// Places `source` unless the store already knows it.
///
/// This is the "check membership, else place" step shared by scans and live
/// notifications. The check and the placement aren't atomic; a concurrent
/// caller that wins in between surfaces as [`Placement::AlreadyRecorded`].
pub async fn record_file(cache: &Repository, ctx: &Context, source: impl AsRef<Path>) -> LibraryResult<Record> {
    let source = source.as_ref();
    let known = cache.exists(source).await.or_raise(|| ErrorKind::Cache).or_raise(|| LibraryErrorKind::Place)?;
    if known {
        tracing::debug!(path = %source.display(), "already mapped, skipping");
        return Ok(Record::Known);
    }
    place_file(cache, ctx, source).await.map(Record::Placed)
}

/// Links a source file into the target tree and records the mapping.
///
/// Callers are expected to have checked that the store doesn't know `source`
/// yet (see [`record_file`]).
///
/// 1. The series name is the name of the directory containing `source`.
/// 2. The filename is parsed and the link path rendered from the context's
///    [`NameGenerator`](crate::NameGenerator).
/// 3. The series directory is created if needed and the hardlink made.
/// 4. `(source, target)` is inserted into the store.
///
/// Ownership and permission adjustments along the way are best-effort and
/// only logged when they fail.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Place>`](LibraryErrorKind::Place) raised
/// from an inner [`Exn<ErrorKind>`](ErrorKind).
pub async fn place_file(cache: &Repository, ctx: &Context, source: impl AsRef<Path>) -> LibraryResult<Placement> {
    place_file_inner(cache, ctx, source.as_ref()).await.or_raise(|| LibraryErrorKind::Place)
}

#[instrument(skip_all, fields(path = %source.display()))]
async fn place_file_inner(cache: &Repository, ctx: &Context, source: &Path) -> Result<Placement> {
    let invalid = || ErrorKind::InvalidSource(source.to_path_buf());
    let filename = source.file_name().and_then(|f| f.to_str()).ok_or_raise(invalid)?;
    let series = source.parent().and_then(Path::file_name).and_then(|s| s.to_str()).ok_or_raise(invalid)?;
    tracing::info!(series, filename, "processing new file");

    let parsed = chapterlink_parse::parse(filename);
    let relative = ctx.names.generate(series, filename, &parsed).or_raise(|| ErrorKind::Template)?;
    let target = ctx.target_root.join(relative);

    let linked = link_into_place(ctx, source, &target).await?;
    match cache.insert(&Mapping::new(source, &target)).await {
        Ok(()) if linked => Ok(Placement::Linked(target)),
        Ok(()) => Ok(Placement::AlreadyLinked(target)),
        Err(e) if matches!(e.deref(), CacheErrorKind::DuplicateKey(_)) => {
            tracing::debug!(path = %source.display(), "recorded concurrently by another caller");
            Ok(Placement::AlreadyRecorded(target))
        },
        Err(e) => Err(e).or_raise(|| ErrorKind::Cache),
    }
}

/// Creates the link's parent directory and the link itself, adjusting
/// ownership of both.
///
/// Returns `false` when the link path was already taken, which is logged and
/// otherwise treated like success.
pub(crate) async fn link_into_place(ctx: &Context, source: &Path, target: &Path) -> Result<bool> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent).await.or_raise(|| ErrorKind::Storage)?;
        if let Err(e) = ctx.ownership.apply_dir(parent).await {
            tracing::warn!(path = %parent.display(), error = %e, "could not adjust directory ownership");
        }
    }
    let linked = match hard_link(source, target).await {
        Ok(()) => true,
        Err(e) if matches!(e.deref(), StorageErrorKind::AlreadyExists(_)) => {
            tracing::warn!(path = %target.display(), "link already exists");
            false
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
    };
    if let Err(e) = ctx.ownership.apply_file(target).await {
        tracing::warn!(path = %target.display(), error = %e, "could not adjust link ownership");
    }
    Ok(linked)
}
