use crate::error::{ErrorKind, Result};
use std::path::Path;
use tokio::fs;

/// Creates a hardlink at `target` pointing to the same inode as `source`.
///
/// Never replaces anything: an existing `target` fails with
/// [`ErrorKind::AlreadyExists`] and is left untouched. The parent directory of
/// `target` must already exist (see [`ensure_dir`]).
pub async fn hard_link(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
    let (source, target) = (source.as_ref(), target.as_ref());
    match fs::hard_link(source, target).await {
        Ok(()) => Ok(()),
        // Blame the path that is actually missing.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !exists(source).await.unwrap_or(true) => {
            exn::bail!(ErrorKind::NotFound(source.to_path_buf()))
        },
        Err(e) => exn::bail!(ErrorKind::from_io(e, target)),
    }
}

/// Creates `dir` and any missing parents. Succeeds if it already exists.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await.map_err(|e| ErrorKind::from_io(e, dir))?;
    Ok(())
}

/// Whether anything exists at `path`.
///
/// A dangling symlink counts as missing.
pub async fn exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    Ok(fs::try_exists(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
}
