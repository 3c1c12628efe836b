use crate::error::{ErrorKind, Result};
use std::path::Path;

/// Ownership and permissions to stamp onto created directories and links.
///
/// Every field is optional; an all-`None` value changes nothing. Failures are
/// returned to the caller, who is expected to log them and carry on: a link
/// with the wrong owner is still better than no link at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    /// Mode bits for series directories, e.g. `0o755`.
    pub dir_mode: Option<u32>,
    /// Mode bits for links, e.g. `0o644`. Hardlinks share their inode, so this
    /// also changes the source file.
    pub file_mode: Option<u32>,
}

impl Ownership {
    /// Whether applying this would touch the filesystem at all.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    pub async fn apply_dir(&self, path: impl AsRef<Path>) -> Result<()> {
        self.apply(path.as_ref(), self.dir_mode).await
    }

    pub async fn apply_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.apply(path.as_ref(), self.file_mode).await
    }

    #[cfg(unix)]
    async fn apply(&self, path: &Path, mode: Option<u32>) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        if self.uid.is_some() || self.gid.is_some() {
            // tokio::fs has no chown.
            let (owned, uid, gid) = (path.to_path_buf(), self.uid, self.gid);
            tokio::task::spawn_blocking(move || std::os::unix::fs::chown(owned, uid, gid))
                .await
                .map_err(|e| ErrorKind::Io(std::io::Error::other(e)))?
                .map_err(|e| ErrorKind::from_io(e, path))?;
        }
        if let Some(mode) = mode {
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .await
                .map_err(|e| ErrorKind::from_io(e, path))?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn apply(&self, _path: &Path, _mode: Option<u32>) -> Result<()> {
        if !self.is_noop() {
            tracing::debug!("ownership and permission changes are only supported on unix");
        }
        Ok(())
    }
}
