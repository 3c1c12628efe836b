//! Validation of paths relative to the target root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a path that is about to be joined onto the target root.
///
/// Rendered link names are built from parts of source filenames and directory
/// names, which are not trusted. The result must stay inside the target root:
/// `..` may only cancel out earlier segments, `.` and repeated separators are
/// dropped, and a leading `/` is ignored rather than honoured.
///
/// > **Note:** Null bytes are rejected; nothing else about the segments
/// >           themselves (encoding, length) is checked here.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use chapterlink_storage::validate_path;
///
/// assert!(validate_path("Bleach/Bleach Chapter 1.cbz").is_ok());
/// assert!(validate_path("../Bleach Chapter 1.cbz").is_err());
/// assert_eq!(
///     validate_path("/Bleach//./Bleach Chapter 1.cbz").unwrap(),
///     Path::new("Bleach/Bleach Chapter 1.cbz")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path in the underlying syscalls.
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                segments.push(segment);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if segments.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    match segments.is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(segments.into_iter().collect()),
    }
}
