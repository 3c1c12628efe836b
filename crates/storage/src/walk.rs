use crate::error::{ErrorKind, Result};
use async_stream::stream;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

pub type EntryStream = Pin<Box<dyn Stream<Item = Result<Entry>> + Send>>;

/// Something found while walking a directory tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entry {
    Directory(PathBuf),
    File(PathBuf),
}
impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::File(path) => path,
        }
    }
}

enum Step {
    Yield(Entry),
    Skip,
}

/// Walks the tree under `root`, yielding the root itself first.
///
/// - A `root` that doesn't exist (or isn't a directory) yields nothing.
/// - Anything under `skip` is neither yielded nor descended into.
/// - Symlinks are not followed and not yielded.
/// - A directory that can't be read yields one error item; the walk goes on
///   with its siblings.
pub fn walk(root: impl Into<PathBuf>, skip: Option<PathBuf>) -> EntryStream {
    let root = root.into();
    Box::pin(stream! {
        match fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {},
            Ok(_) => return,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                yield Err(exn::Exn::from(ErrorKind::from_io(e, &root)));
                return;
            }
        }
        if skip.as_deref().is_some_and(|skip| root.starts_with(skip)) {
            return;
        }
        yield Ok(Entry::Directory(root.clone()));
        let mut stack = vec![root];

        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                // Removed between being listed and being read.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue 'dirs,
                Err(e) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(e, &current)));
                    continue 'dirs;
                }
            };
            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(e) => { yield Err(exn::Exn::from(ErrorKind::from_io(e, &current))); continue 'entries; },
                };
                match classify(entry, skip.as_deref()).await {
                    Ok(Step::Yield(Entry::Directory(dir))) => {
                        stack.push(dir.clone());
                        yield Ok(Entry::Directory(dir));
                    },
                    Ok(Step::Yield(file)) => yield Ok(file),
                    Ok(Step::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        }
    })
}

async fn classify(entry: fs::DirEntry, skip: Option<&Path>) -> Result<Step> {
    let path = entry.path();
    if skip.is_some_and(|skip| path.starts_with(skip)) {
        return Ok(Step::Skip);
    }
    let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
    Ok(match file_type {
        t if t.is_dir() => Step::Yield(Entry::Directory(path)),
        t if t.is_file() => Step::Yield(Entry::File(path)),
        _ => Step::Skip,
    })
}
