//! Shared fixture for the operation tests: a temporary source and target tree
//! plus an in-memory store.

use crate::{Context, NameGenerator, NamingPolicy};
use chapterlink_cache::{Database, Repository};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) struct Fixture {
    _dir: TempDir,
    pub cache: Repository,
    pub ctx: Context,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_target("target").await
    }

    /// `target` is relative to the temporary directory, so `"source/links"`
    /// nests the link tree inside the source tree.
    pub async fn with_target(target: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        // Resolve symlinked temp dirs so paths compare equal to walked ones.
        let root = dir.path().canonicalize().unwrap();
        let (source, target) = (root.join("source"), root.join(target));
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(&target).unwrap();
        let db = Database::connect_in_memory().await.unwrap();
        let names = NameGenerator::from_policy(NamingPolicy::default()).unwrap();
        Self { _dir: dir, cache: Repository::from(&db), ctx: Context::new(source, target, names) }
    }

    pub fn source_root(&self) -> &Path {
        &self.ctx.source_root
    }

    /// Creates `source/<series>/<name>` with some content and returns its path.
    pub fn source_file(&self, series: &str, name: &str) -> PathBuf {
        let path = self.ctx.source_root.join(series).join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    pub fn target_path(&self, relative: &str) -> PathBuf {
        self.ctx.target_root.join(relative)
    }

    pub fn same_file(&self, a: &Path, b: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let (a, b) = (std::fs::metadata(a).unwrap(), std::fs::metadata(b).unwrap());
            a.dev() == b.dev() && a.ino() == b.ino()
        }
        #[cfg(not(unix))]
        {
            std::fs::read(a).unwrap() == std::fs::read(b).unwrap()
        }
    }
}
