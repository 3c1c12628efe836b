//! Configuration loading and validation.
//!
//! Values are layered with [`figment`], later layers winning:
//!
//! 1. built-in defaults,
//! 2. an optional TOML or YAML file (picked by extension),
//! 3. environment variables such as `SOURCE_PATH` or `INCLUDE_VOLUME`,
//!    including any put there by [`load_dotenv`].
//!
//! Empty variables count as unset. Flags accept `true`/`false`, `1`/`0`,
//! `yes`/`no` and `on`/`off`.
//!
//! The merged values are then validated into a [`Config`]; nothing starts
//! until both the source and target directories are known to exist.

pub mod error;
mod raw;

use crate::error::{ErrorKind, Result};
use crate::raw::{KEYS, Raw};
use chapterlink_storage::Ownership;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use figment::value::UncasedStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How link names are put together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub include_series: bool,
    pub include_volume: bool,
    pub volume_first: bool,
    /// Replaces the template derived from the toggles above.
    pub template: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical path of the tree to mirror.
    pub source_path: PathBuf,
    /// Canonical path the link tree is built under.
    pub target_path: PathBuf,
    pub scan_interval: Duration,
    pub naming: Naming,
    pub ownership: Ownership,
    /// Existing folder holding the mapping database.
    pub database_folder: PathBuf,
    pub debug: bool,
}

impl Config {
    /// Load from defaults, the optional `file`, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file))
    }

    /// The layered providers without validation, for callers that want to
    /// merge in more of their own.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(file) = file {
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
                Some("json") => figment.merge(Json::file_exact(file)),
                _ => figment.merge(Toml::file_exact(file)),
            };
        }
        figment.merge(Env::raw().only(KEYS).filter(is_set))
    }

    /// Extract and validate.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let raw: Raw = figment.extract_lossy().or_raise(|| ErrorKind::Load)?;
        tracing::trace!(?raw, "merged configuration");

        let source_path = directory("SOURCE_PATH", raw.source_path)?;
        let target_path = directory("TARGET_PATH", raw.target_path)?;
        if raw.scan_interval_seconds == 0 {
            exn::bail!(ErrorKind::InvalidInterval);
        }
        let ownership = Ownership {
            uid: raw.uid,
            gid: raw.gid,
            dir_mode: raw.directory_mode.map(|m| m.parse("DIRECTORY_MODE")).transpose()?,
            file_mode: raw.file_mode.map(|m| m.parse("FILE_MODE")).transpose()?,
        };
        let database_folder = raw.database_folder.unwrap_or_else(default_database_folder);
        std::fs::create_dir_all(&database_folder).or_raise(|| ErrorKind::CreateFolder(database_folder.clone()))?;

        Ok(Self {
            source_path,
            target_path,
            scan_interval: Duration::from_secs(raw.scan_interval_seconds),
            naming: Naming {
                include_series: raw.include_series_in_filename,
                include_volume: raw.include_volume,
                volume_first: raw.volume_first,
                template: raw.filename_template.filter(|t| !t.trim().is_empty()),
            },
            ownership,
            database_folder,
            debug: raw.debug,
        })
    }

    /// Whether the link tree lives inside the source tree, in which case
    /// scanning must skip it.
    pub fn target_inside_source(&self) -> bool {
        self.target_path.starts_with(&self.source_path)
    }
}

/// Loads `.env` from the working directory (or the nearest parent holding
/// one) into the process environment.
///
/// Variables that are already set win. Returns the path of the file that was
/// loaded, if any was found.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).or_raise(|| ErrorKind::DotEnv),
    }
}

fn directory(name: &'static str, path: Option<PathBuf>) -> Result<PathBuf> {
    let path = path.ok_or_raise(|| ErrorKind::MissingPath(name))?;
    let canonical = std::fs::canonicalize(&path).or_raise(|| ErrorKind::NotFound(name, path.clone()))?;
    if !canonical.is_dir() {
        exn::bail!(ErrorKind::NotADirectory(name, path));
    }
    Ok(canonical)
}

fn is_set(key: &UncasedStr) -> bool {
    std::env::var(key.as_str()).is_ok_and(|value| !value.trim().is_empty())
}

fn default_database_folder() -> PathBuf {
    directories::ProjectDirs::from("", "", "chapterlink")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
