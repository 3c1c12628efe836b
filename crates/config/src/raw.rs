use crate::error::{ErrorKind, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variables that are read; everything else is ignored.
pub(crate) const KEYS: &[&str] = &[
    "source_path",
    "target_path",
    "scan_interval_seconds",
    "include_series_in_filename",
    "include_volume",
    "volume_first",
    "uid",
    "gid",
    "directory_mode",
    "file_mode",
    "database_folder",
    "filename_template",
    "debug",
];

/// Configuration as merged, before validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Raw {
    pub source_path: Option<PathBuf>,
    pub target_path: Option<PathBuf>,
    pub scan_interval_seconds: u64,
    pub include_series_in_filename: bool,
    pub include_volume: bool,
    pub volume_first: bool,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub directory_mode: Option<Mode>,
    pub file_mode: Option<Mode>,
    pub database_folder: Option<PathBuf>,
    pub filename_template: Option<String>,
    pub debug: bool,
}
impl Default for Raw {
    fn default() -> Self {
        Self {
            source_path: None,
            target_path: None,
            scan_interval_seconds: 3600,
            include_series_in_filename: true,
            include_volume: false,
            volume_first: true,
            uid: None,
            gid: None,
            directory_mode: None,
            file_mode: None,
            database_folder: None,
            filename_template: None,
            debug: false,
        }
    }
}

/// Permission bits, written the way `chmod` takes them.
///
/// Environment values like `0755` arrive as the integer `755`, so numbers are
/// read digit by digit as octal too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Mode {
    Text(String),
    Number(u64),
}
impl Mode {
    pub fn parse(self, name: &'static str) -> Result<u32> {
        let text = match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        };
        let digits = text.trim().trim_start_matches("0o");
        match u32::from_str_radix(digits, 8) {
            Ok(mode) if mode <= 0o7777 => Ok(mode),
            _ => exn::bail!(ErrorKind::InvalidMode(name, text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Mode::Text("755".into()), Some(0o755))]
    #[case(Mode::Text("0755".into()), Some(0o755))]
    #[case(Mode::Text("0o640".into()), Some(0o640))]
    #[case(Mode::Number(644), Some(0o644))]
    #[case(Mode::Number(4755), Some(0o4755))]
    #[case(Mode::Text("".into()), None)]
    #[case(Mode::Text("9".into()), None)]
    #[case(Mode::Number(17777), None)]
    fn test_mode(#[case] mode: Mode, #[case] expected: Option<u32>) {
        assert_eq!(mode.parse("FILE_MODE").ok(), expected);
    }
}
