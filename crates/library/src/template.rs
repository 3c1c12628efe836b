//! Link naming.
//!
//! Converts a source file's series directory and [`ParseResult`] into a path
//! relative to the target root, using an [upon] template. The template syntax
//! follows upon's conventions (`{{ variable }}`, `{% if variable %}...{% endif %}`).
//!
//! # Template Variables
//!
//! | Variable   | Type             | Description                                   |
//! |------------|------------------|-----------------------------------------------|
//! | `series`   | `String`         | Name of the directory holding the source file |
//! | `chapter`  | `String`         | Chapter identifier, or `Unknown`              |
//! | `volume`   | `Option<String>` | Volume identifier                             |
//! | `filename` | `String`         | Source file name without its extension        |
//!
//! The source file's extension is always appended after rendering.
//!
//! # Example
//!
//! ```
//! use chapterlink_library::{NameGenerator, NamingPolicy};
//! use chapterlink_parse::parse;
//! use std::path::Path;
//!
//! let policy = NamingPolicy { include_volume: true, ..Default::default() };
//! let names = NameGenerator::from_policy(policy).unwrap();
//! let filename = "Naruto - v02 - c015.cbz";
//! let path = names.generate("Naruto", filename, &parse(filename)).unwrap();
//! assert_eq!(path, Path::new("Naruto/Naruto Volume 2 Chapter 15.cbz"));
//! ```

use crate::error::{Error, ErrorKind, Result};
use chapterlink_parse::ParseResult;
use chapterlink_storage::validate_path;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// Rendered in place of the chapter when none could be read from the filename.
pub const MISSING_CHAPTER: &str = "Unknown";

/// The naming toggles, from which a default template is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingPolicy {
    /// Prefix the link name with the series name.
    pub include_series: bool,
    /// Mention the volume, when there is one.
    pub include_volume: bool,
    /// Put the volume before the chapter rather than after it.
    pub volume_first: bool,
}
impl Default for NamingPolicy {
    fn default() -> Self {
        Self { include_series: true, include_volume: false, volume_first: true }
    }
}
impl NamingPolicy {
    /// The template these toggles describe.
    pub fn template(&self) -> String {
        let mut name = String::from("{{ series }}/");
        if self.include_series {
            name.push_str("{{ series }} ");
        }
        match (self.include_volume, self.volume_first) {
            (true, true) => name.push_str("{% if volume %}Volume {{ volume }} {% endif %}Chapter {{ chapter }}"),
            (true, false) => name.push_str("Chapter {{ chapter }}{% if volume %} (Volume {{ volume }}){% endif %}"),
            (false, _) => name.push_str("Chapter {{ chapter }}"),
        }
        name
    }
}

/// Generates link paths relative to the target root.
///
/// Constructed via [`FromStr`] (a custom template) or
/// [`from_policy`](Self::from_policy); either way the template is compiled
/// eagerly so that syntax errors surface at startup rather than per file.
pub struct NameGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl std::fmt::Debug for NameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameGenerator").finish_non_exhaustive()
    }
}
impl FromStr for NameGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl NameGenerator {
    pub fn from_policy(policy: NamingPolicy) -> Result<Self> {
        policy.template().parse()
    }

    /// Renders the link path for `filename`, found in the directory `series`.
    ///
    /// The result is trimmed segment by segment and validated so that it can't
    /// leave the target root, then the extension of `filename` is appended.
    #[instrument(level = "trace", skip(self, parsed))]
    pub fn generate(&self, series: &str, filename: &str, parsed: &ParseResult) -> Result<PathBuf> {
        let file = Path::new(filename);
        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
        let chapter = parsed.chapter.as_deref().unwrap_or_else(|| {
            tracing::warn!(series, filename, "no chapter found in filename, naming it \"{MISSING_CHAPTER}\"");
            MISSING_CHAPTER
        });
        let rendered = self
            .template
            .render(
                &self.engine,
                upon::value! {
                    series: series,
                    chapter: chapter,
                    volume: parsed.volume.as_deref(),
                    filename: stem,
                },
            )
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        let path = Self::normalize(&rendered)?;
        Ok(match file.extension().and_then(|e| e.to_str()) {
            Some(ext) => PathBuf::from(format!("{}.{ext}", path.display())),
            None => path,
        })
    }

    /// Trims each path segment, joins them with `/`, then validates via
    /// [`chapterlink_storage::validate_path`].
    fn normalize(rendered: &str) -> Result<PathBuf> {
        let path = rendered.trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        validate_path(&path).or_raise(|| ErrorKind::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapterlink_parse::parse;
    use rstest::rstest;

    fn generate(policy: NamingPolicy, series: &str, filename: &str) -> PathBuf {
        NameGenerator::from_policy(policy).unwrap().generate(series, filename, &parse(filename)).unwrap()
    }

    #[rstest]
    #[case(true, false, true, "Naruto/Naruto Chapter 15.cbz")]
    #[case(true, true, true, "Naruto/Naruto Volume 2 Chapter 15.cbz")]
    #[case(true, true, false, "Naruto/Naruto Chapter 15 (Volume 2).cbz")]
    #[case(false, false, true, "Naruto/Chapter 15.cbz")]
    #[case(false, true, true, "Naruto/Volume 2 Chapter 15.cbz")]
    #[case(false, true, false, "Naruto/Chapter 15 (Volume 2).cbz")]
    fn test_policies(
        #[case] include_series: bool,
        #[case] include_volume: bool,
        #[case] volume_first: bool,
        #[case] expected: &str,
    ) {
        let policy = NamingPolicy { include_series, include_volume, volume_first };
        assert_eq!(generate(policy, "Naruto", "Naruto - v02 - c015.cbz"), Path::new(expected));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_volume_is_left_out_when_absent(#[case] volume_first: bool) {
        let policy = NamingPolicy { include_volume: true, volume_first, ..Default::default() };
        assert_eq!(generate(policy, "Bleach", "Bleach 001.cbz"), Path::new("Bleach/Bleach Chapter 1.cbz"));
    }

    #[test]
    fn test_missing_chapter_placeholder() {
        let path = generate(NamingPolicy::default(), "Berserk", "Vol3.zip");
        assert_eq!(path, Path::new("Berserk/Berserk Chapter Unknown.zip"));
    }

    #[test]
    fn test_fractional_chapter_keeps_extension() {
        let path = generate(NamingPolicy::default(), "One Piece", "One Piece c105.5.zip");
        assert_eq!(path, Path::new("One Piece/One Piece Chapter 105.5.zip"));
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(generate(NamingPolicy::default(), "S", "c7"), Path::new("S/S Chapter 7"));
    }

    #[test]
    fn test_custom_template() {
        let names: NameGenerator = "{{ series }} / raw / {{ filename }} - {{ chapter }}".parse().unwrap();
        let path = names.generate("Kingdom", "Kingdom Ch.701 pt.2.cbz", &parse("Kingdom Ch.701 pt.2.cbz")).unwrap();
        assert_eq!(path, Path::new("Kingdom/raw/Kingdom Ch.701 pt.2 - 701.2.cbz"));
    }

    #[test]
    fn test_template_syntax_error() {
        let err = "{{ series".parse::<NameGenerator>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let names: NameGenerator = "../{{ series }}".parse().unwrap();
        let err = names.generate("x", "c1.cbz", &parse("c1.cbz")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
