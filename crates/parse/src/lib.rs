//! Chapter and volume identifiers from unstructured filenames.
//!
//! Filenames of chapter releases follow no standard: `One Piece c105.5.zip`,
//! `Naruto - v02 - c015.cbz` and `Bleach 001.cbz` all need to yield a chapter
//! number. [`parse`] works through an ordered list of patterns and accepts the
//! first one that fits:
//!
//! 1. **Explicit** patterns name the chapter: `ch`, `chapter`, `c` or `chap`
//!    followed by digits, an optional `part`/`p`/`pt` number and an optional
//!    `.digits` fraction.
//! 2. **Implicit** patterns are bare numbers, tried as a part-style pair, then
//!    a number directly in front of the extension, then any number at all. An
//!    implicit match directly preceded by a volume indicator (`v`, `vol`,
//!    `volume`) is rejected and the next pattern is tried, so `v02` is never
//!    read as chapter 2.
//!
//! The matched text is then removed and the volume is searched for in what is
//! left, so the same digits can never count as both chapter and volume.
//!
//! # Example
//!
//! ```
//! use chapterlink_parse::parse;
//!
//! let parsed = parse("Naruto - v02 - c015.cbz");
//! assert_eq!(parsed.chapter.as_deref(), Some("15"));
//! assert_eq!(parsed.volume.as_deref(), Some("2"));
//! ```

mod chapter;
mod consts;

use tracing::instrument;

pub use crate::chapter::parse_chapter;

/// What could be read from a filename.
///
/// Nothing here is an error: a filename without a recognizable number simply
/// has no `chapter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParseResult {
    /// Chapter identifier, possibly fractional (`"12.5"`).
    pub chapter: Option<String>,
    /// Volume identifier, digits only.
    pub volume: Option<String>,
    /// The normalized filename with the chapter match cut out; the search
    /// space used for volume detection.
    pub residual: String,
}

/// Reads the chapter and volume identifiers from a filename.
///
/// Deterministic and total: the same input always produces the same result.
#[instrument(level = "trace")]
pub fn parse(filename: &str) -> ParseResult {
    let (chapter, residual) = parse_chapter(filename);
    let volume = parse_volume(&residual);
    ParseResult { chapter, volume, residual }
}

/// Finds a volume indicator (`v`, `vol`, `volume`, any case) followed by
/// optional separators and digits, and returns the digits.
pub fn parse_volume(text: &str) -> Option<String> {
    consts::VOLUME_REGEX.captures(text).and_then(|captures| captures.get(1)).map(|m| strip_zeros(m.as_str()))
}

/// Collapses leading zeros the way a number would (`"015"` → `"15"`, `"000"` → `"0"`).
pub(crate) fn strip_zeros(digits: &str) -> String {
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        stripped => stripped.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("One Piece c105.5.zip", Some("105.5"), None)]
    #[case("Naruto - v02 - c015.cbz", Some("15"), Some("2"))]
    #[case("Bleach 001.cbz", Some("1"), None)]
    #[case("Chapter 12 Part 3.cbz", Some("12.3"), None)]
    #[case("Kingdom Ch.701 pt.2.cbz", Some("701.2"), None)]
    #[case("Attack on Titan 139-2.cbz", Some("139.2"), None)]
    #[case("Some Title 45 v3.cbz", Some("45"), Some("3"))]
    #[case("Berserk Volume 41 Chapter 364.cbz", Some("364"), Some("41"))]
    #[case("Oneshot.cbz", None, None)]
    fn test_parse(#[case] filename: &str, #[case] chapter: Option<&str>, #[case] volume: Option<&str>) {
        let parsed = parse(filename);
        assert_eq!(parsed.chapter.as_deref(), chapter, "chapter of {filename:?}");
        assert_eq!(parsed.volume.as_deref(), volume, "volume of {filename:?}");
    }

    #[test]
    fn test_volume_only_filename_has_no_chapter() {
        // Expected behaviour: every implicit pattern rejects the number because
        // it follows "vol", and no explicit pattern fires.
        let parsed = parse("Vol3.zip");
        assert_eq!(parsed.chapter, None);
        assert_eq!(parsed.residual, "vol3.zip");
        assert_eq!(parsed.volume.as_deref(), Some("3"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        for filename in ["One Piece c105.5.zip", "Naruto - v02 - c015.cbz", "Vol3.zip", "no digits here"] {
            assert_eq!(parse(filename), parse(filename));
        }
    }

    #[test]
    fn test_volume_is_read_from_residual() {
        // A chapter match is cut out before the volume search runs.
        let parsed = parse("Title v12.cbz");
        assert_eq!(parsed.chapter, None);
        assert_eq!(parsed.volume.as_deref(), Some("12"));
        let parsed = parse("c12.cbz");
        assert_eq!(parsed.chapter.as_deref(), Some("12"));
        assert_eq!(parsed.volume, None);
    }

    #[rstest]
    #[case("vol 3", Some("3"))]
    #[case("VOLUME_04", Some("4"))]
    #[case("v:7", Some("7"))]
    #[case("nothing", None)]
    fn test_parse_volume(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_volume(text).as_deref(), expected);
    }

    #[test]
    fn test_strip_zeros() {
        assert_eq!(strip_zeros("015"), "15");
        assert_eq!(strip_zeros("000"), "0");
        assert_eq!(strip_zeros("100"), "100");
    }
}
