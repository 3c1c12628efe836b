use regex::Regex;
use std::sync::LazyLock;

/// Separators allowed between a token and its digits (spaces are already
/// stripped by normalization, but a literal space is harmless here).
const SEP: &str = r"[ .\-_]*";
/// Optional `part`/`p`/`pt` suffix carrying a second digit group.
const PART: &str = r"(?:part|p|pt)";

/// Separator characters trimmed from the text preceding an implicit match (before
/// checking it for a volume indicator) and from joined second numbers (`12-5`).
pub(crate) const SEPARATORS: &[char] = &['.', ',', '-', '_', '+'];
/// Tokens that, when immediately preceding a bare number, mark it as a volume.
pub(crate) const VOLUME_INDICATORS: &[&str] = &["v", "vol", "volume"];

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Whether a pattern names its chapter explicitly (`ch12`) or is a bare number
/// that has to be guarded against being a volume number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Explicit,
    Implicit,
}

/// A chapter pattern and how to interpret its captures.
///
/// Named groups:
/// - `chapter`: the main chapter number (always present).
/// - `part`: a `part`-style second number.
/// - `fraction`: a trailing `.digits` suffix (explicit patterns only).
/// - `joined`: a second number joined by a separator (implicit patterns only).
/// - `span`: the portion of the match that counts as consumed, when it differs
///   from the whole match.
#[derive(Debug)]
pub(crate) struct Pattern {
    pub(crate) kind: Kind,
    pub(crate) regex: Regex,
}

fn explicit(token: &str) -> Pattern {
    let regex = format!(r"{token}{SEP}(?P<chapter>\d+)(?:{SEP}{PART}{SEP}(?P<part>\d+))?(?P<fraction>\.\d+)?");
    Pattern { kind: Kind::Explicit, regex: Regex::new(&regex).unwrap() }
}

fn implicit(regex: &str) -> Pattern {
    Pattern { kind: Kind::Implicit, regex: Regex::new(regex).unwrap() }
}

/// Every chapter pattern in priority order. The first one that matches (and,
/// for implicit patterns, is not preceded by a volume indicator) wins.
pub(crate) static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        explicit("ch"),
        explicit("chapter"),
        explicit("c"),
        explicit("chap"),
        // A number with a part-style second number: `12part3`, `12p3`.
        implicit(&format!(r"(?P<chapter>\d+){SEP}{PART}{SEP}(?P<part>\d+)(?P<fraction>\.\d+)?")),
        // A number directly in front of the file extension: `012.cbz`, `12-5.cbz`.
        // Only the number counts as consumed, the extension stays in the residual.
        implicit(r"(?P<span>(?P<chapter>\d+)(?P<joined>[._\-]\d+)?)\.\w+$"),
        // Any number at all.
        implicit(r"(?P<chapter>\d+)(?P<joined>[,.+\-_]\d+)?"),
    ]
});

regex!(VOLUME_REGEX, r"(?i)(?:v|vol|volume)[ .\-_:]*(\d+)");
