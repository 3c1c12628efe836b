use crate::consts::{Kind, PATTERNS, Pattern, SEPARATORS, VOLUME_INDICATORS};
use crate::strip_zeros;
use regex::{Captures, Match};

/// Finds the chapter identifier in a filename.
///
/// Returns the chapter (if any pattern was accepted) and the residual: the
/// normalized filename (spaces removed, lowercase) with the accepted match cut
/// out. When nothing matches the residual is the whole normalized filename.
pub fn parse_chapter(filename: &str) -> (Option<String>, String) {
    let normalized = normalize(filename);
    match PATTERNS.iter().find_map(|pattern| accept(pattern, &normalized)) {
        Some((chapter, span)) => (Some(chapter), cut(&normalized, span)),
        None => (None, normalized),
    }
}

fn normalize(filename: &str) -> String {
    filename.replace(' ', "").to_lowercase()
}

/// Applies a single pattern. Only the first match of each pattern is looked at;
/// a rejected match moves on to the next pattern, not to the next match.
fn accept<'a>(pattern: &Pattern, normalized: &'a str) -> Option<(String, Match<'a>)> {
    let captures = pattern.regex.captures(normalized)?;
    let span = captures.name("span").or_else(|| captures.get(0))?;
    if pattern.kind == Kind::Implicit && follows_volume_indicator(&normalized[..span.start()]) {
        return None;
    }
    let chapter = strip_zeros(captures.name("chapter")?.as_str());
    Some(match second_number(pattern.kind, &captures) {
        Some(part) => (format!("{chapter}.{part}"), span),
        None => (chapter, span),
    })
}

fn follows_volume_indicator(preceding: &str) -> bool {
    let preceding = preceding.trim_end_matches(SEPARATORS);
    VOLUME_INDICATORS.iter().any(|indicator| preceding.ends_with(indicator))
}

/// The number appended after the chapter's `.`, if the match has one.
///
/// Its digits are kept as written, leading zeros included, so `3 part 02`
/// reads as `3.02` just like `3-02` does.
fn second_number(kind: Kind, captures: &Captures<'_>) -> Option<String> {
    if let Some(part) = captures.name("part") {
        return Some(part.as_str().to_string());
    }
    let (group, trim) = match kind {
        Kind::Explicit => ("fraction", &['.'][..]),
        Kind::Implicit => ("joined", SEPARATORS),
    };
    captures.name(group).map(|m| m.as_str().trim_start_matches(trim).to_string()).filter(|s| !s.is_empty())
}

/// Removes the matched span. Prefix and suffix are concatenated when the match
/// sits in the middle; the result is never parsed for a chapter again.
fn cut(normalized: &str, span: Match<'_>) -> String {
    if span.start() == 0 {
        normalized[span.end()..].to_string()
    } else if span.end() == normalized.len() {
        normalized[..span.start()].to_string()
    } else {
        format!("{}{}", &normalized[..span.start()], &normalized[span.end()..])
    }
}
