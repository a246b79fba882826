/*!
 * Line classification: dialogue versus code.
 *
 * Script lines mix spoken text with statements whose quoted arguments are
 * identifiers, asset paths or expressions. Only dialogue may reach an engine.
 */

use once_cell::sync::Lazy;
use regex::{Match, Regex};

use super::escapes;

/// A double-quoted literal; escaped quotes stay inside the span
pub static QUOTED_SPAN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap());

/// Statement prefixes whose quoted arguments are never dialogue
pub const SKIP_KEYWORDS: &[&str] = &[
    "show ", "scene ", "play ", "stop ", "queue ",
    "image ", "define ", "transform ", "screen ",
    "jump ", "call ", "return", "menu:", "if ",
    "python:", "init ", "label ", "with ",
    "hide ", "at ", "as ", "$", "pause",
    "nvl ", "window ", "voice ", "sound ",
    "music ", "audio ", "renpy.", "camera ",
];

/// Inline python marker
pub const INLINE_EXECUTION_MARKER: char = '$';

/// Suffix of the source half of a `old "..."` / `new "..."` string pair
pub const RESERVED_SUFFIX: &str = "old";

/// Extensions of binary assets referenced by path
pub const ASSET_EXTENSIONS: &[&str] = &[".png", ".jpg", ".mp3", ".ogg", ".wav"];

/// Blank lines, comments and inline python pass through untouched
pub fn is_substantive_line(line: &str) -> bool {
    let trimmed = line.trim();
    !(trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with(INLINE_EXECUTION_MARKER))
}

/// Decide whether the quoted span `span` found in `line` is dialogue.
///
/// `span` is the full match including the quotes; its content is the first
/// capture group of [`QUOTED_SPAN_REGEX`].
pub fn should_translate(line: &str, span: Match<'_>) -> bool {
    let before_quote = line[..span.start()].trim().to_lowercase();

    if SKIP_KEYWORDS.iter().any(|k| before_quote.starts_with(k)) {
        return false;
    }

    if before_quote.contains(INLINE_EXECUTION_MARKER) {
        return false;
    }

    if before_quote.ends_with(':') {
        return false;
    }

    if ends_with_reserved_suffix(&before_quote) {
        return false;
    }

    let content = span_content(span.as_str());
    !is_asset_reference(content)
}

/// Text between the quotes of a matched span
pub fn span_content(span: &str) -> &str {
    span.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(span)
}

/// `old` as a whole word at the end of the preceding text
fn ends_with_reserved_suffix(before_quote: &str) -> bool {
    before_quote
        .strip_suffix(RESERVED_SUFFIX)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with(|c: char| c.is_whitespace()))
}

/// Asset file names and paths.
///
/// A backslash counts as a path separator only when it does not start one of
/// the escape sequences dialogue legitimately carries.
pub fn is_asset_reference(content: &str) -> bool {
    if ASSET_EXTENSIONS.iter().any(|ext| content.ends_with(ext)) {
        return true;
    }

    if content.contains('/') {
        return true;
    }

    let mut rest = content;
    while let Some(pos) = rest.find('\\') {
        let tail = &rest[pos..];
        if !escapes::starts_with_escape(tail) {
            return true;
        }
        rest = &tail[2..];
    }

    false
}
