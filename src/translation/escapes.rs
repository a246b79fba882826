/*!
 * Escape sequence protection for translated text.
 *
 * Script literals carry two-character escape sequences (`\n`, `\"`, `\{` ...)
 * that translation engines happily mangle. Before a span leaves the process
 * every recognised escape is swapped for a sentinel that no engine will
 * touch, and swapped back once the translation returns.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Recognised escapes and their sentinels
pub const ESCAPE_SENTINELS: [(char, &str); 7] = [
    ('n', "<!NEWLINE!>"),
    ('t', "<!TAB!>"),
    ('"', "<!QUOTE!>"),
    ('\\', "<!BACKSLASH!>"),
    ('r', "<!CARRIAGE!>"),
    ('{', "<!LEFTBRACE!>"),
    ('}', "<!RIGHTBRACE!>"),
];

static OPEN_BRACE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\s+").unwrap());
static CLOSE_BRACE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\}").unwrap());

fn sentinel_for(escaped: char) -> Option<&'static str> {
    ESCAPE_SENTINELS
        .iter()
        .find(|(c, _)| *c == escaped)
        .map(|(_, sentinel)| *sentinel)
}

/// Whether `text` starts with one of the recognised escape sequences
pub fn starts_with_escape(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('\\'), Some(c)) if sentinel_for(c).is_some()
    )
}

/// Replace every recognised escape sequence with its sentinel.
///
/// The input is scanned left to right so an escaped backslash followed by a
/// letter (`\\n`) is read as one escape plus a plain `n`, never as `\` + `\n`.
/// Unrecognised escapes are left untouched.
pub fn protect(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(sentinel) = chars.peek().copied().and_then(sentinel_for) {
                out.push_str(sentinel);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Inverse of [`protect`], plus whitespace collapse just inside tag braces
/// (`{ 1 }` becomes `{1}`), which engines tend to introduce.
pub fn restore(text: &str) -> String {
    let mut restored = text.to_string();
    for (escaped, sentinel) in ESCAPE_SENTINELS.iter() {
        if restored.contains(sentinel) {
            restored = restored.replace(sentinel, &format!("\\{}", escaped));
        }
    }

    let restored = OPEN_BRACE_SPACE.replace_all(&restored, "{");
    CLOSE_BRACE_SPACE.replace_all(&restored, "}").into_owned()
}
