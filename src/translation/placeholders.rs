/*!
 * Placeholder substitution for markup tokens.
 *
 * Three bracket-delimited token families survive translation by being swapped
 * for small numeric ids before the text is sent anywhere:
 *
 * - formatting tags: `{i}`, `{/i}`, `{color=#f00}`
 * - interpolation variables: `[mname]`, `[player.name]`
 * - stage directions: `(smile)`, only when the content is a plain identifier
 *
 * Ids are assigned per family in first-seen order over the whole document,
 * so scanning must run before any line is rewritten. When tokens nest, as in
 * `{size=[s]}`, only the outermost one becomes a placeholder.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());
static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").unwrap());
static DIRECTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]+)\)").unwrap());
static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

static TAG_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\s*(\d+)\s*\}").unwrap());
static VARIABLE_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*(\d+)\s*\]").unwrap());
static DIRECTION_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*(\d+)\s*\)").unwrap());

/// Marker written in place of a token that was never scanned
pub const UNKNOWN_PLACEHOLDER: &str = "?";

const FAMILIES: [TokenFamily; 3] = [TokenFamily::Tag, TokenFamily::Variable, TokenFamily::Direction];

/// The three token families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenFamily {
    /// `{...}` formatting tags
    Tag,
    /// `[...]` interpolation variables
    Variable,
    /// `(identifier)` stage directions
    Direction,
}

impl TokenFamily {
    /// Opening and closing delimiter
    pub fn delimiters(&self) -> (char, char) {
        match self {
            Self::Tag => ('{', '}'),
            Self::Variable => ('[', ']'),
            Self::Direction => ('(', ')'),
        }
    }

    /// Header used in the mapping side-file
    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Tag => "TAG MAPPING",
            Self::Variable => "VARIABLE MAPPING",
            Self::Direction => "PARENTHESES MAPPING",
        }
    }

    fn token_regex(&self) -> &'static Regex {
        match self {
            Self::Tag => &TAG_REGEX,
            Self::Variable => &VARIABLE_REGEX,
            Self::Direction => &DIRECTION_REGEX,
        }
    }

    fn id_regex(&self) -> &'static Regex {
        match self {
            Self::Tag => &TAG_ID_REGEX,
            Self::Variable => &VARIABLE_ID_REGEX,
            Self::Direction => &DIRECTION_ID_REGEX,
        }
    }

    /// Whether the bracket content counts as a token of this family
    fn accepts(&self, content: &str) -> bool {
        match self {
            Self::Direction => IDENTIFIER_REGEX.is_match(content),
            _ => true,
        }
    }

    fn wrap(&self, inner: &str) -> String {
        let (open, close) = self.delimiters();
        format!("{}{}{}", open, inner, close)
    }

    /// A backslash escapes any delimiter; `{{` and `[[` also escape tags and
    /// variables. `((` is ordinary text.
    fn is_escaped(&self, haystack: &str, start: usize) -> bool {
        let (open, _) = self.delimiters();
        haystack[..start].chars().next_back().is_some_and(|prev| {
            prev == '\\' || (prev == open && *self != Self::Direction)
        })
    }
}

/// A markup token on a line
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    family: TokenFamily,
    start: usize,
    end: usize,
    inner: &'a str,
}

/// Unescaped tokens of `line` in order. Tokens nested inside another token
/// are dropped.
fn find_tokens(line: &str) -> Vec<Token<'_>> {
    let mut found = Vec::new();
    for family in FAMILIES {
        for caps in family.token_regex().captures_iter(line) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if family.is_escaped(line, whole.start()) || !family.accepts(inner.as_str()) {
                continue;
            }
            found.push(Token {
                family,
                start: whole.start(),
                end: whole.end(),
                inner: inner.as_str(),
            });
        }
    }

    // Outer tokens sort before the tokens they contain
    found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    let mut outermost = Vec::with_capacity(found.len());
    let mut covered = 0;
    for token in found {
        if token.start >= covered {
            covered = token.end;
            outermost.push(token);
        }
    }
    outermost
}

/// A numeric placeholder such as `{2}` or `[ 1 ]`
#[derive(Debug, Clone, Copy)]
struct Slot {
    family: TokenFamily,
    start: usize,
    end: usize,
    id: u32,
}

/// Unescaped numeric placeholders of `text` in order
fn find_slots(text: &str) -> Vec<Slot> {
    let mut slots = Vec::new();
    for family in FAMILIES {
        for caps in family.id_regex().captures_iter(text) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if family.is_escaped(text, whole.start()) {
                continue;
            }
            let Ok(id) = digits.as_str().parse::<u32>() else {
                continue;
            };
            slots.push(Slot {
                family,
                start: whole.start(),
                end: whole.end(),
                id,
            });
        }
    }
    slots.sort_by_key(|slot| slot.start);
    slots
}

/// Token-to-id assignments for one family
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyMap {
    /// Tokens in assignment order; the id of `tokens[i]` is `i + 1`
    tokens: Vec<String>,
    index: HashMap<String, u32>,
}

impl FamilyMap {
    /// Id for `token`, assigning the next one if it has not been seen
    pub fn assign(&mut self, token: &str) -> u32 {
        if let Some(id) = self.index.get(token) {
            return *id;
        }
        self.tokens.push(token.to_string());
        let id = self.tokens.len() as u32;
        self.index.insert(token.to_string(), id);
        id
    }

    /// Id already assigned to `token`
    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// Token that owns `id`
    pub fn token(&self, id: u32) -> Option<&str> {
        let position = (id as usize).checked_sub(1)?;
        self.tokens.get(position).map(String::as_str)
    }

    /// `(id, token)` pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, token)| (i as u32 + 1, token.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Placeholder assignments for one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderMap {
    pub tags: FamilyMap,
    pub variables: FamilyMap,
    pub directions: FamilyMap,
}

impl PlaceholderMap {
    /// Build a map by scanning a whole document
    pub fn scan(content: &str) -> Self {
        let mut map = Self::default();
        map.scan_into(content);
        map
    }

    /// Assign ids to every token in `content` not seen before
    pub fn scan_into(&mut self, content: &str) {
        for line in content.lines() {
            for token in find_tokens(line) {
                self.family_mut(token.family).assign(token.inner);
            }
        }
    }

    pub fn family(&self, family: TokenFamily) -> &FamilyMap {
        match family {
            TokenFamily::Tag => &self.tags,
            TokenFamily::Variable => &self.variables,
            TokenFamily::Direction => &self.directions,
        }
    }

    fn family_mut(&mut self, family: TokenFamily) -> &mut FamilyMap {
        match family {
            TokenFamily::Tag => &mut self.tags,
            TokenFamily::Variable => &mut self.variables,
            TokenFamily::Direction => &mut self.directions,
        }
    }

    /// Total number of assignments across all families
    pub fn len(&self) -> usize {
        self.tags.len() + self.variables.len() + self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every token in `line` with its numeric placeholder.
    ///
    /// Tokens that were never scanned become `?`.
    pub fn rewrite_line(&self, line: &str) -> String {
        self.rewrite_tracked(line).0
    }

    /// Rewrite `line`, also returning the byte offsets in the result where a
    /// placeholder was written
    fn rewrite_tracked(&self, line: &str) -> (String, Vec<usize>) {
        let mut rewritten = String::with_capacity(line.len());
        let mut written = Vec::new();
        let mut last = 0;

        for token in find_tokens(line) {
            rewritten.push_str(&line[last..token.start]);
            written.push(rewritten.len());
            let id = self
                .family(token.family)
                .get(token.inner)
                .map(|id| id.to_string())
                .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());
            rewritten.push_str(&token.family.wrap(&id));
            last = token.end;
        }
        rewritten.push_str(&line[last..]);

        (rewritten, written)
    }

    /// Map numeric placeholders in a translated line back to their tokens.
    ///
    /// `source_line` is the line before rewriting. Text that merely looks like
    /// a placeholder there (`(1)` in "Option (1)", or an escaped `[[1]`) is
    /// left as is: occurrences of each placeholder in `translated` are matched
    /// in order against the occurrences in the rewritten source line.
    pub fn restore_line(&self, source_line: &str, translated: &str) -> String {
        if self.is_empty() {
            return translated.to_string();
        }

        let (rewritten, written) = self.rewrite_tracked(source_line);
        let mut expected: HashMap<(TokenFamily, u32), VecDeque<bool>> = HashMap::new();
        for slot in find_slots(&rewritten) {
            expected
                .entry((slot.family, slot.id))
                .or_default()
                .push_back(written.contains(&slot.start));
        }

        let mut restored = String::with_capacity(translated.len());
        let mut last = 0;
        for slot in find_slots(translated) {
            restored.push_str(&translated[last..slot.start]);
            last = slot.end;

            // Extra copies the engine made are placeholders too
            let is_placeholder = expected
                .get_mut(&(slot.family, slot.id))
                .and_then(VecDeque::pop_front)
                .unwrap_or(true);
            match self.family(slot.family).token(slot.id) {
                Some(token) if is_placeholder => restored.push_str(&slot.family.wrap(token)),
                _ => restored.push_str(&translated[slot.start..slot.end]),
            }
        }
        restored.push_str(&translated[last..]);
        restored
    }

    /// Mapping side-file: one section per non-empty family, `{id} = {token}`
    /// lines in ascending id order
    pub fn render_mapping(&self) -> String {
        let mut out = String::new();
        for family in [TokenFamily::Tag, TokenFamily::Variable, TokenFamily::Direction] {
            let map = self.family(family);
            if map.is_empty() {
                continue;
            }
            let _ = writeln!(out, "=== {} ===", family.section_title());
            for (id, token) in map.iter() {
                let _ = writeln!(out, "{} = {}", family.wrap(&id.to_string()), family.wrap(token));
            }
            out.push('\n');
        }
        out
    }
}
