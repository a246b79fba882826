/*!
 * Per-document translation pipeline.
 *
 * A document is scanned once for markup tokens, then processed line by line
 * in order. Each quoted span on a substantive line is classified and either
 * kept verbatim or sent through the cascade. Lines are never merged or
 * reordered and their endings are preserved.
 */

use log::debug;

use super::cascade::CascadeDispatcher;
use super::classifier::{self, QUOTED_SPAN_REGEX};
use super::escapes;
use super::placeholders::PlaceholderMap;

/// How a quoted span was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Translatable,
    Skip,
}

/// What happened to a quoted span
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Translated(String),
    /// Every engine failed or returned the text unchanged
    Untranslated,
    Skipped,
}

/// One quoted literal of the document
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnit {
    /// Span content after placeholder rewriting, without the quotes
    pub raw: String,
    /// 1-based
    pub line_number: usize,
    pub classification: Classification,
    pub outcome: UnitOutcome,
}

impl TextUnit {
    /// Text written back between the quotes
    pub fn output(&self) -> &str {
        match &self.outcome {
            UnitOutcome::Translated(text) => text,
            UnitOutcome::Untranslated | UnitOutcome::Skipped => &self.raw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStats {
    pub total_lines: usize,
    /// Blank, comment and inline python lines
    pub passthrough_lines: usize,
    pub translated: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DocumentStats {
    /// Spans that went through classification
    pub fn total_processed(&self) -> usize {
        self.translated + self.failed + self.skipped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Map placeholders back to the original tokens in the output
    pub restore_placeholders: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            restore_placeholders: true,
        }
    }
}

/// Result of processing one document
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Transformed document, same line count and endings as the input
    pub content: String,
    pub placeholders: PlaceholderMap,
    pub units: Vec<TextUnit>,
    pub stats: DocumentStats,
}

impl ProcessedDocument {
    /// Contents of the mapping side-file
    pub fn mapping(&self) -> String {
        self.placeholders.render_mapping()
    }
}

/// Translate a whole document.
///
/// `on_line` is called after every line with `(lines_done, total_lines)`.
pub async fn process_document<F>(
    content: &str,
    dispatcher: &mut CascadeDispatcher,
    options: &DocumentOptions,
    mut on_line: F,
) -> ProcessedDocument
where
    F: FnMut(usize, usize),
{
    let placeholders = PlaceholderMap::scan(content);
    debug!(
        "Placeholders: {} tags, {} variables, {} directions",
        placeholders.tags.len(),
        placeholders.variables.len(),
        placeholders.directions.len()
    );

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let total_lines = lines.len();

    let mut output = String::with_capacity(content.len() + content.len() / 4);
    let mut units = Vec::new();
    let mut stats = DocumentStats {
        total_lines,
        ..Default::default()
    };

    for (index, line) in lines.iter().enumerate() {
        let (body, ending) = split_line_ending(line);

        if classifier::is_substantive_line(body) {
            let processed = process_line(
                body,
                index + 1,
                &placeholders,
                dispatcher,
                options,
                &mut units,
                &mut stats,
            )
            .await;
            output.push_str(&processed);
        } else {
            stats.passthrough_lines += 1;
            output.push_str(body);
        }
        output.push_str(ending);

        on_line(index + 1, total_lines);
    }

    dispatcher.stats_mut().skipped_units += stats.skipped as u64;

    ProcessedDocument {
        content: output,
        placeholders,
        units,
        stats,
    }
}

async fn process_line(
    body: &str,
    line_number: usize,
    placeholders: &PlaceholderMap,
    dispatcher: &mut CascadeDispatcher,
    options: &DocumentOptions,
    units: &mut Vec<TextUnit>,
    stats: &mut DocumentStats,
) -> String {
    let rewritten = placeholders.rewrite_line(body);
    let mut out = String::with_capacity(rewritten.len());
    let mut last = 0;

    for span in QUOTED_SPAN_REGEX.find_iter(&rewritten) {
        out.push_str(&rewritten[last..span.start()]);
        last = span.end();

        let raw = classifier::span_content(span.as_str());
        if raw.trim().is_empty() {
            out.push_str(span.as_str());
            continue;
        }

        let unit = if classifier::should_translate(&rewritten, span) {
            translate_unit(raw, line_number, dispatcher).await
        } else {
            TextUnit {
                raw: raw.to_string(),
                line_number,
                classification: Classification::Skip,
                outcome: UnitOutcome::Skipped,
            }
        };

        match unit.outcome {
            UnitOutcome::Translated(_) => stats.translated += 1,
            UnitOutcome::Untranslated => stats.failed += 1,
            UnitOutcome::Skipped => stats.skipped += 1,
        }

        out.push('"');
        out.push_str(unit.output());
        out.push('"');
        units.push(unit);
    }
    out.push_str(&rewritten[last..]);

    if options.restore_placeholders {
        placeholders.restore_line(body, &out)
    } else {
        out
    }
}

async fn translate_unit(raw: &str, line_number: usize, dispatcher: &mut CascadeDispatcher) -> TextUnit {
    let protected = escapes::protect(raw);
    let translated = dispatcher.translate_single(&protected).await;
    let translated = escape_bare_quotes(&escapes::restore(&translated));

    let outcome = if translated.trim().is_empty() || translated == raw {
        UnitOutcome::Untranslated
    } else {
        UnitOutcome::Translated(translated)
    };

    TextUnit {
        raw: raw.to_string(),
        line_number,
        classification: Classification::Translatable,
        outcome,
    }
}

/// Split `"text\r\n"` into `("text", "\r\n")`
fn split_line_ending(line: &str) -> (&str, &str) {
    let body = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);
    (body, &line[body.len()..])
}

/// Escape double quotes an engine introduced so the literal stays closed
fn escape_bare_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;
    for c in text.chars() {
        if c == '"' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}
