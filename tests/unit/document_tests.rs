/*!
 * Tests for the per-document pipeline
 */

use rpytl::providers::mock::{MockBehavior, MockProvider};
use rpytl::translation::{process_document, Classification, DocumentOptions, UnitOutcome};
use crate::common::{self, mock_providers};

fn keep_placeholders() -> DocumentOptions {
    DocumentOptions {
        restore_placeholders: false,
    }
}

/// Variables are sent as numeric placeholders and restored afterwards
#[tokio::test]
async fn test_process_document_withVariable_shouldSendPlaceholderAndRestore() {
    let content = "show eileen happy\n\"Hello [mname]!\"\n";
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed =
        process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;

    assert_eq!(handles[0].received(), vec!["Hello [1]!".to_string()]);
    assert_eq!(processed.content, "show eileen happy\n\"[A] Hello [mname]!\"\n");
    assert_eq!(processed.placeholders.variables.get("mname"), Some(1));
    assert_eq!(processed.mapping(), "=== VARIABLE MAPPING ===\n[1] = [mname]\n\n");
}

/// Without restoration the placeholders stay in the output
#[tokio::test]
async fn test_process_document_withoutRestore_shouldKeepPlaceholders() {
    let content = "e \"Hello [mname]!\"";
    let (providers, _handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &keep_placeholders(), |_, _| {}).await;
    assert_eq!(processed.content, "e \"[A] Hello [1]!\"");
}

/// Statement lines and asset names never reach an engine
#[tokio::test]
async fn test_process_document_withCodeAndAssets_shouldNotSubmitThem() {
    let content = "    show eileen \"happy\"\n    \"image.png\"\n    e \"audio/voice.ogg\"\n    $ name = \"Bob\"\n";
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;

    assert_eq!(handles[0].calls(), 0);
    assert_eq!(processed.content, content);
    assert_eq!(processed.stats.skipped, 3);
    assert_eq!(processed.stats.passthrough_lines, 1);
    assert!(processed
        .units
        .iter()
        .all(|u| u.classification == Classification::Skip && u.outcome == UnitOutcome::Skipped));
    assert_eq!(dispatcher.stats().skipped_units, 3);
}

/// Line order, count and endings are preserved
#[tokio::test]
async fn test_process_document_withCrLfEndings_shouldPreserveThem() {
    let content = "label start:\r\n    e \"One\"\r\n\r\n    # note\r\n    e \"Two\"";
    let (providers, _handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let mut progress = Vec::new();
    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |done, total| {
        progress.push((done, total));
    })
    .await;

    assert_eq!(
        processed.content,
        "label start:\r\n    e \"[A] One\"\r\n\r\n    # note\r\n    e \"[A] Two\""
    );
    assert_eq!(progress.len(), 5);
    assert_eq!(progress.last(), Some(&(5, 5)));
    assert_eq!(processed.units[1].line_number, 5);
}

/// Escapes travel as sentinels and come back intact
#[tokio::test]
async fn test_process_document_withEscapes_shouldProtectThem() {
    let content = r#"e "First\nSecond \"quoted\"""#;
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;

    assert_eq!(
        handles[0].received(),
        vec!["First<!NEWLINE!>Second <!QUOTE!>quoted<!QUOTE!>".to_string()]
    );
    assert_eq!(processed.content, r#"e "[A] First\nSecond \"quoted\"""#);
}

/// Failed units keep the source text and are counted
#[tokio::test]
async fn test_process_document_withFailingEngines_shouldKeepOriginal() {
    let content = "e \"Hello {b}there{/b}.\"\ne \"Again.\"";
    let (providers, _handles) = mock_providers::chain(vec![MockProvider::failing("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;

    assert_eq!(processed.content, content);
    assert_eq!(processed.stats.failed, 2);
    assert_eq!(processed.stats.translated, 0);
    assert!(processed.units.iter().all(|u| u.outcome == UnitOutcome::Untranslated));
}

/// Echoed text counts as untranslated
#[tokio::test]
async fn test_process_document_withEchoingEngine_shouldCountAsFailed() {
    let (providers, _handles) =
        mock_providers::chain(vec![MockProvider::new("Echo", MockBehavior::Echo)]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document("e \"Eileen\"", &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;
    assert_eq!(processed.stats.failed, 1);
    assert_eq!(processed.content, "e \"Eileen\"");
}

/// Several spans on one line are handled independently
#[tokio::test]
async fn test_process_document_withSeveralSpans_shouldTranslateEach() {
    let content = "e \"Left\" \"Right\"";
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;
    assert_eq!(handles[0].received(), vec!["Left".to_string(), "Right".to_string()]);
    assert_eq!(processed.content, "e \"[A] Left\" \"[A] Right\"");
    assert_eq!(processed.stats.total_processed(), 2);
}

/// The sample script mixes every kind of line
#[tokio::test]
async fn test_process_document_withSampleScript_shouldTranslateDialogueOnly() {
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(
        common::SAMPLE_SCRIPT,
        &mut dispatcher,
        &DocumentOptions::default(),
        |_, _| {},
    )
    .await;

    assert_eq!(
        handles[0].received(),
        vec![
            "Hello [1]!".to_string(),
            "I like {1}bold{2} words.".to_string(),
            "Stay here".to_string(),
            "Goodbye.".to_string(),
        ]
    );
    assert!(processed.content.contains("e \"[A] I like {b}bold{/b} words.\""));
    assert!(processed.content.contains("play music \"audio/theme.ogg\""));
    assert!(processed.content.contains("    \"image.png\"\n"));
    assert_eq!(processed.stats.translated, 4);
    assert_eq!(processed.stats.skipped, 2);
    assert_eq!(
        processed.content.lines().count(),
        common::SAMPLE_SCRIPT.lines().count()
    );
}

/// A tag holding a variable travels as a single tag placeholder
#[tokio::test]
async fn test_process_document_withVariableInsideTag_shouldRestoreWholeTag() {
    let content = "e \"{size=[s]}Big{/size}\"";
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;

    assert_eq!(handles[0].received(), vec!["{1}Big{2}".to_string()]);
    assert_eq!(processed.content, "e \"[A] {size=[s]}Big{/size}\"");
    assert!(processed.placeholders.variables.is_empty());
}

/// Escaped brackets that look like placeholders are not restored
#[tokio::test]
async fn test_process_document_withEscapedPlaceholderLookalike_shouldKeepLiteral() {
    let content = "e \"Hi [mname]\"\ne \"Use [[1] here\"";
    let (providers, _handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;
    assert_eq!(processed.content, "e \"[A] Hi [mname]\"\ne \"[A] Use [[1] here\"");
}

/// A literal "(1)" and a direction with id 1 on the same line both survive
#[tokio::test]
async fn test_process_document_withLiteralNumberedParentheses_shouldRestoreDirection() {
    let content = "e \"Option (1) makes me (smile)\"";
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    let processed = process_document(content, &mut dispatcher, &DocumentOptions::default(), |_, _| {}).await;

    assert_eq!(handles[0].received(), vec!["Option (1) makes me (1)".to_string()]);
    assert_eq!(processed.content, "e \"[A] Option (1) makes me (smile)\"");
}
