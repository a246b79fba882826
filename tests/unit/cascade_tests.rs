/*!
 * Tests for the cascade dispatcher
 */

use rpytl::providers::mock::{MockOutcome, MockProvider};
use rpytl::translation::cascade::NO_ENGINE;
use crate::common::{self, mock_providers};

/// First success wins and later engines are not called
#[tokio::test]
async fn test_translate_single_withWorkingFirstEngine_shouldNotCallOthers() {
    let (providers, handles) = mock_providers::chain(vec![
        MockProvider::working("A"),
        MockProvider::working("B"),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    assert_eq!(dispatcher.translate_single("Hello").await, "[A] Hello");
    assert_eq!(handles[0].calls(), 1);
    assert_eq!(handles[1].calls(), 0);
}

/// A fails three units in a row with no success; the 4th unit starts at B
#[tokio::test]
async fn test_translate_single_withThreeConsecutiveFailures_shouldSkipBlockedEngine() {
    let (providers, handles) = mock_providers::chain(vec![
        MockProvider::failing("A"),
        MockProvider::working("B"),
        MockProvider::working("C"),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    for _ in 0..3 {
        assert_eq!(dispatcher.translate_single("Hello").await, "[B] Hello");
    }
    assert!(dispatcher.state("A").unwrap().blocked);

    assert_eq!(dispatcher.translate_single("Bye").await, "[B] Bye");
    assert_eq!(handles[0].calls(), 3);
    assert_eq!(handles[1].calls(), 4);
    assert_eq!(handles[2].calls(), 0);
    assert_eq!(dispatcher.stats().blocked_saves, 1);

    // B keeps succeeding; A stays blocked
    assert!(dispatcher.state("A").unwrap().blocked);
    assert_eq!(dispatcher.blocked_engines(), vec!["A"]);
}

/// Engines that succeeded before are blocked by the ratio rule instead
#[tokio::test]
async fn test_translate_single_withLowSuccessRatio_shouldBlockAfterMinAttempts() {
    let (providers, _handles) = mock_providers::chain(vec![
        MockProvider::scripted(
            "A",
            vec![
                MockOutcome::Succeed,
                MockOutcome::Fail,
                MockOutcome::Fail,
                MockOutcome::Fail,
                MockOutcome::Fail,
                MockOutcome::Fail,
            ],
        ),
        MockProvider::working("B"),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    for _ in 0..5 {
        dispatcher.translate_single("Hello").await;
    }
    // 1 success in 5 attempts is not below 0.2
    assert!(!dispatcher.state("A").unwrap().blocked);

    dispatcher.translate_single("Hello").await;
    let state = dispatcher.state("A").unwrap();
    assert_eq!(state.attempts, 6);
    assert!(state.blocked);
}

/// Every engine blocked: the next unit resets all state first
#[tokio::test]
async fn test_translate_single_withAllEnginesBlocked_shouldResetAndRetry() {
    let fails = vec![MockOutcome::Fail, MockOutcome::Fail, MockOutcome::Fail];
    let (providers, handles) = mock_providers::chain(vec![
        MockProvider::scripted("A", fails.clone()),
        MockProvider::scripted("B", fails),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    for _ in 0..3 {
        assert_eq!(dispatcher.translate_single("Hello").await, "Hello");
    }
    assert_eq!(dispatcher.blocked_engines(), vec!["A", "B"]);
    assert_eq!(dispatcher.stats().failed_units, 3);

    assert_eq!(dispatcher.translate_single("Hello").await, "[A] Hello");
    assert_eq!(dispatcher.stats().global_resets, 1);
    assert!(dispatcher.blocked_engines().is_empty());

    let a = dispatcher.state("A").unwrap();
    assert_eq!((a.failures, a.successes, a.attempts), (0, 1, 1));
    let b = dispatcher.state("B").unwrap();
    assert_eq!((b.failures, b.successes, b.attempts), (0, 0, 0));
    assert_eq!(handles[0].calls(), 4);
    assert_eq!(handles[1].calls(), 3);
}

/// Rate limiting counts as a failure and is tallied separately
#[tokio::test]
async fn test_translate_single_withRateLimitedEngine_shouldFallThrough() {
    let (providers, _handles) = mock_providers::chain(vec![
        MockProvider::rate_limited("A"),
        MockProvider::working("B"),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    assert_eq!(dispatcher.translate_single("Hello").await, "[B] Hello");
    let usage = &dispatcher.stats().engines[0];
    assert_eq!((usage.attempts, usage.failures, usage.rate_limited), (1, 1, 1));
    assert_eq!(dispatcher.state("A").unwrap().failures, 1);
}

/// A missing dependency disables the engine for good, even across resets
#[tokio::test]
async fn test_translate_single_withConfigurationError_shouldStayDisabled() {
    let (providers, handles) = mock_providers::chain(vec![
        MockProvider::misconfigured("A"),
        MockProvider::failing("B"),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    for _ in 0..4 {
        assert_eq!(dispatcher.translate_single("Hello").await, "Hello");
    }

    assert_eq!(handles[0].calls(), 1);
    assert_eq!(handles[1].calls(), 4);
    assert_eq!(dispatcher.stats().global_resets, 1);
    assert!(dispatcher.state("A").unwrap().disabled);
}

/// Whitespace never reaches an engine
#[tokio::test]
async fn test_translate_single_withBlankText_shouldNotCallEngines() {
    let (providers, handles) = mock_providers::chain(vec![MockProvider::working("A")]);
    let mut dispatcher = common::dispatcher(providers);

    assert_eq!(dispatcher.translate_single("   ").await, "   ");
    assert_eq!(handles[0].calls(), 0);
    assert!(dispatcher.session().is_empty());
}

/// Every call is recorded in order, plus one record for a lost unit
#[tokio::test]
async fn test_session_log_shouldRecordEveryCall() {
    let (providers, _handles) = mock_providers::chain(vec![
        MockProvider::scripted("A", vec![MockOutcome::Fail]),
        MockProvider::scripted("B", vec![MockOutcome::Succeed, MockOutcome::Fail]),
    ]);
    let mut dispatcher = common::dispatcher(providers);

    dispatcher.translate_single("One").await;
    let records = dispatcher.session().records();
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].engine.as_str(), records[0].success), ("A", false));
    assert_eq!((records[1].engine.as_str(), records[1].success), ("B", true));
    assert_eq!(records[1].translated, "[B] One");
    assert_eq!(records[1].length_original, 3);

    let (providers, _handles) = mock_providers::chain(vec![MockProvider::failing("A")]);
    let mut dispatcher = common::dispatcher(providers);
    dispatcher.translate_single("Lost").await;
    let records = dispatcher.session().records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].engine, NO_ENGINE);
    assert_eq!(records[1].translated, "Lost");
}

/// Batch cool-downs only matter while a throttled engine is usable
#[tokio::test]
async fn test_usable_batch_throttled_withBlockedThrottledEngine_shouldBeFalse() {
    let (providers, _handles) = mock_providers::chain(vec![
        MockProvider::failing("A").with_batch_throttle(),
        MockProvider::working("B"),
    ]);
    let mut dispatcher = common::dispatcher(providers);
    assert!(dispatcher.usable_batch_throttled());

    for _ in 0..3 {
        dispatcher.translate_single("Hello").await;
    }
    assert!(!dispatcher.usable_batch_throttled());
}

/// The report names blocked engines and their status
#[tokio::test]
async fn test_report_lines_shouldShowUsageAndStatus() {
    let (providers, _handles) = mock_providers::chain(vec![
        MockProvider::failing("A"),
        MockProvider::working("B"),
    ]);
    let mut dispatcher = common::dispatcher(providers);
    for _ in 0..4 {
        dispatcher.translate_single("Hello").await;
    }

    let report = dispatcher.report_lines();
    assert!(report.contains(&"Translated units: 4".to_string()));
    assert!(report.contains(&"  B: 4 (100.0%)".to_string()));
    assert!(report.contains(&"Blocked engines: A".to_string()));
    assert!(report.iter().any(|l| l.contains("A: 0.0% success over 3 attempts [Blocked]")));
    assert!(report.iter().any(|l| l.contains("B: 100.0% success over 4 attempts [Active]")));
}
