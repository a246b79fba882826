/*!
 * Session log records and run statistics.
 *
 * These structures are what ends up in the session JSON file written at the
 * end of a run.
 */

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Outcome of one engine call, or of a unit no engine could translate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// RFC 3339 local time of the call
    pub timestamp: String,
    /// Text sent to the engine
    pub original: String,
    /// Engine output, or the original text when the call failed
    pub translated: String,
    /// Engine display name
    pub engine: String,
    pub success: bool,
    /// Error message for failed calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub length_original: usize,
    pub length_translated: usize,
}

impl SessionRecord {
    pub fn success(engine: &str, original: &str, translated: &str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            original: original.to_string(),
            translated: translated.to_string(),
            engine: engine.to_string(),
            success: true,
            error: None,
            length_original: original.chars().count(),
            length_translated: translated.chars().count(),
        }
    }

    pub fn failure(engine: &str, original: &str, error: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            original: original.to_string(),
            translated: original.to_string(),
            engine: engine.to_string(),
            success: false,
            error: Some(error.into()),
            length_original: original.chars().count(),
            length_translated: original.chars().count(),
        }
    }
}

/// Per-engine counters over the whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineUsage {
    pub engine: String,
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub rate_limited: u64,
}

impl EngineUsage {
    pub fn new(engine: &str) -> Self {
        Self {
            engine: engine.to_string(),
            ..Default::default()
        }
    }

    /// Successful calls over attempts, 0 when never tried
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64
    }
}

/// Derived run counters; only persisted in the session log summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// One entry per engine, in priority order
    pub engines: Vec<EngineUsage>,
    /// Units every engine failed on
    pub failed_units: u64,
    /// Quoted spans classified as code or assets
    pub skipped_units: u64,
    /// Calls avoided because the engine was blocked
    pub blocked_saves: u64,
    pub global_resets: u64,
    pub batch_delays: u64,
    pub documents_processed: u64,
    pub documents_skipped: u64,
}

impl ProcessingStats {
    pub fn for_engines<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            engines: names.into_iter().map(EngineUsage::new).collect(),
            ..Default::default()
        }
    }

    /// Units translated by any engine
    pub fn total_translated(&self) -> u64 {
        self.engines.iter().map(|e| e.successes).sum()
    }
}

/// Everything written to `rpytl_session_<id>.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration_minutes: f64,
    pub total_translations: usize,
    pub statistics: ProcessingStats,
    pub translations: Vec<SessionRecord>,
}
