/*!
 * Append-only session log.
 *
 * One log is owned by one run. Records are kept in memory in call order and
 * written once, as a single JSON document, when the run ends.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::info;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::models::{ProcessingStats, SessionRecord, SessionSummary};
use crate::file_utils::FileManager;

#[derive(Debug)]
pub struct SessionLog {
    session_id: String,
    start_time: DateTime<Local>,
    records: Vec<SessionRecord>,
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLog {
    pub fn new() -> Self {
        let start_time = Local::now();
        Self {
            session_id: Self::make_session_id(&start_time),
            start_time,
            records: Vec::new(),
        }
    }

    /// `YYYYmmdd_HHMMSS_<8 hex>`; the suffix keeps two runs started in the
    /// same second apart
    fn make_session_id(start_time: &DateTime<Local>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}_{}", start_time.format("%Y%m%d_%H%M%S"), &suffix[..8])
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn push(&mut self, record: SessionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of the log closed at the current time
    pub fn summary(&self, stats: &ProcessingStats) -> SessionSummary {
        let end_time = Local::now();
        let elapsed = end_time.signed_duration_since(self.start_time);
        SessionSummary {
            session_id: self.session_id.clone(),
            start_time: self.start_time,
            end_time,
            duration_minutes: elapsed.num_milliseconds() as f64 / 60_000.0,
            total_translations: self.records.iter().filter(|r| r.success).count(),
            statistics: stats.clone(),
            translations: self.records.clone(),
        }
    }

    /// Path of the session file inside `log_dir`
    pub fn file_path(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(format!("rpytl_session_{}.json", self.session_id))
    }

    /// Write the session file into `log_dir`
    pub fn save(&self, log_dir: &Path, stats: &ProcessingStats) -> Result<PathBuf> {
        let summary = self.summary(stats);
        let json = serde_json::to_string_pretty(&summary)
            .context("Failed to serialize session log")?;

        let path = self.file_path(log_dir);
        FileManager::write_to_file(&path, &json)?;
        info!("Session log saved: {}", path.display());
        Ok(path)
    }
}
