/*!
 * Session bookkeeping for a translation run.
 *
 * This module provides:
 * - Per-call outcome records in call order
 * - Run statistics derived from the cascade and the pipeline
 * - The JSON session file written when the run ends
 */

pub mod session_log;
pub mod models;

// Re-export main types
pub use session_log::SessionLog;
pub use models::{EngineUsage, ProcessingStats, SessionRecord, SessionSummary};
