/*!
 * Cascading dispatch over an ordered chain of engines.
 *
 * Every text unit walks the chain in priority order until one engine
 * succeeds. Engines that keep failing are blocked and skipped; when every
 * engine is blocked the whole chain is reset and tried again. Engine state
 * lives for the whole run so blocking decisions accumulate across documents.
 */

use log::{debug, error, info, warn};

use crate::app_config::BlockingConfig;
use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::session::{ProcessingStats, SessionLog, SessionRecord};

/// Successes between two progress messages for the same engine
const SUCCESS_REPORT_INTERVAL: u64 = 50;

/// Engine label used for units no engine could translate
pub const NO_ENGINE: &str = "none";

/// Rolling counters of one engine since the last global reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    /// Failures since the last success
    pub failures: u32,
    pub successes: u32,
    pub attempts: u32,
    pub blocked: bool,
    /// Unusable for the rest of the run (missing external dependency)
    pub disabled: bool,
}

impl EngineState {
    pub fn is_usable(&self) -> bool {
        !self.blocked && !self.disabled
    }

    fn record_success(&mut self) {
        self.attempts += 1;
        self.successes += 1;
        self.failures = 0;
    }

    fn record_failure(&mut self) {
        self.attempts += 1;
        self.failures += 1;
    }

    /// Whether the counters cross either blocking threshold
    pub fn should_block(&self, rules: &BlockingConfig) -> bool {
        if self.failures >= rules.consecutive_failures && self.successes == 0 {
            return true;
        }
        if self.attempts >= rules.min_attempts {
            let ratio = self.successes as f64 / self.attempts as f64;
            return ratio < rules.min_success_ratio;
        }
        false
    }

    fn reset(&mut self) {
        let disabled = self.disabled;
        *self = Self {
            disabled,
            ..Self::default()
        };
    }
}

/// Ordered engines with per-engine circuit breaking
#[derive(Debug)]
pub struct CascadeDispatcher {
    providers: Vec<Box<dyn Provider>>,
    states: Vec<EngineState>,
    rules: BlockingConfig,
    stats: ProcessingStats,
    session: SessionLog,
}

impl CascadeDispatcher {
    /// Create a dispatcher over `providers`, highest priority first
    pub fn new(providers: Vec<Box<dyn Provider>>, rules: BlockingConfig) -> Self {
        let states = vec![EngineState::default(); providers.len()];
        let stats = ProcessingStats::for_engines(providers.iter().map(|p| p.name()));
        Self {
            providers,
            states,
            rules,
            stats,
            session: SessionLog::new(),
        }
    }

    /// Engine names in priority order
    pub fn engine_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn states(&self) -> &[EngineState] {
        &self.states
    }

    /// State of the engine called `name`
    pub fn state(&self, name: &str) -> Option<&EngineState> {
        self.providers
            .iter()
            .position(|p| p.name() == name)
            .map(|index| &self.states[index])
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ProcessingStats {
        &mut self.stats
    }

    pub fn session(&self) -> &SessionLog {
        &self.session
    }

    /// Names of engines currently blocked
    pub fn blocked_engines(&self) -> Vec<&str> {
        self.providers
            .iter()
            .zip(&self.states)
            .filter(|(_, state)| state.blocked)
            .map(|(provider, _)| provider.name())
            .collect()
    }

    /// Whether any usable engine asks for cool-downs between batches
    pub fn usable_batch_throttled(&self) -> bool {
        self.providers
            .iter()
            .zip(&self.states)
            .any(|(provider, state)| provider.batch_throttled() && state.is_usable())
    }

    /// Clear every block and counter; disabled engines stay disabled
    pub fn global_reset(&mut self) {
        warn!("All engines are blocked, resetting engine states");
        for state in &mut self.states {
            state.reset();
        }
        self.stats.global_resets += 1;
    }

    /// Translate one text unit through the cascade.
    ///
    /// Never fails: when every engine fails the original text is returned and
    /// the unit is counted as failed.
    pub async fn translate_single(&mut self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let any_enabled = self.states.iter().any(|s| !s.disabled);
        if any_enabled && !self.states.iter().any(EngineState::is_usable) {
            self.global_reset();
        }

        for index in 0..self.providers.len() {
            if self.states[index].disabled {
                continue;
            }
            if self.states[index].blocked {
                self.stats.blocked_saves += 1;
                continue;
            }

            let result = self.providers[index].translate(text).await;
            match result {
                Ok(translated) => {
                    self.on_success(index, text, &translated);
                    return translated;
                }
                Err(e) => self.on_failure(index, text, e),
            }
        }

        warn!("All engines failed, keeping original text: {}", preview(text));
        self.stats.failed_units += 1;
        self.session
            .push(SessionRecord::failure(NO_ENGINE, text, "all engines failed"));
        text.to_string()
    }

    fn on_success(&mut self, index: usize, original: &str, translated: &str) {
        let name = self.providers[index].name();
        self.states[index].record_success();

        let usage = &mut self.stats.engines[index];
        usage.attempts += 1;
        usage.successes += 1;
        if usage.successes == 1 {
            info!("{} engine is working", name);
        } else if usage.successes % SUCCESS_REPORT_INTERVAL == 0 {
            info!("{} has translated {} texts", name, usage.successes);
        }
        debug!("{}: {} -> {}", name, preview(original), preview(translated));

        self.session
            .push(SessionRecord::success(name, original, translated));
    }

    fn on_failure(&mut self, index: usize, original: &str, error: ProviderError) {
        let name = self.providers[index].name();
        let usage = &mut self.stats.engines[index];
        usage.attempts += 1;
        usage.failures += 1;
        if error.is_rate_limited() {
            usage.rate_limited += 1;
        }

        match &error {
            ProviderError::RateLimited(_) => warn!("{} is rate limited", name),
            ProviderError::Configuration(message) => {
                error!("{} disabled for this run: {}", name, message);
                self.states[index].disabled = true;
            }
            ProviderError::Failed(message) => debug!("{} failed: {}", name, message),
        }
        self.session
            .push(SessionRecord::failure(name, original, error.to_string()));

        let state = &mut self.states[index];
        if state.disabled {
            return;
        }
        state.record_failure();
        if !state.blocked && state.should_block(&self.rules) {
            state.blocked = true;
            warn!(
                "{} blocked after {} attempts ({} consecutive failures, {} successes)",
                name, state.attempts, state.failures, state.successes
            );
        }
    }

    /// Human readable run report, one line per entry
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let total = self.stats.total_translated();

        lines.push(format!("Translated units: {}", total));
        for usage in &self.stats.engines {
            let share = if total == 0 {
                0.0
            } else {
                usage.successes as f64 * 100.0 / total as f64
            };
            lines.push(format!("  {}: {} ({:.1}%)", usage.engine, usage.successes, share));
        }
        lines.push(format!("Failed units: {}", self.stats.failed_units));
        lines.push(format!("Skipped code/asset spans: {}", self.stats.skipped_units));
        lines.push(format!("Blocked engine saves: {}", self.stats.blocked_saves));
        lines.push(format!("Batch delays: {}", self.stats.batch_delays));
        lines.push(format!("Global resets: {}", self.stats.global_resets));

        let blocked = self.blocked_engines();
        if blocked.is_empty() {
            lines.push("Blocked engines: none".to_string());
        } else {
            lines.push(format!("Blocked engines: {}", blocked.join(", ")));
        }

        for (usage, state) in self.stats.engines.iter().zip(&self.states) {
            let status = if state.disabled {
                "Disabled"
            } else if state.blocked {
                "Blocked"
            } else {
                "Active"
            };
            lines.push(format!(
                "  {}: {:.1}% success over {} attempts [{}]",
                usage.engine,
                usage.success_rate() * 100.0,
                usage.attempts,
                status
            ));
        }
        lines
    }

    pub fn log_report(&self) {
        info!("Run statistics:");
        for line in self.report_lines() {
            info!("{}", line);
        }
    }
}

/// First 50 characters of `text` for log lines
fn preview(text: &str) -> String {
    const LIMIT: usize = 50;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let cut: String = text.chars().take(LIMIT).collect();
        format!("{}...", cut)
    }
}
