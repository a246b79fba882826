use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;

/// Application configuration module
/// This module handles loading, validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation engines in priority order
    #[serde(default = "default_engines")]
    pub engines: Vec<EngineConfig>,

    /// Thresholds that decide when an engine gets blocked
    #[serde(default)]
    pub blocking: BlockingConfig,

    /// Cool-down between groups of documents
    #[serde(default)]
    pub batch: BatchConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    // @engine: Google Translate free web endpoint
    Google,
    // @engine: Bing web translator
    Bing,
    // @engine: Lingva (Google proxy, rotating instances)
    Lingva,
    // @engine: translate-shell command line tool
    Shell,
}

impl EngineKind {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::Lingva => "Lingva",
            Self::Shell => "Shell",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Bing => "bing".to_string(),
            Self::Lingva => "lingva".to_string(),
            Self::Shell => "shell".to_string(),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for EngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            "lingva" => Ok(Self::Lingva),
            "shell" | "trans" | "translate-shell" => Ok(Self::Shell),
            _ => Err(anyhow!("Invalid engine type: {}", s)),
        }
    }
}

/// Per-engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub kind: EngineKind,

    // @field: Whether the engine takes part in the cascade
    #[serde(default = "default_true")]
    pub enabled: bool,

    // @field: Endpoint URLs, or the command name for the shell engine
    #[serde(default)]
    pub endpoints: Vec<String>,

    // @field: Timeout seconds per call (engine default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    // @field: Delay after every successful call (engine default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_call_delay_ms: Option<u64>,

    // @field: Whether batch cool-downs are applied on behalf of this engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_throttled: Option<bool>,
}

impl EngineConfig {
    // @param kind: Engine enum
    // @returns: Engine config with defaults
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            enabled: true,
            endpoints: Vec::new(),
            timeout_secs: None,
            post_call_delay_ms: None,
            batch_throttled: None,
        }
    }

    /// Per-call timeout in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(match self.kind {
            EngineKind::Shell => default_shell_timeout_secs(),
            _ => default_web_timeout_secs(),
        })
    }

    /// Delay observed after every successful call, in milliseconds
    pub fn post_call_delay_ms(&self) -> u64 {
        self.post_call_delay_ms.unwrap_or(match self.kind {
            EngineKind::Shell => default_shell_post_call_delay_ms(),
            _ => default_web_post_call_delay_ms(),
        })
    }

    /// Whether batch cool-downs are applied on behalf of this engine
    pub fn is_batch_throttled(&self) -> bool {
        self.batch_throttled
            .unwrap_or(matches!(self.kind, EngineKind::Google | EngineKind::Bing))
    }

    /// Endpoints for this engine, falling back to the built-in defaults
    pub fn resolved_endpoints(&self) -> Vec<String> {
        if !self.endpoints.is_empty() {
            return self.endpoints.clone();
        }

        match self.kind {
            EngineKind::Google => vec![default_google_endpoint()],
            EngineKind::Bing => vec![default_bing_endpoint()],
            EngineKind::Lingva => default_lingva_endpoints(),
            EngineKind::Shell => vec![default_shell_command()],
        }
    }
}

/// Rules for moving an engine from active to blocked
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BlockingConfig {
    /// Consecutive failures (with zero successes) that block an engine
    #[serde(default = "default_consecutive_failures")]
    pub consecutive_failures: u32,

    /// Attempts required before the success ratio rule applies
    #[serde(default = "default_min_attempts")]
    pub min_attempts: u32,

    /// Success ratio below which an engine is blocked
    #[serde(default = "default_min_success_ratio")]
    pub min_success_ratio: f64,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            consecutive_failures: default_consecutive_failures(),
            min_attempts: default_min_attempts(),
            min_success_ratio: default_min_success_ratio(),
        }
    }
}

/// Cool-down between groups of documents
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Documents per batch
    #[serde(default = "default_batch_size")]
    pub size: usize,

    /// Seconds to wait between batches
    #[serde(default = "default_batch_delay_secs")]
    pub delay_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
            delay_secs: default_batch_delay_secs(),
        }
    }
}

/// Where and how results are written
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Root output directory
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Map numeric placeholders back to the original tokens in the output
    #[serde(default = "default_true")]
    pub restore_placeholders: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            restore_placeholders: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "id".to_string()
}

fn default_engines() -> Vec<EngineConfig> {
    vec![
        EngineConfig::new(EngineKind::Google),
        EngineConfig::new(EngineKind::Bing),
        EngineConfig::new(EngineKind::Lingva),
        EngineConfig::new(EngineKind::Shell),
    ]
}

/// Validation failure carried as [`AppError::Config`]
fn config_error(message: String) -> anyhow::Error {
    AppError::Config(message).into()
}

fn default_true() -> bool {
    true
}

fn default_web_timeout_secs() -> u64 {
    20
}

fn default_shell_timeout_secs() -> u64 {
    25
}

fn default_web_post_call_delay_ms() -> u64 {
    500
}

fn default_shell_post_call_delay_ms() -> u64 {
    300
}

fn default_consecutive_failures() -> u32 {
    3
}

fn default_min_attempts() -> u32 {
    5
}

fn default_min_success_ratio() -> f64 {
    0.2
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_secs() -> u64 {
    20
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_bing_endpoint() -> String {
    "https://www.bing.com/ttranslatev3".to_string()
}

fn default_lingva_endpoints() -> Vec<String> {
    vec![
        "https://lingva.ml".to_string(),
        "https://translate.plausibility.cloud".to_string(),
        "https://lingva.lunar.icu".to_string(),
    ]
}

fn default_shell_command() -> String {
    "trans".to_string()
}

impl Config {
    /// Load the configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        for code in [&self.source_language, &self.target_language] {
            crate::language_utils::get_language_name(code)
                .map_err(|e| config_error(format!("{:#}", e)))?;
        }

        if !self.engines.iter().any(|e| e.enabled) {
            return Err(config_error("At least one translation engine must be enabled".to_string()));
        }

        let mut seen = Vec::new();
        for engine in &self.engines {
            if seen.contains(&engine.kind) {
                return Err(config_error(format!(
                    "Engine '{}' is configured more than once",
                    engine.kind
                )));
            }
            seen.push(engine.kind);
        }

        if self.blocking.consecutive_failures == 0 {
            return Err(config_error("blocking.consecutive_failures must be at least 1".to_string()));
        }

        if !(0.0..=1.0).contains(&self.blocking.min_success_ratio) {
            return Err(config_error(format!(
                "blocking.min_success_ratio must be between 0.0 and 1.0, got {}",
                self.blocking.min_success_ratio
            )));
        }

        if self.batch.size == 0 {
            return Err(config_error("batch.size must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Enabled engines in priority order
    pub fn enabled_engines(&self) -> impl Iterator<Item = &EngineConfig> {
        self.engines.iter().filter(|e| e.enabled)
    }

    /// Reorder engines so the listed kinds come first, in the given order,
    /// and disable every engine that was not listed
    pub fn apply_engine_order(&mut self, order: &[EngineKind]) {
        let mut reordered = Vec::with_capacity(self.engines.len());
        for kind in order {
            let mut engine = self
                .engines
                .iter()
                .find(|e| e.kind == *kind)
                .cloned()
                .unwrap_or_else(|| EngineConfig::new(*kind));
            engine.enabled = true;
            if !reordered.iter().any(|e: &EngineConfig| e.kind == *kind) {
                reordered.push(engine);
            }
        }

        for engine in &self.engines {
            if !order.contains(&engine.kind) {
                let mut disabled = engine.clone();
                disabled.enabled = false;
                reordered.push(disabled);
            }
        }

        self.engines = reordered;
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            engines: default_engines(),
            blocking: BlockingConfig::default(),
            batch: BatchConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
