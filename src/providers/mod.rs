/*!
 * Translation engine implementations.
 *
 * This module contains the clients the cascade dispatches to, in their
 * default priority order:
 * - Google: free `translate_a/single` web endpoint
 * - Bing: `ttranslatev3` web endpoint
 * - Lingva: Google proxy instances, rotated on failure
 * - Shell: the translate-shell command line tool
 * - Mock: scripted engine for tests and benchmarks
 */

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{Config, EngineConfig, EngineKind};
use crate::errors::ProviderError;
use crate::language_utils;

/// Common trait for all translation engines
///
/// An engine turns one piece of source text into translated text, or fails
/// with a typed [`ProviderError`]. Engines may retry internally across
/// equivalent endpoints, and every engine sleeps for its own post-call delay
/// after a success so the cascade never has to know about upstream limits.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Display name used in logs and statistics
    fn name(&self) -> &str;

    /// Translate `text` from the configured source to the target language
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - Translated text, never empty
    async fn translate(&self, text: &str) -> Result<String, ProviderError>;

    /// Whether the batch controller should cool down on behalf of this engine
    fn batch_throttled(&self) -> bool {
        false
    }
}

/// Source and target codes in the form engines expect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Resolve configured ISO codes into engine codes
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            language_utils::to_engine_code(&config.source_language)?,
            language_utils::to_engine_code(&config.target_language)?,
        ))
    }
}

/// Build every enabled engine from the configuration, in priority order
pub fn build_providers(config: &Config) -> anyhow::Result<Vec<Box<dyn Provider>>> {
    let languages = LanguagePair::from_config(config)?;
    let providers = config
        .enabled_engines()
        .map(|engine| build_provider(engine, &languages))
        .collect();
    Ok(providers)
}

/// Build a single engine
pub fn build_provider(engine: &EngineConfig, languages: &LanguagePair) -> Box<dyn Provider> {
    debug!(
        "Configuring {} engine (timeout {}s, post-call delay {}ms)",
        engine.kind.display_name(),
        engine.timeout_secs(),
        engine.post_call_delay_ms()
    );
    match engine.kind {
        EngineKind::Google => Box::new(google::Google::new(engine, languages.clone())),
        EngineKind::Bing => Box::new(bing::Bing::new(engine, languages.clone())),
        EngineKind::Lingva => Box::new(lingva::Lingva::new(engine, languages.clone())),
        EngineKind::Shell => Box::new(shell::Shell::new(engine, languages.clone())),
    }
}

/// HTTP client with the engine's timeout
pub(crate) fn http_client(timeout_secs: u64, user_agent: Option<&str>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs));
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent);
    }
    builder.build().unwrap_or_default()
}

/// Map a non-success HTTP status to the engine error taxonomy
pub(crate) fn status_error(engine: &str, status: StatusCode) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimited(format!("{} rate limit exceeded", engine))
    } else {
        ProviderError::Failed(format!("{} HTTP error: {}", engine, status))
    }
}

/// Map a transport error; timeouts are ordinary failures
pub(crate) fn request_error(engine: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Failed(format!("{} request timed out", engine))
    } else {
        ProviderError::Failed(format!("{} network error: {}", engine, error))
    }
}

/// Reject empty engine output
pub(crate) fn non_empty(engine: &str, translated: String) -> Result<String, ProviderError> {
    if translated.trim().is_empty() {
        Err(ProviderError::Failed(format!("Empty {} translation result", engine)))
    } else {
        Ok(translated)
    }
}

/// Self-throttle after a successful call
pub(crate) async fn post_call_pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

pub mod bing;
pub mod google;
pub mod lingva;
pub mod mock;
pub mod shell;
