use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

use super::{http_client, non_empty, post_call_pause, request_error, status_error, LanguagePair, Provider};
use crate::app_config::EngineConfig;
use crate::errors::ProviderError;

/// Lingva Translate, a Google Translate front end with several public
/// instances. The client rotates through them when one fails.
#[derive(Debug)]
pub struct Lingva {
    client: Client,
    endpoints: Vec<String>,
    /// Instance tried first on the next call
    current: AtomicUsize,
    languages: LanguagePair,
    post_call_delay: Duration,
    batch_throttled: bool,
}

#[derive(Debug, Deserialize)]
struct LingvaResponse {
    translation: Option<String>,
}

impl Lingva {
    pub fn new(config: &EngineConfig, languages: LanguagePair) -> Self {
        Self {
            client: http_client(config.timeout_secs(), None),
            endpoints: config.resolved_endpoints(),
            current: AtomicUsize::new(0),
            languages,
            post_call_delay: Duration::from_millis(config.post_call_delay_ms()),
            batch_throttled: config.is_batch_throttled(),
        }
    }

    /// `{base}/api/v1/{source}/{target}/{text}` with the text percent-encoded
    /// as a single path segment
    pub fn request_url(base: &str, languages: &LanguagePair, text: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(base)
            .map_err(|e| ProviderError::Configuration(format!("Invalid Lingva endpoint {}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Configuration(format!("Invalid Lingva endpoint {}", base)))?
            .pop_if_empty()
            .extend(["api", "v1", languages.source.as_str(), languages.target.as_str(), text]);
        Ok(url)
    }

    /// Index of the instance tried first on the next call
    pub fn current_endpoint(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    fn advance(&self) {
        let next = (self.current_endpoint() + 1) % self.endpoints.len().max(1);
        self.current.store(next, Ordering::Relaxed);
    }

    async fn translate_once(&self, base: &str, text: &str) -> Result<String, ProviderError> {
        let url = Self::request_url(base, &self.languages, text)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(self.name(), status));
        }

        let body: LingvaResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Failed(format!("Lingva JSON parse error: {}", e)))?;

        let translated = body.translation.ok_or_else(|| {
            ProviderError::Failed("Lingva response missing translation field".to_string())
        })?;
        non_empty(self.name(), translated)
    }
}

#[async_trait]
impl Provider for Lingva {
    fn name(&self) -> &str {
        "Lingva"
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        if self.endpoints.is_empty() {
            return Err(ProviderError::Configuration("No Lingva endpoints configured".to_string()));
        }

        let mut last_error = None;
        for _ in 0..self.endpoints.len() {
            let base = &self.endpoints[self.current_endpoint()];
            match self.translate_once(base, text).await {
                Ok(translated) => {
                    post_call_pause(self.post_call_delay).await;
                    return Ok(translated);
                }
                Err(e) => {
                    debug!("Lingva instance {} failed: {}", base, e);
                    self.advance();
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::Failed("Lingva failed".to_string())))
    }

    fn batch_throttled(&self) -> bool {
        self.batch_throttled
    }
}
