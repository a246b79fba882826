use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{http_client, non_empty, post_call_pause, request_error, status_error, LanguagePair, Provider};
use crate::app_config::EngineConfig;
use crate::errors::ProviderError;

/// Google Translate through the free `translate_a/single` endpoint
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint URL
    endpoint: String,
    languages: LanguagePair,
    post_call_delay: Duration,
    batch_throttled: bool,
}

impl Google {
    pub fn new(config: &EngineConfig, languages: LanguagePair) -> Self {
        let endpoint = config
            .resolved_endpoints()
            .into_iter()
            .next()
            .unwrap_or_default();
        Self {
            client: http_client(config.timeout_secs(), None),
            endpoint,
            languages,
            post_call_delay: Duration::from_millis(config.post_call_delay_ms()),
            batch_throttled: config.is_batch_throttled(),
        }
    }

    /// Concatenate the translated segments of a `translate_a/single` reply.
    ///
    /// The reply is a positional array; element 0 holds one
    /// `[translated, original, ...]` entry per sentence.
    pub fn extract_text_from_response(value: &Value) -> Option<String> {
        let segments = value.get(0)?.as_array()?;
        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();
        Some(text)
    }
}

#[async_trait]
impl Provider for Google {
    fn name(&self) -> &str {
        "Google"
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.languages.source.as_str()),
                ("tl", self.languages.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| request_error(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(self.name(), status));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Failed(format!("Google JSON parse error: {}", e)))?;

        let translated = Self::extract_text_from_response(&value)
            .ok_or_else(|| ProviderError::Failed("Google response format changed".to_string()))?;
        let translated = non_empty(self.name(), translated)?;

        post_call_pause(self.post_call_delay).await;
        Ok(translated)
    }

    fn batch_throttled(&self) -> bool {
        self.batch_throttled
    }
}
