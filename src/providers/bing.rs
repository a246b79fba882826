use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{http_client, non_empty, post_call_pause, request_error, status_error, LanguagePair, Provider};
use crate::app_config::EngineConfig;
use crate::errors::ProviderError;

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36";

/// Bing Translator web interface
#[derive(Debug)]
pub struct Bing {
    client: Client,
    endpoint: String,
    languages: LanguagePair,
    post_call_delay: Duration,
    batch_throttled: bool,
}

/// What a `ttranslatev3` reply turned out to contain
#[derive(Debug, PartialEq)]
pub enum BingReply {
    Translated(String),
    Throttled,
    Unrecognised,
}

impl Bing {
    pub fn new(config: &EngineConfig, languages: LanguagePair) -> Self {
        let endpoint = config
            .resolved_endpoints()
            .into_iter()
            .next()
            .unwrap_or_default();
        Self {
            client: http_client(config.timeout_secs(), Some(MOBILE_USER_AGENT)),
            endpoint,
            languages,
            post_call_delay: Duration::from_millis(config.post_call_delay_ms()),
            batch_throttled: config.is_batch_throttled(),
        }
    }

    /// Interpret a reply body.
    ///
    /// Older deployments answer `{"translationResponse": "..."}`, current ones
    /// `[{"translations": [{"text": "..."}]}]`; throttling can also arrive as
    /// a 200 carrying `{"statusCode": 429}`.
    pub fn parse_reply(value: &Value) -> BingReply {
        if let Some(text) = value.get("translationResponse").and_then(Value::as_str) {
            return BingReply::Translated(text.to_string());
        }

        if let Some(text) = value
            .get(0)
            .and_then(|v| v.get("translations"))
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("text"))
            .and_then(Value::as_str)
        {
            return BingReply::Translated(text.to_string());
        }

        if value.get("statusCode").and_then(Value::as_u64) == Some(429) {
            return BingReply::Throttled;
        }

        BingReply::Unrecognised
    }
}

#[async_trait]
impl Provider for Bing {
    fn name(&self) -> &str {
        "Bing"
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("text", text),
                ("fromLang", self.languages.source.as_str()),
                ("toLang", self.languages.target.as_str()),
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
            .map_err(|e| ProviderError::Failed(format!("Bing JSON parse error: {}", e)))?;

        let translated = match Self::parse_reply(&value) {
            BingReply::Translated(text) => non_empty(self.name(), text)?,
            BingReply::Throttled => {
                return Err(ProviderError::RateLimited("Bing rate limit exceeded".to_string()));
            }
            BingReply::Unrecognised => {
                return Err(ProviderError::Failed("Bing response format changed".to_string()));
            }
        };

        post_call_pause(self.post_call_delay).await;
        Ok(translated)
    }

    fn batch_throttled(&self) -> bool {
        self.batch_throttled
    }
}
