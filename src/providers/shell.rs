use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::process::Command;

use super::{non_empty, post_call_pause, LanguagePair, Provider};
use crate::app_config::EngineConfig;
use crate::errors::ProviderError;

/// translate-shell (`trans`), the offline-friendly last resort
///
/// The text is handed over as a single argument rather than interpolated
/// into a shell command line, so no quoting is involved.
#[derive(Debug)]
pub struct Shell {
    /// Command to execute
    program: String,
    languages: LanguagePair,
    timeout: Duration,
    post_call_delay: Duration,
    batch_throttled: bool,
}

impl Shell {
    pub fn new(config: &EngineConfig, languages: LanguagePair) -> Self {
        let program = config
            .resolved_endpoints()
            .into_iter()
            .next()
            .unwrap_or_else(|| "trans".to_string());
        Self {
            program,
            languages,
            timeout: Duration::from_secs(config.timeout_secs()),
            post_call_delay: Duration::from_millis(config.post_call_delay_ms()),
            batch_throttled: config.is_batch_throttled(),
        }
    }

    /// Arguments passed to the command
    pub fn arguments(&self, text: &str) -> Vec<String> {
        vec![
            "-brief".to_string(),
            "-no-ansi".to_string(),
            format!("{}:{}", self.languages.source, self.languages.target),
            text.to_string(),
        ]
    }
}

#[async_trait]
impl Provider for Shell {
    fn name(&self) -> &str {
        "Shell"
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let child = Command::new(&self.program)
            .args(self.arguments(text))
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => return Err(ProviderError::Failed("translate-shell timeout".to_string())),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ProviderError::Configuration(format!(
                    "'{}' not found; install translate-shell to use this engine",
                    self.program
                )));
            }
            Ok(Err(e)) => return Err(ProviderError::Failed(format!("translate-shell error: {}", e))),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(ProviderError::Failed(format!(
                "translate-shell failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let translated = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let translated = non_empty(self.name(), translated)?;

        post_call_pause(self.post_call_delay).await;
        Ok(translated)
    }

    fn batch_throttled(&self) -> bool {
        self.batch_throttled
    }
}
