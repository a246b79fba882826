/*!
 * Mock engine implementations for testing.
 *
 * This module provides a scripted engine that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::failing()` - Always fails with a generic error
 * - `MockProvider::rate_limited()` - Always reports throttling
 * - `MockProvider::scripted(..)` - Follows a fixed outcome sequence
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock engine
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, returning `"<prefix><text>"`
    Working { prefix: String },
    /// Always fails with [`ProviderError::Failed`]
    Failing,
    /// Always fails with [`ProviderError::RateLimited`]
    RateLimited,
    /// Always fails with [`ProviderError::Configuration`]
    Misconfigured,
    /// Echoes the input unchanged
    Echo,
}

/// One entry of a scripted outcome sequence
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    Succeed,
    Fail,
    RateLimit,
}

/// Mock engine for testing cascade behavior
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    behavior: MockBehavior,
    /// Outcomes consumed before falling back to `behavior`
    script: Mutex<VecDeque<MockOutcome>>,
    /// Request counter, shared so tests can keep a handle after boxing
    request_count: Arc<AtomicUsize>,
    /// Every text received, in order
    received: Arc<Mutex<Vec<String>>>,
    batch_throttled: bool,
}

impl MockProvider {
    /// Create a new mock engine with the specified behavior
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            script: Mutex::new(VecDeque::new()),
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            batch_throttled: false,
        }
    }

    /// Engine that always succeeds with `"[<name>] <text>"`
    pub fn working(name: impl Into<String>) -> Self {
        let name = name.into();
        let prefix = format!("[{}] ", name);
        Self::new(name, MockBehavior::Working { prefix })
    }

    /// Engine that always fails
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Failing)
    }

    /// Engine that is always throttled
    pub fn rate_limited(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::RateLimited)
    }

    /// Engine whose external dependency is missing
    pub fn misconfigured(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Misconfigured)
    }

    /// Engine following `outcomes` first, then behaving like `working`
    pub fn scripted(name: impl Into<String>, outcomes: Vec<MockOutcome>) -> Self {
        let provider = Self::working(name);
        if let Ok(mut script) = provider.script.lock() {
            script.extend(outcomes);
        }
        provider
    }

    /// Mark the engine as batch throttled
    pub fn with_batch_throttle(mut self) -> Self {
        self.batch_throttled = true;
        self
    }

    /// Handle on the request counter
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.request_count)
    }

    /// Handle on the received texts
    pub fn received(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.received)
    }

    fn outcome(&self, text: &str) -> Result<String, ProviderError> {
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match scripted {
            Some(MockOutcome::Succeed) => return Ok(format!("[{}] {}", self.name, text)),
            Some(MockOutcome::Fail) => {
                return Err(ProviderError::Failed(format!("{} scripted failure", self.name)));
            }
            Some(MockOutcome::RateLimit) => {
                return Err(ProviderError::RateLimited(format!("{} scripted throttle", self.name)));
            }
            None => {}
        }

        match &self.behavior {
            MockBehavior::Working { prefix } => Ok(format!("{}{}", prefix, text)),
            MockBehavior::Echo => Ok(text.to_string()),
            MockBehavior::Failing => Err(ProviderError::Failed(format!("{} unavailable", self.name))),
            MockBehavior::RateLimited => {
                Err(ProviderError::RateLimited(format!("{} rate limit exceeded", self.name)))
            }
            MockBehavior::Misconfigured => {
                Err(ProviderError::Configuration(format!("{} dependency missing", self.name)))
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(text.to_string());
        }
        self.outcome(text)
    }

    fn batch_throttled(&self) -> bool {
        self.batch_throttled
    }
}
