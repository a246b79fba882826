/*!
 * Batch throttling between documents.
 *
 * The web engines tolerate bursts badly, so after every group of documents
 * the run pauses, but only while an engine that asked for it is still usable.
 */

use log::info;
use std::time::Duration;

use crate::app_config::BatchConfig;

use super::cascade::CascadeDispatcher;

/// Counts completed documents and sleeps between batches
#[derive(Debug, Clone)]
pub struct BatchThrottle {
    /// Documents per batch
    size: usize,
    delay: Duration,
    /// Documents completed so far
    processed: usize,
}

impl BatchThrottle {
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            size: config.size.max(1),
            delay: Duration::from_secs(config.delay_secs),
            processed: 0,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Whether the document count just reached a batch boundary
    pub fn at_batch_boundary(&self) -> bool {
        self.processed > 0 && self.processed % self.size == 0
    }

    /// Signal that a document finished.
    ///
    /// Returns true when a cool-down was taken.
    pub async fn handle_file_completed(&mut self, dispatcher: &mut CascadeDispatcher) -> bool {
        self.processed += 1;

        if !self.at_batch_boundary() || !dispatcher.usable_batch_throttled() {
            return false;
        }

        info!(
            "Batch of {} documents done, cooling down for {}s",
            self.size,
            self.delay.as_secs()
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        dispatcher.stats_mut().batch_delays += 1;
        true
    }
}
