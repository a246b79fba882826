/*!
 * Mock provider helpers for testing
 *
 * Wraps the library's scripted mock engine so tests can keep counters after
 * the engines are boxed and moved into a dispatcher.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rpytl::providers::mock::MockProvider;
use rpytl::providers::Provider;

/// Handles on a mock engine's call history
#[derive(Debug, Clone)]
pub struct MockHandle {
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockHandle {
    /// Number of translate calls made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts received, in call order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

/// Box a mock engine and keep a handle on it
pub fn boxed(mock: MockProvider) -> (Box<dyn Provider>, MockHandle) {
    let handle = MockHandle {
        calls: mock.counter(),
        received: mock.received(),
    };
    (Box::new(mock), handle)
}

/// Chain of mocks, returned with their handles in the same order
pub fn chain(mocks: Vec<MockProvider>) -> (Vec<Box<dyn Provider>>, Vec<MockHandle>) {
    mocks.into_iter().map(boxed).unzip()
}
