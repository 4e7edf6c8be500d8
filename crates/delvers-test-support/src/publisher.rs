//! Test publishers — mock `EventPublisher` implementations for tests.

use std::sync::Mutex;

use delvers_core::publisher::{EventPublisher, PublishError, PublishedEvent};

/// A publisher that records every published batch and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<PublishedEvent>>,
}

impl RecordingPublisher {
    /// Create an empty recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all events published so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_events(&self) -> Vec<PublishedEvent> {
        self.published.lock().unwrap().clone()
    }

    /// Returns the event types published so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn event_types(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, events: &[PublishedEvent]) -> Result<(), PublishError> {
        self.published.lock().unwrap().extend_from_slice(events);
        Ok(())
    }
}

/// A publisher that always fails. Useful for checking that publication
/// failures never abort the operation that produced the event.
#[derive(Debug)]
pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish(&self, _events: &[PublishedEvent]) -> Result<(), PublishError> {
        Err(PublishError("connection refused".into()))
    }
}
