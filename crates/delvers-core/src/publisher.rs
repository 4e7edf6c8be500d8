//! Event publication port.
//!
//! The engine never pushes notifications itself. After a successful
//! mutation the session hands the resulting events to an `EventPublisher`,
//! which owns serialization and fan-out to observers.

use thiserror::Error;
use uuid::Uuid;

use crate::event::DomainEvent;

/// Wire-ready representation of a published event.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Session this event belongs to.
    pub session_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the session stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl PublishedEvent {
    /// Flattens a domain event into its published form.
    pub fn from_event(event: &dyn DomainEvent) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            session_id: meta.session_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }
}

/// Publication failed. Never fatal to the operation that produced the event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event publication failed: {0}")]
pub struct PublishError(pub String);

/// Sink for events produced by successful mutations.
pub trait EventPublisher: Send + Sync {
    /// Publishes a batch of events in order.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the events could not be delivered.
    fn publish(&self, events: &[PublishedEvent]) -> Result<(), PublishError>;
}

/// Publisher that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _events: &[PublishedEvent]) -> Result<(), PublishError> {
        Ok(())
    }
}
