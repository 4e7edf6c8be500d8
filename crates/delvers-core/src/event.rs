//! Event envelopes.
//!
//! Every accepted intent yields one or more events. Each carries the same
//! metadata block so observers can order, correlate and replay them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope fields shared by every session event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Dotted type name, e.g. `phase.hero_elected`.
    pub event_type: String,
    /// Session this event belongs to.
    pub session_id: Uuid,
    /// Position in the session stream, starting at 1 with no gaps.
    pub sequence_number: i64,
    /// Copied from the intent that produced the event.
    pub correlation_id: Uuid,
    /// The intent that caused the event. Intents are not events here, so
    /// this equals `correlation_id`.
    pub causation_id: Uuid,
    /// Session clock reading when the event was emitted.
    pub occurred_at: DateTime<Utc>,
}

/// An event that can be flattened for publication.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Dotted type name matching `EventMetadata::event_type`.
    fn event_type(&self) -> &'static str;

    /// The event body as JSON, without the envelope.
    fn to_payload(&self) -> serde_json::Value;

    /// The envelope.
    fn metadata(&self) -> &EventMetadata;
}
