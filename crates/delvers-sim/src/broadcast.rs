//! Fan-out publisher backed by a tokio broadcast channel.

use delvers_core::publisher::{EventPublisher, PublishError, PublishedEvent};
use tokio::sync::broadcast;

/// Publishes every event to all current subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

impl BroadcastPublisher {
    /// A publisher buffering up to `capacity` events per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// A new subscription that sees every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, events: &[PublishedEvent]) -> Result<(), PublishError> {
        for event in events {
            self.sender
                .send(event.clone())
                .map_err(|_| PublishError("no subscribers".to_owned()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn event(sequence_number: i64) -> PublishedEvent {
        let correlation_id = Uuid::new_v4();
        PublishedEvent {
            event_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            event_type: "phase.quest_started".to_owned(),
            payload: serde_json::json!({ "QuestStarted": { "cycle": 1 } }),
            sequence_number,
            correlation_id,
            causation_id: correlation_id,
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_events_in_order() {
        let publisher = BroadcastPublisher::new(16);
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();

        publisher.publish(&[event(1), event(2)]).unwrap();

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.recv().await.unwrap().sequence_number, 1);
            assert_eq!(rx.recv().await.unwrap().sequence_number, 2);
        }
    }

    #[test]
    fn test_publishing_without_subscribers_fails() {
        let publisher = BroadcastPublisher::new(16);

        let err = publisher.publish(&[event(1)]).unwrap_err();

        assert_eq!(err.to_string(), "event publication failed: no subscribers");
    }
}
