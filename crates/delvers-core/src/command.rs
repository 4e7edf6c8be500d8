//! Participant intents.

use uuid::Uuid;

/// An intent from one connected participant. The network layer has already
/// authenticated the sender; `participant_id` names it.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name used in log fields, e.g. `session.move_hero`.
    fn command_type(&self) -> &'static str;

    /// Id carried by every event the intent produces.
    fn correlation_id(&self) -> Uuid;

    /// The issuing participant. System-originated intents have none.
    fn participant_id(&self) -> Option<&str> {
        None
    }
}
