//! Shared test doubles for the Delvers turn engine.

mod clock;
mod publisher;
mod rng;

pub use clock::{FixedClock, ManualClock};
pub use publisher::{FailingPublisher, RecordingPublisher};
pub use rng::{MockRng, SequenceRng};
