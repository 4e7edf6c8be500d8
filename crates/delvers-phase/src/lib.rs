//! Delvers — phase orchestration.
//!
//! Sequences a quest through setup, hero election, active hero turns and the
//! game-master phase, and guards the single-holder election slot.

pub mod application;
pub mod domain;

pub use application::shared::SharedOrchestrator;
pub use domain::config::{AdvancePolicy, PhaseConfig};
pub use domain::orchestrator::{MonsterFlags, PhaseOrchestrator};
pub use domain::phase::Phase;
