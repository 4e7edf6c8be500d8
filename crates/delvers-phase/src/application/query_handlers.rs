//! Read-only views of orchestrator state for broadcast.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use delvers_core::position::Position;
use serde::Serialize;

use crate::domain::orchestrator::{MonsterFlags, PhaseOrchestrator};
use crate::domain::phase::Phase;

/// Serializable snapshot of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseView {
    /// Current phase.
    pub phase: Phase,
    /// Current cycle number.
    pub cycle: u32,
    /// The game master, if assigned.
    pub game_master_id: Option<String>,
    /// The hero whose turn it is.
    pub active_hero: Option<String>,
    /// The holder of the election slot.
    pub elected_player: Option<String>,
    /// When the current election opened.
    pub election_started_at: Option<DateTime<Utc>>,
    /// When the current election times out, if a timeout is configured.
    pub election_deadline: Option<DateTime<Utc>>,
    /// Registered heroes that may still take a turn this cycle.
    pub eligible_heroes: Vec<String>,
    /// Heroes that completed a turn this cycle.
    pub heroes_acted: Vec<String>,
    /// Readiness per participant.
    pub readiness: BTreeMap<String, bool>,
    /// Chosen starting tiles.
    pub start_positions: BTreeMap<String, Position>,
    /// Monster flags for the current GM phase.
    pub monsters: BTreeMap<String, MonsterFlags>,
}

impl PhaseView {
    /// Builds a view from the orchestrator.
    #[must_use]
    pub fn from_orchestrator(orchestrator: &PhaseOrchestrator) -> Self {
        Self {
            phase: orchestrator.phase(),
            cycle: orchestrator.cycle(),
            game_master_id: orchestrator.game_master_id().map(str::to_owned),
            active_hero: orchestrator.active_hero().map(str::to_owned),
            elected_player: orchestrator.elected_player().map(str::to_owned),
            election_started_at: orchestrator.election_started_at(),
            election_deadline: orchestrator.election_deadline(),
            eligible_heroes: orchestrator.eligible_registered_heroes(),
            heroes_acted: orchestrator.heroes_acted().iter().cloned().collect(),
            readiness: orchestrator.readiness().clone(),
            start_positions: orchestrator.start_positions().clone(),
            monsters: orchestrator.monster_flags_snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::PhaseConfig;

    #[test]
    fn test_view_of_fresh_orchestrator_serializes_phase_name() {
        // Arrange
        let mut orchestrator = PhaseOrchestrator::new(PhaseConfig::default());
        orchestrator.register_player("a").unwrap();
        orchestrator
            .select_starting_position("a", Position::new(4, 7))
            .unwrap();

        // Act
        let view = PhaseView::from_orchestrator(&orchestrator);
        let json = serde_json::to_value(&view).unwrap();

        // Assert
        assert_eq!(json["phase"], "quest_setup");
        assert_eq!(json["cycle"], 0);
        assert_eq!(json["readiness"]["a"], false);
        assert_eq!(json["start_positions"]["a"]["x"], 4);
        assert!(json["active_hero"].is_null());
    }
}
