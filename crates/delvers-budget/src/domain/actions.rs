//! Action records and the per-turn activity log.

use std::fmt;

use delvers_core::position::Position;
use serde::{Deserialize, Serialize};

/// What a hero or monster searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    /// Treasure in a room or corridor.
    Treasure,
    /// Hidden traps.
    Traps,
    /// Secret doors.
    SecretDoors,
}

impl SearchKind {
    /// Returns the stable snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Treasure => "treasure",
            Self::Traps => "traps",
            Self::SecretDoors => "secret_doors",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of action that consumed an action slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum ActionKind {
    /// Melee or ranged attack.
    Attack,
    /// Spell cast.
    CastSpell(String),
    /// Search of the current location.
    Search(SearchKind),
    /// Door opened or disarmed trap.
    Interact,
    /// Monster special ability.
    Ability(String),
    /// Anything else the session layer defines.
    Other(String),
}

/// A single action taken during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// What was done.
    pub kind: ActionKind,
    /// The targeted entity, if any.
    pub target_id: Option<String>,
    /// The targeted tile, if any.
    pub target_position: Option<Position>,
    /// Outcome reported by the rules layer, if known.
    pub success: Option<bool>,
    /// Free-form description.
    pub details: Option<String>,
}

impl ActionRecord {
    /// An action of `kind` with no target or outcome.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            target_id: None,
            target_position: None,
            success: None,
            details: None,
        }
    }

    /// Sets the targeted entity.
    #[must_use]
    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    /// Sets the targeted tile.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.target_position = Some(position);
        self
    }

    /// Sets the reported outcome.
    #[must_use]
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Something that happened during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TurnActivity {
    /// Movement dice were rolled.
    Rolled {
        /// Per-die results.
        dice: Vec<u32>,
        /// Movement granted by the roll.
        total: u32,
    },
    /// One tile of movement.
    Moved {
        /// Destination tile.
        to: Position,
        /// Points left afterwards.
        remaining: u32,
    },
    /// The action slot was used.
    Acted {
        /// What was done.
        kind: ActionKind,
    },
    /// A location was searched.
    Searched {
        /// What was searched for.
        kind: SearchKind,
        /// The searched location.
        location_key: String,
    },
    /// An item was used.
    ItemUsed {
        /// The item.
        item_id: String,
    },
    /// A special ability was used.
    AbilityUsed {
        /// The ability.
        ability_id: String,
        /// The targeted entity, if any.
        target_id: Option<String>,
        /// Reported outcome.
        success: bool,
    },
    /// Damage was taken.
    Damaged {
        /// Body points lost.
        amount: u32,
        /// Body points left.
        remaining_body: u32,
    },
}

/// One entry of a turn's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// The turn the activity belongs to.
    pub turn_number: u32,
    /// What happened.
    pub activity: TurnActivity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_target_and_outcome() {
        let record = ActionRecord::new(ActionKind::Attack)
            .with_target("goblin-2")
            .at(Position::new(3, 4))
            .with_success(true)
            .with_details("2 skulls");

        assert_eq!(record.target_id.as_deref(), Some("goblin-2"));
        assert_eq!(record.target_position, Some(Position::new(3, 4)));
        assert_eq!(record.success, Some(true));
        assert_eq!(record.details.as_deref(), Some("2 skulls"));
    }

    #[test]
    fn test_action_kind_serializes_with_type_tag() {
        let json = serde_json::to_value(ActionKind::Search(SearchKind::SecretDoors)).unwrap();

        assert_eq!(json["type"], "search");
        assert_eq!(json["value"], "secret_doors");
    }
}
