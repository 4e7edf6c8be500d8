//! Monster special abilities.

use serde::{Deserialize, Serialize};

/// A monster capability with independent per-turn and per-quest caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAbility {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether using the ability consumes the monster's action.
    pub requires_action: bool,
    /// Uses allowed per turn; `None` is unlimited.
    pub uses_per_turn: Option<u32>,
    /// Uses allowed per quest; `None` is unlimited.
    pub uses_per_quest: Option<u32>,
    /// Uses so far this turn.
    pub used_this_turn: u32,
    /// Uses left this quest; `None` is unlimited. Only ever decreases.
    pub remaining_this_quest: Option<u32>,
}

impl SpecialAbility {
    /// An ability usable once per turn, without a quest cap, that consumes
    /// the monster's action.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            requires_action: true,
            uses_per_turn: Some(1),
            uses_per_quest: None,
            used_this_turn: 0,
            remaining_this_quest: None,
        }
    }

    /// Sets whether the ability consumes the action slot.
    #[must_use]
    pub fn requires_action(mut self, requires_action: bool) -> Self {
        self.requires_action = requires_action;
        self
    }

    /// Sets the per-turn cap.
    #[must_use]
    pub fn per_turn(mut self, uses: Option<u32>) -> Self {
        self.uses_per_turn = uses;
        self
    }

    /// Sets the per-quest cap and resets the remaining counter to it.
    #[must_use]
    pub fn per_quest(mut self, uses: Option<u32>) -> Self {
        self.uses_per_quest = uses;
        self.remaining_this_quest = uses;
        self
    }

    /// Why the ability cannot be used right now, ignoring the action slot.
    pub(crate) fn exhaustion_reason(&self) -> Option<String> {
        if let Some(cap) = self.uses_per_turn {
            if self.used_this_turn >= cap {
                return Some(format!("per-turn limit of {cap} reached"));
            }
        }
        if self.remaining_this_quest == Some(0) {
            return Some("no uses remaining this quest".to_owned());
        }
        None
    }

    /// Records one use.
    pub(crate) fn consume(&mut self) {
        self.used_this_turn += 1;
        if let Some(remaining) = self.remaining_this_quest.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
}
