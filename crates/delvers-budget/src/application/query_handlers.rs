//! Read-only views of budget trackers for broadcast.

use delvers_core::position::Position;
use serde::Serialize;

use crate::domain::ability::SpecialAbility;
use crate::domain::effects::ActiveEffect;
use crate::domain::hero::{HeroBudgetTracker, TurnFlag, TurnStrategy};
use crate::domain::monster::{MonsterBudgetTracker, MonsterFlag, TurnSummary};

/// Serializable snapshot of a hero's budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroBudgetView {
    /// The hero.
    pub hero_id: String,
    /// Current turn number.
    pub turn_number: u32,
    /// Dice rolled for movement this turn.
    pub dice: Vec<u32>,
    /// Movement points for this turn.
    pub movement_total: u32,
    /// Movement points spent.
    pub movement_used: u32,
    /// Movement points left.
    pub movement_remaining: u32,
    /// Whether the action slot is used.
    pub action_taken: bool,
    /// Which category was used first.
    pub strategy: TurnStrategy,
    /// Whether another tile may be entered.
    pub can_move: bool,
    /// Whether another action may be taken.
    pub can_take_action: bool,
    /// Where the hero stands.
    pub position: Option<Position>,
    /// Active per-turn overrides.
    pub flags: Vec<TurnFlag>,
    /// Active effects.
    pub effects: Vec<ActiveEffect>,
}

impl HeroBudgetView {
    /// Builds a view from the tracker.
    #[must_use]
    pub fn from_tracker(tracker: &HeroBudgetTracker) -> Self {
        let movement = tracker.movement();
        Self {
            hero_id: tracker.hero_id().to_owned(),
            turn_number: tracker.turn_number(),
            dice: tracker.dice().to_vec(),
            movement_total: movement.total(),
            movement_used: movement.used(),
            movement_remaining: movement.remaining(),
            action_taken: tracker.action_taken(),
            strategy: tracker.turn_strategy(),
            can_move: tracker.can_move(),
            can_take_action: tracker.can_take_action(),
            position: tracker.current_position(),
            flags: tracker.turn_flags(),
            effects: tracker.active_effects().to_vec(),
        }
    }
}

/// Serializable snapshot of a monster's budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonsterBudgetView {
    /// The monster.
    pub monster_id: String,
    /// Its type.
    pub monster_type: String,
    /// Body points left.
    pub current_body: u32,
    /// Movement points left.
    pub movement_remaining: u32,
    /// What it did this turn.
    pub summary: TurnSummary,
    /// Whether it can still act.
    pub can_take_action: bool,
    /// Where it stands.
    pub position: Option<Position>,
    /// Set flags.
    pub flags: Vec<MonsterFlag>,
    /// Special abilities and their remaining uses.
    pub abilities: Vec<SpecialAbility>,
}

impl MonsterBudgetView {
    /// Builds a view from the tracker.
    #[must_use]
    pub fn from_tracker(tracker: &MonsterBudgetTracker) -> Self {
        Self {
            monster_id: tracker.monster_id().to_owned(),
            monster_type: tracker.monster_type().to_owned(),
            current_body: tracker.current_body(),
            movement_remaining: tracker.movement().remaining(),
            summary: tracker.turn_summary(),
            can_take_action: tracker.can_take_action(),
            position: tracker.current_position(),
            flags: tracker.flags(),
            abilities: tracker.abilities().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::BudgetConfig;
    use crate::domain::monster::MonsterStats;

    #[test]
    fn test_hero_view_reflects_tracker() {
        let mut hero = HeroBudgetTracker::new("elf", BudgetConfig::default());
        hero.roll_movement_dice(&[4, 2]).unwrap();
        hero.record_movement(Position::new(0, 1)).unwrap();

        let view = HeroBudgetView::from_tracker(&hero);

        assert_eq!(view.movement_total, 6);
        assert_eq!(view.movement_remaining, 5);
        assert_eq!(view.strategy, TurnStrategy::MoveFirst);
        assert_eq!(view.position, Some(Position::new(0, 1)));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["strategy"], "move_first");
    }

    #[test]
    fn test_monster_view_serializes_summary() {
        let monster = MonsterBudgetTracker::new(
            "goblin-2",
            "goblin",
            MonsterStats {
                movement: 10,
                attack_dice: 2,
                defense_dice: 1,
                body_points: 1,
            },
            Vec::new(),
        );

        let view = MonsterBudgetView::from_tracker(&monster);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["summary"], "no_actions");
        assert_eq!(json["movement_remaining"], 10);
        assert_eq!(json["monster_type"], "goblin");
    }
}
