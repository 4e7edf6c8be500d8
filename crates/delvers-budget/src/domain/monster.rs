//! Per-turn budget for a monster during the game-master phase.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use delvers_core::error::TurnError;
use delvers_core::position::Position;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ability::SpecialAbility;
use super::actions::{ActionKind, ActionRecord, ActivityEntry, TurnActivity};
use super::effects::{self, ActiveEffect, EffectKind, EffectTrigger};
use super::movement::MovementLedger;

/// Cached combat statistics for a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterStats {
    /// Fixed movement per turn.
    pub movement: u32,
    /// Attack dice.
    pub attack_dice: u32,
    /// Defense dice.
    pub defense_dice: u32,
    /// Starting body points.
    pub body_points: u32,
}

/// State flags on a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterFlag {
    /// May attack once more this turn; consumed by that attack.
    ExtraAttack,
    /// Heroes may move through this monster.
    Passable,
    /// The monster has been activated by the game master.
    Awakened,
    /// The monster is visible on the board.
    Revealed,
}

impl MonsterFlag {
    /// Whether the flag survives turn resets.
    #[must_use]
    pub fn is_quest_long(self) -> bool {
        matches!(self, Self::Awakened | Self::Revealed)
    }
}

/// What a monster did this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSummary {
    /// Neither moved nor acted.
    NoActions,
    /// Moved only.
    MovedOnly,
    /// Acted only.
    ActedOnly,
    /// Moved and acted.
    MovedAndActed,
}

impl TurnSummary {
    /// Human-readable label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoActions => "no actions",
            Self::MovedOnly => "moved only",
            Self::ActedOnly => "acted only",
            Self::MovedAndActed => "moved and acted",
        }
    }
}

impl fmt::Display for TurnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A special-ability use request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityUse {
    /// The ability to use.
    pub ability_id: String,
    /// The targeted entity, if any.
    pub target_id: Option<String>,
    /// The targeted tile, if any.
    pub target_position: Option<Position>,
    /// Outcome reported by the rules layer.
    pub success: bool,
    /// Free-form description.
    pub details: Option<String>,
}

/// Movement, action and ability budget for one monster.
///
/// Unlike heroes, monsters have fixed movement and no move/act ordering
/// lock.
#[derive(Debug, Clone)]
pub struct MonsterBudgetTracker {
    monster_id: String,
    monster_type: String,
    turn_number: u32,
    stats: MonsterStats,
    movement: MovementLedger,
    current_body: u32,
    has_moved: bool,
    action_taken: bool,
    action: Option<ActionRecord>,
    abilities: BTreeMap<String, SpecialAbility>,
    flags: BTreeSet<MonsterFlag>,
    effects: Vec<ActiveEffect>,
    events: Vec<ActivityEntry>,
    current_position: Option<Position>,
    path: Vec<Position>,
}

impl MonsterBudgetTracker {
    /// A budget at full movement and body.
    pub fn new(
        monster_id: impl Into<String>,
        monster_type: impl Into<String>,
        stats: MonsterStats,
        abilities: Vec<SpecialAbility>,
    ) -> Self {
        Self {
            monster_id: monster_id.into(),
            monster_type: monster_type.into(),
            turn_number: 0,
            stats,
            movement: MovementLedger::with_total(stats.movement),
            current_body: stats.body_points,
            has_moved: false,
            action_taken: false,
            action: None,
            abilities: abilities
                .into_iter()
                .map(|ability| (ability.id.clone(), ability))
                .collect(),
            flags: BTreeSet::new(),
            effects: Vec::new(),
            events: Vec::new(),
            current_position: None,
            path: Vec::new(),
        }
    }

    fn log(&mut self, activity: TurnActivity) {
        self.events.push(ActivityEntry {
            turn_number: self.turn_number,
            activity,
        });
    }

    fn apply_effect_side_effects(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::ExtraAttack => {
                self.flags.insert(MonsterFlag::ExtraAttack);
            }
            EffectKind::Passable => {
                self.flags.insert(MonsterFlag::Passable);
            }
            EffectKind::MovementHalved => self.movement.halve_remaining(),
            _ => {}
        }
    }

    // --- movement ---

    /// Checks whether the monster may move one more tile.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotMove` when no movement remains.
    pub fn check_move(&self) -> Result<(), TurnError> {
        if self.movement.remaining() == 0 {
            return Err(TurnError::CannotMove("no movement remaining".to_owned()));
        }
        Ok(())
    }

    /// Whether [`Self::check_move`] passes.
    #[must_use]
    pub fn can_move(&self) -> bool {
        self.check_move().is_ok()
    }

    /// Spends one movement point moving to `to`. Returns the points left.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotMove` if [`Self::check_move`] fails.
    pub fn record_movement(&mut self, to: Position) -> Result<u32, TurnError> {
        self.check_move()?;
        self.movement.spend_one();
        self.has_moved = true;
        self.path.push(to);
        self.current_position = Some(to);
        let remaining = self.movement.remaining();
        self.log(TurnActivity::Moved { to, remaining });
        Ok(remaining)
    }

    /// Places the monster without spending movement.
    pub fn set_position(&mut self, position: Position) {
        self.current_position = Some(position);
    }

    // --- actions ---

    /// Checks whether the monster may act.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotAct` once the action is used, unless an
    /// extra attack is available.
    pub fn check_action(&self) -> Result<(), TurnError> {
        if self.action_taken && !self.flags.contains(&MonsterFlag::ExtraAttack) {
            return Err(TurnError::CannotAct(
                "action already taken this turn".to_owned(),
            ));
        }
        Ok(())
    }

    /// Whether [`Self::check_action`] passes.
    #[must_use]
    pub fn can_take_action(&self) -> bool {
        self.check_action().is_ok()
    }

    /// Uses the action slot.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotAct` if [`Self::check_action`] fails.
    pub fn record_action(&mut self, record: ActionRecord) -> Result<(), TurnError> {
        self.check_action()?;
        self.take_action(record);
        Ok(())
    }

    fn take_action(&mut self, record: ActionRecord) {
        if self.action_taken {
            self.flags.remove(&MonsterFlag::ExtraAttack);
        }
        self.action_taken = true;
        self.log(TurnActivity::Acted {
            kind: record.kind.clone(),
        });
        debug!(monster_id = %self.monster_id, kind = ?record.kind, "monster action recorded");
        self.action = Some(record);
    }

    // --- abilities ---

    /// Checks whether an ability may be used now.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::AbilityUnavailable` for an unknown or exhausted
    /// ability and `TurnError::CannotAct` when the ability needs the action
    /// slot and it is used up.
    pub fn check_ability(&self, ability_id: &str) -> Result<(), TurnError> {
        let ability = self
            .abilities
            .get(ability_id)
            .ok_or_else(|| TurnError::AbilityUnavailable {
                ability_id: ability_id.to_owned(),
                reason: "ability not found".to_owned(),
            })?;
        if let Some(reason) = ability.exhaustion_reason() {
            return Err(TurnError::AbilityUnavailable {
                ability_id: ability_id.to_owned(),
                reason,
            });
        }
        if ability.requires_action {
            self.check_action()?;
        }
        Ok(())
    }

    /// Whether [`Self::check_ability`] passes.
    #[must_use]
    pub fn can_use_ability(&self, ability_id: &str) -> bool {
        self.check_ability(ability_id).is_ok()
    }

    /// Uses an ability, counting it against both caps. Abilities that need
    /// an action consume the action slot.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Self::check_ability`].
    pub fn use_ability(&mut self, request: AbilityUse) -> Result<(), TurnError> {
        self.check_ability(&request.ability_id)?;
        let requires_action = match self.abilities.get_mut(&request.ability_id) {
            Some(ability) => {
                ability.consume();
                ability.requires_action
            }
            None => return Err(TurnError::not_found("ability", request.ability_id)),
        };
        self.log(TurnActivity::AbilityUsed {
            ability_id: request.ability_id.clone(),
            target_id: request.target_id.clone(),
            success: request.success,
        });
        if requires_action {
            self.take_action(ActionRecord {
                kind: ActionKind::Ability(request.ability_id),
                target_id: request.target_id,
                target_position: request.target_position,
                success: Some(request.success),
                details: request.details,
            });
        }
        Ok(())
    }

    // --- effects and flags ---

    /// Adds an effect. `ExtraAttack` and `Passable` set the matching flag;
    /// `MovementHalved` halves remaining movement at once.
    pub fn add_active_effect(&mut self, effect: ActiveEffect) {
        self.apply_effect_side_effects(effect.kind);
        self.effects.push(effect);
    }

    /// Fires effects waiting on `trigger`. Each effect fires at most once.
    pub fn trigger_effects(&mut self, trigger: EffectTrigger) -> Vec<ActiveEffect> {
        effects::fire(&mut self.effects, trigger)
    }

    /// Sets a flag directly.
    pub fn set_flag(&mut self, flag: MonsterFlag) {
        self.flags.insert(flag);
    }

    /// Whether a flag is set.
    #[must_use]
    pub fn has_flag(&self, flag: MonsterFlag) -> bool {
        self.flags.contains(&flag)
    }

    // --- body ---

    /// Removes body points, never going below zero. Returns the body left.
    pub fn record_damage(&mut self, amount: u32) -> u32 {
        self.current_body = self.current_body.saturating_sub(amount);
        self.log(TurnActivity::Damaged {
            amount,
            remaining_body: self.current_body,
        });
        self.current_body
    }

    /// Whether any body points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current_body > 0
    }

    // --- lifecycle ---

    /// Starts turn `turn_number`. Restores full movement, clears the action
    /// slot, the event log and per-turn ability counts, and drops
    /// end-of-turn effects and non-quest-long flags. Per-quest ability
    /// counters are kept, and surviving effects re-apply their side effects.
    pub fn reset_for_new_turn(&mut self, turn_number: u32) {
        self.turn_number = turn_number;
        self.movement = MovementLedger::with_total(self.stats.movement);
        self.has_moved = false;
        self.action_taken = false;
        self.action = None;
        self.events.clear();
        self.path.clear();
        for ability in self.abilities.values_mut() {
            ability.used_this_turn = 0;
        }
        effects::expire_end_of_turn(&mut self.effects);
        self.flags.retain(|flag| flag.is_quest_long());
        let surviving: Vec<EffectKind> = self.effects.iter().map(|e| e.kind).collect();
        for kind in surviving {
            self.apply_effect_side_effects(kind);
        }
    }

    /// What the monster did this turn.
    #[must_use]
    pub fn turn_summary(&self) -> TurnSummary {
        match (self.has_moved, self.action_taken) {
            (false, false) => TurnSummary::NoActions,
            (true, false) => TurnSummary::MovedOnly,
            (false, true) => TurnSummary::ActedOnly,
            (true, true) => TurnSummary::MovedAndActed,
        }
    }

    // --- queries ---

    /// The monster this budget belongs to.
    #[must_use]
    pub fn monster_id(&self) -> &str {
        &self.monster_id
    }

    /// The monster's type (e.g. "orc").
    #[must_use]
    pub fn monster_type(&self) -> &str {
        &self.monster_type
    }

    /// Current turn number.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Cached combat statistics.
    #[must_use]
    pub fn stats(&self) -> MonsterStats {
        self.stats
    }

    /// Body points left.
    #[must_use]
    pub fn current_body(&self) -> u32 {
        self.current_body
    }

    /// Movement points for this turn.
    #[must_use]
    pub fn movement(&self) -> MovementLedger {
        self.movement
    }

    /// Whether the monster moved this turn.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Whether the monster used its action this turn.
    #[must_use]
    pub fn action_taken(&self) -> bool {
        self.action_taken
    }

    /// The most recent action this turn.
    #[must_use]
    pub fn action(&self) -> Option<&ActionRecord> {
        self.action.as_ref()
    }

    /// A special ability by id.
    #[must_use]
    pub fn ability(&self, ability_id: &str) -> Option<&SpecialAbility> {
        self.abilities.get(ability_id)
    }

    /// All special abilities.
    pub fn abilities(&self) -> impl Iterator<Item = &SpecialAbility> {
        self.abilities.values()
    }

    /// Set flags.
    #[must_use]
    pub fn flags(&self) -> Vec<MonsterFlag> {
        self.flags.iter().copied().collect()
    }

    /// Active effects.
    #[must_use]
    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    /// This turn's event log.
    #[must_use]
    pub fn events(&self) -> &[ActivityEntry] {
        &self.events
    }

    /// Where the monster stands.
    #[must_use]
    pub fn current_position(&self) -> Option<Position> {
        self.current_position
    }

    /// Tiles moved through this turn.
    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::effects::EffectExpiry;

    const ORC: MonsterStats = MonsterStats {
        movement: 8,
        attack_dice: 3,
        defense_dice: 2,
        body_points: 1,
    };

    fn orc() -> MonsterBudgetTracker {
        MonsterBudgetTracker::new("orc-1", "orc", ORC, Vec::new())
    }

    fn sorcerer() -> MonsterBudgetTracker {
        MonsterBudgetTracker::new(
            "witch-lord",
            "sorcerer",
            MonsterStats {
                movement: 6,
                attack_dice: 4,
                defense_dice: 4,
                body_points: 3,
            },
            vec![
                SpecialAbility::new("fireball", "Fireball")
                    .per_turn(Some(1))
                    .per_quest(Some(2)),
                SpecialAbility::new("command", "Command")
                    .requires_action(false)
                    .per_turn(Some(2)),
            ],
        )
    }

    fn cast(ability_id: &str) -> AbilityUse {
        AbilityUse {
            ability_id: ability_id.to_owned(),
            target_id: Some("wizard".to_owned()),
            target_position: Some(Position::new(2, 2)),
            success: true,
            details: None,
        }
    }

    fn effect(kind: EffectKind, expiry: EffectExpiry) -> ActiveEffect {
        ActiveEffect::new("test", kind, 1, EffectTrigger::Immediate, expiry)
    }

    // --- movement ---

    #[test]
    fn test_fixed_movement_needs_no_roll() {
        let mut monster = orc();

        let remaining = monster.record_movement(Position::new(1, 0)).unwrap();

        assert_eq!(remaining, 7);
        assert_eq!(monster.movement().total(), 8);
        assert_eq!(monster.turn_summary(), TurnSummary::MovedOnly);
    }

    #[test]
    fn test_monster_may_move_after_acting() {
        let mut monster = orc();
        monster.record_movement(Position::new(1, 0)).unwrap();
        monster.record_action(ActionRecord::new(ActionKind::Attack)).unwrap();

        let result = monster.record_movement(Position::new(2, 0));

        assert!(result.is_ok());
        assert_eq!(monster.turn_summary(), TurnSummary::MovedAndActed);
    }

    #[test]
    fn test_movement_exhausts() {
        let mut monster = orc();
        for x in 1..=8 {
            monster.record_movement(Position::new(x, 0)).unwrap();
        }

        let result = monster.record_movement(Position::new(9, 0));

        assert_eq!(result.unwrap_err().code(), "cannot_move");
        assert_eq!(monster.movement().used(), 8);
    }

    // --- actions ---

    #[test]
    fn test_extra_attack_allows_one_more_action() {
        let mut monster = orc();
        monster.record_action(ActionRecord::new(ActionKind::Attack)).unwrap();
        assert!(!monster.can_take_action());

        monster.add_active_effect(effect(EffectKind::ExtraAttack, EffectExpiry::EndOfTurn));
        let extra = monster.record_action(ActionRecord::new(ActionKind::Attack));
        let third = monster.record_action(ActionRecord::new(ActionKind::Attack));

        assert!(extra.is_ok());
        assert!(!monster.has_flag(MonsterFlag::ExtraAttack));
        assert_eq!(third.unwrap_err().code(), "cannot_act");
    }

    // --- abilities ---

    #[test]
    fn test_unknown_ability_is_unavailable() {
        let monster = orc();

        match monster.check_ability("fireball").unwrap_err() {
            TurnError::AbilityUnavailable { ability_id, reason } => {
                assert_eq!(ability_id, "fireball");
                assert_eq!(reason, "ability not found");
            }
            other => panic!("expected AbilityUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_action_ability_consumes_action_slot() {
        let mut monster = sorcerer();

        monster.use_ability(cast("fireball")).unwrap();

        assert!(monster.action_taken());
        let action = monster.action().unwrap();
        assert_eq!(action.kind, ActionKind::Ability("fireball".to_owned()));
        assert_eq!(action.target_id.as_deref(), Some("wizard"));
        assert_eq!(action.success, Some(true));
        assert_eq!(
            monster.ability("fireball").unwrap().remaining_this_quest,
            Some(1)
        );
        assert_eq!(monster.check_ability("fireball").unwrap_err().code(), "ability_unavailable");
    }

    #[test]
    fn test_free_ability_leaves_action_slot() {
        let mut monster = sorcerer();

        monster.use_ability(cast("command")).unwrap();
        monster.use_ability(cast("command")).unwrap();
        let third = monster.use_ability(cast("command"));

        assert!(!monster.action_taken());
        assert!(monster.can_use_ability("fireball"));
        match third.unwrap_err() {
            TurnError::AbilityUnavailable { reason, .. } => {
                assert_eq!(reason, "per-turn limit of 2 reached");
            }
            other => panic!("expected AbilityUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_action_ability_blocked_after_attack() {
        let mut monster = sorcerer();
        monster.record_action(ActionRecord::new(ActionKind::Attack)).unwrap();

        let result = monster.use_ability(cast("fireball"));

        assert_eq!(result.unwrap_err().code(), "cannot_act");
        assert_eq!(monster.ability("fireball").unwrap().used_this_turn, 0);
    }

    #[test]
    fn test_quest_cap_survives_turn_resets() {
        let mut monster = sorcerer();

        monster.use_ability(cast("fireball")).unwrap();
        monster.reset_for_new_turn(2);
        monster.use_ability(cast("fireball")).unwrap();
        monster.reset_for_new_turn(3);

        let ability = monster.ability("fireball").unwrap();
        assert_eq!(ability.used_this_turn, 0);
        assert_eq!(ability.remaining_this_quest, Some(0));
        match monster.check_ability("fireball").unwrap_err() {
            TurnError::AbilityUnavailable { reason, .. } => {
                assert_eq!(reason, "no uses remaining this quest");
            }
            other => panic!("expected AbilityUnavailable, got {other:?}"),
        }
    }

    // --- effects ---

    #[test]
    fn test_movement_halved_takes_effect_immediately() {
        let mut monster = orc();
        monster.record_movement(Position::new(1, 0)).unwrap();

        monster.add_active_effect(effect(EffectKind::MovementHalved, EffectExpiry::EndOfTurn));

        let ledger = monster.movement();
        assert_eq!(ledger.remaining(), 3);
        assert_eq!(ledger.used() + ledger.remaining(), ledger.total());
    }

    #[test]
    fn test_passable_effect_sets_flag() {
        let mut monster = orc();

        monster.add_active_effect(effect(EffectKind::Passable, EffectExpiry::EndOfTurn));

        assert!(monster.has_flag(MonsterFlag::Passable));
    }

    #[test]
    fn test_reset_keeps_quest_long_flags_and_effects() {
        // Arrange
        let mut monster = orc();
        monster.set_flag(MonsterFlag::Revealed);
        monster.add_active_effect(effect(EffectKind::ExtraAttack, EffectExpiry::EndOfTurn));
        monster.add_active_effect(effect(EffectKind::MovementHalved, EffectExpiry::EndOfQuest));
        monster.record_movement(Position::new(1, 0)).unwrap();
        monster.record_action(ActionRecord::new(ActionKind::Attack)).unwrap();

        // Act
        monster.reset_for_new_turn(2);

        // Assert
        assert_eq!(monster.turn_number(), 2);
        assert_eq!(monster.turn_summary(), TurnSummary::NoActions);
        assert!(monster.events().is_empty());
        assert!(monster.has_flag(MonsterFlag::Revealed));
        assert!(!monster.has_flag(MonsterFlag::ExtraAttack));
        assert_eq!(monster.active_effects().len(), 1);
        assert_eq!(monster.movement().remaining(), 4);
        assert!(monster.action().is_none());
    }

    // --- body ---

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut monster = sorcerer();

        assert_eq!(monster.record_damage(2), 1);
        assert!(monster.is_alive());
        assert_eq!(monster.record_damage(5), 0);
        assert!(!monster.is_alive());
    }

    #[test]
    fn test_turn_summary_labels() {
        assert_eq!(TurnSummary::NoActions.to_string(), "no actions");
        assert_eq!(TurnSummary::MovedOnly.to_string(), "moved only");
        assert_eq!(TurnSummary::ActedOnly.to_string(), "acted only");
        assert_eq!(TurnSummary::MovedAndActed.to_string(), "moved and acted");
    }
}
