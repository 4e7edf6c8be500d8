//! Per-turn budget for a hero.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use delvers_core::error::TurnError;
use delvers_core::position::Position;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::actions::{ActionKind, ActionRecord, ActivityEntry, SearchKind, TurnActivity};
use super::config::{BudgetConfig, SearchHistoryScope};
use super::effects::{self, ActiveEffect, EffectKind, EffectTrigger};
use super::movement::MovementLedger;

const MUST_ROLL_FIRST: &str = "must roll movement dice first";

/// Which budgeted category a hero used first this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStrategy {
    /// Neither moved nor acted yet.
    Choose,
    /// Moved, has not acted.
    MoveFirst,
    /// Acted, has not moved.
    ActFirst,
    /// Both moved and acted.
    Complete,
}

impl TurnStrategy {
    /// Returns the stable snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Choose => "choose",
            Self::MoveFirst => "move_first",
            Self::ActFirst => "act_first",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for TurnStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-turn overrides granted by spells, items or the game master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnFlag {
    /// Movement may continue after both movement and action were used.
    AllowSplitMovement,
    /// One more action may be taken; consumed by that action.
    ExtraAction,
}

/// A completed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// What was searched for.
    pub kind: SearchKind,
    /// The searched location.
    pub location_key: String,
    /// Turn in which the search happened.
    pub turn_number: u32,
    /// What the search turned up, as reported by the caller.
    pub found: Vec<String>,
}

/// Movement, action and search budget for one hero.
#[derive(Debug, Clone)]
pub struct HeroBudgetTracker {
    hero_id: String,
    config: BudgetConfig,
    turn_number: u32,
    movement: MovementLedger,
    dice: Vec<u32>,
    rolled: bool,
    has_moved: bool,
    action_taken: bool,
    last_action: Option<ActionRecord>,
    current_position: Option<Position>,
    path: Vec<Position>,
    flags: BTreeSet<TurnFlag>,
    searches: BTreeMap<(SearchKind, String), SearchRecord>,
    items_used: BTreeSet<String>,
    effects: Vec<ActiveEffect>,
    activity: Vec<ActivityEntry>,
}

impl HeroBudgetTracker {
    /// A budget for `hero_id` at turn 0 with nothing rolled.
    pub fn new(hero_id: impl Into<String>, config: BudgetConfig) -> Self {
        Self {
            hero_id: hero_id.into(),
            config,
            turn_number: 0,
            movement: MovementLedger::default(),
            dice: Vec::new(),
            rolled: false,
            has_moved: false,
            action_taken: false,
            last_action: None,
            current_position: None,
            path: Vec::new(),
            flags: BTreeSet::new(),
            searches: BTreeMap::new(),
            items_used: BTreeSet::new(),
            effects: Vec::new(),
            activity: Vec::new(),
        }
    }

    fn log(&mut self, activity: TurnActivity) {
        self.activity.push(ActivityEntry {
            turn_number: self.turn_number,
            activity,
        });
    }

    /// Side effects of an effect landing on the hero.
    fn apply_effect_side_effects(&mut self, effect: &ActiveEffect) {
        match effect.kind {
            EffectKind::ExtraAction => {
                self.flags.insert(TurnFlag::ExtraAction);
            }
            EffectKind::BonusMovement => {
                self.movement
                    .grant(u32::try_from(effect.magnitude).unwrap_or(0));
            }
            _ => {}
        }
    }

    // --- movement ---

    /// Sums the per-die results into this turn's movement. Legal once per
    /// turn. Returns the new movement total.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::AlreadyRolled` on a second roll and
    /// `TurnError::Validation` if `results` is empty or its sum does not fit
    /// in a `u32`.
    pub fn roll_movement_dice(&mut self, results: &[u32]) -> Result<u32, TurnError> {
        if self.rolled {
            return Err(TurnError::AlreadyRolled);
        }
        if results.is_empty() {
            return Err(TurnError::Validation(
                "at least one die result is required".to_owned(),
            ));
        }
        let rolled = results
            .iter()
            .try_fold(0u32, |sum, die| sum.checked_add(*die))
            .ok_or_else(|| TurnError::Validation("movement roll is out of range".to_owned()))?;
        self.movement.grant(rolled);
        self.dice = results.to_vec();
        self.rolled = true;
        self.log(TurnActivity::Rolled {
            dice: results.to_vec(),
            total: rolled,
        });
        debug!(hero_id = %self.hero_id, rolled, total = self.movement.total(), "movement rolled");
        Ok(self.movement.total())
    }

    /// Checks whether the hero may move one more tile.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotMove` with the reason.
    pub fn check_move(&self) -> Result<(), TurnError> {
        if !self.rolled {
            return Err(TurnError::CannotMove(MUST_ROLL_FIRST.to_owned()));
        }
        if self.movement.remaining() == 0 {
            return Err(TurnError::CannotMove("no movement remaining".to_owned()));
        }
        if self.has_moved && self.action_taken && !self.flags.contains(&TurnFlag::AllowSplitMovement)
        {
            return Err(TurnError::CannotMove(
                "already moved and acted this turn; movement cannot be split around an action"
                    .to_owned(),
            ));
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

    /// Places the hero without spending movement (turn start, teleport).
    pub fn set_position(&mut self, position: Position) {
        self.current_position = Some(position);
    }

    // --- actions ---

    /// Checks whether the hero may take an action.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotAct` with the reason.
    pub fn check_action(&self) -> Result<(), TurnError> {
        if !self.rolled {
            return Err(TurnError::CannotAct(MUST_ROLL_FIRST.to_owned()));
        }
        if self.action_taken && !self.flags.contains(&TurnFlag::ExtraAction) {
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
            self.flags.remove(&TurnFlag::ExtraAction);
        }
        self.action_taken = true;
        self.log(TurnActivity::Acted {
            kind: record.kind.clone(),
        });
        debug!(hero_id = %self.hero_id, kind = ?record.kind, "hero action recorded");
        self.last_action = Some(record);
    }

    /// Which category the hero used first this turn.
    #[must_use]
    pub fn turn_strategy(&self) -> TurnStrategy {
        match (self.has_moved, self.action_taken) {
            (false, false) => TurnStrategy::Choose,
            (true, false) => TurnStrategy::MoveFirst,
            (false, true) => TurnStrategy::ActFirst,
            (true, true) => TurnStrategy::Complete,
        }
    }

    // --- searches ---

    /// Checks whether `location_key` may be searched for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotSearch` for a repeated search and
    /// `TurnError::CannotAct` if the action slot is unavailable.
    pub fn check_search(&self, kind: SearchKind, location_key: &str) -> Result<(), TurnError> {
        if self
            .searches
            .contains_key(&(kind, location_key.to_owned()))
        {
            return Err(TurnError::CannotSearch(format!(
                "already searched for {kind} at {location_key}"
            )));
        }
        self.check_action()
    }

    /// Whether the hero may search `location_key` for treasure.
    #[must_use]
    pub fn can_search_treasure(&self, location_key: &str) -> bool {
        self.check_search(SearchKind::Treasure, location_key).is_ok()
    }

    /// Records a search, consuming the hero's action.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Self::check_search`].
    pub fn record_search(
        &mut self,
        kind: SearchKind,
        location_key: &str,
        found: Vec<String>,
    ) -> Result<(), TurnError> {
        self.check_search(kind, location_key)?;
        self.take_action(
            ActionRecord::new(ActionKind::Search(kind)).with_details(location_key),
        );
        self.searches.insert(
            (kind, location_key.to_owned()),
            SearchRecord {
                kind,
                location_key: location_key.to_owned(),
                turn_number: self.turn_number,
                found,
            },
        );
        self.log(TurnActivity::Searched {
            kind,
            location_key: location_key.to_owned(),
        });
        Ok(())
    }

    // --- items ---

    /// Checks whether `item_id` may still be used this turn.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::CannotAct` if the item was already used.
    pub fn check_item_use(&self, item_id: &str) -> Result<(), TurnError> {
        if self.items_used.contains(item_id) {
            return Err(TurnError::CannotAct(format!(
                "item {item_id} already used this turn"
            )));
        }
        Ok(())
    }

    /// Records use of `item_id`. Does not consume the action slot.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Self::check_item_use`].
    pub fn record_item_use(&mut self, item_id: &str) -> Result<(), TurnError> {
        self.check_item_use(item_id)?;
        self.items_used.insert(item_id.to_owned());
        self.log(TurnActivity::ItemUsed {
            item_id: item_id.to_owned(),
        });
        Ok(())
    }

    // --- flags and effects ---

    /// Grants a per-turn override.
    pub fn set_turn_flag(&mut self, flag: TurnFlag) {
        self.flags.insert(flag);
    }

    /// Revokes a per-turn override.
    pub fn clear_turn_flag(&mut self, flag: TurnFlag) {
        self.flags.remove(&flag);
    }

    /// Whether a per-turn override is set.
    #[must_use]
    pub fn has_turn_flag(&self, flag: TurnFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Adds an effect. `ExtraAction` grants the extra-action flag and
    /// `BonusMovement` adds `magnitude` movement points.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::Validation` for negative bonus movement.
    pub fn add_active_effect(&mut self, effect: ActiveEffect) -> Result<(), TurnError> {
        if effect.kind == EffectKind::BonusMovement && effect.magnitude < 0 {
            return Err(TurnError::Validation(
                "bonus movement must not be negative".to_owned(),
            ));
        }
        self.apply_effect_side_effects(&effect);
        self.effects.push(effect);
        Ok(())
    }

    /// Fires effects waiting on `trigger`. Each effect fires at most once.
    pub fn trigger_effects(&mut self, trigger: EffectTrigger) -> Vec<ActiveEffect> {
        effects::fire(&mut self.effects, trigger)
    }

    // --- lifecycle ---

    /// Starts turn `turn_number`: clears movement, the action slot, flags,
    /// the path, item use and the activity log, and drops end-of-turn
    /// effects. Longer-lived effects re-apply their side effects to the new
    /// turn. Search history is cleared only under
    /// [`SearchHistoryScope::Turn`].
    pub fn reset_for_new_turn(&mut self, turn_number: u32) {
        self.turn_number = turn_number;
        self.movement = MovementLedger::default();
        self.dice.clear();
        self.rolled = false;
        self.has_moved = false;
        self.action_taken = false;
        self.last_action = None;
        self.path.clear();
        self.flags.clear();
        self.items_used.clear();
        self.activity.clear();
        if self.config.search_history_scope == SearchHistoryScope::Turn {
            self.searches.clear();
        }
        effects::expire_end_of_turn(&mut self.effects);
        for effect in self.effects.clone() {
            self.apply_effect_side_effects(&effect);
        }
    }

    // --- queries ---

    /// The hero this budget belongs to.
    #[must_use]
    pub fn hero_id(&self) -> &str {
        &self.hero_id
    }

    /// Current turn number.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Movement points for this turn.
    #[must_use]
    pub fn movement(&self) -> MovementLedger {
        self.movement
    }

    /// Per-die results of this turn's roll.
    #[must_use]
    pub fn dice(&self) -> &[u32] {
        &self.dice
    }

    /// Whether movement was rolled this turn.
    #[must_use]
    pub fn has_rolled(&self) -> bool {
        self.rolled
    }

    /// Whether the hero moved this turn.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Whether the hero used its action this turn.
    #[must_use]
    pub fn action_taken(&self) -> bool {
        self.action_taken
    }

    /// The most recent action this turn.
    #[must_use]
    pub fn last_action(&self) -> Option<&ActionRecord> {
        self.last_action.as_ref()
    }

    /// Where the hero stands.
    #[must_use]
    pub fn current_position(&self) -> Option<Position> {
        self.current_position
    }

    /// Tiles moved through this turn.
    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Active per-turn overrides.
    #[must_use]
    pub fn turn_flags(&self) -> Vec<TurnFlag> {
        self.flags.iter().copied().collect()
    }

    /// Recorded searches.
    pub fn searches(&self) -> impl Iterator<Item = &SearchRecord> {
        self.searches.values()
    }

    /// Active effects.
    #[must_use]
    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    /// This turn's activity log.
    #[must_use]
    pub fn activity(&self) -> &[ActivityEntry] {
        &self.activity
    }
}
