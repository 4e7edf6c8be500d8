//! The phase orchestrator state machine.
//!
//! Methods here take `&mut self` and never lock: they assume the caller
//! already holds exclusive access. [`crate::SharedOrchestrator`] is the
//! locked wrapper used by concurrent callers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use delvers_core::clock::Clock;
use delvers_core::error::TurnError;
use delvers_core::position::Position;
use serde::{Deserialize, Serialize};

use super::config::PhaseConfig;
use super::phase::Phase;

/// Coarse per-monster bookkeeping for the current GM phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterFlags {
    /// The monster has moved this GM phase.
    pub moved: bool,
    /// The monster has taken its action this GM phase.
    pub action_taken: bool,
}

/// Holder of the election slot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Election {
    player_id: String,
    elected_at: DateTime<Utc>,
}

/// Outcome of a completed hero turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedHeroTurn {
    /// The hero whose turn ended.
    pub hero_id: String,
    /// The phase the orchestrator moved to.
    pub next_phase: Phase,
}

/// Top-level quest state machine.
#[derive(Debug)]
pub struct PhaseOrchestrator {
    config: PhaseConfig,
    phase: Phase,
    cycle: u32,
    game_master_id: Option<String>,
    players: BTreeSet<String>,
    readiness: BTreeMap<String, bool>,
    start_positions: BTreeMap<String, Position>,
    election: Option<Election>,
    election_started_at: Option<DateTime<Utc>>,
    active_hero: Option<String>,
    heroes_acted: BTreeSet<String>,
    monsters: BTreeMap<String, MonsterFlags>,
}

impl PhaseOrchestrator {
    /// Creates an orchestrator in `QuestSetup`.
    #[must_use]
    pub fn new(config: PhaseConfig) -> Self {
        Self {
            config,
            phase: Phase::QuestSetup,
            cycle: 0,
            game_master_id: None,
            players: BTreeSet::new(),
            readiness: BTreeMap::new(),
            start_positions: BTreeMap::new(),
            election: None,
            election_started_at: None,
            active_hero: None,
            heroes_acted: BTreeSet::new(),
            monsters: BTreeMap::new(),
        }
    }

    fn require_phase(&self, expected: Phase, operation: &'static str) -> Result<(), TurnError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(TurnError::InvalidPhase {
                operation,
                phase: self.phase.as_str(),
            })
        }
    }

    fn require_registered(&self, player_id: &str) -> Result<(), TurnError> {
        if self.players.contains(player_id) {
            Ok(())
        } else {
            Err(TurnError::not_found("player", player_id))
        }
    }

    fn is_game_master(&self, player_id: &str) -> bool {
        self.game_master_id.as_deref() == Some(player_id)
    }

    fn open_election(&mut self, clock: &dyn Clock) {
        self.phase = Phase::HeroElection;
        self.election = None;
        self.election_started_at = Some(clock.now());
    }

    /// At least one registered hero acted this cycle and the advance policy
    /// is met. Only registered heroes are ever counted as acted.
    fn is_hero_round_complete(&self) -> bool {
        let acted = self.heroes_acted.len();
        acted > 0 && self.config.advance_policy().is_satisfied(acted, self.hero_count())
    }

    fn enter_gm_phase(&mut self) {
        self.phase = Phase::GmPhase;
        self.election = None;
        self.election_started_at = None;
        self.monsters = BTreeMap::new();
    }

    /// Leaves `HeroActive` for the GM phase or the next election.
    fn finish_hero_turn(&mut self, clock: &dyn Clock) {
        if self.is_hero_round_complete() {
            self.enter_gm_phase();
        } else {
            self.open_election(clock);
        }
    }

    // --- setup ---

    /// Adds a participant. During `QuestSetup` the participant also starts
    /// out not ready. Registering an existing id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::Validation` if `player_id` is empty.
    pub fn register_player(&mut self, player_id: &str) -> Result<(), TurnError> {
        if player_id.is_empty() {
            return Err(TurnError::Validation("player id must not be empty".to_owned()));
        }
        self.players.insert(player_id.to_owned());
        if self.phase == Phase::QuestSetup {
            self.readiness.entry(player_id.to_owned()).or_insert(false);
        }
        Ok(())
    }

    /// Registers `player_id` (if needed) and makes it the game master.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `QuestSetup` and
    /// `TurnError::Validation` for an empty id.
    pub fn assign_game_master(&mut self, player_id: &str) -> Result<(), TurnError> {
        self.require_phase(Phase::QuestSetup, "assign_game_master")?;
        self.register_player(player_id)?;
        self.game_master_id = Some(player_id.to_owned());
        Ok(())
    }

    /// Drops a participant's bookkeeping and returns the phase afterwards.
    ///
    /// A pending election held by the participant is cleared. Removing the
    /// active hero ends its turn without counting it as acted. Whenever the
    /// departure leaves the hero round complete under the advance policy,
    /// the GM phase begins.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotFound` if the participant is not registered
    /// and `TurnError::Validation` for the game master once the quest has
    /// started.
    pub fn remove_player(
        &mut self,
        player_id: &str,
        clock: &dyn Clock,
    ) -> Result<Phase, TurnError> {
        self.require_registered(player_id)?;
        let is_game_master = self.is_game_master(player_id);
        if is_game_master && self.phase != Phase::QuestSetup {
            return Err(TurnError::Validation(
                "the game master cannot leave a quest in progress".to_owned(),
            ));
        }

        self.players.remove(player_id);
        self.readiness.remove(player_id);
        self.start_positions.remove(player_id);
        self.heroes_acted.remove(player_id);
        if is_game_master {
            self.game_master_id = None;
        }
        if self
            .election
            .as_ref()
            .is_some_and(|e| e.player_id == player_id)
        {
            self.election = None;
        }

        if self.active_hero.as_deref() == Some(player_id) {
            self.active_hero = None;
            self.finish_hero_turn(clock);
        } else if self.phase == Phase::HeroElection && self.is_hero_round_complete() {
            self.enter_gm_phase();
        }
        Ok(self.phase)
    }

    /// Records the tile a participant will start the quest on.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `QuestSetup` and
    /// `TurnError::NotFound` for an unregistered participant.
    pub fn select_starting_position(
        &mut self,
        player_id: &str,
        position: Position,
    ) -> Result<(), TurnError> {
        self.require_phase(Phase::QuestSetup, "select_starting_position")?;
        self.require_registered(player_id)?;
        self.start_positions.insert(player_id.to_owned(), position);
        Ok(())
    }

    /// Sets a participant's readiness flag.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `QuestSetup` and
    /// `TurnError::NotFound` for an unregistered participant.
    pub fn set_player_ready(&mut self, player_id: &str, ready: bool) -> Result<(), TurnError> {
        self.require_phase(Phase::QuestSetup, "set_player_ready")?;
        self.require_registered(player_id)?;
        self.readiness.insert(player_id.to_owned(), ready);
        Ok(())
    }

    /// True iff at least one participant has a readiness entry and every
    /// entry is `true`.
    #[must_use]
    pub fn are_all_players_ready(&self) -> bool {
        !self.readiness.is_empty() && self.readiness.values().all(|ready| *ready)
    }

    /// Leaves setup and opens the first hero election of cycle 1.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `QuestSetup` and
    /// `TurnError::NotReady` if any participant is not ready.
    pub fn start_quest_after_setup(&mut self, clock: &dyn Clock) -> Result<u32, TurnError> {
        self.require_phase(Phase::QuestSetup, "start_quest_after_setup")?;
        if !self.are_all_players_ready() {
            return Err(TurnError::NotReady);
        }
        self.cycle = 1;
        self.heroes_acted = BTreeSet::new();
        self.open_election(clock);
        Ok(self.cycle)
    }

    // --- election ---

    /// Volunteers `player_id` for the next hero turn. Electing the current
    /// holder again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `HeroElection`,
    /// `TurnError::NotFound` for an unregistered participant,
    /// `TurnError::NotEligible` for the game master,
    /// `TurnError::AlreadyActed` if the hero already took a turn this cycle
    /// and `TurnError::AlreadyElected` if someone else holds the slot.
    pub fn elect_self_as_next_player(
        &mut self,
        player_id: &str,
        clock: &dyn Clock,
    ) -> Result<(), TurnError> {
        self.require_phase(Phase::HeroElection, "elect_self_as_next_player")?;
        self.require_registered(player_id)?;
        if self.is_game_master(player_id) {
            return Err(TurnError::NotEligible(player_id.to_owned()));
        }
        if self.heroes_acted.contains(player_id) {
            return Err(TurnError::AlreadyActed(player_id.to_owned()));
        }
        match &self.election {
            Some(current) if current.player_id == player_id => Ok(()),
            Some(current) => Err(TurnError::AlreadyElected(current.player_id.clone())),
            None => {
                self.election = Some(Election {
                    player_id: player_id.to_owned(),
                    elected_at: clock.now(),
                });
                Ok(())
            }
        }
    }

    /// Withdraws a pending election held by `player_id`.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `HeroElection` and
    /// `TurnError::NotElected` if the slot is empty or held by someone else.
    pub fn cancel_player_election(&mut self, player_id: &str) -> Result<(), TurnError> {
        self.require_phase(Phase::HeroElection, "cancel_player_election")?;
        match &self.election {
            Some(current) if current.player_id == player_id => {
                self.election = None;
                Ok(())
            }
            _ => Err(TurnError::NotElected(player_id.to_owned())),
        }
    }

    /// Hands the turn to the elected hero and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `HeroElection` and
    /// `TurnError::NoElection` if the slot is empty.
    pub fn confirm_election_and_start_hero_turn(&mut self) -> Result<String, TurnError> {
        self.require_phase(Phase::HeroElection, "confirm_election_and_start_hero_turn")?;
        let election = self.election.take().ok_or(TurnError::NoElection)?;
        self.active_hero = Some(election.player_id.clone());
        self.election_started_at = None;
        self.phase = Phase::HeroActive;
        Ok(election.player_id)
    }

    /// Filters `all_ids` down to heroes that may still take a turn this
    /// cycle.
    #[must_use]
    pub fn eligible_heroes(&self, all_ids: &[String]) -> Vec<String> {
        all_ids
            .iter()
            .filter(|id| !self.is_game_master(id) && !self.heroes_acted.contains(*id))
            .cloned()
            .collect()
    }

    /// Eligible heroes among registered participants, in id order.
    #[must_use]
    pub fn eligible_registered_heroes(&self) -> Vec<String> {
        let all: Vec<String> = self.players.iter().cloned().collect();
        self.eligible_heroes(&all)
    }

    // --- turns ---

    /// Ends the active hero's turn. Moves to the GM phase if the advance
    /// policy is satisfied, otherwise reopens the election.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `HeroActive`.
    pub fn complete_hero_turn(&mut self, clock: &dyn Clock) -> Result<CompletedHeroTurn, TurnError> {
        self.require_phase(Phase::HeroActive, "complete_hero_turn")?;
        let hero_id = self.active_hero.take().unwrap_or_default();
        if !hero_id.is_empty() {
            self.heroes_acted.insert(hero_id.clone());
        }
        self.finish_hero_turn(clock);

        Ok(CompletedHeroTurn {
            hero_id,
            next_phase: self.phase,
        })
    }

    /// Marks whether a monster has moved this GM phase.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `GmPhase`.
    pub fn set_monster_moved(&mut self, monster_id: &str, moved: bool) -> Result<(), TurnError> {
        self.require_phase(Phase::GmPhase, "set_monster_moved")?;
        self.monsters.entry(monster_id.to_owned()).or_default().moved = moved;
        Ok(())
    }

    /// Marks whether a monster has acted this GM phase.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `GmPhase`.
    pub fn set_monster_action_taken(
        &mut self,
        monster_id: &str,
        action_taken: bool,
    ) -> Result<(), TurnError> {
        self.require_phase(Phase::GmPhase, "set_monster_action_taken")?;
        self.monsters
            .entry(monster_id.to_owned())
            .or_default()
            .action_taken = action_taken;
        Ok(())
    }

    /// Ends the GM phase and opens the next cycle's election. Returns the
    /// new cycle number.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidPhase` outside `GmPhase`.
    pub fn complete_gm_turn(&mut self, clock: &dyn Clock) -> Result<u32, TurnError> {
        self.require_phase(Phase::GmPhase, "complete_gm_turn")?;
        // Fresh collections each cycle; snapshots handed out earlier keep
        // their own copies.
        self.monsters = BTreeMap::new();
        self.heroes_acted = BTreeSet::new();
        self.cycle += 1;
        self.open_election(clock);
        Ok(self.cycle)
    }

    // --- queries ---

    /// The orchestrator configuration.
    #[must_use]
    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current cycle number (`0` until the quest starts).
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// The hero whose turn it is, if any.
    #[must_use]
    pub fn active_hero(&self) -> Option<&str> {
        self.active_hero.as_deref()
    }

    /// The holder of the election slot, if any.
    #[must_use]
    pub fn elected_player(&self) -> Option<&str> {
        self.election.as_ref().map(|e| e.player_id.as_str())
    }

    /// When the current holder claimed the election slot.
    #[must_use]
    pub fn elected_at(&self) -> Option<DateTime<Utc>> {
        self.election.as_ref().map(|e| e.elected_at)
    }

    /// When the current election opened.
    #[must_use]
    pub fn election_started_at(&self) -> Option<DateTime<Utc>> {
        self.election_started_at
    }

    /// When the current election times out, if a timeout is configured.
    #[must_use]
    pub fn election_deadline(&self) -> Option<DateTime<Utc>> {
        let started = self.election_started_at?;
        self.config.election_timeout().map(|timeout| started + timeout)
    }

    /// Whether the current election has outlived its timeout at `now`.
    #[must_use]
    pub fn is_election_expired(&self, now: DateTime<Utc>) -> bool {
        self.phase == Phase::HeroElection
            && self.election_deadline().is_some_and(|deadline| now >= deadline)
    }

    /// The game master, if assigned.
    #[must_use]
    pub fn game_master_id(&self) -> Option<&str> {
        self.game_master_id.as_deref()
    }

    /// Registered participants, including the game master.
    #[must_use]
    pub fn players(&self) -> &BTreeSet<String> {
        &self.players
    }

    /// Number of registered heroes (participants other than the GM).
    #[must_use]
    pub fn hero_count(&self) -> usize {
        self.players
            .iter()
            .filter(|id| !self.is_game_master(id))
            .count()
    }

    /// Readiness per participant.
    #[must_use]
    pub fn readiness(&self) -> &BTreeMap<String, bool> {
        &self.readiness
    }

    /// The starting tile chosen by a participant.
    #[must_use]
    pub fn start_position(&self, player_id: &str) -> Option<Position> {
        self.start_positions.get(player_id).copied()
    }

    /// All chosen starting tiles.
    #[must_use]
    pub fn start_positions(&self) -> &BTreeMap<String, Position> {
        &self.start_positions
    }

    /// Heroes that completed a turn this cycle.
    #[must_use]
    pub fn heroes_acted(&self) -> &BTreeSet<String> {
        &self.heroes_acted
    }

    /// Flags for one monster this GM phase.
    #[must_use]
    pub fn monster_flags(&self, monster_id: &str) -> Option<MonsterFlags> {
        self.monsters.get(monster_id).copied()
    }

    /// Snapshot of every monster's flags this GM phase.
    #[must_use]
    pub fn monster_flags_snapshot(&self) -> BTreeMap<String, MonsterFlags> {
        self.monsters.clone()
    }

    /// True during `HeroElection` or `HeroActive`.
    #[must_use]
    pub fn is_hero_turn(&self) -> bool {
        matches!(self.phase, Phase::HeroElection | Phase::HeroActive)
    }

    /// True during `GmPhase`.
    #[must_use]
    pub fn is_gm_turn(&self) -> bool {
        self.phase == Phase::GmPhase
    }

    /// True during `QuestSetup`.
    #[must_use]
    pub fn is_quest_setup(&self) -> bool {
        self.phase == Phase::QuestSetup
    }

    /// True iff a hero turn is active and belongs to `player_id`.
    #[must_use]
    pub fn can_player_act(&self, player_id: &str) -> bool {
        self.phase == Phase::HeroActive && self.active_hero() == Some(player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use delvers_test_support::FixedClock;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    /// Orchestrator with GM `gm` and heroes `a`, `b`, already in cycle 1.
    fn started(config: PhaseConfig) -> PhaseOrchestrator {
        let clock = fixed_clock();
        let mut orchestrator = PhaseOrchestrator::new(config);
        orchestrator.assign_game_master("gm").unwrap();
        orchestrator.register_player("a").unwrap();
        orchestrator.register_player("b").unwrap();
        for id in ["gm", "a", "b"] {
            orchestrator.set_player_ready(id, true).unwrap();
        }
        orchestrator.start_quest_after_setup(&clock).unwrap();
        orchestrator
    }

    fn play_hero_turn(orchestrator: &mut PhaseOrchestrator, hero: &str) -> CompletedHeroTurn {
        let clock = fixed_clock();
        orchestrator.elect_self_as_next_player(hero, &clock).unwrap();
        orchestrator.confirm_election_and_start_hero_turn().unwrap();
        orchestrator.complete_hero_turn(&clock).unwrap()
    }

    // --- setup ---

    #[test]
    fn test_readiness_gates_quest_start() {
        // Arrange
        let clock = fixed_clock();
        let mut orchestrator = PhaseOrchestrator::new(PhaseConfig::default());
        orchestrator.register_player("A").unwrap();
        orchestrator.register_player("B").unwrap();

        // Act
        orchestrator.set_player_ready("A", true).unwrap();
        orchestrator.set_player_ready("B", false).unwrap();
        let not_yet = orchestrator.are_all_players_ready();
        let early_start = orchestrator.start_quest_after_setup(&clock);
        orchestrator.set_player_ready("B", true).unwrap();
        let cycle = orchestrator.start_quest_after_setup(&clock).unwrap();

        // Assert
        assert!(!not_yet);
        assert_eq!(early_start, Err(TurnError::NotReady));
        assert_eq!(cycle, 1);
        assert_eq!(orchestrator.phase(), Phase::HeroElection);
        assert_eq!(orchestrator.cycle(), 1);
        assert_eq!(orchestrator.election_started_at(), Some(clock.0));
    }

    #[test]
    fn test_no_players_is_not_ready() {
        let orchestrator = PhaseOrchestrator::new(PhaseConfig::default());

        assert!(!orchestrator.are_all_players_ready());
    }

    #[test]
    fn test_registering_twice_keeps_readiness() {
        let mut orchestrator = PhaseOrchestrator::new(PhaseConfig::default());
        orchestrator.register_player("a").unwrap();
        orchestrator.set_player_ready("a", true).unwrap();

        orchestrator.register_player("a").unwrap();

        assert_eq!(orchestrator.readiness().get("a"), Some(&true));
    }

    #[test]
    fn test_empty_player_id_is_rejected() {
        let mut orchestrator = PhaseOrchestrator::new(PhaseConfig::default());

        let result = orchestrator.register_player("");

        assert!(matches!(result, Err(TurnError::Validation(_))));
        assert!(orchestrator.players().is_empty());
    }

    #[test]
    fn test_setup_operations_fail_after_quest_start() {
        let mut orchestrator = started(PhaseConfig::default());

        let ready = orchestrator.set_player_ready("a", false);
        let position = orchestrator.select_starting_position("a", Position::new(1, 1));

        match ready.unwrap_err() {
            TurnError::InvalidPhase { operation, phase } => {
                assert_eq!(operation, "set_player_ready");
                assert_eq!(phase, "hero_election");
            }
            other => panic!("expected InvalidPhase, got {other:?}"),
        }
        assert_eq!(position.unwrap_err().code(), "invalid_phase");
        assert_eq!(orchestrator.readiness().get("a"), Some(&true));
        assert_eq!(orchestrator.start_position("a"), None);
    }

    #[test]
    fn test_starting_position_recorded_for_registered_player() {
        let mut orchestrator = PhaseOrchestrator::new(PhaseConfig::default());
        orchestrator.register_player("a").unwrap();

        orchestrator
            .select_starting_position("a", Position::new(2, 5))
            .unwrap();
        let unknown = orchestrator.select_starting_position("zed", Position::new(0, 0));

        assert_eq!(orchestrator.start_position("a"), Some(Position::new(2, 5)));
        assert_eq!(unknown.unwrap_err().code(), "not_found");
    }

    #[test]
    fn test_player_registered_mid_quest_has_no_readiness_entry() {
        let mut orchestrator = started(PhaseConfig::default());

        orchestrator.register_player("late").unwrap();

        assert!(orchestrator.players().contains("late"));
        assert!(!orchestrator.readiness().contains_key("late"));
    }

    // --- election ---

    #[test]
    fn test_election_slot_is_exclusive_until_cancelled() {
        // Arrange
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());

        // Act / Assert
        orchestrator.elect_self_as_next_player("a", &clock).unwrap();
        assert_eq!(orchestrator.elected_player(), Some("a"));

        let rival = orchestrator.elect_self_as_next_player("b", &clock);
        assert_eq!(rival, Err(TurnError::AlreadyElected("a".to_owned())));
        assert_eq!(orchestrator.elected_player(), Some("a"));

        orchestrator.cancel_player_election("a").unwrap();
        assert_eq!(orchestrator.elected_player(), None);

        orchestrator.elect_self_as_next_player("b", &clock).unwrap();
        assert_eq!(orchestrator.elected_player(), Some("b"));
        assert_eq!(orchestrator.elected_at(), Some(clock.0));
    }

    #[test]
    fn test_reelecting_self_is_idempotent() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());

        orchestrator.elect_self_as_next_player("a", &clock).unwrap();
        let again = orchestrator.elect_self_as_next_player("a", &clock);

        assert!(again.is_ok());
        assert_eq!(orchestrator.elected_player(), Some("a"));
    }

    #[test]
    fn test_only_holder_may_cancel() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        orchestrator.elect_self_as_next_player("a", &clock).unwrap();

        let result = orchestrator.cancel_player_election("b");

        assert_eq!(result, Err(TurnError::NotElected("b".to_owned())));
        assert_eq!(orchestrator.elected_player(), Some("a"));
    }

    #[test]
    fn test_cancel_with_empty_slot_is_not_elected() {
        let mut orchestrator = started(PhaseConfig::default());

        let result = orchestrator.cancel_player_election("a");

        assert_eq!(result.unwrap_err().code(), "not_elected");
    }

    #[test]
    fn test_game_master_cannot_elect() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());

        let result = orchestrator.elect_self_as_next_player("gm", &clock);

        assert_eq!(result, Err(TurnError::NotEligible("gm".to_owned())));
        assert_eq!(orchestrator.elected_player(), None);
    }

    #[test]
    fn test_unregistered_player_cannot_elect() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());

        let result = orchestrator.elect_self_as_next_player("ghost", &clock);

        assert_eq!(result.unwrap_err().code(), "not_found");
    }

    #[test]
    fn test_confirm_without_election_fails() {
        let mut orchestrator = started(PhaseConfig::default());

        let result = orchestrator.confirm_election_and_start_hero_turn();

        assert_eq!(result, Err(TurnError::NoElection));
        assert_eq!(orchestrator.phase(), Phase::HeroElection);
    }

    #[test]
    fn test_confirm_starts_hero_turn_and_clears_slot() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        orchestrator.elect_self_as_next_player("b", &clock).unwrap();

        let hero = orchestrator.confirm_election_and_start_hero_turn().unwrap();

        assert_eq!(hero, "b");
        assert_eq!(orchestrator.phase(), Phase::HeroActive);
        assert_eq!(orchestrator.active_hero(), Some("b"));
        assert_eq!(orchestrator.elected_player(), None);
        assert!(orchestrator.can_player_act("b"));
        assert!(!orchestrator.can_player_act("a"));
        assert!(orchestrator.is_hero_turn());
    }

    #[test]
    fn test_hero_who_acted_cannot_elect_again_this_cycle() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        play_hero_turn(&mut orchestrator, "a");

        let result = orchestrator.elect_self_as_next_player("a", &clock);

        assert_eq!(result, Err(TurnError::AlreadyActed("a".to_owned())));
    }

    #[test]
    fn test_eligible_heroes_excludes_gm_and_acted() {
        let mut orchestrator = started(PhaseConfig::default());
        play_hero_turn(&mut orchestrator, "a");
        let all = vec!["gm".to_owned(), "a".to_owned(), "b".to_owned()];

        assert_eq!(orchestrator.eligible_heroes(&all), vec!["b".to_owned()]);
        assert_eq!(orchestrator.eligible_registered_heroes(), vec!["b".to_owned()]);
    }

    #[test]
    fn test_removing_elected_player_clears_slot() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        orchestrator.elect_self_as_next_player("a", &clock).unwrap();

        let phase = orchestrator.remove_player("a", &clock).unwrap();

        assert_eq!(phase, Phase::HeroElection);
        assert_eq!(orchestrator.elected_player(), None);
        assert!(!orchestrator.players().contains("a"));
        assert_eq!(orchestrator.hero_count(), 1);
    }

    #[test]
    fn test_departed_hero_no_longer_counts_toward_all_heroes_policy() {
        // Arrange
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        orchestrator.register_player("c").unwrap();
        play_hero_turn(&mut orchestrator, "a");

        // Act
        orchestrator.remove_player("a", &clock).unwrap();
        let after_b = play_hero_turn(&mut orchestrator, "b");

        // Assert
        assert_eq!(after_b.next_phase, Phase::HeroElection);
        assert_eq!(orchestrator.hero_count(), 2);
        assert_eq!(orchestrator.heroes_acted().len(), 1);
        assert_eq!(orchestrator.eligible_registered_heroes(), vec!["c".to_owned()]);
    }

    #[test]
    fn test_removing_active_hero_ends_its_turn() {
        // Arrange
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        orchestrator.elect_self_as_next_player("a", &clock).unwrap();
        orchestrator.confirm_election_and_start_hero_turn().unwrap();

        // Act
        let phase = orchestrator.remove_player("a", &clock).unwrap();

        // Assert
        assert_eq!(phase, Phase::HeroElection);
        assert_eq!(orchestrator.active_hero(), None);
        assert!(!orchestrator.can_player_act("a"));
        assert!(orchestrator.heroes_acted().is_empty());
        assert_eq!(orchestrator.eligible_registered_heroes(), vec!["b".to_owned()]);
    }

    #[test]
    fn test_removing_active_hero_can_finish_the_round() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        play_hero_turn(&mut orchestrator, "a");
        orchestrator.elect_self_as_next_player("b", &clock).unwrap();
        orchestrator.confirm_election_and_start_hero_turn().unwrap();

        let phase = orchestrator.remove_player("b", &clock).unwrap();

        assert_eq!(phase, Phase::GmPhase);
        assert_eq!(orchestrator.election_started_at(), None);
    }

    #[test]
    fn test_removing_last_pending_hero_during_election_starts_gm_phase() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        play_hero_turn(&mut orchestrator, "a");

        let phase = orchestrator.remove_player("b", &clock).unwrap();

        assert_eq!(phase, Phase::GmPhase);
        assert!(orchestrator.is_gm_turn());
    }

    #[test]
    fn test_game_master_cannot_leave_after_quest_start() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());

        let err = orchestrator.remove_player("gm", &clock).unwrap_err();

        match err {
            TurnError::Validation(reason) => {
                assert_eq!(reason, "the game master cannot leave a quest in progress");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(orchestrator.game_master_id(), Some("gm"));
        assert!(orchestrator.players().contains("gm"));
    }

    #[test]
    fn test_game_master_may_leave_during_setup() {
        let clock = fixed_clock();
        let mut orchestrator = PhaseOrchestrator::new(PhaseConfig::default());
        orchestrator.assign_game_master("gm").unwrap();

        orchestrator.remove_player("gm", &clock).unwrap();

        assert_eq!(orchestrator.game_master_id(), None);
        assert!(orchestrator.readiness().is_empty());
    }

    // --- turns ---

    #[test]
    fn test_all_heroes_policy_returns_to_election_until_everyone_acted() {
        let mut orchestrator = started(PhaseConfig::default());

        let first = play_hero_turn(&mut orchestrator, "b");

        assert_eq!(first.hero_id, "b");
        assert_eq!(first.next_phase, Phase::HeroElection);
        assert_eq!(orchestrator.phase(), Phase::HeroElection);
        assert_eq!(orchestrator.active_hero(), None);

        let second = play_hero_turn(&mut orchestrator, "a");

        assert_eq!(second.next_phase, Phase::GmPhase);
        assert!(orchestrator.is_gm_turn());
    }

    #[test]
    fn test_any_hero_policy_advances_after_one_turn() {
        let mut orchestrator = started(PhaseConfig {
            require_all_heroes_acted: false,
            election_timeout_secs: 0,
        });

        let completed = play_hero_turn(&mut orchestrator, "a");

        assert_eq!(completed.next_phase, Phase::GmPhase);
    }

    #[test]
    fn test_complete_gm_turn_starts_next_cycle() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());
        play_hero_turn(&mut orchestrator, "a");
        play_hero_turn(&mut orchestrator, "b");
        orchestrator.set_monster_moved("orc", true).unwrap();

        let cycle = orchestrator.complete_gm_turn(&clock).unwrap();

        assert_eq!(cycle, 2);
        assert_eq!(orchestrator.cycle(), 2);
        assert_eq!(orchestrator.phase(), Phase::HeroElection);
        assert!(orchestrator.heroes_acted().is_empty());
        assert!(orchestrator.monster_flags_snapshot().is_empty());
        assert_eq!(orchestrator.eligible_registered_heroes().len(), 2);
    }

    #[test]
    fn test_monster_flags_created_lazily_in_gm_phase() {
        let mut orchestrator = started(PhaseConfig::default());
        play_hero_turn(&mut orchestrator, "a");
        play_hero_turn(&mut orchestrator, "b");

        orchestrator.set_monster_moved("goblin-1", true).unwrap();
        orchestrator.set_monster_action_taken("goblin-2", true).unwrap();

        assert_eq!(
            orchestrator.monster_flags("goblin-1"),
            Some(MonsterFlags {
                moved: true,
                action_taken: false
            })
        );
        assert_eq!(
            orchestrator.monster_flags("goblin-2"),
            Some(MonsterFlags {
                moved: false,
                action_taken: true
            })
        );
        assert_eq!(orchestrator.monster_flags("goblin-3"), None);
    }

    #[test]
    fn test_operations_outside_their_phase_do_not_mutate() {
        let clock = fixed_clock();
        let mut orchestrator = started(PhaseConfig::default());

        let monster = orchestrator.set_monster_moved("orc", true);
        let gm_done = orchestrator.complete_gm_turn(&clock);
        let hero_done = orchestrator.complete_hero_turn(&clock);

        assert_eq!(monster.unwrap_err().code(), "invalid_phase");
        assert_eq!(gm_done.unwrap_err().code(), "invalid_phase");
        assert_eq!(hero_done.unwrap_err().code(), "invalid_phase");
        assert_eq!(orchestrator.phase(), Phase::HeroElection);
        assert_eq!(orchestrator.cycle(), 1);
        assert!(orchestrator.monster_flags_snapshot().is_empty());
    }

    #[test]
    fn test_election_expiry_follows_configured_timeout() {
        let clock = fixed_clock();
        let orchestrator = started(PhaseConfig {
            require_all_heroes_acted: true,
            election_timeout_secs: 30,
        });

        assert_eq!(
            orchestrator.election_deadline(),
            Some(clock.0 + Duration::seconds(30))
        );
        assert!(!orchestrator.is_election_expired(clock.0 + Duration::seconds(29)));
        assert!(orchestrator.is_election_expired(clock.0 + Duration::seconds(30)));
    }

    #[test]
    fn test_election_never_expires_without_timeout() {
        let clock = fixed_clock();
        let orchestrator = started(PhaseConfig::default());

        assert!(!orchestrator.is_election_expired(clock.0 + Duration::days(1)));
    }
}
