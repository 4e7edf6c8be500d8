//! Lock-holding entry points over [`PhaseOrchestrator`].
//!
//! Each public method acquires the lock exactly once and delegates to the
//! lock-free core. Mutations take the write lock; queries take the read
//! lock. Never call back into a `SharedOrchestrator` from inside
//! [`SharedOrchestrator::read`] or [`SharedOrchestrator::write`].

use std::collections::BTreeMap;
use std::sync::RwLock;

use delvers_core::clock::Clock;
use delvers_core::error::TurnError;
use delvers_core::position::Position;
use delvers_core::sync;
use tracing::{debug, info};

use crate::domain::config::PhaseConfig;
use crate::domain::orchestrator::{CompletedHeroTurn, MonsterFlags, PhaseOrchestrator};
use crate::domain::phase::Phase;

use super::query_handlers::PhaseView;

/// An orchestrator shared between connections.
#[derive(Debug)]
pub struct SharedOrchestrator {
    inner: RwLock<PhaseOrchestrator>,
}

impl SharedOrchestrator {
    /// Creates a shared orchestrator in `QuestSetup`.
    #[must_use]
    pub fn new(config: PhaseConfig) -> Self {
        Self {
            inner: RwLock::new(PhaseOrchestrator::new(config)),
        }
    }

    /// Runs `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&PhaseOrchestrator) -> R) -> R {
        let guard = sync::read(&self.inner);
        f(&*guard)
    }

    /// Runs `f` under the write lock, so several core operations can be
    /// composed into one critical section.
    pub fn write<R>(&self, f: impl FnOnce(&mut PhaseOrchestrator) -> R) -> R {
        let mut guard = sync::write(&self.inner);
        f(&mut *guard)
    }

    /// See [`PhaseOrchestrator::register_player`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn register_player(&self, player_id: &str) -> Result<(), TurnError> {
        self.write(|o| o.register_player(player_id))?;
        debug!(player_id, "player registered");
        Ok(())
    }

    /// See [`PhaseOrchestrator::assign_game_master`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn assign_game_master(&self, player_id: &str) -> Result<(), TurnError> {
        self.write(|o| o.assign_game_master(player_id))?;
        info!(player_id, "game master assigned");
        Ok(())
    }

    /// See [`PhaseOrchestrator::remove_player`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn remove_player(&self, player_id: &str, clock: &dyn Clock) -> Result<Phase, TurnError> {
        let phase = self.write(|o| o.remove_player(player_id, clock))?;
        info!(player_id, %phase, "player removed");
        Ok(phase)
    }

    /// See [`PhaseOrchestrator::select_starting_position`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn select_starting_position(
        &self,
        player_id: &str,
        position: Position,
    ) -> Result<(), TurnError> {
        self.write(|o| o.select_starting_position(player_id, position))
    }

    /// See [`PhaseOrchestrator::set_player_ready`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn set_player_ready(&self, player_id: &str, ready: bool) -> Result<(), TurnError> {
        self.write(|o| o.set_player_ready(player_id, ready))
    }

    /// See [`PhaseOrchestrator::start_quest_after_setup`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn start_quest_after_setup(&self, clock: &dyn Clock) -> Result<u32, TurnError> {
        let cycle = self.write(|o| o.start_quest_after_setup(clock))?;
        info!(cycle, "quest started");
        Ok(cycle)
    }

    /// See [`PhaseOrchestrator::elect_self_as_next_player`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn elect_self_as_next_player(
        &self,
        player_id: &str,
        clock: &dyn Clock,
    ) -> Result<(), TurnError> {
        self.write(|o| o.elect_self_as_next_player(player_id, clock))?;
        debug!(player_id, "player elected");
        Ok(())
    }

    /// See [`PhaseOrchestrator::cancel_player_election`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn cancel_player_election(&self, player_id: &str) -> Result<(), TurnError> {
        self.write(|o| o.cancel_player_election(player_id))?;
        debug!(player_id, "election cancelled");
        Ok(())
    }

    /// See [`PhaseOrchestrator::confirm_election_and_start_hero_turn`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn confirm_election_and_start_hero_turn(&self) -> Result<String, TurnError> {
        let hero_id = self.write(PhaseOrchestrator::confirm_election_and_start_hero_turn)?;
        info!(hero_id = %hero_id, "hero turn started");
        Ok(hero_id)
    }

    /// See [`PhaseOrchestrator::complete_hero_turn`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn complete_hero_turn(&self, clock: &dyn Clock) -> Result<CompletedHeroTurn, TurnError> {
        let completed = self.write(|o| o.complete_hero_turn(clock))?;
        info!(
            hero_id = %completed.hero_id,
            next_phase = %completed.next_phase,
            "hero turn completed"
        );
        Ok(completed)
    }

    /// See [`PhaseOrchestrator::set_monster_moved`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn set_monster_moved(&self, monster_id: &str, moved: bool) -> Result<(), TurnError> {
        self.write(|o| o.set_monster_moved(monster_id, moved))
    }

    /// See [`PhaseOrchestrator::set_monster_action_taken`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn set_monster_action_taken(
        &self,
        monster_id: &str,
        action_taken: bool,
    ) -> Result<(), TurnError> {
        self.write(|o| o.set_monster_action_taken(monster_id, action_taken))
    }

    /// See [`PhaseOrchestrator::complete_gm_turn`].
    ///
    /// # Errors
    ///
    /// Propagates the core operation's error.
    pub fn complete_gm_turn(&self, clock: &dyn Clock) -> Result<u32, TurnError> {
        let cycle = self.write(|o| o.complete_gm_turn(clock))?;
        info!(cycle, "game master turn completed");
        Ok(cycle)
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.read(PhaseOrchestrator::phase)
    }

    /// Current cycle number.
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.read(PhaseOrchestrator::cycle)
    }

    /// The hero whose turn it is, if any.
    #[must_use]
    pub fn active_hero(&self) -> Option<String> {
        self.read(|o| o.active_hero().map(str::to_owned))
    }

    /// The holder of the election slot, if any.
    #[must_use]
    pub fn elected_player(&self) -> Option<String> {
        self.read(|o| o.elected_player().map(str::to_owned))
    }

    /// See [`PhaseOrchestrator::are_all_players_ready`].
    #[must_use]
    pub fn are_all_players_ready(&self) -> bool {
        self.read(PhaseOrchestrator::are_all_players_ready)
    }

    /// See [`PhaseOrchestrator::eligible_heroes`].
    #[must_use]
    pub fn eligible_heroes(&self, all_ids: &[String]) -> Vec<String> {
        self.read(|o| o.eligible_heroes(all_ids))
    }

    /// See [`PhaseOrchestrator::can_player_act`].
    #[must_use]
    pub fn can_player_act(&self, player_id: &str) -> bool {
        self.read(|o| o.can_player_act(player_id))
    }

    /// True during hero election or an active hero turn.
    #[must_use]
    pub fn is_hero_turn(&self) -> bool {
        self.read(PhaseOrchestrator::is_hero_turn)
    }

    /// True during the GM phase.
    #[must_use]
    pub fn is_gm_turn(&self) -> bool {
        self.read(PhaseOrchestrator::is_gm_turn)
    }

    /// True during quest setup.
    #[must_use]
    pub fn is_quest_setup(&self) -> bool {
        self.read(PhaseOrchestrator::is_quest_setup)
    }

    /// Snapshot of the monster flags for the current GM phase.
    #[must_use]
    pub fn monster_flags_snapshot(&self) -> BTreeMap<String, MonsterFlags> {
        self.read(PhaseOrchestrator::monster_flags_snapshot)
    }

    /// Read-only view of the whole orchestrator.
    #[must_use]
    pub fn snapshot(&self) -> PhaseView {
        self.read(PhaseView::from_orchestrator)
    }
}
