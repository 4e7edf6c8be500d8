//! The caller-owned game session.
//!
//! `GameSession` owns one orchestrator and the hero and monster budget
//! registries. Locks are always taken orchestrator first, then budget.
//! Starting a turn, ending the GM phase and every monster intent hold the
//! orchestrator's write lock across the budget update. Hero intents check
//! turn ownership under the read lock and release it before touching the
//! hero's budget. No code path asks for the orchestrator while holding a
//! budget lock.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use delvers_budget::domain::hero::HeroBudgetTracker;
use delvers_budget::domain::monster::{MonsterBudgetTracker, MonsterFlag};
use delvers_budget::BudgetRegistry;
use delvers_core::clock::Clock;
use delvers_core::error::TurnError;
use delvers_core::event::EventMetadata;
use delvers_core::position::Position;
use delvers_core::publisher::{EventPublisher, PublishedEvent};
use delvers_phase::{Phase, PhaseOrchestrator, SharedOrchestrator};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::domain::commands::{
    ApplyHeroEffect, ApplyMonsterEffect, AssignGameMaster, CancelElection, ConfirmElection,
    DamageMonster, ElectSelf, EndGmTurn, EndHeroTurn, GrantTurnFlag, Intent, MonsterAction,
    MoveHero, MoveMonster, PlaceMonster, RegisterPlayer, RemovePlayer, RollMovement,
    SearchLocation, SelectStartingPosition, SetPlayerReady, StartQuest, TakeAction, UseItem,
    UseMonsterAbility,
};
use crate::domain::events::{
    ElectionCancelled, GameMasterAssigned, GmTurnCompleted, HeroActed, HeroEffectApplied,
    HeroElected, HeroMoved, HeroSearched, HeroTurnCompleted, HeroTurnStarted, ItemUsed,
    MonsterAbilityUsed, MonsterActed, MonsterDamaged, MonsterEffectApplied, MonsterMoved,
    MonsterPlaced, MonsterSlain, MovementRolled, PlayerRegistered, PlayerRemoved, QuestStarted,
    ReadinessChanged, SessionEvent, SessionEventKind, StartingPositionSelected, TurnFlagGranted,
};

use super::command_handlers;
use super::query_handlers::SessionView;

/// A hero turn handed out by the orchestrator.
struct StartedTurn {
    hero_id: String,
    cycle: u32,
    start: Option<Position>,
}

/// One quest shared by every connected participant.
pub struct GameSession {
    session_id: Uuid,
    config: SessionConfig,
    orchestrator: SharedOrchestrator,
    heroes: BudgetRegistry<HeroBudgetTracker>,
    monsters: BudgetRegistry<MonsterBudgetTracker>,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher>,
    sequence: AtomicI64,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("session_id", &self.session_id)
            .field("config", &self.config)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Creates a session in `QuestSetup` with a fresh id.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self::with_id(Uuid::now_v7(), config, clock, publisher)
    }

    /// Creates a session with a caller-chosen id.
    #[must_use]
    pub fn with_id(
        session_id: Uuid,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            session_id,
            config,
            orchestrator: SharedOrchestrator::new(config.phase),
            heroes: BudgetRegistry::new("hero"),
            monsters: BudgetRegistry::new("monster"),
            clock,
            publisher,
            sequence: AtomicI64::new(0),
        }
    }

    /// The session id stamped on every event.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The shared orchestrator.
    #[must_use]
    pub fn orchestrator(&self) -> &SharedOrchestrator {
        &self.orchestrator
    }

    /// Hero budgets by hero id.
    #[must_use]
    pub fn heroes(&self) -> &BudgetRegistry<HeroBudgetTracker> {
        &self.heroes
    }

    /// Monster budgets by monster id.
    #[must_use]
    pub fn monsters(&self) -> &BudgetRegistry<MonsterBudgetTracker> {
        &self.monsters
    }

    /// Read-only view of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        SessionView::from_session(self)
    }

    /// Routes any intent to its operation. See [`command_handlers::dispatch`].
    ///
    /// # Errors
    ///
    /// Returns the `TurnError` of the rejected operation.
    pub fn dispatch(&self, intent: &Intent) -> Result<Vec<SessionEvent>, TurnError> {
        command_handlers::dispatch(self, intent)
    }

    // --- plumbing ---

    /// Wraps `kinds` in envelopes and hands them to the publisher. A failed
    /// publication is logged and otherwise ignored.
    fn emit(&self, correlation_id: Uuid, kinds: Vec<SessionEventKind>) -> Vec<SessionEvent> {
        let occurred_at = self.clock.now();
        let events: Vec<SessionEvent> = kinds
            .into_iter()
            .map(|kind| SessionEvent {
                metadata: EventMetadata {
                    event_id: Uuid::new_v4(),
                    event_type: kind.event_type().to_owned(),
                    session_id: self.session_id,
                    sequence_number: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
                    correlation_id,
                    causation_id: correlation_id,
                    occurred_at,
                },
                kind,
            })
            .collect();

        let published: Vec<PublishedEvent> = events
            .iter()
            .map(|event| PublishedEvent::from_event(event))
            .collect();
        if let Err(error) = self.publisher.publish(&published) {
            warn!(
                %error,
                session_id = %self.session_id,
                count = published.len(),
                "event publication failed"
            );
        }
        events
    }

    /// Fails unless `player_id` holds the active hero turn.
    fn require_active_hero(&self, operation: &'static str, player_id: &str) -> Result<(), TurnError> {
        self.orchestrator.read(|o| check_active_hero(o, operation, player_id))
    }

    /// Fails unless `player_id` is the game master.
    fn require_game_master(&self, player_id: &str) -> Result<(), TurnError> {
        self.orchestrator.read(|o| check_game_master(o, player_id))
    }

    /// Resets (or creates) the hero's budget for the new turn and puts the
    /// hero on its last known tile, falling back to its starting tile.
    /// Called with the orchestrator's write lock held.
    fn begin_hero_budget(&self, turn: &StartedTurn) {
        let tracker = self.heroes.get_or_insert_with(&turn.hero_id, || {
            HeroBudgetTracker::new(turn.hero_id.clone(), self.config.budget)
        });
        let mut hero = delvers_core::sync::write(tracker.as_ref());
        hero.reset_for_new_turn(turn.cycle);
        if let (None, Some(start)) = (hero.current_position(), turn.start) {
            hero.set_position(start);
        }
        debug!(hero_id = %turn.hero_id, cycle = turn.cycle, "hero budget reset");
    }

    // --- setup ---

    /// Registers a participant.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::Validation` for an empty id.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn register_player(&self, command: &RegisterPlayer) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator.register_player(&command.player_id)?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::PlayerRegistered(PlayerRegistered {
                player_id: command.player_id.clone(),
            })],
        ))
    }

    /// Makes the issuing participant the game master.
    ///
    /// # Errors
    ///
    /// Propagates the orchestrator's error.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn assign_game_master(
        &self,
        command: &AssignGameMaster,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator.assign_game_master(&command.player_id)?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::GameMasterAssigned(GameMasterAssigned {
                player_id: command.player_id.clone(),
            })],
        ))
    }

    /// Removes the issuing participant and its hero budget. A departing
    /// active hero forfeits the rest of its turn.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotFound` for an unknown participant and
    /// `TurnError::Validation` for the game master once the quest started.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn remove_player(&self, command: &RemovePlayer) -> Result<Vec<SessionEvent>, TurnError> {
        let phase = self
            .orchestrator
            .remove_player(&command.player_id, self.clock.as_ref())?;
        self.heroes.remove(&command.player_id);
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::PlayerRemoved(PlayerRemoved {
                player_id: command.player_id.clone(),
                phase,
            })],
        ))
    }

    /// Records a starting tile.
    ///
    /// # Errors
    ///
    /// Propagates the orchestrator's error.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn select_starting_position(
        &self,
        command: &SelectStartingPosition,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator
            .select_starting_position(&command.player_id, command.position)?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::StartingPositionSelected(
                StartingPositionSelected {
                    player_id: command.player_id.clone(),
                    position: command.position,
                },
            )],
        ))
    }

    /// Records readiness.
    ///
    /// # Errors
    ///
    /// Propagates the orchestrator's error.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn set_player_ready(&self, command: &SetPlayerReady) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator
            .set_player_ready(&command.player_id, command.ready)?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::ReadinessChanged(ReadinessChanged {
                player_id: command.player_id.clone(),
                ready: command.ready,
            })],
        ))
    }

    /// Ends setup and opens the first election.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotReady` unless everyone is ready.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn start_quest(&self, command: &StartQuest) -> Result<Vec<SessionEvent>, TurnError> {
        let cycle = self
            .orchestrator
            .start_quest_after_setup(self.clock.as_ref())?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::QuestStarted(QuestStarted { cycle })],
        ))
    }

    // --- election ---

    /// Volunteers the issuing hero for the next turn.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::AlreadyElected` with the holder's id when the
    /// slot is taken, among the orchestrator's other errors.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn elect_self(&self, command: &ElectSelf) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator
            .elect_self_as_next_player(&command.player_id, self.clock.as_ref())?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroElected(HeroElected {
                player_id: command.player_id.clone(),
            })],
        ))
    }

    /// Withdraws the issuing hero's pending election.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotElected` unless the issuer holds the slot.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn cancel_election(&self, command: &CancelElection) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator
            .cancel_player_election(&command.player_id)?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::ElectionCancelled(ElectionCancelled {
                player_id: command.player_id.clone(),
            })],
        ))
    }

    /// Starts the issuing hero's turn and resets its budget.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotElected` if someone else holds the slot,
    /// `TurnError::NoElection` if nobody does, and `TurnError::InvalidPhase`
    /// outside the election.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn confirm_election(
        &self,
        command: &ConfirmElection,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        let turn = self.orchestrator.write(|o| {
            if o.elected_player().is_some_and(|holder| holder != command.player_id) {
                return Err(TurnError::NotElected(command.player_id.clone()));
            }
            let turn = start_elected_turn(o)?;
            self.begin_hero_budget(&turn);
            Ok(turn)
        })?;
        info!(hero_id = %turn.hero_id, cycle = turn.cycle, "hero turn started");
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroTurnStarted(HeroTurnStarted {
                hero_id: turn.hero_id,
                cycle: turn.cycle,
                auto_selected: false,
            })],
        ))
    }

    /// Applies the election timeout: once the election has expired with
    /// the slot still empty, the first eligible hero by id is elected and
    /// its turn started. Does nothing when the election is not expired or
    /// nobody is eligible.
    ///
    /// # Errors
    ///
    /// Propagates the orchestrator's error; none is expected once the
    /// preconditions hold.
    #[instrument(level = "debug", skip(self))]
    pub fn auto_elect_on_timeout(
        &self,
        correlation_id: Uuid,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        let now = self.clock.now();
        let clock = self.clock.as_ref();
        let turn = self.orchestrator.write(|o| {
            if o.elected_player().is_some() || !o.is_election_expired(now) {
                return Ok(None);
            }
            let Some(hero_id) = o.eligible_registered_heroes().into_iter().next() else {
                return Ok(None);
            };
            o.elect_self_as_next_player(&hero_id, clock)?;
            let turn = start_elected_turn(o)?;
            self.begin_hero_budget(&turn);
            Ok(Some(turn))
        })?;

        let Some(turn) = turn else {
            return Ok(Vec::new());
        };
        info!(hero_id = %turn.hero_id, cycle = turn.cycle, "election timed out, hero auto-selected");
        Ok(self.emit(
            correlation_id,
            vec![
                SessionEventKind::HeroElected(HeroElected {
                    player_id: turn.hero_id.clone(),
                }),
                SessionEventKind::HeroTurnStarted(HeroTurnStarted {
                    hero_id: turn.hero_id,
                    cycle: turn.cycle,
                    auto_selected: true,
                }),
            ],
        ))
    }

    // --- hero turn ---

    /// Records the active hero's movement roll.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the active hero or already rolled.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn roll_movement(&self, command: &RollMovement) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_active_hero("roll_movement", &command.player_id)?;
        let total = self
            .heroes
            .write(&command.player_id, |h| h.roll_movement_dice(&command.dice))??;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::MovementRolled(MovementRolled {
                hero_id: command.player_id.clone(),
                dice: command.dice.clone(),
                total,
            })],
        ))
    }

    /// Moves the active hero one tile.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the active hero or may not move.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn move_hero(&self, command: &MoveHero) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_active_hero("move_hero", &command.player_id)?;
        let remaining = self
            .heroes
            .write(&command.player_id, |h| h.record_movement(command.to))??;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroMoved(HeroMoved {
                hero_id: command.player_id.clone(),
                to: command.to,
                remaining,
            })],
        ))
    }

    /// Spends the active hero's action.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the active hero or may not act.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn take_action(&self, command: &TakeAction) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_active_hero("take_action", &command.player_id)?;
        self.heroes.write(&command.player_id, |h| {
            h.record_action(command.action.clone())
        })??;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroActed(HeroActed {
                hero_id: command.player_id.clone(),
                action: command.action.clone(),
            })],
        ))
    }

    /// Searches a location with the active hero's action.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the active hero, already searched the
    /// location for this kind, or may not act.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn search_location(
        &self,
        command: &SearchLocation,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_active_hero("search_location", &command.player_id)?;
        self.heroes.write(&command.player_id, |h| {
            h.record_search(command.kind, &command.location_key, command.found.clone())
        })??;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroSearched(HeroSearched {
                hero_id: command.player_id.clone(),
                kind: command.kind,
                location_key: command.location_key.clone(),
                found: command.found.clone(),
            })],
        ))
    }

    /// Uses an item during the active hero's turn.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the active hero or already used the item.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn use_item(&self, command: &UseItem) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_active_hero("use_item", &command.player_id)?;
        self.heroes
            .write(&command.player_id, |h| h.record_item_use(&command.item_id))??;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::ItemUsed(ItemUsed {
                hero_id: command.player_id.clone(),
                item_id: command.item_id.clone(),
            })],
        ))
    }

    /// Ends the active hero's turn. Checking ownership and completing the
    /// turn happen under one write lock.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the active hero.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn end_hero_turn(&self, command: &EndHeroTurn) -> Result<Vec<SessionEvent>, TurnError> {
        let clock = self.clock.as_ref();
        let completed = self.orchestrator.write(|o| {
            check_active_hero(o, "end_hero_turn", &command.player_id)?;
            o.complete_hero_turn(clock)
        })?;
        info!(
            hero_id = %completed.hero_id,
            next_phase = %completed.next_phase,
            "hero turn completed"
        );
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroTurnCompleted(HeroTurnCompleted {
                hero_id: completed.hero_id,
                next_phase: completed.next_phase,
            })],
        ))
    }

    /// Puts an effect on a hero. Game master only.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the game master, the hero has no budget
    /// yet, or the effect is invalid.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, hero_id = %command.hero_id))]
    pub fn apply_hero_effect(
        &self,
        command: &ApplyHeroEffect,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_game_master(&command.player_id)?;
        self.heroes.write(&command.hero_id, |h| {
            h.add_active_effect(command.effect.clone())
        })??;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::HeroEffectApplied(HeroEffectApplied {
                hero_id: command.hero_id.clone(),
                effect: command.effect.clone(),
            })],
        ))
    }

    /// Grants a hero a turn flag. Game master only.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the game master or the hero has no
    /// budget yet.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, hero_id = %command.hero_id))]
    pub fn grant_turn_flag(&self, command: &GrantTurnFlag) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_game_master(&command.player_id)?;
        self.heroes
            .write(&command.hero_id, |h| h.set_turn_flag(command.flag))?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::TurnFlagGranted(TurnFlagGranted {
                hero_id: command.hero_id.clone(),
                flag: command.flag,
            })],
        ))
    }

    // --- monsters ---

    /// Places a monster on the board and creates its budget. Game master
    /// only, in any phase.
    ///
    /// # Errors
    ///
    /// Fails if the issuer is not the game master or the id is taken.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, monster_id = %command.monster_id))]
    pub fn place_monster(&self, command: &PlaceMonster) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_game_master(&command.player_id)?;
        if command.monster_id.is_empty() {
            return Err(TurnError::Validation("monster id must not be empty".to_owned()));
        }
        let mut monster = MonsterBudgetTracker::new(
            command.monster_id.clone(),
            command.monster_type.clone(),
            command.stats,
            command.abilities.clone(),
        );
        monster.reset_for_new_turn(self.orchestrator.cycle());
        monster.set_position(command.position);
        monster.set_flag(MonsterFlag::Revealed);
        self.monsters
            .try_insert(command.monster_id.clone(), monster)?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::MonsterPlaced(MonsterPlaced {
                monster_id: command.monster_id.clone(),
                monster_type: command.monster_type.clone(),
                position: command.position,
            })],
        ))
    }

    /// Moves a monster one tile during the GM phase.
    ///
    /// # Errors
    ///
    /// Fails outside the GM phase, for anyone but the game master, for an
    /// unknown monster, or when the monster has no movement left.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, monster_id = %command.monster_id))]
    pub fn move_monster(&self, command: &MoveMonster) -> Result<Vec<SessionEvent>, TurnError> {
        let remaining = self.orchestrator.write(|o| {
            check_gm_phase(o, "move_monster", &command.player_id)?;
            let remaining = self
                .monsters
                .write(&command.monster_id, |m| m.record_movement(command.to))??;
            o.set_monster_moved(&command.monster_id, true)?;
            Ok::<_, TurnError>(remaining)
        })?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::MonsterMoved(MonsterMoved {
                monster_id: command.monster_id.clone(),
                to: command.to,
                remaining,
            })],
        ))
    }

    /// Spends a monster's action during the GM phase.
    ///
    /// # Errors
    ///
    /// Fails outside the GM phase, for anyone but the game master, for an
    /// unknown monster, or when the monster may not act.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, monster_id = %command.monster_id))]
    pub fn monster_action(&self, command: &MonsterAction) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator.write(|o| {
            check_gm_phase(o, "monster_action", &command.player_id)?;
            self.monsters.write(&command.monster_id, |m| {
                m.record_action(command.action.clone())
            })??;
            o.set_monster_action_taken(&command.monster_id, true)
        })?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::MonsterActed(MonsterActed {
                monster_id: command.monster_id.clone(),
                action: command.action.clone(),
            })],
        ))
    }

    /// Uses a monster's special ability during the GM phase.
    ///
    /// # Errors
    ///
    /// Fails outside the GM phase, for anyone but the game master, for an
    /// unknown monster, or when the ability is unavailable.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, monster_id = %command.monster_id))]
    pub fn use_monster_ability(
        &self,
        command: &UseMonsterAbility,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator.write(|o| {
            check_gm_phase(o, "use_monster_ability", &command.player_id)?;
            let action_taken = self.monsters.write(&command.monster_id, |m| {
                m.use_ability(command.ability.clone())
                    .map(|()| m.action_taken())
            })??;
            if action_taken {
                o.set_monster_action_taken(&command.monster_id, true)?;
            }
            Ok::<_, TurnError>(())
        })?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::MonsterAbilityUsed(MonsterAbilityUsed {
                monster_id: command.monster_id.clone(),
                ability_id: command.ability.ability_id.clone(),
                target_id: command.ability.target_id.clone(),
                success: command.ability.success,
            })],
        ))
    }

    /// Puts an effect on a monster. Game master only, in any phase.
    ///
    /// # Errors
    ///
    /// Fails for anyone but the game master or for an unknown monster.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, monster_id = %command.monster_id))]
    pub fn apply_monster_effect(
        &self,
        command: &ApplyMonsterEffect,
    ) -> Result<Vec<SessionEvent>, TurnError> {
        self.require_game_master(&command.player_id)?;
        self.monsters.write(&command.monster_id, |m| {
            m.add_active_effect(command.effect.clone());
        })?;
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::MonsterEffectApplied(MonsterEffectApplied {
                monster_id: command.monster_id.clone(),
                effect: command.effect.clone(),
            })],
        ))
    }

    /// Removes body points from a monster. A monster left with none is
    /// taken off the board.
    ///
    /// # Errors
    ///
    /// Fails for an unregistered issuer or an unknown monster.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id, monster_id = %command.monster_id))]
    pub fn damage_monster(&self, command: &DamageMonster) -> Result<Vec<SessionEvent>, TurnError> {
        self.orchestrator.read(|o| {
            if o.players().contains(&command.player_id) {
                Ok(())
            } else {
                Err(TurnError::not_found("player", command.player_id.clone()))
            }
        })?;
        let remaining_body = self
            .monsters
            .write(&command.monster_id, |m| m.record_damage(command.amount))?;

        let mut kinds = vec![SessionEventKind::MonsterDamaged(MonsterDamaged {
            monster_id: command.monster_id.clone(),
            amount: command.amount,
            remaining_body,
        })];
        if remaining_body == 0 {
            self.monsters.remove(&command.monster_id);
            info!(monster_id = %command.monster_id, "monster slain");
            kinds.push(SessionEventKind::MonsterSlain(MonsterSlain {
                monster_id: command.monster_id.clone(),
            }));
        }
        Ok(self.emit(command.correlation_id, kinds))
    }

    /// Ends the GM phase, opens the next cycle and resets every monster
    /// budget for it.
    ///
    /// # Errors
    ///
    /// Fails outside the GM phase or for anyone but the game master.
    #[instrument(level = "debug", skip_all, fields(player_id = %command.player_id))]
    pub fn end_gm_turn(&self, command: &EndGmTurn) -> Result<Vec<SessionEvent>, TurnError> {
        let clock = self.clock.as_ref();
        let next_cycle = self.orchestrator.write(|o| {
            check_game_master(o, &command.player_id)?;
            let next_cycle = o.complete_gm_turn(clock)?;
            self.monsters
                .write_all(|m| m.reset_for_new_turn(next_cycle));
            Ok::<_, TurnError>(next_cycle)
        })?;
        info!(cycle = next_cycle, "game master turn completed");
        Ok(self.emit(
            command.correlation_id,
            vec![SessionEventKind::GmTurnCompleted(GmTurnCompleted { next_cycle })],
        ))
    }
}

fn check_active_hero(
    orchestrator: &PhaseOrchestrator,
    operation: &'static str,
    player_id: &str,
) -> Result<(), TurnError> {
    if orchestrator.can_player_act(player_id) {
        Ok(())
    } else if orchestrator.phase() == Phase::HeroActive {
        Err(TurnError::NotElected(player_id.to_owned()))
    } else {
        Err(TurnError::InvalidPhase {
            operation,
            phase: orchestrator.phase().as_str(),
        })
    }
}

fn check_game_master(orchestrator: &PhaseOrchestrator, player_id: &str) -> Result<(), TurnError> {
    if orchestrator.game_master_id() == Some(player_id) {
        Ok(())
    } else {
        Err(TurnError::Validation(format!(
            "player {player_id} is not the game master"
        )))
    }
}

/// Fails unless `player_id` is the game master and the GM phase is on.
fn check_gm_phase(
    orchestrator: &PhaseOrchestrator,
    operation: &'static str,
    player_id: &str,
) -> Result<(), TurnError> {
    check_game_master(orchestrator, player_id)?;
    if orchestrator.phase() == Phase::GmPhase {
        Ok(())
    } else {
        Err(TurnError::InvalidPhase {
            operation,
            phase: orchestrator.phase().as_str(),
        })
    }
}

fn start_elected_turn(orchestrator: &mut PhaseOrchestrator) -> Result<StartedTurn, TurnError> {
    let hero_id = orchestrator.confirm_election_and_start_hero_turn()?;
    Ok(StartedTurn {
        cycle: orchestrator.cycle(),
        start: orchestrator.start_position(&hero_id),
        hero_id,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use delvers_budget::domain::actions::{ActionKind, ActionRecord};
    use delvers_test_support::{FixedClock, RecordingPublisher};

    use super::*;

    fn session() -> (GameSession, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::new());
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let session = GameSession::new(SessionConfig::default(), Arc::new(clock), publisher.clone());
        (session, publisher)
    }

    fn register(session: &GameSession, player_id: &str) {
        session
            .register_player(&RegisterPlayer {
                correlation_id: Uuid::new_v4(),
                player_id: player_id.to_owned(),
            })
            .unwrap();
    }

    #[test]
    fn test_events_carry_increasing_sequence_numbers() {
        let (session, publisher) = session();

        register(&session, "a");
        register(&session, "b");

        let published = publisher.published_events();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].sequence_number, 1);
        assert_eq!(published[1].sequence_number, 2);
        assert!(published.iter().all(|e| e.session_id == session.session_id()));
        assert_eq!(publisher.event_types(), vec!["session.player_registered"; 2]);
    }

    #[test]
    fn test_rejected_intent_publishes_nothing() {
        let (session, publisher) = session();

        let result = session.register_player(&RegisterPlayer {
            correlation_id: Uuid::new_v4(),
            player_id: String::new(),
        });

        assert_eq!(result.unwrap_err().code(), "validation_error");
        assert!(publisher.published_events().is_empty());
    }

    #[test]
    fn test_hero_intent_outside_hero_turn_is_invalid_phase() {
        let (session, _publisher) = session();
        register(&session, "a");

        let err = session
            .take_action(&TakeAction {
                correlation_id: Uuid::new_v4(),
                player_id: "a".to_owned(),
                action: ActionRecord::new(ActionKind::Attack),
            })
            .unwrap_err();

        match err {
            TurnError::InvalidPhase { operation, phase } => {
                assert_eq!(operation, "take_action");
                assert_eq!(phase, "quest_setup");
            }
            other => panic!("expected InvalidPhase, got {other:?}"),
        }
    }

    #[test]
    fn test_place_monster_requires_game_master() {
        let (session, _publisher) = session();
        register(&session, "a");

        let err = session
            .place_monster(&PlaceMonster {
                correlation_id: Uuid::new_v4(),
                player_id: "a".to_owned(),
                monster_id: "orc-1".to_owned(),
                monster_type: "orc".to_owned(),
                stats: delvers_budget::domain::monster::MonsterStats {
                    movement: 8,
                    attack_dice: 3,
                    defense_dice: 2,
                    body_points: 1,
                },
                abilities: Vec::new(),
                position: Position::new(5, 5),
            })
            .unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert!(session.monsters().is_empty());
    }
}
