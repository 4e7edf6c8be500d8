//! Runs a scripted quest to completion.

use std::sync::Arc;
use std::time::Duration;

use delvers_budget::domain::monster::MonsterStats;
use delvers_core::clock::SystemClock;
use delvers_core::error::TurnError;
use delvers_core::position::Position;
use delvers_core::rng::StdDiceRng;
use delvers_session::application::query_handlers::SessionView;
use delvers_session::domain::commands::{
    AssignGameMaster, PlaceMonster, RegisterPlayer, SelectStartingPosition, SetPlayerReady,
    StartQuest,
};
use delvers_session::{ConfigError, GameSession, SessionConfig};
use serde::Serialize;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::broadcast::BroadcastPublisher;
use crate::participants;

/// Environment variable holding the number of GM phases to play.
pub const CYCLES_VAR: &str = "DELVERS_SIM_CYCLES";
/// Environment variable holding the dice seed.
pub const SEED_VAR: &str = "DELVERS_SIM_SEED";
/// Environment variable holding a comma-separated hero roster.
pub const HEROES_VAR: &str = "DELVERS_SIM_HEROES";

const GAME_MASTER_ID: &str = "zargon";
const CHANNEL_CAPACITY: usize = 256;

/// Errors that end a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The environment held an invalid setting.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The session rejected a setup intent.
    #[error("session rejected setup: {0}")]
    Turn(#[from] TurnError),

    /// A participant task panicked or was cancelled.
    #[error("participant task failed: {0}")]
    Join(#[from] JoinError),

    /// The game master did not finish in time.
    #[error("simulation did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Settings for one simulated quest.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Settings for the session under test.
    pub session: SessionConfig,
    /// Hero ids, in registration order.
    pub heroes: Vec<String>,
    /// Monsters placed before the quest starts.
    pub monsters: u32,
    /// GM phases to play before stopping.
    pub cycles: u32,
    /// Seed for hero dice. `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Upper bound on the whole run.
    pub deadline: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            heroes: ["barbarian", "dwarf", "elf", "wizard"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            monsters: 2,
            cycles: 3,
            seed: None,
            deadline: Duration::from_secs(30),
        }
    }
}

impl SimConfig {
    /// Reads the simulation settings and the session settings from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            session: SessionConfig::from_lookup(&lookup)?,
            ..Self::default()
        };

        if let Some(raw) = lookup(CYCLES_VAR) {
            config.cycles = raw.trim().parse().map_err(|_| ConfigError {
                key: CYCLES_VAR,
                value: raw.clone(),
                expected: "a whole number of cycles",
            })?;
        }
        if let Some(raw) = lookup(SEED_VAR) {
            config.seed = Some(raw.trim().parse().map_err(|_| ConfigError {
                key: SEED_VAR,
                value: raw.clone(),
                expected: "an unsigned 64-bit seed",
            })?);
        }
        if let Some(raw) = lookup(HEROES_VAR) {
            let heroes: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_owned)
                .collect();
            if heroes.is_empty() {
                return Err(ConfigError {
                    key: HEROES_VAR,
                    value: raw,
                    expected: "at least one hero id",
                });
            }
            config.heroes = heroes;
        }
        Ok(config)
    }

    fn hero_rng(&self, index: u64) -> StdDiceRng {
        match self.seed {
            Some(seed) => StdDiceRng::seeded(seed.wrapping_add(index)),
            None => StdDiceRng::from_os(),
        }
    }
}

/// Outcome of a finished simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    /// GM phases the game master played.
    pub cycles_completed: u32,
    /// Session state after the last GM phase.
    pub final_view: SessionView,
}

/// Plays a quest with one task per participant until the game master has
/// played `config.cycles` GM phases.
///
/// # Errors
///
/// Returns `SimError` if setup is rejected, a task fails, or the run exceeds
/// its deadline.
#[instrument(skip_all, fields(heroes = config.heroes.len(), cycles = config.cycles))]
pub async fn run(config: SimConfig) -> Result<SimReport, SimError> {
    let publisher = Arc::new(BroadcastPublisher::new(CHANNEL_CAPACITY));
    let session = Arc::new(GameSession::new(
        config.session,
        Arc::new(SystemClock),
        publisher.clone(),
    ));
    info!(session_id = %session.session_id(), "simulation starting");

    // Subscribe before setup so the channel has receivers for every event.
    let hero_feeds: Vec<_> = config.heroes.iter().map(|_| publisher.subscribe()).collect();
    let gm_feed = publisher.subscribe();
    set_up(&session, &config)?;

    let mut heroes: Vec<JoinHandle<()>> = Vec::with_capacity(config.heroes.len());
    for ((index, hero_id), rx) in (0u64..).zip(&config.heroes).zip(hero_feeds) {
        heroes.push(tokio::spawn(participants::hero(
            Arc::clone(&session),
            hero_id.clone(),
            rx,
            config.hero_rng(index),
        )));
    }
    let game_master = tokio::spawn(participants::game_master(
        Arc::clone(&session),
        GAME_MASTER_ID.to_owned(),
        gm_feed,
        config.cycles,
    ));
    let ticker = config
        .session
        .phase
        .election_timeout()
        .map(|_| tokio::spawn(election_ticker(Arc::clone(&session))));

    session.start_quest(&StartQuest {
        correlation_id: Uuid::new_v4(),
        player_id: GAME_MASTER_ID.to_owned(),
    })?;

    let outcome = tokio::time::timeout(config.deadline, game_master).await;
    for handle in heroes.iter().chain(ticker.as_ref()) {
        handle.abort();
    }
    let cycles_completed = outcome.map_err(|_| SimError::TimedOut(config.deadline))???;

    info!(cycles_completed, "simulation finished");
    Ok(SimReport {
        cycles_completed,
        final_view: session.snapshot(),
    })
}

/// Registers everyone, places the monsters and readies the table.
fn set_up(session: &GameSession, config: &SimConfig) -> Result<(), TurnError> {
    session.assign_game_master(&AssignGameMaster {
        correlation_id: Uuid::new_v4(),
        player_id: GAME_MASTER_ID.to_owned(),
    })?;
    for (x, hero_id) in (0..).zip(&config.heroes) {
        session.register_player(&RegisterPlayer {
            correlation_id: Uuid::new_v4(),
            player_id: hero_id.clone(),
        })?;
        session.select_starting_position(&SelectStartingPosition {
            correlation_id: Uuid::new_v4(),
            player_id: hero_id.clone(),
            position: Position::new(x, 0),
        })?;
    }
    for (y, n) in (0..).zip(1..=config.monsters) {
        session.place_monster(&PlaceMonster {
            correlation_id: Uuid::new_v4(),
            player_id: GAME_MASTER_ID.to_owned(),
            monster_id: format!("orc-{n}"),
            monster_type: "orc".to_owned(),
            stats: MonsterStats {
                movement: 8,
                attack_dice: 3,
                defense_dice: 2,
                body_points: 1,
            },
            abilities: Vec::new(),
            position: Position::new(12, y),
        })?;
    }
    for player_id in config.heroes.iter().map(String::as_str).chain([GAME_MASTER_ID]) {
        session.set_player_ready(&SetPlayerReady {
            correlation_id: Uuid::new_v4(),
            player_id: player_id.to_owned(),
            ready: true,
        })?;
    }
    Ok(())
}

/// Polls the election deadline once a second.
async fn election_ticker(session: Arc<GameSession>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        interval.tick().await;
        if let Err(error) = session.auto_elect_on_timeout(Uuid::new_v4()) {
            warn!(code = error.code(), %error, "auto-election failed");
        }
    }
}
