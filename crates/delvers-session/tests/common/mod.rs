//! Shared helpers for session integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use delvers_budget::domain::monster::MonsterStats;
use delvers_core::clock::Clock;
use delvers_core::position::Position;
use delvers_core::publisher::EventPublisher;
use delvers_session::domain::commands::{
    AssignGameMaster, ConfirmElection, ElectSelf, EndHeroTurn, PlaceMonster, RegisterPlayer,
    SelectStartingPosition, SetPlayerReady, StartQuest,
};
use delvers_session::{GameSession, SessionConfig};
use delvers_test_support::{FixedClock, RecordingPublisher};
use uuid::Uuid;

pub const GM: &str = "zargon";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

pub fn cid() -> Uuid {
    Uuid::new_v4()
}

pub fn orc_stats() -> MonsterStats {
    MonsterStats {
        movement: 8,
        attack_dice: 3,
        defense_dice: 2,
        body_points: 1,
    }
}

/// A session with a recording publisher and a fixed clock.
pub fn recorded_session(config: SessionConfig) -> (GameSession, Arc<RecordingPublisher>) {
    let publisher = Arc::new(RecordingPublisher::new());
    let session = build_session(config, Arc::new(FixedClock(start_time())), publisher.clone());
    (session, publisher)
}

pub fn build_session(
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher>,
) -> GameSession {
    GameSession::new(config, clock, publisher)
}

/// Assigns the game master, registers `heroes` on starting tiles along the
/// first row, readies everyone and starts the quest.
pub fn start_quest(session: &GameSession, heroes: &[&str]) {
    session
        .assign_game_master(&AssignGameMaster {
            correlation_id: cid(),
            player_id: GM.to_owned(),
        })
        .unwrap();
    for (x, hero) in (0..).zip(heroes) {
        session
            .register_player(&RegisterPlayer {
                correlation_id: cid(),
                player_id: (*hero).to_owned(),
            })
            .unwrap();
        session
            .select_starting_position(&SelectStartingPosition {
                correlation_id: cid(),
                player_id: (*hero).to_owned(),
                position: Position::new(x, 0),
            })
            .unwrap();
    }
    for id in heroes.iter().copied().chain([GM]) {
        session
            .set_player_ready(&SetPlayerReady {
                correlation_id: cid(),
                player_id: id.to_owned(),
                ready: true,
            })
            .unwrap();
    }
    session
        .start_quest(&StartQuest {
            correlation_id: cid(),
            player_id: GM.to_owned(),
        })
        .unwrap();
}

/// Elects `hero` and starts its turn.
pub fn begin_turn(session: &GameSession, hero: &str) {
    session
        .elect_self(&ElectSelf {
            correlation_id: cid(),
            player_id: hero.to_owned(),
        })
        .unwrap();
    session
        .confirm_election(&ConfirmElection {
            correlation_id: cid(),
            player_id: hero.to_owned(),
        })
        .unwrap();
}

/// Ends `hero`'s turn.
pub fn end_turn(session: &GameSession, hero: &str) {
    session
        .end_hero_turn(&EndHeroTurn {
            correlation_id: cid(),
            player_id: hero.to_owned(),
        })
        .unwrap();
}

pub fn place_orc(session: &GameSession, monster_id: &str, position: Position) {
    session
        .place_monster(&PlaceMonster {
            correlation_id: cid(),
            player_id: GM.to_owned(),
            monster_id: monster_id.to_owned(),
            monster_type: "orc".to_owned(),
            stats: orc_stats(),
            abilities: Vec::new(),
            position,
        })
        .unwrap();
}
