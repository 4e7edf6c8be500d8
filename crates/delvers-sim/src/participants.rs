//! Scripted participants.
//!
//! Each participant owns a broadcast subscription and reacts to events.
//! Session calls are synchronous and never held across an `.await`.

use std::sync::Arc;

use delvers_budget::domain::actions::{ActionKind, ActionRecord};
use delvers_core::error::TurnError;
use delvers_core::position::Position;
use delvers_core::publisher::PublishedEvent;
use delvers_core::rng::{DeterministicRng, roll_dice};
use delvers_phase::Phase;
use delvers_session::application::query_handlers::{get_hero_budget, get_monster_budget};
use delvers_session::domain::commands::{
    ConfirmElection, ElectSelf, EndGmTurn, EndHeroTurn, MonsterAction, MoveHero, MoveMonster,
    RollMovement, TakeAction,
};
use delvers_session::domain::events::{
    ELECTION_CANCELLED_EVENT_TYPE, GM_TURN_COMPLETED_EVENT_TYPE, HERO_TURN_COMPLETED_EVENT_TYPE,
    HERO_TURN_STARTED_EVENT_TYPE, QUEST_STARTED_EVENT_TYPE,
};
use delvers_session::GameSession;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Movement dice rolled by every hero.
const MOVEMENT_DICE: usize = 2;
/// Faces per movement die.
const DIE_SIDES: u32 = 6;
/// Tiles a scripted hero walks before attacking.
const STEPS_PER_TURN: u32 = 3;

/// Waits for the next event. Lagged subscribers skip ahead; `None` means the
/// channel is closed.
async fn next_event(rx: &mut Receiver<PublishedEvent>, who: &str) -> Option<PublishedEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(participant = who, skipped, "subscriber lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Runs a hero connection until its subscription closes.
pub async fn hero(
    session: Arc<GameSession>,
    hero_id: String,
    mut rx: Receiver<PublishedEvent>,
    mut rng: impl DeterministicRng,
) {
    while let Some(event) = next_event(&mut rx, &hero_id).await {
        let outcome = match event.event_type.as_str() {
            QUEST_STARTED_EVENT_TYPE
            | HERO_TURN_COMPLETED_EVENT_TYPE
            | GM_TURN_COMPLETED_EVENT_TYPE
            | ELECTION_CANCELLED_EVENT_TYPE => volunteer(&session, &hero_id, &mut rng),
            HERO_TURN_STARTED_EVENT_TYPE => resume_auto_selected(&session, &hero_id, &mut rng),
            _ => continue,
        };
        match outcome {
            Ok(true) => info!(hero_id = %hero_id, "hero turn played"),
            Ok(false) => {}
            Err(error) => debug!(hero_id = %hero_id, code = error.code(), %error, "hero turn skipped"),
        }
    }
}

/// Volunteers for the next turn and, if the slot is won, plays it out.
/// Returns whether a turn was played.
fn volunteer(
    session: &GameSession,
    hero_id: &str,
    rng: &mut impl DeterministicRng,
) -> Result<bool, TurnError> {
    let orchestrator = session.orchestrator();
    if orchestrator.phase() != Phase::HeroElection
        || !orchestrator
            .read(|o| o.eligible_registered_heroes())
            .iter()
            .any(|id| id == hero_id)
    {
        return Ok(false);
    }

    session.elect_self(&ElectSelf {
        correlation_id: Uuid::new_v4(),
        player_id: hero_id.to_owned(),
    })?;
    session.confirm_election(&ConfirmElection {
        correlation_id: Uuid::new_v4(),
        player_id: hero_id.to_owned(),
    })?;
    play_turn(session, hero_id, rng)?;
    Ok(true)
}

/// Plays a turn the session handed to this hero after an election timeout.
fn resume_auto_selected(
    session: &GameSession,
    hero_id: &str,
    rng: &mut impl DeterministicRng,
) -> Result<bool, TurnError> {
    if session.orchestrator().active_hero().as_deref() != Some(hero_id)
        || get_hero_budget(session, hero_id)?.movement_total > 0
    {
        return Ok(false);
    }
    play_turn(session, hero_id, rng)?;
    Ok(true)
}

/// Rolls, walks north, attacks and ends the turn.
fn play_turn(
    session: &GameSession,
    hero_id: &str,
    rng: &mut impl DeterministicRng,
) -> Result<(), TurnError> {
    let dice = roll_dice(rng, MOVEMENT_DICE, DIE_SIDES);
    session.roll_movement(&RollMovement {
        correlation_id: Uuid::new_v4(),
        player_id: hero_id.to_owned(),
        dice,
    })?;

    let mut at = get_hero_budget(session, hero_id)?
        .position
        .unwrap_or(Position::new(0, 0));
    for _ in 0..STEPS_PER_TURN {
        let next = Position::new(at.x, at.y + 1);
        if session
            .move_hero(&MoveHero {
                correlation_id: Uuid::new_v4(),
                player_id: hero_id.to_owned(),
                to: next,
            })
            .is_err()
        {
            break;
        }
        at = next;
    }

    session.take_action(&TakeAction {
        correlation_id: Uuid::new_v4(),
        player_id: hero_id.to_owned(),
        action: ActionRecord::new(ActionKind::Attack).at(at),
    })?;
    session.end_hero_turn(&EndHeroTurn {
        correlation_id: Uuid::new_v4(),
        player_id: hero_id.to_owned(),
    })?;
    Ok(())
}

/// Runs the game master until `cycles` GM phases have been played. Returns
/// the number of GM phases played.
///
/// # Errors
///
/// Returns the first error from ending a GM phase.
pub async fn game_master(
    session: Arc<GameSession>,
    gm_id: String,
    mut rx: Receiver<PublishedEvent>,
    cycles: u32,
) -> Result<u32, TurnError> {
    let mut played = 0;
    while played < cycles {
        let Some(event) = next_event(&mut rx, &gm_id).await else {
            break;
        };
        if event.event_type != HERO_TURN_COMPLETED_EVENT_TYPE
            || session.orchestrator().phase() != Phase::GmPhase
        {
            continue;
        }

        for monster_id in session.monsters().ids() {
            if let Err(error) = play_monster(&session, &gm_id, &monster_id) {
                debug!(monster_id = %monster_id, code = error.code(), %error, "monster idle");
            }
        }
        session.end_gm_turn(&EndGmTurn {
            correlation_id: Uuid::new_v4(),
            player_id: gm_id.clone(),
        })?;
        played += 1;
        info!(played, "game master phase played");
    }
    Ok(played)
}

/// Moves a monster one tile west and attacks.
fn play_monster(session: &GameSession, gm_id: &str, monster_id: &str) -> Result<(), TurnError> {
    let at = get_monster_budget(session, monster_id)?
        .position
        .unwrap_or(Position::new(0, 0));
    session.move_monster(&MoveMonster {
        correlation_id: Uuid::new_v4(),
        player_id: gm_id.to_owned(),
        monster_id: monster_id.to_owned(),
        to: Position::new(at.x - 1, at.y),
    })?;
    session.monster_action(&MonsterAction {
        correlation_id: Uuid::new_v4(),
        player_id: gm_id.to_owned(),
        monster_id: monster_id.to_owned(),
        action: ActionRecord::new(ActionKind::Attack),
    })?;
    Ok(())
}
