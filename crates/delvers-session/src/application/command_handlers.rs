//! Single entry point for intents arriving from the network layer.

use delvers_core::command::Command;
use delvers_core::error::TurnError;
use tracing::{info, instrument, warn};

use crate::domain::commands::Intent;
use crate::domain::events::SessionEvent;

use super::session::GameSession;

/// Routes `intent` to the matching session operation and returns the events
/// it produced. Rejections are logged with their error code and returned
/// unchanged.
///
/// # Errors
///
/// Returns the `TurnError` of the rejected operation.
#[instrument(
    skip_all,
    fields(
        command_type = intent.command_type(),
        player_id = intent.participant_id().unwrap_or_default(),
        correlation_id = %intent.correlation_id(),
    )
)]
pub fn dispatch(session: &GameSession, intent: &Intent) -> Result<Vec<SessionEvent>, TurnError> {
    info!("handling intent");

    let result = match intent {
        Intent::RegisterPlayer(command) => session.register_player(command),
        Intent::AssignGameMaster(command) => session.assign_game_master(command),
        Intent::RemovePlayer(command) => session.remove_player(command),
        Intent::SelectStartingPosition(command) => session.select_starting_position(command),
        Intent::SetPlayerReady(command) => session.set_player_ready(command),
        Intent::StartQuest(command) => session.start_quest(command),
        Intent::ElectSelf(command) => session.elect_self(command),
        Intent::CancelElection(command) => session.cancel_election(command),
        Intent::ConfirmElection(command) => session.confirm_election(command),
        Intent::RollMovement(command) => session.roll_movement(command),
        Intent::MoveHero(command) => session.move_hero(command),
        Intent::TakeAction(command) => session.take_action(command),
        Intent::SearchLocation(command) => session.search_location(command),
        Intent::UseItem(command) => session.use_item(command),
        Intent::EndHeroTurn(command) => session.end_hero_turn(command),
        Intent::ApplyHeroEffect(command) => session.apply_hero_effect(command),
        Intent::GrantTurnFlag(command) => session.grant_turn_flag(command),
        Intent::PlaceMonster(command) => session.place_monster(command),
        Intent::MoveMonster(command) => session.move_monster(command),
        Intent::MonsterAction(command) => session.monster_action(command),
        Intent::UseMonsterAbility(command) => session.use_monster_ability(command),
        Intent::ApplyMonsterEffect(command) => session.apply_monster_effect(command),
        Intent::DamageMonster(command) => session.damage_monster(command),
        Intent::EndGmTurn(command) => session.end_gm_turn(command),
    };

    if let Err(error) = &result {
        warn!(code = error.code(), %error, "intent rejected");
    }
    result
}
