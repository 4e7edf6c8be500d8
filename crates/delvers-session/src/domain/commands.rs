//! Intents a participant may send to a game session.
//!
//! Each intent carries the issuing participant and a correlation id. The
//! [`Intent`] enum wraps them for a single dispatch entry point.

use delvers_budget::domain::ability::SpecialAbility;
use delvers_budget::domain::actions::{ActionRecord, SearchKind};
use delvers_budget::domain::effects::ActiveEffect;
use delvers_budget::domain::hero::TurnFlag;
use delvers_budget::domain::monster::{AbilityUse, MonsterStats};
use delvers_core::command::Command;
use delvers_core::position::Position;
use uuid::Uuid;

/// Command to join the session.
#[derive(Debug, Clone)]
pub struct RegisterPlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for RegisterPlayer {
    fn command_type(&self) -> &'static str {
        "session.register_player"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to make a participant the game master.
#[derive(Debug, Clone)]
pub struct AssignGameMaster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for AssignGameMaster {
    fn command_type(&self) -> &'static str {
        "session.assign_game_master"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to leave the session.
#[derive(Debug, Clone)]
pub struct RemovePlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for RemovePlayer {
    fn command_type(&self) -> &'static str {
        "session.remove_player"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to choose a starting tile during setup.
#[derive(Debug, Clone)]
pub struct SelectStartingPosition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The chosen tile.
    pub position: Position,
}

impl Command for SelectStartingPosition {
    fn command_type(&self) -> &'static str {
        "session.select_starting_position"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to declare or withdraw readiness during setup.
#[derive(Debug, Clone)]
pub struct SetPlayerReady {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// New readiness.
    pub ready: bool,
}

impl Command for SetPlayerReady {
    fn command_type(&self) -> &'static str {
        "session.set_player_ready"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to end setup and open the first election.
#[derive(Debug, Clone)]
pub struct StartQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for StartQuest {
    fn command_type(&self) -> &'static str {
        "session.start_quest"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to volunteer for the next hero turn.
#[derive(Debug, Clone)]
pub struct ElectSelf {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for ElectSelf {
    fn command_type(&self) -> &'static str {
        "session.elect_self"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to withdraw a pending election.
#[derive(Debug, Clone)]
pub struct CancelElection {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for CancelElection {
    fn command_type(&self) -> &'static str {
        "session.cancel_election"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the elected hero to begin its turn.
#[derive(Debug, Clone)]
pub struct ConfirmElection {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for ConfirmElection {
    fn command_type(&self) -> &'static str {
        "session.confirm_election"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to record movement dice rolled by the hero's client.
#[derive(Debug, Clone)]
pub struct RollMovement {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// Per-die results.
    pub dice: Vec<u32>,
}

impl Command for RollMovement {
    fn command_type(&self) -> &'static str {
        "session.roll_movement"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to move the active hero one tile.
#[derive(Debug, Clone)]
pub struct MoveHero {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The tile to enter.
    pub to: Position,
}

impl Command for MoveHero {
    fn command_type(&self) -> &'static str {
        "session.move_hero"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to spend the active hero's action.
#[derive(Debug, Clone)]
pub struct TakeAction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// What the hero does.
    pub action: ActionRecord,
}

impl Command for TakeAction {
    fn command_type(&self) -> &'static str {
        "session.take_action"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to search a location with the hero's action.
#[derive(Debug, Clone)]
pub struct SearchLocation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// What to search for.
    pub kind: SearchKind,
    /// The location, e.g. a room or corridor id.
    pub location_key: String,
    /// What the rules layer says the search turned up.
    pub found: Vec<String>,
}

impl Command for SearchLocation {
    fn command_type(&self) -> &'static str {
        "session.search_location"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to use an item during the hero's turn.
#[derive(Debug, Clone)]
pub struct UseItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The item.
    pub item_id: String,
}

impl Command for UseItem {
    fn command_type(&self) -> &'static str {
        "session.use_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to end the active hero's turn.
#[derive(Debug, Clone)]
pub struct EndHeroTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for EndHeroTurn {
    fn command_type(&self) -> &'static str {
        "session.end_hero_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to put an effect on a hero.
#[derive(Debug, Clone)]
pub struct ApplyHeroEffect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The hero.
    pub hero_id: String,
    /// The effect.
    pub effect: ActiveEffect,
}

impl Command for ApplyHeroEffect {
    fn command_type(&self) -> &'static str {
        "session.apply_hero_effect"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to grant a hero a turn flag.
#[derive(Debug, Clone)]
pub struct GrantTurnFlag {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The hero.
    pub hero_id: String,
    /// The flag.
    pub flag: TurnFlag,
}

impl Command for GrantTurnFlag {
    fn command_type(&self) -> &'static str {
        "session.grant_turn_flag"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to put a monster on the board.
#[derive(Debug, Clone)]
pub struct PlaceMonster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The monster.
    pub monster_id: String,
    /// Its type, e.g. "orc".
    pub monster_type: String,
    /// Combat statistics.
    pub stats: MonsterStats,
    /// Special abilities.
    pub abilities: Vec<SpecialAbility>,
    /// Where it stands.
    pub position: Position,
}

impl Command for PlaceMonster {
    fn command_type(&self) -> &'static str {
        "session.place_monster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to move a monster one tile.
#[derive(Debug, Clone)]
pub struct MoveMonster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The monster.
    pub monster_id: String,
    /// The tile to enter.
    pub to: Position,
}

impl Command for MoveMonster {
    fn command_type(&self) -> &'static str {
        "session.move_monster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to spend a monster's action.
#[derive(Debug, Clone)]
pub struct MonsterAction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The monster.
    pub monster_id: String,
    /// What the monster does.
    pub action: ActionRecord,
}

impl Command for MonsterAction {
    fn command_type(&self) -> &'static str {
        "session.monster_action"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to use a monster ability.
#[derive(Debug, Clone)]
pub struct UseMonsterAbility {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The monster.
    pub monster_id: String,
    /// The ability use.
    pub ability: AbilityUse,
}

impl Command for UseMonsterAbility {
    fn command_type(&self) -> &'static str {
        "session.use_monster_ability"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to put an effect on a monster.
#[derive(Debug, Clone)]
pub struct ApplyMonsterEffect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The monster.
    pub monster_id: String,
    /// The effect.
    pub effect: ActiveEffect,
}

impl Command for ApplyMonsterEffect {
    fn command_type(&self) -> &'static str {
        "session.apply_monster_effect"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command to remove body points from a monster.
#[derive(Debug, Clone)]
pub struct DamageMonster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
    /// The monster.
    pub monster_id: String,
    /// Body points to remove.
    pub amount: u32,
}

impl Command for DamageMonster {
    fn command_type(&self) -> &'static str {
        "session.damage_monster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Command by the game master to end the GM phase.
#[derive(Debug, Clone)]
pub struct EndGmTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing participant.
    pub player_id: String,
}

impl Command for EndGmTurn {
    fn command_type(&self) -> &'static str {
        "session.end_gm_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn participant_id(&self) -> Option<&str> {
        Some(&self.player_id)
    }
}

/// Any intent accepted by a session.
#[derive(Debug, Clone)]
pub enum Intent {
    /// See [`RegisterPlayer`].
    RegisterPlayer(RegisterPlayer),
    /// See [`AssignGameMaster`].
    AssignGameMaster(AssignGameMaster),
    /// See [`RemovePlayer`].
    RemovePlayer(RemovePlayer),
    /// See [`SelectStartingPosition`].
    SelectStartingPosition(SelectStartingPosition),
    /// See [`SetPlayerReady`].
    SetPlayerReady(SetPlayerReady),
    /// See [`StartQuest`].
    StartQuest(StartQuest),
    /// See [`ElectSelf`].
    ElectSelf(ElectSelf),
    /// See [`CancelElection`].
    CancelElection(CancelElection),
    /// See [`ConfirmElection`].
    ConfirmElection(ConfirmElection),
    /// See [`RollMovement`].
    RollMovement(RollMovement),
    /// See [`MoveHero`].
    MoveHero(MoveHero),
    /// See [`TakeAction`].
    TakeAction(TakeAction),
    /// See [`SearchLocation`].
    SearchLocation(SearchLocation),
    /// See [`UseItem`].
    UseItem(UseItem),
    /// See [`EndHeroTurn`].
    EndHeroTurn(EndHeroTurn),
    /// See [`ApplyHeroEffect`].
    ApplyHeroEffect(ApplyHeroEffect),
    /// See [`GrantTurnFlag`].
    GrantTurnFlag(GrantTurnFlag),
    /// See [`PlaceMonster`].
    PlaceMonster(PlaceMonster),
    /// See [`MoveMonster`].
    MoveMonster(MoveMonster),
    /// See [`MonsterAction`].
    MonsterAction(MonsterAction),
    /// See [`UseMonsterAbility`].
    UseMonsterAbility(UseMonsterAbility),
    /// See [`ApplyMonsterEffect`].
    ApplyMonsterEffect(ApplyMonsterEffect),
    /// See [`DamageMonster`].
    DamageMonster(DamageMonster),
    /// See [`EndGmTurn`].
    EndGmTurn(EndGmTurn),
}

impl Intent {
    fn as_command(&self) -> &dyn Command {
        match self {
            Self::RegisterPlayer(command) => command,
            Self::AssignGameMaster(command) => command,
            Self::RemovePlayer(command) => command,
            Self::SelectStartingPosition(command) => command,
            Self::SetPlayerReady(command) => command,
            Self::StartQuest(command) => command,
            Self::ElectSelf(command) => command,
            Self::CancelElection(command) => command,
            Self::ConfirmElection(command) => command,
            Self::RollMovement(command) => command,
            Self::MoveHero(command) => command,
            Self::TakeAction(command) => command,
            Self::SearchLocation(command) => command,
            Self::UseItem(command) => command,
            Self::EndHeroTurn(command) => command,
            Self::ApplyHeroEffect(command) => command,
            Self::GrantTurnFlag(command) => command,
            Self::PlaceMonster(command) => command,
            Self::MoveMonster(command) => command,
            Self::MonsterAction(command) => command,
            Self::UseMonsterAbility(command) => command,
            Self::ApplyMonsterEffect(command) => command,
            Self::DamageMonster(command) => command,
            Self::EndGmTurn(command) => command,
        }
    }
}

impl Command for Intent {
    fn command_type(&self) -> &'static str {
        self.as_command().command_type()
    }

    fn correlation_id(&self) -> Uuid {
        self.as_command().correlation_id()
    }

    fn participant_id(&self) -> Option<&str> {
        self.as_command().participant_id()
    }
}
