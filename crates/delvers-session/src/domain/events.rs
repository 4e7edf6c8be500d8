//! Domain events published by a game session.

use delvers_budget::domain::actions::{ActionRecord, SearchKind};
use delvers_budget::domain::effects::ActiveEffect;
use delvers_budget::domain::hero::TurnFlag;
use delvers_core::event::{DomainEvent, EventMetadata};
use delvers_core::position::Position;
use delvers_phase::Phase;
use serde::{Deserialize, Serialize};

/// Emitted when a participant joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegistered {
    /// The participant.
    pub player_id: String,
}

/// Emitted when the game master is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMasterAssigned {
    /// The game master.
    pub player_id: String,
}

/// Emitted when a participant leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRemoved {
    /// The participant.
    pub player_id: String,
    /// Phase after the departure.
    pub phase: Phase,
}

/// Emitted when a hero picks a starting tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingPositionSelected {
    /// The hero.
    pub player_id: String,
    /// The chosen tile.
    pub position: Position,
}

/// Emitted when a participant toggles readiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessChanged {
    /// The participant.
    pub player_id: String,
    /// New readiness.
    pub ready: bool,
}

/// Emitted when setup ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStarted {
    /// The first cycle.
    pub cycle: u32,
}

/// Emitted when a hero takes the election slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroElected {
    /// The elected hero.
    pub player_id: String,
}

/// Emitted when a hero gives up the election slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCancelled {
    /// The hero.
    pub player_id: String,
}

/// Emitted when a hero turn begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroTurnStarted {
    /// The active hero.
    pub hero_id: String,
    /// The current cycle.
    pub cycle: u32,
    /// Whether the hero was picked by the election timeout.
    pub auto_selected: bool,
}

/// Emitted when a hero rolls for movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRolled {
    /// The hero.
    pub hero_id: String,
    /// Per-die results.
    pub dice: Vec<u32>,
    /// Movement points granted.
    pub total: u32,
}

/// Emitted when a hero enters a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroMoved {
    /// The hero.
    pub hero_id: String,
    /// The entered tile.
    pub to: Position,
    /// Movement points left.
    pub remaining: u32,
}

/// Emitted when a hero uses its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroActed {
    /// The hero.
    pub hero_id: String,
    /// What the hero did.
    pub action: ActionRecord,
}

/// Emitted when a hero searches a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSearched {
    /// The hero.
    pub hero_id: String,
    /// What was searched for.
    pub kind: SearchKind,
    /// Where.
    pub location_key: String,
    /// What turned up.
    pub found: Vec<String>,
}

/// Emitted when a hero uses an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUsed {
    /// The hero.
    pub hero_id: String,
    /// The item.
    pub item_id: String,
}

/// Emitted when an effect lands on a hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroEffectApplied {
    /// The hero.
    pub hero_id: String,
    /// The effect.
    pub effect: ActiveEffect,
}

/// Emitted when the game master grants a turn flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFlagGranted {
    /// The hero.
    pub hero_id: String,
    /// The flag.
    pub flag: TurnFlag,
}

/// Emitted when a hero turn ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroTurnCompleted {
    /// The hero.
    pub hero_id: String,
    /// Where the quest went next.
    pub next_phase: Phase,
}

/// Emitted when the game master places a monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterPlaced {
    /// The monster.
    pub monster_id: String,
    /// Its type.
    pub monster_type: String,
    /// Where it stands.
    pub position: Position,
}

/// Emitted when a monster enters a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterMoved {
    /// The monster.
    pub monster_id: String,
    /// The entered tile.
    pub to: Position,
    /// Movement points left.
    pub remaining: u32,
}

/// Emitted when a monster uses its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterActed {
    /// The monster.
    pub monster_id: String,
    /// What it did.
    pub action: ActionRecord,
}

/// Emitted when a monster uses a special ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterAbilityUsed {
    /// The monster.
    pub monster_id: String,
    /// The ability.
    pub ability_id: String,
    /// The target, if any.
    pub target_id: Option<String>,
    /// Outcome reported by the rules layer.
    pub success: bool,
}

/// Emitted when an effect lands on a monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterEffectApplied {
    /// The monster.
    pub monster_id: String,
    /// The effect.
    pub effect: ActiveEffect,
}

/// Emitted when a monster takes damage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterDamaged {
    /// The monster.
    pub monster_id: String,
    /// Body points removed.
    pub amount: u32,
    /// Body points left.
    pub remaining_body: u32,
}

/// Emitted when a monster runs out of body points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSlain {
    /// The monster.
    pub monster_id: String,
}

/// Emitted when the game master ends the GM phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmTurnCompleted {
    /// The cycle that begins.
    pub next_cycle: u32,
}

/// Event type identifier for [`PlayerRegistered`].
pub const PLAYER_REGISTERED_EVENT_TYPE: &str = "session.player_registered";
/// Event type identifier for [`GameMasterAssigned`].
pub const GAME_MASTER_ASSIGNED_EVENT_TYPE: &str = "session.game_master_assigned";
/// Event type identifier for [`PlayerRemoved`].
pub const PLAYER_REMOVED_EVENT_TYPE: &str = "session.player_removed";
/// Event type identifier for [`StartingPositionSelected`].
pub const STARTING_POSITION_SELECTED_EVENT_TYPE: &str = "session.starting_position_selected";
/// Event type identifier for [`ReadinessChanged`].
pub const READINESS_CHANGED_EVENT_TYPE: &str = "session.readiness_changed";
/// Event type identifier for [`QuestStarted`].
pub const QUEST_STARTED_EVENT_TYPE: &str = "phase.quest_started";
/// Event type identifier for [`HeroElected`].
pub const HERO_ELECTED_EVENT_TYPE: &str = "phase.hero_elected";
/// Event type identifier for [`ElectionCancelled`].
pub const ELECTION_CANCELLED_EVENT_TYPE: &str = "phase.election_cancelled";
/// Event type identifier for [`HeroTurnStarted`].
pub const HERO_TURN_STARTED_EVENT_TYPE: &str = "phase.hero_turn_started";
/// Event type identifier for [`HeroTurnCompleted`].
pub const HERO_TURN_COMPLETED_EVENT_TYPE: &str = "phase.hero_turn_completed";
/// Event type identifier for [`GmTurnCompleted`].
pub const GM_TURN_COMPLETED_EVENT_TYPE: &str = "phase.gm_turn_completed";
/// Event type identifier for [`MovementRolled`].
pub const MOVEMENT_ROLLED_EVENT_TYPE: &str = "hero.movement_rolled";
/// Event type identifier for [`HeroMoved`].
pub const HERO_MOVED_EVENT_TYPE: &str = "hero.moved";
/// Event type identifier for [`HeroActed`].
pub const HERO_ACTED_EVENT_TYPE: &str = "hero.acted";
/// Event type identifier for [`HeroSearched`].
pub const HERO_SEARCHED_EVENT_TYPE: &str = "hero.searched";
/// Event type identifier for [`ItemUsed`].
pub const ITEM_USED_EVENT_TYPE: &str = "hero.item_used";
/// Event type identifier for [`HeroEffectApplied`].
pub const HERO_EFFECT_APPLIED_EVENT_TYPE: &str = "hero.effect_applied";
/// Event type identifier for [`TurnFlagGranted`].
pub const TURN_FLAG_GRANTED_EVENT_TYPE: &str = "hero.turn_flag_granted";
/// Event type identifier for [`MonsterPlaced`].
pub const MONSTER_PLACED_EVENT_TYPE: &str = "monster.placed";
/// Event type identifier for [`MonsterMoved`].
pub const MONSTER_MOVED_EVENT_TYPE: &str = "monster.moved";
/// Event type identifier for [`MonsterActed`].
pub const MONSTER_ACTED_EVENT_TYPE: &str = "monster.acted";
/// Event type identifier for [`MonsterAbilityUsed`].
pub const MONSTER_ABILITY_USED_EVENT_TYPE: &str = "monster.ability_used";
/// Event type identifier for [`MonsterEffectApplied`].
pub const MONSTER_EFFECT_APPLIED_EVENT_TYPE: &str = "monster.effect_applied";
/// Event type identifier for [`MonsterDamaged`].
pub const MONSTER_DAMAGED_EVENT_TYPE: &str = "monster.damaged";
/// Event type identifier for [`MonsterSlain`].
pub const MONSTER_SLAIN_EVENT_TYPE: &str = "monster.slain";

/// Event payload variants for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A participant joined.
    PlayerRegistered(PlayerRegistered),
    /// The game master was assigned.
    GameMasterAssigned(GameMasterAssigned),
    /// A participant left.
    PlayerRemoved(PlayerRemoved),
    /// A hero chose a starting tile.
    StartingPositionSelected(StartingPositionSelected),
    /// A participant toggled readiness.
    ReadinessChanged(ReadinessChanged),
    /// Setup ended.
    QuestStarted(QuestStarted),
    /// A hero took the election slot.
    HeroElected(HeroElected),
    /// A hero gave up the election slot.
    ElectionCancelled(ElectionCancelled),
    /// A hero turn began.
    HeroTurnStarted(HeroTurnStarted),
    /// A hero turn ended.
    HeroTurnCompleted(HeroTurnCompleted),
    /// The GM phase ended.
    GmTurnCompleted(GmTurnCompleted),
    /// A hero rolled for movement.
    MovementRolled(MovementRolled),
    /// A hero moved.
    HeroMoved(HeroMoved),
    /// A hero acted.
    HeroActed(HeroActed),
    /// A hero searched.
    HeroSearched(HeroSearched),
    /// A hero used an item.
    ItemUsed(ItemUsed),
    /// An effect landed on a hero.
    HeroEffectApplied(HeroEffectApplied),
    /// A hero received a turn flag.
    TurnFlagGranted(TurnFlagGranted),
    /// A monster was placed.
    MonsterPlaced(MonsterPlaced),
    /// A monster moved.
    MonsterMoved(MonsterMoved),
    /// A monster acted.
    MonsterActed(MonsterActed),
    /// A monster used an ability.
    MonsterAbilityUsed(MonsterAbilityUsed),
    /// An effect landed on a monster.
    MonsterEffectApplied(MonsterEffectApplied),
    /// A monster took damage.
    MonsterDamaged(MonsterDamaged),
    /// A monster died.
    MonsterSlain(MonsterSlain),
}

impl SessionEventKind {
    /// The event type identifier for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlayerRegistered(_) => PLAYER_REGISTERED_EVENT_TYPE,
            Self::GameMasterAssigned(_) => GAME_MASTER_ASSIGNED_EVENT_TYPE,
            Self::PlayerRemoved(_) => PLAYER_REMOVED_EVENT_TYPE,
            Self::StartingPositionSelected(_) => STARTING_POSITION_SELECTED_EVENT_TYPE,
            Self::ReadinessChanged(_) => READINESS_CHANGED_EVENT_TYPE,
            Self::QuestStarted(_) => QUEST_STARTED_EVENT_TYPE,
            Self::HeroElected(_) => HERO_ELECTED_EVENT_TYPE,
            Self::ElectionCancelled(_) => ELECTION_CANCELLED_EVENT_TYPE,
            Self::HeroTurnStarted(_) => HERO_TURN_STARTED_EVENT_TYPE,
            Self::HeroTurnCompleted(_) => HERO_TURN_COMPLETED_EVENT_TYPE,
            Self::GmTurnCompleted(_) => GM_TURN_COMPLETED_EVENT_TYPE,
            Self::MovementRolled(_) => MOVEMENT_ROLLED_EVENT_TYPE,
            Self::HeroMoved(_) => HERO_MOVED_EVENT_TYPE,
            Self::HeroActed(_) => HERO_ACTED_EVENT_TYPE,
            Self::HeroSearched(_) => HERO_SEARCHED_EVENT_TYPE,
            Self::ItemUsed(_) => ITEM_USED_EVENT_TYPE,
            Self::HeroEffectApplied(_) => HERO_EFFECT_APPLIED_EVENT_TYPE,
            Self::TurnFlagGranted(_) => TURN_FLAG_GRANTED_EVENT_TYPE,
            Self::MonsterPlaced(_) => MONSTER_PLACED_EVENT_TYPE,
            Self::MonsterMoved(_) => MONSTER_MOVED_EVENT_TYPE,
            Self::MonsterActed(_) => MONSTER_ACTED_EVENT_TYPE,
            Self::MonsterAbilityUsed(_) => MONSTER_ABILITY_USED_EVENT_TYPE,
            Self::MonsterEffectApplied(_) => MONSTER_EFFECT_APPLIED_EVENT_TYPE,
            Self::MonsterDamaged(_) => MONSTER_DAMAGED_EVENT_TYPE,
            Self::MonsterSlain(_) => MONSTER_SLAIN_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for a game session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Derived Serialize on plain data never fails.
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
