//! Read-only views of a game session.

use delvers_budget::application::query_handlers::{HeroBudgetView, MonsterBudgetView};
use delvers_core::error::TurnError;
use delvers_phase::application::query_handlers::PhaseView;
use serde::Serialize;
use uuid::Uuid;

use super::session::GameSession;

/// Serializable snapshot of a whole session, suitable for broadcast to a
/// newly connected participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// The session id.
    pub session_id: Uuid,
    /// Orchestrator state.
    pub phase: PhaseView,
    /// Hero budgets, in hero id order.
    pub heroes: Vec<HeroBudgetView>,
    /// Monster budgets, in monster id order.
    pub monsters: Vec<MonsterBudgetView>,
}

impl SessionView {
    /// Builds a view of `session`. The orchestrator and each budget are
    /// read under their own locks, one at a time.
    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            session_id: session.session_id(),
            phase: session.orchestrator().snapshot(),
            heroes: session.heroes().map_all(HeroBudgetView::from_tracker),
            monsters: session.monsters().map_all(MonsterBudgetView::from_tracker),
        }
    }
}

/// Returns the view of one hero's budget.
///
/// # Errors
///
/// Returns `TurnError::NotFound` if the hero has no budget yet.
pub fn get_hero_budget(session: &GameSession, hero_id: &str) -> Result<HeroBudgetView, TurnError> {
    session.heroes().read(hero_id, HeroBudgetView::from_tracker)
}

/// Returns the view of one monster's budget.
///
/// # Errors
///
/// Returns `TurnError::NotFound` for an unknown monster.
pub fn get_monster_budget(
    session: &GameSession,
    monster_id: &str,
) -> Result<MonsterBudgetView, TurnError> {
    session.monsters().read(monster_id, MonsterBudgetView::from_tracker)
}
