//! Turn-engine error types.

use thiserror::Error;

/// Typed failure returned by every orchestrator and budget operation.
///
/// A rejected call never mutates state, so callers are free to surface the
/// error, retry, or fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// The operation is not legal in the current phase.
    #[error("{operation} is not allowed during the {phase} phase")]
    InvalidPhase {
        /// The rejected operation.
        operation: &'static str,
        /// The phase the orchestrator was in.
        phase: &'static str,
    },

    /// The quest was started before every participant was ready.
    #[error("not all players are ready")]
    NotReady,

    /// The hero already completed a turn this cycle.
    #[error("player {0} has already acted this cycle")]
    AlreadyActed(String),

    /// Another participant holds the election slot.
    #[error("player {0} is already elected")]
    AlreadyElected(String),

    /// The caller does not hold the election slot.
    #[error("player {0} is not the elected player")]
    NotElected(String),

    /// Confirmation was requested with an empty election slot.
    #[error("no player has been elected")]
    NoElection,

    /// The participant may not take hero turns (e.g. the game master).
    #[error("player {0} is not eligible to take a hero turn")]
    NotEligible(String),

    /// Movement rejected by the budget or the strategy lock.
    #[error("cannot move: {0}")]
    CannotMove(String),

    /// Action rejected by the budget.
    #[error("cannot act: {0}")]
    CannotAct(String),

    /// Movement dice were already rolled this turn.
    #[error("movement dice already rolled this turn")]
    AlreadyRolled,

    /// A search was rejected.
    #[error("cannot search: {0}")]
    CannotSearch(String),

    /// A special ability could not be used.
    #[error("ability {ability_id} unavailable: {reason}")]
    AbilityUnavailable {
        /// The ability that was requested.
        ability_id: String,
        /// Why it could not be used.
        reason: String,
    },

    /// A referenced participant, monster or hero budget does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),
}

impl TurnError {
    /// Returns the stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPhase { .. } => "invalid_phase",
            Self::NotReady => "not_ready",
            Self::AlreadyActed(_) => "already_acted",
            Self::AlreadyElected(_) => "already_elected",
            Self::NotElected(_) => "not_elected",
            Self::NoElection => "no_election",
            Self::NotEligible(_) => "not_eligible",
            Self::CannotMove(_) => "cannot_move",
            Self::CannotAct(_) => "cannot_act",
            Self::AlreadyRolled => "already_rolled",
            Self::CannotSearch(_) => "cannot_search",
            Self::AbilityUnavailable { .. } => "ability_unavailable",
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_error",
        }
    }

    /// Shorthand for [`TurnError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
