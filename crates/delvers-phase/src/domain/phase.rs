//! Quest phases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level phase of a quest.
///
/// Phases only move forward: `QuestSetup` is left once and never re-entered,
/// after which the quest loops between hero turns and the game-master phase
/// until the session is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players join, pick starting tiles and declare readiness.
    QuestSetup,
    /// Heroes volunteer for the next turn.
    HeroElection,
    /// The elected hero is taking a turn.
    HeroActive,
    /// The game master moves monsters.
    #[serde(rename = "gm_phase")]
    GmPhase,
}

impl Phase {
    /// Returns the stable snake-case name of the phase.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuestSetup => "quest_setup",
            Self::HeroElection => "hero_election",
            Self::HeroActive => "hero_active",
            Self::GmPhase => "gm_phase",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
