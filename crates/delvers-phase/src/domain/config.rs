//! Orchestrator configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// When the hero round is considered finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Every registered hero must complete a turn before the GM phase.
    AllHeroes,
    /// The GM phase follows as soon as one hero has completed a turn.
    AnyHero,
}

impl AdvancePolicy {
    /// Returns whether `acted` completed turns out of `heroes` registered
    /// heroes satisfy the policy.
    #[must_use]
    pub fn is_satisfied(self, acted: usize, heroes: usize) -> bool {
        match self {
            Self::AllHeroes => acted >= heroes,
            Self::AnyHero => acted >= 1,
        }
    }
}

/// Configuration supplied when the orchestrator is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Whether the GM phase requires every hero to have acted.
    pub require_all_heroes_acted: bool,
    /// Seconds an election may stay open before an external policy may
    /// auto-select a hero. `0` disables the timeout. Never enforced by the
    /// orchestrator itself.
    pub election_timeout_secs: u64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            require_all_heroes_acted: true,
            election_timeout_secs: 0,
        }
    }
}

impl PhaseConfig {
    /// Returns the advance policy implied by the configuration.
    #[must_use]
    pub fn advance_policy(&self) -> AdvancePolicy {
        if self.require_all_heroes_acted {
            AdvancePolicy::AllHeroes
        } else {
            AdvancePolicy::AnyHero
        }
    }

    /// Returns the election timeout, or `None` when disabled.
    #[must_use]
    pub fn election_timeout(&self) -> Option<Duration> {
        if self.election_timeout_secs == 0 {
            return None;
        }
        i64::try_from(self.election_timeout_secs)
            .ok()
            .map(Duration::seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_heroes_policy_waits_for_every_hero() {
        let policy = AdvancePolicy::AllHeroes;

        assert!(!policy.is_satisfied(1, 2));
        assert!(policy.is_satisfied(2, 2));
    }

    #[test]
    fn test_any_hero_policy_needs_one_turn() {
        let policy = AdvancePolicy::AnyHero;

        assert!(!policy.is_satisfied(0, 3));
        assert!(policy.is_satisfied(1, 3));
    }

    #[test]
    fn test_zero_timeout_is_disabled() {
        let config = PhaseConfig::default();

        assert_eq!(config.election_timeout(), None);
        assert_eq!(config.advance_policy(), AdvancePolicy::AllHeroes);
    }

    #[test]
    fn test_timeout_converts_to_duration() {
        let config = PhaseConfig {
            require_all_heroes_acted: false,
            election_timeout_secs: 30,
        };

        assert_eq!(config.election_timeout(), Some(Duration::seconds(30)));
        assert_eq!(config.advance_policy(), AdvancePolicy::AnyHero);
    }
}
