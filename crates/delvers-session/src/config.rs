//! Session configuration loaded from the environment.

use delvers_budget::domain::config::{BudgetConfig, SearchHistoryScope};
use delvers_phase::PhaseConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable selecting the advance policy.
pub const REQUIRE_ALL_HEROES_VAR: &str = "DELVERS_REQUIRE_ALL_HEROES";
/// Environment variable holding the election timeout in seconds.
pub const ELECTION_TIMEOUT_VAR: &str = "DELVERS_ELECTION_TIMEOUT_SECS";
/// Environment variable selecting the search history scope.
pub const SEARCH_SCOPE_VAR: &str = "DELVERS_SEARCH_SCOPE";

/// A configuration value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for {key}: expected {expected}")]
pub struct ConfigError {
    /// The offending variable.
    pub key: &'static str,
    /// The raw value.
    pub value: String,
    /// What would have been accepted.
    pub expected: &'static str,
}

/// Configuration for a whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Orchestrator settings.
    pub phase: PhaseConfig,
    /// Settings shared by every hero budget.
    pub budget: BudgetConfig,
}

impl SessionConfig {
    /// Reads the configuration from process environment variables. Unset
    /// variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(REQUIRE_ALL_HEROES_VAR) {
            config.phase.require_all_heroes_acted = parse_bool(REQUIRE_ALL_HEROES_VAR, &raw)?;
        }
        if let Some(raw) = lookup(ELECTION_TIMEOUT_VAR) {
            config.phase.election_timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError {
                    key: ELECTION_TIMEOUT_VAR,
                    value: raw.clone(),
                    expected: "a whole number of seconds",
                })?;
        }
        if let Some(raw) = lookup(SEARCH_SCOPE_VAR) {
            config.budget.search_history_scope = match raw.trim().to_ascii_lowercase().as_str() {
                "quest" => SearchHistoryScope::Quest,
                "turn" => SearchHistoryScope::Turn,
                _ => {
                    return Err(ConfigError {
                        key: SEARCH_SCOPE_VAR,
                        value: raw,
                        expected: "quest or turn",
                    });
                }
            };
        }

        Ok(config)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key,
            value: raw.to_owned(),
            expected: "true or false",
        }),
    }
}
