//! Budget configuration.

use serde::{Deserialize, Serialize};

/// How long a hero's search history lasts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchHistoryScope {
    /// A location stays searched for the rest of the quest.
    #[default]
    Quest,
    /// Search history is cleared at the start of each of the hero's turns.
    Turn,
}

/// Configuration applied to every hero budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Lifetime of per-location search records.
    pub search_history_scope: SearchHistoryScope,
}
