//! Delvers — per-turn budgets.
//!
//! Tracks what a hero or monster may still do during its turn: movement
//! points, the action slot, searches, special abilities and active effects.
//! Trackers know nothing about phases; the session checks whose turn it is
//! before touching them.

pub mod application;
pub mod domain;

pub use application::registry::BudgetRegistry;
pub use domain::hero::HeroBudgetTracker;
pub use domain::monster::MonsterBudgetTracker;
