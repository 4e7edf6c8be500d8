//! Delvers — game session.
//!
//! Composes the phase orchestrator and the hero and monster budgets into a
//! single caller-owned session. Every accepted intent produces events that
//! are handed to an [`EventPublisher`](delvers_core::publisher::EventPublisher).

pub mod application;
pub mod config;
pub mod domain;

pub use application::session::GameSession;
pub use config::{ConfigError, SessionConfig};
pub use domain::commands::Intent;
