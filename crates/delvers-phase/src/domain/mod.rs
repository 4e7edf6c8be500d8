//! Phase state machine and its configuration.

pub mod config;
pub mod orchestrator;
pub mod phase;
