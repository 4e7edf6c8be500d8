//! Intents accepted by a session and the events it publishes.

pub mod commands;
pub mod events;
