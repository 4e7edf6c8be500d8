//! Locked entry points and read-only views over the orchestrator.

pub mod query_handlers;
pub mod shared;
