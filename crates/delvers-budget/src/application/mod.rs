//! Tracker storage and read-only views.

pub mod query_handlers;
pub mod registry;
