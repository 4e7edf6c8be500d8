//! Session services: intent handling and read-only views.

pub mod command_handlers;
pub mod query_handlers;
pub mod session;
