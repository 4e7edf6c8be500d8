//! Delvers Core — shared turn-engine abstractions.
//!
//! This crate defines the error type, time and randomness ports, command and
//! event envelopes, and board coordinates that the phase, budget and session
//! crates depend on. It contains no game rules.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod position;
pub mod publisher;
pub mod rng;
pub mod sync;
