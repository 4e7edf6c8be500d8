//! Delvers — scripted session runner.
//!
//! Drives a [`GameSession`](delvers_session::GameSession) with one tokio
//! task per participant. Participants react to published events the way
//! network connections would: heroes race for the election slot, the game
//! master moves monsters once the hero round is over.

pub mod broadcast;
pub mod participants;
pub mod runner;
