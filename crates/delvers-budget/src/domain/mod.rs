//! Budget trackers and the records they keep.

pub mod ability;
pub mod actions;
pub mod config;
pub mod effects;
pub mod hero;
pub mod monster;
pub mod movement;
