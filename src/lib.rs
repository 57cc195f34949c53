//! Duel Arena - observer-bound stat models under a turn coordinator
//!
//! A two-participant, turn-based combat core: stat models notify view
//! bindings through an observer registry, per-participant controllers
//! run the turn state machine, and a session coordinates the rotation.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod view;

pub use error::{DuelError, Result};
