//! Immutable per-participant starting configuration
//!
//! A `PlayerConfig` is read once at controller creation (and again on
//! reset) and never written back by the runtime, so the same config can
//! seed any number of sessions.

use crate::core::PlayerName;
use crate::error::{DuelError, Result};
use serde::{Deserialize, Serialize};

/// Starting stats for one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name
    pub name: PlayerName,

    /// Upper bound for current health
    pub max_health: i32,

    /// Starting health (clamped into [0, max_health] at model creation)
    pub current_health: i32,

    /// Damage dealt by an attack / amount restored by a heal
    pub power: i32,

    /// Allocatable pool spent on max health or power before a game
    #[serde(default)]
    pub free_points: i32,
}

impl PlayerConfig {
    pub fn new(name: impl Into<PlayerName>, max_health: i32, power: i32) -> Self {
        PlayerConfig {
            name: name.into(),
            max_health,
            current_health: max_health,
            power,
            free_points: 0,
        }
    }

    /// Set starting health below the maximum (builder pattern)
    pub fn with_current_health(mut self, current_health: i32) -> Self {
        self.current_health = current_health;
        self
    }

    /// Set the allocatable point pool (builder pattern)
    pub fn with_free_points(mut self, free_points: i32) -> Self {
        self.free_points = free_points;
        self
    }

    /// Check the config invariants a roster must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.max_health < 0 {
            return Err(DuelError::InvalidRoster(format!(
                "{}: max_health must be >= 0, got {}",
                self.name, self.max_health
            )));
        }
        if self.power < 0 {
            return Err(DuelError::InvalidRoster(format!(
                "{}: power must be >= 0, got {}",
                self.name, self.power
            )));
        }
        if self.free_points < 0 {
            return Err(DuelError::InvalidRoster(format!(
                "{}: free_points must be >= 0, got {}",
                self.name, self.free_points
            )));
        }
        Ok(())
    }
}
