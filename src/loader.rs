//! Roster file loader (JSON)
//!
//! A roster maps participant keys to starting configurations. Lookups of
//! unknown keys fail fast with the key named in the error; a typo in a
//! host's wiring should never survive to the first turn.

use crate::core::PlayerConfig;
use crate::error::{DuelError, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Participant configurations keyed by roster name
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    players: FxHashMap<String, PlayerConfig>,
}

impl Roster {
    /// Load a roster from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Roster> {
        let content = fs::read_to_string(path).map_err(DuelError::IoError)?;
        Self::parse(&content)
    }

    /// Parse a roster from its JSON content
    pub fn parse(content: &str) -> Result<Roster> {
        let roster: Roster = serde_json::from_str(content)
            .map_err(|e| DuelError::InvalidRoster(e.to_string()))?;
        if roster.players.is_empty() {
            return Err(DuelError::InvalidRoster("empty roster".to_string()));
        }
        for config in roster.players.values() {
            config.validate()?;
        }
        Ok(roster)
    }

    /// Look up a participant's configuration
    pub fn player(&self, key: &str) -> Result<&PlayerConfig> {
        self.players
            .get(key)
            .ok_or_else(|| DuelError::UnknownParticipant(key.to_string()))
    }

    /// Roster keys in sorted order (for stable listings)
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.players.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Built-in two-player roster used when the host supplies no file
pub fn default_roster() -> Roster {
    let mut players = FxHashMap::default();
    players.insert("knight".to_string(), PlayerConfig::new("Knight", 100, 20));
    players.insert("mage".to_string(), PlayerConfig::new("Mage", 80, 30));
    Roster { players }
}
