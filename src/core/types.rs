//! Strongly-typed wrappers for duel concepts
//!
//! Newtypes to prevent type confusion and make the code more
//! self-documenting. Instead of bare integers and Strings for different
//! concepts, we wrap them in distinct types that cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one side of the two-party encounter
///
/// IDs are stable for the lifetime of a session. With exactly two
/// participants the conventional values are 0 (first to act) and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(u32);

impl ParticipantId {
    pub const fn new(id: u32) -> Self {
        ParticipantId(id)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Index into a two-entry controller array
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Player name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        PlayerName(s)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        PlayerName(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_display() {
        assert_eq!(ParticipantId::new(0).to_string(), "P1");
        assert_eq!(ParticipantId::new(1).to_string(), "P2");
        assert_eq!(ParticipantId::new(1).index(), 1);
    }

    #[test]
    fn test_player_name_conversions() {
        let name = PlayerName::from("Alice");
        assert_eq!(name.as_str(), "Alice");
        assert_eq!(name, PlayerName::new(String::from("Alice")));
    }
}
