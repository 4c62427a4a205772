//! Identity and read-model types for the simulation domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Create a new random player ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    /// Create a new random game ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-model of a player as the context builder and operations see it.
/// The position of a snapshot in the supplied player list is the 0-based
/// index space the model's 1-based indices refer to; keeping that order
/// stable across build, parse and apply is a caller invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identity.
    pub id: PlayerId,
    /// Display name used in prompts.
    pub name: String,
    /// Short persona description.
    pub persona: String,
    /// Backstory fed to relationship initialization.
    pub backstory: String,
}

/// Phase of the in-game day, derived from the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// 06:00–11:59.
    Morning,
    /// 12:00–17:59.
    Afternoon,
    /// 18:00–23:59.
    Evening,
    /// 00:00–05:59.
    Night,
}

impl GamePhase {
    /// Derive the phase from an hour of day (wraps at 24).
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=23 => Self::Evening,
            _ => Self::Night,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        };
        write!(f, "{name}")
    }
}

/// In-game clock coordinates for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Game day, starting at 1.
    pub day: u32,
    /// Hour of day, 0–23.
    pub hour: u32,
    /// Monotonically increasing tick counter.
    pub tick: u64,
}

impl GameClock {
    /// The phase of day this clock falls in.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        GamePhase::from_hour(self.hour)
    }
}
