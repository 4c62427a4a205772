//! Append-only game event timeline entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::{GameClock, GameId, PlayerId};

/// Unique identifier for a game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameEventId(pub Uuid);

impl GameEventId {
    /// Create a new random event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of timeline entry this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEventKind {
    /// Game-scoped macro narrative for one tick.
    TickSimulation,
    /// Player-scoped narrative from the human player's perspective.
    PlayerPerspective,
    /// One-time relationship graph initialization.
    RelationshipInit,
}

/// One timeline entry. Created by the services, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Identity.
    pub id: GameEventId,
    /// Game this event belongs to.
    pub game: GameId,
    /// Entry kind.
    pub kind: GameEventKind,
    /// Game day the event occurred on.
    pub day: u32,
    /// Hour of day the event occurred at.
    pub hour: u32,
    /// Tick counter at the time of the event.
    pub tick: u64,
    /// Player the event is scoped to, if any.
    pub player: Option<PlayerId>,
    /// Narrative text, if any.
    pub narrative: Option<String>,
    /// Structured metadata, if any.
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp, caller-supplied.
    pub created_at: DateTime<Utc>,
}

impl GameEvent {
    /// Create a bare event at the given clock coordinates.
    #[must_use]
    pub fn new(game: GameId, kind: GameEventKind, clock: &GameClock, now: DateTime<Utc>) -> Self {
        Self {
            id: GameEventId::new(),
            game,
            kind,
            day: clock.day,
            hour: clock.hour,
            tick: clock.tick,
            player: None,
            narrative: None,
            metadata: None,
            created_at: now,
        }
    }

    /// Scope the event to a player.
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Attach narrative text.
    #[must_use]
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }

    /// Attach structured metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
