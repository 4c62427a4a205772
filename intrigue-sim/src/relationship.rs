//! The bounded, invariant-enforcing relationship edge.
//!
//! A `Relationship` is a directed perception: how `source` sees `target`,
//! scored on four independent dimensions. Every mutation path (the
//! constructor and the four adjust methods) re-clamps into [0, 100], so
//! no sequence of calls can push a dimension out of bounds. The entity
//! never reads a clock; `updated_at` comes from the caller, keeping it
//! deterministic and easy to test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, SimError};
use crate::types::PlayerId;

/// Lower bound of every relationship dimension.
pub const DIMENSION_MIN: i32 = 0;
/// Upper bound of every relationship dimension.
pub const DIMENSION_MAX: i32 = 100;

/// Clamp a raw dimension value into [0, 100]. Idempotent.
#[must_use]
pub fn clamp_dimension(value: i32) -> i32 {
    value.clamp(DIMENSION_MIN, DIMENSION_MAX)
}

/// Unique identifier for a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub Uuid);

impl RelationshipId {
    /// Create a new random relationship ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute scores for the four dimensions, as parsed from model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipValues {
    /// How much the source trusts the target.
    pub trust: i32,
    /// How much the source likes the target.
    pub affinity: i32,
    /// How much the source respects the target.
    pub respect: i32,
    /// How threatened the source feels by the target.
    pub threat: i32,
}

/// Directed relationship edge between two players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Identity.
    pub id: RelationshipId,
    /// The perceiving player.
    pub source: PlayerId,
    /// The perceived player.
    pub target: PlayerId,
    trust: i32,
    affinity: i32,
    respect: i32,
    threat: i32,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp, caller-supplied.
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create an edge from absolute scores. Scores are clamped to
    /// [0, 100] regardless of what the model produced.
    ///
    /// # Errors
    /// Returns [`SimError::SelfRelationship`] when `source == target`.
    pub fn new(
        source: PlayerId,
        target: PlayerId,
        values: RelationshipValues,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if source == target {
            return Err(SimError::SelfRelationship(source));
        }
        Ok(Self {
            id: RelationshipId::new(),
            source,
            target,
            trust: clamp_dimension(values.trust),
            affinity: clamp_dimension(values.affinity),
            respect: clamp_dimension(values.respect),
            threat: clamp_dimension(values.threat),
            created_at: now,
            updated_at: now,
        })
    }

    /// Current trust score.
    #[must_use]
    pub fn trust(&self) -> i32 {
        self.trust
    }

    /// Current affinity score.
    #[must_use]
    pub fn affinity(&self) -> i32 {
        self.affinity
    }

    /// Current respect score.
    #[must_use]
    pub fn respect(&self) -> i32 {
        self.respect
    }

    /// Current threat score.
    #[must_use]
    pub fn threat(&self) -> i32 {
        self.threat
    }

    /// All four scores as a value object.
    #[must_use]
    pub fn values(&self) -> RelationshipValues {
        RelationshipValues {
            trust: self.trust,
            affinity: self.affinity,
            respect: self.respect,
            threat: self.threat,
        }
    }

    /// Adjust trust by a signed delta, re-clamping into [0, 100].
    pub fn adjust_trust(&mut self, delta: i32, now: DateTime<Utc>) {
        self.trust = clamp_dimension(self.trust.saturating_add(delta));
        self.updated_at = now;
    }

    /// Adjust affinity by a signed delta, re-clamping into [0, 100].
    pub fn adjust_affinity(&mut self, delta: i32, now: DateTime<Utc>) {
        self.affinity = clamp_dimension(self.affinity.saturating_add(delta));
        self.updated_at = now;
    }

    /// Adjust respect by a signed delta, re-clamping into [0, 100].
    pub fn adjust_respect(&mut self, delta: i32, now: DateTime<Utc>) {
        self.respect = clamp_dimension(self.respect.saturating_add(delta));
        self.updated_at = now;
    }

    /// Adjust threat by a signed delta, re-clamping into [0, 100].
    pub fn adjust_threat(&mut self, delta: i32, now: DateTime<Utc>) {
        self.threat = clamp_dimension(self.threat.saturating_add(delta));
        self.updated_at = now;
    }
}
