//! Error types for the simulation domain.
//!
//! These are precondition violations: caller bugs, not model
//! misbehavior. They are raised immediately and synchronously and are
//! never converted into [`intrigue_llm::AiCallResult`] failures. Model
//! output problems live in [`intrigue_llm::AiError`].

use thiserror::Error;

/// Domain precondition violations.
#[derive(Debug, Error)]
pub enum SimError {
    /// A relationship edge cannot point at its own source.
    #[error("Relationship source and target must differ: {0}")]
    SelfRelationship(crate::PlayerId),

    /// The tick simulation needs at least two players.
    #[error("Not enough players: {count} (minimum: 2)")]
    NotEnoughPlayers {
        /// How many players were supplied.
        count: usize,
    },

    /// The human player index does not point into the player list.
    #[error("Human player index out of range: {index} (player count: {count})")]
    HumanIndexOutOfRange {
        /// The offending 0-based index.
        index: usize,
        /// How many players were supplied.
        count: usize,
    },

    /// A 1-based player index does not point into the player list.
    #[error("Player index out of range: {index} (player count: {count})")]
    PlayerIndexOutOfRange {
        /// The offending 1-based index.
        index: usize,
        /// How many players were supplied.
        count: usize,
    },
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SimError>;
