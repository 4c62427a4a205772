//! # intrigue-sim: Tick Simulation Domain for Intrigue
//!
//! The deterministic half of the engine: the relationship graph, the
//! event timeline, the context builder that turns read-models into
//! prompts, the operation variants that validate model output, and the
//! services that apply validated results to game state.
//!
//! Model output enters this crate only through an operation's `parse`,
//! which enforces a two-tier policy: structural violations of required
//! fields are errors, data-quality problems on array elements are
//! sanitized. Relationship dimensions are clamped twice on the way in
//! (±20 at parse time, ±15 again at apply time) and the entity itself
//! clamps every dimension into [0, 100] on every write.
//!
//! Concurrency is a caller concern: the engine assumes at most one
//! in-flight tick per game.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod error;
pub mod event;
pub mod ops;
pub mod relationship;
pub mod services;
pub mod types;

pub use context::{TickContext, build_tick_context};
pub use error::SimError;
pub use event::{GameEvent, GameEventId, GameEventKind};
pub use ops::{
    InitializeRelationshipsOperation, RelationshipDelta, RelationshipInitResult,
    RelationshipScore, SimulateTickOperation, SimulateTickResult,
};
pub use relationship::{Relationship, RelationshipId, RelationshipValues};
pub use services::{AppliedTick, RelationshipService, SimulationService};
pub use types::{GameClock, GameId, GamePhase, PlayerId, PlayerSnapshot};
