//! State application services.

pub mod relationship;
pub mod simulation;

pub use relationship::RelationshipService;
pub use simulation::{AppliedTick, SimulationService};
