//! Model operation variants, one per use case.

pub mod relationships;
pub mod tick;

pub use relationships::{
    InitializeRelationshipsOperation, RelationshipInitResult, RelationshipScore,
};
pub use tick::{RelationshipDelta, SimulateTickOperation, SimulateTickResult};
