//! One-time construction of the relationship graph.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, SimError};
use crate::ops::relationships::RelationshipInitResult;
use crate::relationship::Relationship;
use crate::types::PlayerSnapshot;

/// Builds the full directed relationship graph from a validated scoring.
pub struct RelationshipService;

impl RelationshipService {
    /// Construct one [`Relationship`] per scored ordered pair.
    ///
    /// `players` must be in the same index order the operation used
    /// (caller invariant). The operation already rejected bad indices,
    /// self-pairs and incomplete graphs, so failures here are caller bugs
    /// and surface as [`SimError`] preconditions. Absolute scores are
    /// clamped to [0, 100] by the entity.
    pub fn initialize_relationships(
        result: &RelationshipInitResult,
        players: &[PlayerSnapshot],
        now: DateTime<Utc>,
    ) -> Result<Vec<Relationship>> {
        let resolve = |index: usize| {
            index
                .checked_sub(1)
                .and_then(|i| players.get(i))
                .map(|p| p.id)
                .ok_or(SimError::PlayerIndexOutOfRange {
                    index,
                    count: players.len(),
                })
        };

        let mut edges = Vec::with_capacity(result.scores.len());
        for score in &result.scores {
            let source = resolve(score.source)?;
            let target = resolve(score.target)?;
            edges.push(Relationship::new(source, target, score.values, now)?);
        }

        debug!(edges = edges.len(), players = players.len(), "relationship graph built");
        Ok(edges)
    }
}
