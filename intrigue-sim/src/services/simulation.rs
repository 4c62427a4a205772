//! Applies a validated tick result to mutable game state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::error::{Result, SimError};
use crate::event::{GameEvent, GameEventKind};
use crate::ops::tick::{RelationshipDelta, SimulateTickResult};
use crate::relationship::Relationship;
use crate::types::{GameClock, GameId, PlayerId, PlayerSnapshot};

/// Per-dimension delta bound enforced at apply time, tighter than and
/// independent of the operation's parse-time bound. The tighter bound
/// wins.
pub const SERVICE_DELTA_CLAMP: i32 = 15;

/// Outcome of applying one tick: the emitted events plus delta accounting.
#[derive(Debug)]
pub struct AppliedTick {
    /// Events to append to the timeline, in emission order.
    pub events: Vec<GameEvent>,
    /// Deltas applied to an existing edge.
    pub deltas_applied: usize,
    /// Deltas dropped because no edge existed for the pair.
    pub deltas_dropped: usize,
}

/// Applies validated tick results: emits events, adjusts relationship
/// edges under the service-layer clamp.
pub struct SimulationService;

impl SimulationService {
    /// Apply a tick result.
    ///
    /// `players` must be in the same index order the operation context
    /// used (caller invariant). `edges` is the existing relationship graph
    /// keyed by `(source id, target id)`; deltas referencing a pair with
    /// no edge are dropped; edges are only created during initialization,
    /// never on demand.
    ///
    /// # Errors
    /// Returns a [`SimError`] precondition violation when `human_index`
    /// or a delta index does not point into `players`. Delta indices were
    /// validated at parse time against the same index space, so hitting
    /// that here means the caller supplied a different player list.
    pub fn apply_simulation(
        result: &SimulateTickResult,
        game: GameId,
        players: &[PlayerSnapshot],
        human_index: Option<usize>,
        edges: &mut HashMap<(PlayerId, PlayerId), Relationship>,
        clock: &GameClock,
        now: DateTime<Utc>,
    ) -> Result<AppliedTick> {
        let human = match human_index {
            Some(index) => Some(players.get(index).ok_or(SimError::HumanIndexOutOfRange {
                index,
                count: players.len(),
            })?),
            None => None,
        };

        let mut events = Vec::new();
        events.push(
            GameEvent::new(game, GameEventKind::TickSimulation, clock, now)
                .with_narrative(result.narrative.clone())
                .with_metadata(json!({
                    "headline": result.headline,
                    "mood": result.mood,
                    "players_nearby": result.players_nearby,
                    "relationship_changes": result.relationship_changes,
                })),
        );

        if let Some(human) = human {
            events.push(
                GameEvent::new(game, GameEventKind::PlayerPerspective, clock, now)
                    .with_player(human.id)
                    .with_narrative(result.player_narrative.clone()),
            );
        }

        let mut deltas_applied = 0;
        let mut deltas_dropped = 0;
        for delta in &result.relationship_changes {
            let source = Self::resolve(players, delta.source)?;
            let target = Self::resolve(players, delta.target)?;

            let Some(edge) = edges.get_mut(&(source, target)) else {
                debug!(
                    source = delta.source,
                    target = delta.target,
                    "dropping delta for missing edge"
                );
                deltas_dropped += 1;
                continue;
            };

            Self::apply_delta(edge, delta, now);
            deltas_applied += 1;
        }

        Ok(AppliedTick {
            events,
            deltas_applied,
            deltas_dropped,
        })
    }

    /// Resolve a 1-based index into a player id.
    fn resolve(players: &[PlayerSnapshot], index: usize) -> Result<PlayerId> {
        index
            .checked_sub(1)
            .and_then(|i| players.get(i))
            .map(|p| p.id)
            .ok_or(SimError::PlayerIndexOutOfRange {
                index,
                count: players.len(),
            })
    }

    /// Apply one delta to an edge, re-clamped to ±[`SERVICE_DELTA_CLAMP`].
    fn apply_delta(edge: &mut Relationship, delta: &RelationshipDelta, now: DateTime<Utc>) {
        let clamp = |d: i32| d.clamp(-SERVICE_DELTA_CLAMP, SERVICE_DELTA_CLAMP);
        edge.adjust_trust(clamp(delta.trust_delta), now);
        edge.adjust_affinity(clamp(delta.affinity_delta), now);
        edge.adjust_respect(clamp(delta.respect_delta), now);
        edge.adjust_threat(clamp(delta.threat_delta), now);
    }
}
