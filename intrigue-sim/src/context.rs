//! Pure transformation from domain read-models into operation input.
//!
//! Nothing here touches a clock, the network or storage: the same inputs
//! always produce the same context, which is what makes the prompt text
//! deterministic and testable.

use std::collections::HashMap;

use crate::event::GameEvent;
use crate::relationship::Relationship;
use crate::types::{GameClock, GameId, PlayerId, PlayerSnapshot};

/// How many recent events the tick prompt includes by default.
pub const DEFAULT_RECENT_EVENTS: usize = 10;

/// Everything the tick operation needs to format its prompt and validate
/// the response against the player index space.
#[derive(Debug, Clone)]
pub struct TickContext {
    /// Game identity.
    pub game: GameId,
    /// Clock coordinates of the tick being simulated.
    pub clock: GameClock,
    /// Players in index order; position 0 is model index 1.
    pub players: Vec<PlayerSnapshot>,
    /// 0-based index of the human player in `players`.
    pub human_index: usize,
    /// The human player's free-text action for this tick.
    pub action_text: String,
    /// Rendered relationship matrix, one edge per line.
    pub relationship_lines: Vec<String>,
    /// Rendered recent events, oldest first.
    pub recent_event_lines: Vec<String>,
}

/// Assemble a [`TickContext`] from domain read-models.
///
/// `players` order defines the index space the model's 1-based indices
/// refer to; callers must reuse the same order when applying the result.
/// `recent_events` are expected newest-first (timeline order); the last
/// `max_recent` are rendered oldest-first.
#[must_use]
pub fn build_tick_context(
    game: GameId,
    clock: GameClock,
    players: &[PlayerSnapshot],
    human_index: usize,
    action_text: &str,
    relationships: &[Relationship],
    recent_events: &[GameEvent],
    max_recent: usize,
) -> TickContext {
    TickContext {
        game,
        clock,
        players: players.to_vec(),
        human_index,
        action_text: action_text.to_string(),
        relationship_lines: render_relationship_lines(players, relationships),
        recent_event_lines: render_recent_events(recent_events, max_recent),
    }
}

/// Render the directed relationship matrix, one line per edge, in the
/// order the edges were supplied. Edges pointing at players outside the
/// supplied list are skipped.
fn render_relationship_lines(
    players: &[PlayerSnapshot],
    relationships: &[Relationship],
) -> Vec<String> {
    let names: HashMap<PlayerId, &str> =
        players.iter().map(|p| (p.id, p.name.as_str())).collect();

    relationships
        .iter()
        .filter_map(|rel| {
            let source = names.get(&rel.source)?;
            let target = names.get(&rel.target)?;
            let v = rel.values();
            Some(format!(
                "{source} -> {target}: trust={} affinity={} respect={} threat={}",
                v.trust, v.affinity, v.respect, v.threat
            ))
        })
        .collect()
}

/// Render the most recent `max_recent` events, oldest first. Events
/// without narrative text carry nothing useful for the prompt and are
/// skipped.
fn render_recent_events(recent_events: &[GameEvent], max_recent: usize) -> Vec<String> {
    let mut lines: Vec<String> = recent_events
        .iter()
        .filter_map(|e| {
            let narrative = e.narrative.as_deref()?;
            Some(format!("[day {} {:02}:00] {narrative}", e.day, e.hour))
        })
        .take(max_recent)
        .collect();
    lines.reverse();
    lines
}
