//! One-time relationship graph scoring operation.
//!
//! Unlike the tick operation, nothing here is sanitized: the graph is
//! built exactly once, before the game starts, so an incomplete or
//! malformed scoring is a structural error and the whole attempt fails.

use serde_json::{Value, json};
use std::collections::HashSet;

use intrigue_llm::{AiError, AiOperation, ChatMessage, PromptId};

use crate::error::{Result as SimResult, SimError};
use crate::relationship::RelationshipValues;
use crate::types::PlayerSnapshot;

/// One AI-scored ordered pair, 1-based indices into the player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipScore {
    /// Perceiving player, 1-based.
    pub source: usize,
    /// Perceived player, 1-based.
    pub target: usize,
    /// Absolute scores; the entity clamps them to [0, 100].
    pub values: RelationshipValues,
}

/// Validated output: exactly N * (N - 1) scored ordered pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipInitResult {
    /// All scored pairs, in model order.
    pub scores: Vec<RelationshipScore>,
}

/// Saturating i64 to i32 conversion, so absurd scores cannot wrap sign.
fn narrow(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// The relationship graph initialization use case.
#[derive(Debug, Clone)]
pub struct InitializeRelationshipsOperation {
    players: Vec<PlayerSnapshot>,
}

impl InitializeRelationshipsOperation {
    /// Create the operation over the player list (index order is the
    /// model's index space).
    ///
    /// # Errors
    /// Returns [`SimError::NotEnoughPlayers`] for fewer than two players.
    pub fn new(players: Vec<PlayerSnapshot>) -> SimResult<Self> {
        let count = players.len();
        if count < 2 {
            return Err(SimError::NotEnoughPlayers { count });
        }
        Ok(Self { players })
    }

    /// Ordered pairs expected for this player count: N * (N - 1).
    #[must_use]
    pub fn expected_pair_count(&self) -> usize {
        let n = self.players.len();
        n * (n - 1)
    }

    /// Render the numbered player roster with personas and backstories.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut out = String::from("PLAYERS:\n");
        for (i, player) in self.players.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}: {}\n   Backstory: {}\n",
                i + 1,
                player.name,
                player.persona,
                player.backstory
            ));
        }
        out.push_str(&format!(
            "\nScore every ordered pair: {} entries in total.\n",
            self.expected_pair_count()
        ));
        out
    }

    /// Required integer field on a score entry.
    fn required_int(
        obj: &serde_json::Map<String, Value>,
        field: &str,
        raw: &str,
    ) -> Result<i64, AiError> {
        obj.get(field)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                AiError::parsing(format!("relationship entry missing integer '{field}'"), raw)
            })
    }
}

impl AiOperation for InitializeRelationshipsOperation {
    type Output = RelationshipInitResult;

    fn action_name(&self) -> &'static str {
        "initialize_relationships"
    }

    fn prompt_id(&self) -> PromptId {
        PromptId::RelationshipInit
    }

    fn prompt_vars(&self) -> Vec<(String, String)> {
        vec![
            ("player_count".to_string(), self.players.len().to_string()),
            ("pair_count".to_string(), self.expected_pair_count().to_string()),
        ]
    }

    fn messages(&self) -> Vec<ChatMessage> {
        vec![ChatMessage::user(self.format_message())]
    }

    fn response_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "OBJECT",
            "properties": {
                "relationships": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "source": { "type": "INTEGER" },
                            "target": { "type": "INTEGER" },
                            "trust": { "type": "INTEGER" },
                            "affinity": { "type": "INTEGER" },
                            "respect": { "type": "INTEGER" },
                            "threat": { "type": "INTEGER" },
                        },
                        "required": ["source", "target", "trust", "affinity", "respect", "threat"],
                    },
                },
            },
            "required": ["relationships"],
        }))
    }

    fn parse(&self, content: &str) -> Result<RelationshipInitResult, AiError> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            AiError::parsing(format!("Invalid JSON in relationship response: {e}"), content)
        })?;

        let entries = value
            .get("relationships")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AiError::parsing("missing or non-array 'relationships'", content)
            })?;

        let expected = self.expected_pair_count();
        if entries.len() != expected {
            return Err(AiError::parsing(
                format!(
                    "expected {expected} relationship entries for {} players, got {}",
                    self.players.len(),
                    entries.len()
                ),
                content,
            ));
        }

        let player_count = self.players.len();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut scores = Vec::with_capacity(expected);

        for entry in entries {
            let obj = entry.as_object().ok_or_else(|| {
                AiError::parsing("relationship entry is not an object", content)
            })?;

            let source = Self::required_int(obj, "source", content)? as usize;
            let target = Self::required_int(obj, "target", content)? as usize;
            if !(1..=player_count).contains(&source) || !(1..=player_count).contains(&target) {
                return Err(AiError::parsing(
                    format!("relationship entry has out-of-range indices: {source} -> {target}"),
                    content,
                ));
            }
            if source == target {
                return Err(AiError::parsing(
                    format!("relationship entry pairs player {source} with itself"),
                    content,
                ));
            }
            if !seen.insert((source, target)) {
                return Err(AiError::parsing(
                    format!("duplicate relationship entry: {source} -> {target}"),
                    content,
                ));
            }

            scores.push(RelationshipScore {
                source,
                target,
                values: RelationshipValues {
                    trust: narrow(Self::required_int(obj, "trust", content)?),
                    affinity: narrow(Self::required_int(obj, "affinity", content)?),
                    respect: narrow(Self::required_int(obj, "respect", content)?),
                    threat: narrow(Self::required_int(obj, "threat", content)?),
                },
            });
        }

        Ok(RelationshipInitResult { scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerId;

    fn snapshot(name: &str) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(),
            name: name.to_string(),
            persona: format!("{name} persona"),
            backstory: format!("{name} grew up nearby"),
        }
    }

    fn operation(n: usize) -> InitializeRelationshipsOperation {
        let names = ["Ada", "Brin", "Cole", "Dara"];
        InitializeRelationshipsOperation::new(
            names.iter().take(n).map(|n| snapshot(n)).collect(),
        )
        .expect("valid players")
    }

    fn full_body(n: usize) -> Value {
        let mut entries = Vec::new();
        for source in 1..=n {
            for target in 1..=n {
                if source != target {
                    entries.push(json!({
                        "source": source,
                        "target": target,
                        "trust": 50, "affinity": 50, "respect": 50, "threat": 20,
                    }));
                }
            }
        }
        json!({ "relationships": entries })
    }

    #[test]
    fn constructor_rejects_single_player() {
        let err = InitializeRelationshipsOperation::new(vec![snapshot("Ada")]).expect_err("invalid input should be rejected");
        assert!(matches!(err, SimError::NotEnoughPlayers { count: 1 }));
    }

    #[test]
    fn message_lists_players_and_pair_count() {
        let msg = operation(3).format_message();
        assert!(msg.contains("1. Ada"));
        assert!(msg.contains("3. Cole"));
        assert!(msg.contains("Ada grew up nearby"));
        assert!(msg.contains("6 entries"));
    }

    #[test]
    fn parse_accepts_complete_graph() {
        let result = operation(3).parse(&full_body(3).to_string()).expect("parse");
        assert_eq!(result.scores.len(), 6);
    }

    #[test]
    fn one_missing_pair_rejected() {
        let mut body = full_body(3);
        body["relationships"].as_array_mut().expect("array").pop();
        let err = operation(3).parse(&body.to_string()).expect_err("invalid input should be rejected");
        assert!(err.to_string().contains("expected 6"));
    }

    #[test]
    fn duplicate_pair_rejected() {
        let mut body = full_body(3);
        {
            let entries = body["relationships"].as_array_mut().expect("array");
            entries.pop();
            let first = entries[0].clone();
            entries.push(first);
        }
        let err = operation(3).parse(&body.to_string()).expect_err("invalid input should be rejected");
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn self_pair_rejected() {
        let mut body = full_body(2);
        body["relationships"][0]["target"] = json!(1);
        let err = operation(2).parse(&body.to_string()).expect_err("invalid input should be rejected");
        assert!(err.to_string().contains("itself"));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let mut body = full_body(2);
        body["relationships"][0]["target"] = json!(9);
        let err = operation(2).parse(&body.to_string()).expect_err("invalid input should be rejected");
        assert!(err.to_string().contains("out-of-range"));
    }

    #[test]
    fn missing_score_field_rejected() {
        let mut body = full_body(2);
        body["relationships"][0].as_object_mut().expect("object").remove("respect");
        let err = operation(2).parse(&body.to_string()).expect_err("invalid input should be rejected");
        assert!(err.to_string().contains("respect"));
    }

    #[test]
    fn absolute_scores_carried_unclamped() {
        // Out-of-bound absolute scores are the entity's problem, not the
        // operation's.
        let mut body = full_body(2);
        body["relationships"][0]["trust"] = json!(130);
        let result = operation(2).parse(&body.to_string()).expect("parse");
        assert_eq!(result.scores[0].values.trust, 130);
    }

    #[test]
    fn non_json_rejected() {
        let err = operation(2).parse("nope").expect_err("invalid input should be rejected");
        assert!(err.to_string().contains("Invalid JSON"));
    }
}
