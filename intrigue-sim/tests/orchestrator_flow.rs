//! Orchestrator flow against a canned local provider: the audit log must
//! distinguish "the model responded" from "the response was usable".

use chrono::Utc;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use intrigue_llm::{AiCallResult, AiConfig, AiError, AiLogStatus, AiOrchestrator, GeminiClient, PromptEngine};
use intrigue_sim::{GameClock, GameId, PlayerId, PlayerSnapshot, SimulateTickOperation, build_tick_context};

/// Serve exactly one HTTP request with a canned 200 response, returning
/// the base URL to point the client at.
async fn spawn_one_shot_provider(response_body: String) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = vec![0u8; 64 * 1024];
        let mut read_total = 0;
        loop {
            let n = socket.read(&mut buf[read_total..]).await.expect("read");
            read_total += n;
            let text = String::from_utf8_lossy(&buf[..read_total]);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if read_total >= header_end + 4 + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
    });

    format!("http://{addr}")
}

fn gemini_envelope(content: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": content }] },
            "finishReason": "STOP",
        }],
        "usageMetadata": {
            "promptTokenCount": 200,
            "candidatesTokenCount": 80,
            "totalTokenCount": 280,
        },
        "modelVersion": "gemini-2.0-flash-001",
    })
    .to_string()
}

fn tick_operation() -> SimulateTickOperation {
    let players = vec![
        PlayerSnapshot {
            id: PlayerId::new(),
            name: "Ada".to_string(),
            persona: "a quiet archivist".to_string(),
            backstory: String::new(),
        },
        PlayerSnapshot {
            id: PlayerId::new(),
            name: "Brin".to_string(),
            persona: "a restless gambler".to_string(),
            backstory: String::new(),
        },
    ];
    let context = build_tick_context(
        GameId::new(),
        GameClock { day: 1, hour: 19, tick: 4 },
        &players,
        0,
        "listens at the study door",
        &[],
        &[],
        10,
    );
    SimulateTickOperation::new(context).expect("valid context")
}

async fn orchestrator_for(base_url: &str) -> AiOrchestrator {
    let config = AiConfig::from_toml(&format!(
        "api_key = \"test-key\"\nbase_url = \"{base_url}\"\ntimeout_ms = 5000\n"
    ))
    .expect("config");
    AiOrchestrator::new(GeminiClient::new(&config), PromptEngine::builtin())
}

#[tokio::test]
async fn success_path_records_full_audit_trail() {
    let content = json!({
        "narrative": "Ada presses her ear to the study door.",
        "player_narrative": "Muffled voices argue about money.",
        "headline": "Eavesdropping",
        "mood": "furtive",
        "players_nearby": [2],
        "relationship_changes": [],
    })
    .to_string();
    let base_url = spawn_one_shot_provider(gemini_envelope(&content)).await;

    let op = tick_operation();
    let outcome = orchestrator_for(&base_url).await.execute(&op, Utc::now()).await;

    match outcome {
        AiCallResult::Success { value, log } => {
            assert_eq!(value.headline, "Eavesdropping");
            assert_eq!(value.players_nearby, vec![2]);
            assert_eq!(log.status, AiLogStatus::Success);
            assert_eq!(log.total_tokens, Some(280));
            assert_eq!(log.finish_reason.as_deref(), Some("STOP"));
            assert_eq!(log.model_version.as_deref(), Some("gemini-2.0-flash-001"));
            assert_eq!(log.action, "simulate_tick");
            assert!(log.duration_ms.is_some());
            assert!(log.system_prompt.contains("2 players"));
            assert!(log.user_prompt.contains("<<<PLAYER_ACTION_START>>>"));
            assert!(log.request_body.contains("generationConfig"));
        }
        AiCallResult::Failure { error, .. } => panic!("expected success, got {error}"),
    }
}

#[tokio::test]
async fn parse_failure_leaves_success_status_log() {
    // The provider answered, but the content is not usable tick JSON.
    let base_url = spawn_one_shot_provider(gemini_envelope("this is not json")).await;

    let op = tick_operation();
    let outcome = orchestrator_for(&base_url).await.execute(&op, Utc::now()).await;

    match outcome {
        AiCallResult::Failure { log, error } => {
            // The model responded; the log says so even though the
            // attempt failed.
            assert_eq!(log.status, AiLogStatus::Success);
            assert!(log.error_message.is_none());
            assert_eq!(log.parsed_content.as_deref(), Some("this is not json"));
            match error {
                AiError::ResponseParsingFailed { detail, .. } => {
                    assert!(detail.contains("Invalid JSON"));
                }
                other => panic!("expected ResponseParsingFailed, got {other}"),
            }
        }
        AiCallResult::Success { .. } => panic!("unusable content must not yield success"),
    }
}

#[tokio::test]
async fn safety_block_is_typed_failure() {
    let body = json!({
        "candidates": [{ "finishReason": "SAFETY" }],
    })
    .to_string();
    let base_url = spawn_one_shot_provider(body).await;

    let op = tick_operation();
    let outcome = orchestrator_for(&base_url).await.execute(&op, Utc::now()).await;

    match outcome {
        AiCallResult::Failure { log, error } => {
            assert!(matches!(error, AiError::ResponseBlockedBySafety));
            assert_eq!(log.status, AiLogStatus::Error);
            assert!(log.error_message.as_deref().is_some_and(|m| m.contains("safety")));
        }
        AiCallResult::Success { .. } => panic!("safety block must not yield success"),
    }
}
