//! End-to-end HTTP tests against the router with in-memory stores and
//! no LLM provider configured.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use mh_domain::config::Config;
use mh_domain::error::{Error, Result};
use mh_domain::state::SessionState;
use mh_gateway::{api, bootstrap};
use mh_providers::NullOracle;
use mh_sessions::{MemoryDocumentStore, MemorySessionStore, SessionStore};
use mh_tools::ToolSet;

/// Session store whose disk is gone.
struct BrokenStore;

impl SessionStore for BrokenStore {
    fn get(&self, _user_id: &str) -> Result<Option<SessionState>> {
        Err(Error::Persistence("disk unavailable".into()))
    }

    fn put(&self, _user_id: &str, _state: SessionState) -> Result<()> {
        Err(Error::Persistence("disk unavailable".into()))
    }

    fn evict(&self, _user_id: &str) -> Result<bool> {
        Err(Error::Persistence("disk unavailable".into()))
    }

    fn len(&self) -> usize {
        0
    }
}

fn app_with(config: Config) -> Router {
    let sessions = Arc::new(MemorySessionStore::new(
        config.sessions.max_users,
        config.sessions.max_messages,
    ));
    app_with_store(config, sessions)
}

fn app_with_store(config: Config, sessions: Arc<dyn SessionStore>) -> Router {
    let config = Arc::new(config);
    let state = bootstrap::assemble(
        config,
        Arc::new(NullOracle),
        false,
        ToolSet::new(2000),
        sessions,
        Arc::new(MemoryDocumentStore::new()),
    );
    api::router(state.clone()).with_state(state)
}

/// Token lookup reads an env var that no test sets.
fn app() -> Router {
    let mut config = Config::default();
    config.server.api_token_env = "MH_TEST_TOKEN_UNSET".into();
    app_with(config)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_oracle_state() {
    let app = app();
    let (status, body) = send(&app, get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["oracle_ready"], false);
}

#[tokio::test]
async fn chat_answers_without_a_provider() {
    let app = app();
    let (status, body) = send(
        &app,
        post("/v1/chat", json!({ "user_id": "u1", "message": "I feel a bit low today" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u1");
    assert!(!body["final_message"].as_str().unwrap().is_empty());
    assert!(body["messages"].as_array().unwrap().len() >= 1);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = app();
    let (status, body) = send(&app, post("/v1/chat", json!({ "user_id": "u1", "message": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn history_survives_turns_and_can_be_cleared() {
    let app = app();
    send(&app, post("/v1/chat", json!({ "user_id": "u2", "message": "hello there" }))).await;
    send(&app, post("/v1/chat", json!({ "user_id": "u2", "message": "how are you?" }))).await;

    let (status, body) = send(&app, get("/v1/chat/u2/history")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    let user_msgs: Vec<&str> = messages
        .iter()
        .filter(|m| m["role"] == "user")
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(user_msgs, vec!["hello there", "how are you?"]);
    assert!(messages.iter().all(|m| m["role"] != "system"));

    let resp = app
        .clone()
        .oneshot(Request::delete("/v1/chat/u2/history").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, body) = send(&app, get("/v1/chat/u2/history")).await;
    assert!(body["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn resources_list_crisis_contacts() {
    let app = app();
    let (status, body) = send(&app, get("/v1/resources")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["crisis_resources"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn journal_reports_patterns_after_five_entries() {
    let app = app();
    for (emotion, ts) in [
        ("happy", "2024-05-01T08:00:00+06:00"),
        ("happy", "2024-05-01T09:00:00+06:00"),
        ("sad", "2024-05-01T14:00:00+06:00"),
        ("happy", "2024-05-01T19:00:00+06:00"),
        ("calm", "2024-05-01T20:00:00+06:00"),
    ] {
        let (status, _) = send(
            &app,
            post(
                "/v1/journal",
                json!({ "user_id": "j1", "emotion": emotion, "score": 0.8, "source": "face", "timestamp": ts }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/v1/journal/j1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 5);
    assert_eq!(body["patterns"]["most_common"], "happy");
    assert_eq!(body["patterns"]["time_patterns"]["morning"], "happy");
}

#[tokio::test]
async fn journal_below_threshold_has_no_patterns() {
    let app = app();
    send(
        &app,
        post("/v1/journal", json!({ "user_id": "j2", "emotion": "calm", "score": 0.5, "source": "voice" })),
    )
    .await;
    let (_, body) = send(&app, get("/v1/journal/j2")).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert!(body["patterns"].is_null());
}

#[tokio::test]
async fn diary_analysis_falls_back_without_provider() {
    let app = app();
    let entry = json!({ "user_id": "d1", "date": "2024-05-01", "content": "<p>Long day at work.</p>" });
    let (status, body) = send(&app, post("/v1/diary/analyze", entry)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"], "Error in mood analysis");
}

#[tokio::test]
async fn diary_entries_are_stored_and_searchable() {
    let app = app();
    let (status, stored) = send(
        &app,
        post(
            "/v1/diary",
            json!({ "user_id": "d2", "date": "2024-05-02", "content": "<b>Walked</b> by the river" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!stored["id"].as_str().unwrap().is_empty());

    send(
        &app,
        post("/v1/diary", json!({ "user_id": "d2", "date": "2024-05-03", "content": "Cooked dinner" })),
    )
    .await;

    let (status, body) = send(&app, get("/v1/diary/search?user_id=d2&query=river")).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["date"], "2024-05-02");

    let (_, body) = send(&app, get("/v1/diary/search?user_id=d2&query=recent")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn api_token_guards_protected_routes() {
    let var = "MH_TEST_TOKEN_GUARD";
    std::env::set_var(var, "s3cret");
    let mut config = Config::default();
    config.server.api_token_env = var.into();
    let app = app_with(config);

    let (status, _) = send(&app, get("/v1/resources")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::get("/v1/resources")
        .header("authorization", "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    // Health stays public.
    let (status, _) = send(&app, get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn storage_failure_is_service_unavailable() {
    let mut config = Config::default();
    config.server.api_token_env = "MH_TEST_TOKEN_UNSET".into();
    let app = app_with_store(config, Arc::new(BrokenStore));

    let (status, body) = send(
        &app,
        post("/v1/chat", json!({ "user_id": "s1", "message": "are you there?" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "persistence: disk unavailable");

    let (status, body) = send(&app, get("/v1/chat/s1/history")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("disk unavailable"));
}

#[tokio::test]
async fn feedback_is_listed_and_summarized() {
    let app = app();
    for (helpful, improvement, ts) in [
        (true, None, "2024-05-01T09:00:00+06:00"),
        (false, Some("felt unclear"), "2024-05-01T10:00:00+06:00"),
        (false, Some("Unclear and needs more detail"), "2024-05-02T10:00:00+06:00"),
        (true, None, "2024-05-02T11:00:00+06:00"),
    ] {
        let (status, body) = send(
            &app,
            post(
                "/v1/feedback",
                json!({
                    "user_id": "f1",
                    "timestamp": ts,
                    "assistant_message": "Have you tried a short walk?",
                    "user_message": "I feel stuck",
                    "helpful": helpful,
                    "improvement": improvement,
                    "message_id": 3,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
    }

    let (status, body) = send(&app, get("/v1/feedback?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["feedback"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1]["timestamp"], "2024-05-02T11:00:00+06:00");

    let (status, body) = send(&app, get("/v1/feedback/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 4);
    assert_eq!(body["stats"]["helpful_percentage"], 50.0);
    assert_eq!(body["common_improvement_themes"][0]["theme"], "unclear");
    assert_eq!(body["common_improvement_themes"][0]["count"], 2);
    assert_eq!(body["daily_stats"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn feedback_analytics_without_data() {
    let app = app();
    let (status, body) = send(&app, get("/v1/feedback/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No feedback data available");
    assert_eq!(body["stats"]["total"], 0);
}

#[tokio::test]
async fn emotion_insights_by_source() {
    let app = app();
    let (status, body) = send(&app, get("/v1/emotion-insights/face/Sad")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["local_resources"].as_str().unwrap().contains("Kaan Pete Roi"));
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);

    let (status, body) = send(&app, get("/v1/emotion-insights/voice/calm")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("local_resources").is_none());

    let (status, _) = send(&app, get("/v1/emotion-insights/voice/disgust")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, get("/v1/emotion-insights/text/sad")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
