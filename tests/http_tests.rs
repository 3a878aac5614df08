// HTTP API tests
//
// Requests go straight into the axum Router; providers are scripted.

mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::Engine;
use common::{heard, session_config, speech, Harness};
use serde_json::{json, Value};
use talkwithme::{create_router, AppState, Topic};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

fn app(scratch: &TempDir, harness: &Harness) -> (Router, AppState) {
    let state = AppState::new(
        harness.providers(),
        session_config(scratch.path(), Topic::FreeTalking),
    );
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Ok((status, body))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn create_session(app: &Router, topic: Option<&str>) -> Result<Uuid> {
    let body = match topic {
        Some(topic) => json!({ "topic": topic }),
        None => json!({}),
    };
    let (status, body) = send(app, post_json("/sessions", body)).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["session_id"].as_str().unwrap().parse()?)
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, _) = app(&scratch, &harness);

    let (status, body) = send(&app, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_list_topics() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, _) = app(&scratch, &harness);

    let (status, body) = send(&app, get("/topics")).await?;
    assert_eq!(status, StatusCode::OK);
    let topics = body.as_array().unwrap();
    assert_eq!(topics.len(), 5);
    assert_eq!(topics[0]["id"], "free_talking");
    assert_eq!(topics[4]["label"], "Restaurant");

    Ok(())
}

#[tokio::test]
async fn test_create_session_with_and_without_topic() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, state) = app(&scratch, &harness);

    let default_id = create_session(&app, None).await?;
    let travel_id = create_session(&app, Some("travel")).await?;
    assert_eq!(state.sessions.read().await.len(), 2);

    let (_, body) = send(&app, get(&format!("/sessions/{}", default_id))).await?;
    assert_eq!(body["topic"], "free_talking");
    assert_eq!(body["mode"], "conversing");
    assert_eq!(body["dialogue"], json!([]));

    let (_, body) = send(&app, get(&format!("/sessions/{}", travel_id))).await?;
    assert_eq!(body["topic"], "travel");

    Ok(())
}

#[tokio::test]
async fn test_full_practice_flow() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    harness
        .transcriber
        .push(Ok(heard("I go to school yesterday", 70.0, 65.0, 68.0)));
    let (app, _) = app(&scratch, &harness);
    let id = create_session(&app, None).await?;

    let turn = Request::post(format!("/sessions/{}/turns", id))
        .header("content-type", "audio/wav")
        .body(Body::from(speech()))
        .unwrap();
    let (status, body) = send(&app, turn).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["user_text"], "I go to school yesterday");
    assert_eq!(body["tier"], "not_bad");
    assert_eq!(body["reply"], "Oh, what did you study?");
    assert_eq!(body["issues"], json!([]));
    assert_eq!(body["snapshot"]["turn_nonce"], 1);
    let audio = base64::engine::general_purpose::STANDARD
        .decode(body["reply_audio"].as_str().unwrap())?;
    assert_eq!(audio, b"RIFF-reply");

    let (status, body) = send(&app, post_empty(&format!("/sessions/{}/report/enter", id))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["snapshot"]["mode"], "reporting");

    let (status, body) = send(&app, get(&format!("/sessions/{}/report", id))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["turn_count"], 1);
    assert_eq!(body["average_pronunciation"], 68.0);
    assert_eq!(body["breakdown"][0]["tier_label"], "Not Bad");

    let (status, body) = send(&app, post_empty(&format!("/sessions/{}/report/exit", id))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["mode"], "conversing");
    assert_eq!(body["snapshot"]["turn_nonce"], 2);

    Ok(())
}

#[tokio::test]
async fn test_failed_recognition_is_reported_in_band() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    harness.transcriber.push(Ok(heard("Error: canceled", 0.0, 0.0, 0.0)));
    let (app, _) = app(&scratch, &harness);
    let id = create_session(&app, None).await?;

    let turn = Request::post(format!("/sessions/{}/turns", id))
        .body(Body::from(speech()))
        .unwrap();
    let (status, body) = send(&app, turn).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "transcription_failed");
    assert_eq!(body["reason"], "Error: canceled");
    assert_eq!(body["issues"], json!(["transcription_failed"]));
    assert_eq!(body["snapshot"]["turn_nonce"], 0);

    Ok(())
}

#[tokio::test]
async fn test_topic_switch_and_reset() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, _) = app(&scratch, &harness);
    let id = create_session(&app, None).await?;

    let (status, body) = send(
        &app,
        post_json(&format!("/sessions/{}/topic", id), json!({ "topic": "restaurant" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["snapshot"]["topic"], "restaurant");

    let (_, body) = send(
        &app,
        post_json(&format!("/sessions/{}/topic", id), json!({ "topic": "restaurant" })),
    )
    .await?;
    assert_eq!(body["changed"], false);

    let (status, body) = send(&app, post_empty(&format!("/sessions/{}/reset", id))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["topic"], "restaurant");
    assert_eq!(body["snapshot"]["turn_nonce"], 2);

    Ok(())
}

#[tokio::test]
async fn test_mode_gates_return_conflict() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, _) = app(&scratch, &harness);
    let id = create_session(&app, None).await?;

    let (status, body) = send(&app, get(&format!("/sessions/{}/report", id))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("report mode"));

    send(&app, post_empty(&format!("/sessions/{}/report/enter", id))).await?;
    let turn = Request::post(format!("/sessions/{}/turns", id))
        .body(Body::from(speech()))
        .unwrap();
    let (status, _) = send(&app, turn).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(harness.transcriber.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_turn_rejected_while_another_is_in_flight() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, state) = app(&scratch, &harness);
    let id = create_session(&app, None).await?;

    let session = state.session(&id).await.unwrap();
    let _busy = session.lock().await;

    let turn = Request::post(format!("/sessions/{}/turns", id))
        .body(Body::from(speech()))
        .unwrap();
    let (status, body) = send(&app, turn).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already processing"));
    assert_eq!(harness.transcriber.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() -> Result<()> {
    let scratch = TempDir::new()?;
    let harness = Harness::happy();
    let (app, _) = app(&scratch, &harness);

    let (status, _) = send(&app, get(&format!("/sessions/{}", Uuid::new_v4()))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = create_session(&app, None).await?;
    let delete = Request::delete(format!("/sessions/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/sessions/{}", id))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
