//! Integration tests for the HTTP adapter, driven through the router with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use draftroom::http::router;
use draftroom::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;

// =========================================================================
// Helpers
// =========================================================================

fn app() -> Router {
    router(Arc::new(RoomManager::new(RoomConfig::default())), &[])
}

const TEAM_SETTINGS: &str = r#"{"version":"14.1","draftMode":"tournament",
    "matchFormat":"bo3","playerCount":"team","timeLimit":"30"}"#;

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_room(app: &Router) -> String {
    let settings: Value = serde_json::from_str(TEAM_SETTINGS).unwrap();
    let (status, json) = call(app, Method::POST, "/create-room", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);
    json["roomId"].as_str().unwrap().to_string()
}

// =========================================================================
// Rooms
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_room_id() {
    let app = app();
    let room_id = create_room(&app).await;
    assert_eq!(room_id.len(), 8);
    assert!(room_id.chars().all(|c| c.is_ascii_hexdigit()));

    let (status, json) = call(&app, Method::GET, &format!("/game/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["roomId"], room_id.as_str());
    assert_eq!(json["settings"]["playerCount"], "team");
    assert_eq!(json["currentSet"], 1);
    assert_eq!(json["status"], "waiting");
}

#[tokio::test]
async fn test_create_room_rejects_invalid_settings() {
    let app = app();

    let bad_mode = json!({"version": "1", "draftMode": "d", "matchFormat": "bo1",
        "playerCount": "duo", "timeLimit": "30"});
    let (status, json) = call(&app, Method::POST, "/create-room", Some(bad_mode)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].is_string());

    let missing = json!({"version": "1"});
    let (status, _) = call(&app, Method::POST, "/create-room", Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/create-room", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_room_is_404() {
    let app = app();
    for uri in ["/game/00000000", "/lobby/00000000"] {
        let (status, json) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["detail"], "room 00000000 not found");
    }

    let (status, _) = call(
        &app,
        Method::POST,
        "/lobby/00000000/join",
        Some(json!({"nickname": "faker"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Lobby
// =========================================================================

#[tokio::test]
async fn test_join_and_lobby_status() {
    let app = app();
    let room_id = create_room(&app).await;
    let join = format!("/lobby/{room_id}/join");

    let (status, host) = call(&app, Method::POST, &join, Some(json!({"nickname": "faker"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(host["isHost"], true);
    assert_eq!(host["team"], "SPECTATOR");
    assert_eq!(host["position"], -1);

    let (_, guest) = call(&app, Method::POST, &join, Some(json!({"nickname": "keria"}))).await;
    assert_eq!(guest["isHost"], false);

    let (status, lobby) = call(&app, Method::GET, &format!("/lobby/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lobby["roomId"], room_id.as_str());
    assert_eq!(lobby["users"].as_array().unwrap().len(), 2);
    assert_eq!(lobby["allReady"], true);
}

#[tokio::test]
async fn test_team_and_ready_updates_drive_all_ready() {
    let app = app();
    let room_id = create_room(&app).await;
    let join = format!("/lobby/{room_id}/join");
    let (_, _host) = call(&app, Method::POST, &join, Some(json!({"nickname": "host"}))).await;
    let (_, guest) = call(&app, Method::POST, &join, Some(json!({"nickname": "guest"}))).await;
    let guest_id = guest["id"].as_str().unwrap();

    let (status, user) = call(
        &app,
        Method::PUT,
        &format!("/lobby/{room_id}/users/{guest_id}/team"),
        Some(json!({"team": "BLUE", "position": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["team"], "BLUE");
    assert_eq!(user["position"], 2);

    let (_, lobby) = call(&app, Method::GET, &format!("/lobby/{room_id}"), None).await;
    assert_eq!(lobby["allReady"], false);

    let (status, user) = call(
        &app,
        Method::PUT,
        &format!("/lobby/{room_id}/users/{guest_id}/ready"),
        Some(json!({"isReady": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["isReady"], true);

    let (_, lobby) = call(&app, Method::GET, &format!("/lobby/{room_id}"), None).await;
    assert_eq!(lobby["allReady"], true);
}

#[tokio::test]
async fn test_update_unknown_user_is_404() {
    let app = app();
    let room_id = create_room(&app).await;

    let (status, json) = call(
        &app,
        Method::PUT,
        &format!("/lobby/{room_id}/users/ffffff/ready"),
        Some(json!({"isReady": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["detail"].as_str().unwrap().contains("ffffff"));
}

// =========================================================================
// Results
// =========================================================================

#[tokio::test]
async fn test_submit_result_advances_set() {
    let app = app();
    let room_id = create_room(&app).await;
    let uri = format!("/game/{room_id}/result");

    let (status, json) = call(
        &app,
        Method::POST,
        &uri,
        Some(json!({"winner": "BLUE", "score": {"blue": 1, "red": 0}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "waiting", "currentSet": 2}));

    let (_, room) = call(&app, Method::GET, &format!("/game/{room_id}"), None).await;
    assert_eq!(room["results"].as_array().unwrap().len(), 1);
    assert_eq!(room["currentSet"], 2);
}

#[tokio::test]
async fn test_submit_result_validation() {
    let app = app();
    let room_id = create_room(&app).await;
    let uri = format!("/game/{room_id}/result");

    let (status, _) = call(
        &app,
        Method::POST,
        &uri,
        Some(json!({"winner": "SPECTATOR", "score": {"blue": 0, "red": 0}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, &uri, Some(json!({"winner": "RED"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/game/00000000/result",
        Some(json!({"winner": "RED", "score": {"blue": 0, "red": 1}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// CORS
// =========================================================================

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/game/00000000")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origin_list() {
    let rooms = Arc::new(RoomManager::new(RoomConfig::default()));
    let app = router(rooms, &["http://draft.example".to_string()]);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/game/00000000")
        .header(header::ORIGIN, "http://draft.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://draft.example"
    );
}
