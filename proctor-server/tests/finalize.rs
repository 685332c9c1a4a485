//! The finalize protocol: the director's result submission and the
//! director-failure path both publish exactly one result and trigger
//! shutdown.

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio::time::timeout;

mod support;

use support::{room, rpc};

#[tokio::test]
async fn put_result_publishes_once_and_triggers_shutdown() {
    let mut room = room().await;

    let response = rpc(
        &room.router,
        Some("tok-director"),
        "/api/v1/director/result",
        json!({"id": "", "message": "all moves played", "status": "success"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    timeout(Duration::from_secs(5), room.shutdown.recv())
        .await
        .expect("shutdown in time")
        .expect("shutdown signal");

    assert_eq!(room.epilogue.writes.load(Ordering::SeqCst), 1);
    let results = room.epilogue.results.lock().unwrap();
    assert_eq!(results.len(), 1);
    // The configured room id is stamped onto results submitted without one.
    assert_eq!(results[0].id, "room-1");
    assert_eq!(results[0].message, "all moves played");
}

#[tokio::test]
async fn repeated_results_are_ignored_after_the_first() {
    let mut room = room().await;

    for message in ["first", "second"] {
        let response = rpc(
            &room.router,
            Some("tok-director"),
            "/api/v1/director/result",
            json!({"id": "", "message": message, "status": "success"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    timeout(Duration::from_secs(5), room.shutdown.recv())
        .await
        .expect("shutdown in time")
        .expect("shutdown signal");
    tokio::task::yield_now().await;

    assert_eq!(room.epilogue.writes.load(Ordering::SeqCst), 1);
    assert_eq!(room.epilogue.results.lock().unwrap()[0].message, "first");
}

#[tokio::test]
async fn non_directors_cannot_submit_results() {
    let room = room().await;

    let response = rpc(
        &room.router,
        Some("tok-alice"),
        "/api/v1/director/result",
        json!({"id": "", "message": "nope", "status": "success"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(room.epilogue.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn director_failure_synthesizes_a_failed_result() {
    let mut room = room().await;

    let response = rpc(
        &room.router,
        Some("tok-operator"),
        "/api/v1/operator/status",
        json!({"name": "director-1", "status": "failed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    timeout(Duration::from_secs(5), room.shutdown.recv())
        .await
        .expect("shutdown in time")
        .expect("shutdown signal");

    assert_eq!(room.epilogue.writes.load(Ordering::SeqCst), 1);
    let results = room.epilogue.results.lock().unwrap();
    assert_eq!(results[0].id, "room-1");
    assert_eq!(results[0].message, "director failed");
    assert!(matches!(
        results[0].status,
        proctor_model::ResultStatus::Failed
    ));
}

#[tokio::test]
async fn actor_failure_is_not_room_terminal() {
    let room = room().await;

    let response = rpc(
        &room.router,
        Some("tok-operator"),
        "/api/v1/operator/status",
        json!({"name": "alice", "status": "failed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::task::yield_now().await;
    assert_eq!(room.epilogue.writes.load(Ordering::SeqCst), 0);

    // The status write itself landed.
    let response = rpc_get_actor_status(&room, "alice").await;
    assert_eq!(response, "failed");
}

async fn rpc_get_actor_status(room: &support::TestRoom, name: &str) -> String {
    let response = support::rpc_get(&room.router, Some("tok-director"), "/api/v1/director/actors")
        .await;
    let actors = support::sse_body(response).await;
    actors
        .iter()
        .find(|a| a["name"] == name)
        .and_then(|a| a["status"].as_str())
        .map(str::to_string)
        .expect("actor present")
}
