//! Test harness: boots the real router over an in-memory store from literal
//! YAML documents and drives it through `tower::ServiceExt`.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use futures_util::StreamExt;
use tower::ServiceExt;

use proctor_config::load_room_config;
use proctor_core::{
    Broker, Epilogue, Finalizer, Manager, Result as CoreResult, ShutdownReceiver, SqliteStorage,
};
use proctor_model::RoomResult;
use proctor_server::{AppState, api_router};

pub const RULES: &str = r#"
director:
  - key: {namespace: game1}
    methods: [get, get-all, put, delete, delete-all, watch]
operator: []
master:
  - key: {}
    methods: [get, get-all, watch]
actors:
  player:
    - key: {type: action, namespace: game1}
      methods: [put, get, watch]
    - key: {type: world, namespace: game1}
      methods: [get, get-all, watch]
  spectator:
    - key: {type: action, namespace: game1}
      methods: [get-all, watch]
"#;

pub const CREDENTIALS: &str = r#"
- name: director-1
  token: tok-director
  character: director
- name: operator-1
  token: tok-operator
  character: operator
- name: master-1
  token: tok-master
  character: master
- name: alice
  token: tok-alice
  character: actor
  role: player
- name: bob
  token: tok-bob
  character: actor
  role: spectator
"#;

/// Records every published result instead of leaving the process.
#[derive(Default)]
pub struct CountingEpilogue {
    pub writes: AtomicUsize,
    pub results: Mutex<Vec<RoomResult>>,
}

#[async_trait]
impl Epilogue for CountingEpilogue {
    async fn write(&self, result: &RoomResult) -> CoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn test(&self) -> CoreResult<()> {
        Ok(())
    }
}

pub struct TestRoom {
    pub router: Router,
    pub epilogue: Arc<CountingEpilogue>,
    pub shutdown: ShutdownReceiver,
}

pub async fn room() -> TestRoom {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("rules.yaml"), RULES).expect("rules.yaml");
    fs::write(dir.path().join("credentials.yaml"), CREDENTIALS).expect("credentials.yaml");

    let config = load_room_config(dir.path()).expect("room config");
    let storage = SqliteStorage::open(None, &config).await.expect("storage");

    let epilogue = Arc::new(CountingEpilogue::default());
    let (finalizer, shutdown) = Finalizer::new("room-1", epilogue.clone());

    let broker = Arc::new(Broker::new(Arc::new(storage)));
    let manager = Arc::new(Manager::new(Arc::clone(&broker), finalizer));
    let router = api_router(AppState { broker, manager });

    TestRoom {
        router,
        epilogue,
        shutdown,
    }
}

/// POST an RPC body; `token: None` leaves the metadata out entirely.
pub async fn rpc(
    router: &Router,
    token: Option<&str>,
    path: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("token", token);
    }

    router
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).expect("request"))
        .await
        .expect("response")
}

pub async fn rpc_get(router: &Router, token: Option<&str>, path: &str) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }

    router
        .clone()
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Collects a finite SSE response and parses every data event.
pub async fn sse_body(response: Response<Body>) -> Vec<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 body");

    text.split("\n\n")
        .filter_map(parse_event)
        .collect()
}

fn parse_event(chunk: &str) -> Option<serde_json::Value> {
    let data: Vec<&str> = chunk
        .lines()
        .filter_map(|line| line.strip_prefix("data: ").or(line.strip_prefix("data:")))
        .collect();
    if data.is_empty() {
        return None;
    }
    serde_json::from_str(&data.join("\n")).ok()
}

/// Incremental reader over a live SSE stream (watch). Skips keep-alive
/// comments; `next_event` resolves when a full data event has arrived.
pub struct SseReader {
    stream: axum::body::BodyDataStream,
    buffer: String,
}

impl SseReader {
    pub fn new(response: Response<Body>) -> Self {
        Self {
            stream: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    pub async fn next_event(&mut self) -> Option<serde_json::Value> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let chunk: String = self.buffer.drain(..end + 2).collect();
                if let Some(event) = parse_event(&chunk) {
                    return Some(event);
                }
                continue;
            }

            let frame = self.stream.next().await?.expect("stream frame");
            self.buffer
                .push_str(std::str::from_utf8(&frame).expect("utf-8 frame"));
        }
    }
}
