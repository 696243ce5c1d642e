//! HTTP and SSE transports.
//!
//! One axum router serves three surfaces:
//! - `GET /api/health`: liveness, healthy from startup regardless of
//!   whether a portal session exists yet;
//! - `GET /api/tools`: the capability document, no authentication;
//! - `POST /api/tool`: direct tool invocation answering with the envelope;
//! - `GET /sse` + `POST /messages?session_id=`: JSON-RPC over server-sent
//!   events for push-stream clients.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use futures_util::Stream;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::jsonrpc::{JsonRpcResponse, PARSE_ERROR};
use crate::service::McpService;

/// Shared state of the HTTP transports.
pub struct HttpState {
    service: Arc<McpService>,
    /// Live SSE connections, keyed by session id.
    streams: Mutex<HashMap<Uuid, mpsc::Sender<Event>>>,
}

impl HttpState {
    pub fn new(service: Arc<McpService>) -> Self {
        Self {
            service,
            streams: Mutex::new(HashMap::new()),
        }
    }
}

pub fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tools", get(list_tools))
        .route("/api/tool", post(invoke_tool))
        .route("/sse", get(open_sse))
        .route("/messages", post(post_message))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Capability document: every tool with its parameter schema and scope.
/// Discoverable without authenticating.
async fn list_tools(State(state): State<Arc<HttpState>>) -> Json<Value> {
    let tools: Vec<Value> = state
        .service
        .dispatcher()
        .registry()
        .specs()
        .map(|spec| {
            json!({
                "name": spec.name,
                "description": spec.description,
                "parameters": spec.input_schema(),
                "required_scope": spec.required_scope,
            })
        })
        .collect();
    Json(json!({"tools": tools}))
}

#[derive(Deserialize)]
struct ToolInvocation {
    tool_name: String,
    #[serde(default)]
    arguments: Value,
}

/// Direct invocation: the response body is the envelope, verbatim.
async fn invoke_tool(
    State(state): State<Arc<HttpState>>,
    Json(invocation): Json<ToolInvocation>,
) -> Json<Value> {
    let dispatcher = state.service.dispatcher();
    let envelope = dispatcher
        .dispatch(
            &invocation.tool_name,
            &invocation.arguments,
            dispatcher.caller_scope(),
        )
        .await;
    Json(serde_json::to_value(&envelope).unwrap_or_else(
        |_| json!({"error": {"kind": "backend", "message": "unserializable result"}}),
    ))
}

/// Removes a session's map entry when its stream is dropped. Clients that
/// disconnect without ever posting would otherwise leave their sender behind
/// for the process lifetime.
struct StreamGuard {
    state: Arc<HttpState>,
    session_id: Uuid,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let state = Arc::clone(&self.state);
        let session_id = self.session_id;
        tokio::spawn(async move {
            if state.streams.lock().await.remove(&session_id).is_some() {
                tracing::info!(%session_id, "SSE stream closed");
            }
        });
    }
}

/// Open an SSE stream. The first event tells the client where to POST its
/// JSON-RPC messages; responses arrive as `message` events on this stream.
async fn open_sse(
    State(state): State<Arc<HttpState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel::<Event>(64);

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?session_id={session_id}"));
    // The channel has capacity; the only send that can fail is after the
    // receiver is dropped, which cannot have happened yet.
    let _ = tx.send(endpoint).await;

    state.streams.lock().await.insert(session_id, tx);
    tracing::info!(%session_id, "SSE stream opened");

    // The guard rides along with the receiver so the map entry goes away
    // when the connection does, not only when a later post fails.
    let guard = StreamGuard {
        state: Arc::clone(&state),
        session_id,
    };
    let stream = futures_util::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        rx.recv().await.map(|event| (Ok(event), (rx, guard)))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Deserialize)]
struct MessageQuery {
    session_id: Uuid,
}

/// Feed one JSON-RPC request into an SSE session.
async fn post_message(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> StatusCode {
    let tx = match state.streams.lock().await.get(&query.session_id) {
        Some(tx) => tx.clone(),
        None => return StatusCode::NOT_FOUND,
    };

    let response = match serde_json::from_str(&body) {
        Ok(request) => state.service.handle(request).await,
        Err(e) => Some(JsonRpcResponse::error(
            Value::Null,
            PARSE_ERROR,
            format!("Parse error: {e}"),
        )),
    };

    if let Some(response) = response {
        let data = match serde_json::to_string(&response) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to serialize response: {e}");
                return StatusCode::INTERNAL_SERVER_ERROR;
            }
        };
        let event = Event::default().event("message").data(data);
        if tx.send(event).await.is_err() {
            // Client went away; drop the dead stream. The in-flight portal
            // work already completed and its result is simply discarded.
            state.streams.lock().await.remove(&query.session_id);
            tracing::info!(session_id = %query.session_id, "SSE stream closed by client");
            return StatusCode::GONE;
        }
    }
    StatusCode::ACCEPTED
}
