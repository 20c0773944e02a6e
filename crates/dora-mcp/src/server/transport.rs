//! HTTP transport.
//!
//! One axum router carries every HTTP surface:
//! - MCP Streamable HTTP (`POST /mcp`, `GET /mcp` for the SSE stream)
//! - Legacy HTTP+SSE (`GET /sse`, `POST /messages`)
//! - Plain REST (`POST /search`, `POST /abstract`, `POST /fulltext`)
//! - OpenAPI documents, health and tool listing

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::openapi;
use super::rpc::{Dispatcher, JsonRpcResponse, codes};
use super::session::{Session, SessionManager};
use crate::config::server::{DEFAULT_PROTOCOL_VERSION, SERVICE_NAME, SERVICE_TITLE};
use crate::error::ClientError;
use crate::formatters;
use crate::models::{FulltextInput, Lookup, PublicationInput, SearchPublicationsInput};

/// Header carrying the MCP session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Query parameters naming a session.
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId", alias = "session_id")]
    session_id: Option<String>,
}

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub dispatcher: Dispatcher,
    pub sessions: Arc<SessionManager>,
    /// Public base URL for endpoint announcements and OpenAPI documents.
    pub base_url: String,
}

/// Create the HTTP router.
pub fn create_router(dispatcher: Dispatcher, base_url: String) -> Router {
    let sessions = Arc::new(SessionManager::new());
    Arc::clone(&sessions).spawn_sweeper();

    let state = Arc::new(HttpState {
        dispatcher,
        sessions,
        base_url: base_url.trim_end_matches('/').to_string(),
    });

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        // Streamable HTTP transport
        .route("/mcp", post(handle_mcp_post).get(handle_mcp_get))
        // Legacy SSE transport
        .route("/sse", get(handle_sse_legacy))
        .route("/messages", post(handle_mcp_post))
        .route("/message", post(handle_mcp_post))
        // REST
        .route("/search", post(rest_search))
        .route("/abstract", post(rest_abstract))
        .route("/fulltext", post(rest_fulltext))
        // API descriptions
        .route("/openapi.json", get(openapi_rest))
        .route("/openapi-minimal.json", get(openapi_minimal))
        .route("/openapi-copilot.json", get(openapi_copilot))
        .route("/openapi-connector.json", get(openapi_connector))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn endpoints() -> serde_json::Value {
    json!({
        "health": "GET /health",
        "tools": "GET /tools",
        "mcp": "POST /mcp",
        "mcp_stream": "GET /mcp",
        "sse": "GET /sse",
        "messages": "POST /messages",
        "search": "POST /search",
        "abstract": "POST /abstract",
        "fulltext": "POST /fulltext",
        "openapi": [
            "/openapi.json",
            "/openapi-minimal.json",
            "/openapi-copilot.json",
            "/openapi-connector.json"
        ]
    })
}

async fn service_info(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let tools: Vec<&str> = state.dispatcher.tools().iter().map(|t| t.name()).collect();
    Json(json!({
        "service": SERVICE_TITLE,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP server for the DORA publication repository",
        "endpoints": endpoints(),
        "mcp_protocol": {
            "version": DEFAULT_PROTOCOL_VERSION,
            "transports": ["streamable-http", "sse", "stdio"],
            "endpoint": format!("{}/mcp", state.base_url)
        },
        "tools": tools
    }))
}

async fn health_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.session_count().await,
        "endpoints": endpoints()
    }))
}

async fn list_tools(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({ "tools": state.dispatcher.tool_infos() }))
}

fn session_id<'a>(query: &'a SessionQuery, headers: &'a HeaderMap) -> Option<&'a str> {
    query
        .session_id
        .as_deref()
        .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
}

fn last_event_id(headers: &HeaderMap) -> u64 {
    headers
        .get("last-event-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn with_session_header(mut response: Response, session: &Session) -> Response {
    if let Ok(value) = HeaderValue::from_str(&session.id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

/// Handle JSON-RPC POSTs (`/mcp`, `/messages`, `/message`).
///
/// The response is returned in the body. When the request belongs to a
/// session it is also published to the session stream for SSE clients.
/// Only `initialize` opens a session; other requests without a known
/// session are answered statelessly.
async fn handle_mcp_post(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let requested = session_id(&query, &headers);

    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            let error = JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {e}"));
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let opens_session = value.get("method").and_then(|m| m.as_str()) == Some("initialize");
    let session = if opens_session {
        Some(state.sessions.get_or_create_session(requested).await)
    } else {
        match requested {
            Some(id) => state.sessions.resume(id).await,
            None => None,
        }
    };

    let Some(response) = state.dispatcher.handle_value(value).await else {
        let accepted = StatusCode::ACCEPTED.into_response();
        return match &session {
            Some(session) => with_session_header(accepted, session),
            None => accepted,
        };
    };

    let Some(session) = session else {
        return Json(response).into_response();
    };

    match serde_json::to_string(&response) {
        Ok(data) => {
            session.publish("message", data).await;
        }
        Err(e) => tracing::warn!(error = %e, "Could not serialize response for session stream"),
    }

    with_session_header(Json(response).into_response(), &session)
}

/// Replay events after `last_event_id`, then follow live events.
async fn session_stream(
    session: Arc<Session>,
    last_event_id: u64,
) -> impl Stream<Item = Result<Event, Infallible>> {
    // Subscribe before reading the backlog so nothing published in between is lost.
    let receiver = session.subscribe();
    let replay = session.replay_after(last_event_id).await;
    let high_water = replay.last().map_or(last_event_id, |e| e.id);

    let replay_stream = stream::iter(replay.into_iter().map(|e| Ok(e.to_sse())));
    let live_stream = BroadcastStream::new(receiver).filter_map(move |result| async move {
        match result {
            Ok(event) if event.id > high_water => Some(Ok(event.to_sse())),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Broadcast lag, client will catch up");
                None
            }
        }
    });

    replay_stream.chain(live_stream)
}

fn sse_response(
    session: &Session,
    stream: impl Stream<Item = Result<Event, Infallible>> + Send + 'static,
) -> Response {
    let response = (
        [
            ("x-accel-buffering", "no"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping")),
    )
        .into_response();
    with_session_header(response, session)
}

/// SSE stream of a Streamable HTTP session.
async fn handle_mcp_get(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Response {
    let last_event_id = last_event_id(&headers);
    let session = state.sessions.get_or_create_session(session_id(&query, &headers)).await;

    tracing::info!(session_id = %session.id, last_event_id, "New SSE stream connection");

    let stream = session_stream(Arc::clone(&session), last_event_id).await;
    sse_response(&session, stream)
}

/// Legacy HTTP+SSE endpoint: announces where to POST messages.
async fn handle_sse_legacy(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Response {
    let last_event_id = last_event_id(&headers);

    let resumed = match session_id(&query, &headers) {
        Some(id) => state.sessions.get_session(id).await,
        None => None,
    };
    let session = match resumed {
        Some(session) => session,
        None => {
            let session = state.sessions.create_session().await;
            let endpoint = format!("{}/messages?sessionId={}", state.base_url, session.id);
            session.publish("endpoint", endpoint).await;
            session
        }
    };

    tracing::info!(session_id = %session.id, last_event_id, "New legacy SSE connection");

    let stream = session_stream(Arc::clone(&session), last_event_id).await;
    sse_response(&session, stream)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn upstream_error(prefix: &str, err: &ClientError) -> Response {
    tracing::error!(error = %err, "Upstream request failed");
    let status = StatusCode::from_u16(err.gateway_status()).unwrap_or(StatusCode::BAD_GATEWAY);
    error_response(status, formatters::format_error(prefix, &err.to_string()))
}

fn lookup_response<T: serde::Serialize>(lookup: &Lookup<T>) -> Response {
    let status = if lookup.is_found() { StatusCode::OK } else { StatusCode::NOT_FOUND };
    (status, Json(lookup)).into_response()
}

/// `POST /search`: raw DORA JSON for `{ "search_string": ... }`.
async fn rest_search(
    State(state): State<Arc<HttpState>>,
    body: Result<Json<SearchPublicationsInput>, JsonRejection>,
) -> Response {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let term = match input.validate() {
        Ok(term) => term,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_user_message()),
    };

    match state.dispatcher.context().client.search(term).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => upstream_error(formatters::SEARCH_ERROR_PREFIX, &e),
    }
}

/// `POST /abstract`
async fn rest_abstract(
    State(state): State<Arc<HttpState>>,
    body: Result<Json<PublicationInput>, JsonRejection>,
) -> Response {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let id = match input.validate() {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_user_message()),
    };

    match state.dispatcher.context().client.get_abstract(&id).await {
        Ok(lookup) => lookup_response(&lookup),
        Err(e) => upstream_error(formatters::PUBLICATION_ERROR_PREFIX, &e),
    }
}

/// `POST /fulltext`
async fn rest_fulltext(
    State(state): State<Arc<HttpState>>,
    body: Result<Json<FulltextInput>, JsonRejection>,
) -> Response {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let id = match input.validate() {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_user_message()),
    };

    let client = &state.dispatcher.context().client;
    match client.download_fulltext(&id, input.include_content).await {
        Ok(lookup) => lookup_response(&lookup),
        Err(e) => upstream_error(formatters::PUBLICATION_ERROR_PREFIX, &e),
    }
}

async fn openapi_rest(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(openapi::rest_spec(&state.base_url))
}

async fn openapi_minimal(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(openapi::minimal_spec(&state.base_url))
}

async fn openapi_copilot(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(openapi::copilot_spec(&state.base_url))
}

async fn openapi_connector(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(openapi::connector_spec(&state.base_url))
}
