//! REST API server for the campus assistant
//!
//! Exposes the assistant, the suggestion list, the campus directory and
//! events over HTTP for the web front end.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::conversational::{Conversation, ConversationState, PendingReply};
use crate::error::AssistantError;
use crate::events;
use crate::locations;
use crate::models::{Message, QuestionCategory, ReplyKind};
use crate::selector::ResponseSelector;
use crate::state::SessionStore;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub session_id: Option<String>,
    pub question_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub upcoming: bool,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> crate::Result<Self> {
        Ok(Self {
            success: true,
            data: Some(serde_json::to_value(data)?),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    match ApiResponse::success(data) {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => fail(e),
    }
}

fn fail(error: AssistantError) -> ApiResult {
    let status = match &error {
        AssistantError::EmptyInput
        | AssistantError::InvalidSessionId(_)
        | AssistantError::UnknownCategory(_) => StatusCode::BAD_REQUEST,
        AssistantError::UnknownQuestion(_)
        | AssistantError::UnknownLocation(_)
        | AssistantError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %error, "Request failed");
    }
    (status, Json(ApiResponse::error(error.to_string())))
}

#[derive(Debug, Serialize)]
struct ChatTurn {
    session_id: Uuid,
    reply: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ReplyKind>,
    conversation: ConversationState,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub sessions: Arc<dyn SessionStore>,
    pub selector: ResponseSelector,
}

/// =============================
/// Helpers
/// =============================

fn parse_session_id(value: Option<&str>) -> Result<Option<Uuid>, AssistantError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(Some(Uuid::parse_str(v.trim())?)),
        _ => Ok(None),
    }
}

async fn open_session(
    state: &ApiState,
    session_id: Option<&str>,
) -> Result<Arc<Conversation>, AssistantError> {
    let session_id = parse_session_id(session_id)?;
    state.sessions.get_or_create(session_id).await
}

async fn finish_turn(
    conversation: &Conversation,
    pending: PendingReply,
    kind: Option<ReplyKind>,
) -> ApiResult {
    match pending.wait().await {
        Ok(reply) => ok(ChatTurn {
            session_id: conversation.id(),
            reply,
            kind,
            conversation: conversation.snapshot().await,
        }),
        Err(e) => fail(e),
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Assistant Endpoints
/// =============================

async fn list_questions(
    State(state): State<ApiState>,
    Query(query): Query<QuestionsQuery>,
) -> ApiResult {
    let table = state.selector.table();

    match query.category.as_deref() {
        Some(raw) => match raw.parse::<QuestionCategory>() {
            Ok(category) => ok(table.by_category(category).collect::<Vec<_>>()),
            Err(e) => fail(e),
        },
        None => ok(table.questions()),
    }
}

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult {
    let message = req.message.trim();
    if message.is_empty() {
        return fail(AssistantError::EmptyInput);
    }

    let conversation = match open_session(&state, req.session_id.as_deref()).await {
        Ok(conversation) => conversation,
        Err(e) => return fail(e),
    };
    info!(session_id = %conversation.id(), "Chat message received");

    // The selector is pure, so the kind matches what the pending reply produces
    let kind = state.selector.select(message).kind;

    match conversation.submit(message).await {
        Some(pending) => finish_turn(&conversation, pending, Some(kind)).await,
        None => fail(AssistantError::EmptyInput),
    }
}

async fn suggestion_handler(
    State(state): State<ApiState>,
    Json(req): Json<SuggestionRequest>,
) -> ApiResult {
    let conversation = match open_session(&state, req.session_id.as_deref()).await {
        Ok(conversation) => conversation,
        Err(e) => return fail(e),
    };

    match conversation.select_suggestion(req.question_id.trim()).await {
        Ok(pending) => finish_turn(&conversation, pending, None).await,
        Err(e) => fail(e),
    }
}

async fn get_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let session_id = match Uuid::parse_str(&session_id) {
        Ok(id) => id,
        Err(e) => return fail(e.into()),
    };

    match state.sessions.get(session_id).await {
        Ok(conversation) => ok(conversation.snapshot().await),
        Err(e) => fail(e),
    }
}

async fn delete_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let session_id = match Uuid::parse_str(&session_id) {
        Ok(id) => id,
        Err(e) => return fail(e.into()),
    };

    match state.sessions.remove(session_id).await {
        Ok(true) => ok(serde_json::json!({ "session_id": session_id, "removed": true })),
        Ok(false) => fail(AssistantError::SessionNotFound(session_id)),
        Err(e) => fail(e),
    }
}

/// =============================
/// Directory Endpoints
/// =============================

async fn list_locations(Query(query): Query<LocationsQuery>) -> ApiResult {
    match query.q.as_deref() {
        Some(q) => ok(locations::search(q)),
        None => ok(locations::CAMPUS_PLACES),
    }
}

async fn get_location(Path(key): Path<String>) -> ApiResult {
    match locations::find_by_key(&key) {
        Ok(place) => ok(place),
        Err(e) => fail(e),
    }
}

async fn list_events(Query(query): Query<EventsQuery>) -> ApiResult {
    if query.upcoming {
        ok(events::upcoming(chrono::Local::now().naive_local()))
    } else {
        ok(events::all())
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/questions", get(list_questions))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/suggestion", post(suggestion_handler))
        .route(
            "/api/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        .route("/api/locations", get(list_locations))
        .route("/api/locations/:key", get(get_location))
        .route("/api/events", get(list_events))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemorySessionStore;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router() -> Router {
        let selector = ResponseSelector::default();
        let sessions = InMemorySessionStore::new(selector, Duration::ZERO).without_welcome();
        create_router(ApiState {
            sessions: Arc::new(sessions),
            selector,
        })
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, ApiResponse) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn delete_req(uri: &str) -> Request<Body> {
        Request::delete(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let app = router();
        let (status, body) = call(
            app.clone(),
            post_json("/api/chat", serde_json::json!({ "message": "libraray" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["kind"]["type"], "keyword");
        assert_eq!(data["kind"]["question_id"], "lib");
        assert_eq!(data["conversation"]["messages"].as_array().unwrap().len(), 2);
        assert_eq!(data["conversation"]["show_suggestions"], false);

        // resume the same session
        let session_id = data["session_id"].as_str().unwrap().to_string();
        let (status, body) = call(
            app.clone(),
            post_json(
                "/api/chat",
                serde_json::json!({ "session_id": session_id, "message": "hi" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["conversation"]["messages"].as_array().unwrap().len(), 4);
        assert_eq!(data["conversation"]["show_suggestions"], true);

        let (status, body) = call(app, get_req(&format!("/api/sessions/{}", session_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap()["messages"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = router();
        let (_, body) = call(
            app.clone(),
            post_json("/api/chat", serde_json::json!({ "message": "hi" })),
        )
        .await;
        let session_id = body.data.unwrap()["session_id"].as_str().unwrap().to_string();
        let uri = format!("/api/sessions/{}", session_id);

        let (status, body) = call(app.clone(), delete_req(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap()["removed"], true);

        let (status, _) = call(app.clone(), get_req(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(app, delete_req(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_chats_stay_within_capacity() {
        let selector = ResponseSelector::default();
        let sessions = Arc::new(
            InMemorySessionStore::new(selector, Duration::ZERO)
                .without_welcome()
                .with_capacity(5),
        );
        let app = create_router(ApiState {
            sessions: sessions.clone(),
            selector,
        });

        for _ in 0..50 {
            let (status, _) = call(
                app.clone(),
                post_json("/api/chat", serde_json::json!({ "message": "hi" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(sessions.count().await, 5);
    }

    #[test]
    fn test_unserializable_data_is_an_error() {
        // JSON object keys must be strings
        let mut data = std::collections::HashMap::new();
        data.insert((1u8, 2u8), "pair");

        assert!(matches!(
            ApiResponse::success(&data),
            Err(AssistantError::SerializationError(_))
        ));
        let (status, Json(body)) = ok(&data);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_chat_rejects_bad_input() {
        let (status, body) = call(
            router(),
            post_json("/api/chat", serde_json::json!({ "message": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);

        let (status, _) = call(
            router(),
            post_json(
                "/api/chat",
                serde_json::json!({ "session_id": "not-a-uuid", "message": "hi" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            router(),
            post_json(
                "/api/chat",
                serde_json::json!({ "session_id": Uuid::new_v4(), "message": "hi" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_suggestion() {
        let (status, body) = call(
            router(),
            post_json(
                "/api/chat/suggestion",
                serde_json::json!({ "question_id": "gym" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["conversation"]["messages"][0]["text"], "Is there a gym facility?");
        assert_eq!(data["conversation"]["messages"][1]["role"], "assistant");

        let (status, _) = call(
            router(),
            post_json(
                "/api/chat/suggestion",
                serde_json::json!({ "question_id": "pool" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_questions_by_category() {
        let (status, body) = call(router(), get_req("/api/questions?category=general")).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body.data.unwrap().as_array().unwrap()
            .iter()
            .map(|q| q["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["hours", "security", "wifi", "events"]);

        let (status, _) = call(router(), get_req("/api/questions?category=sports")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_locations() {
        let (status, body) = call(router(), get_req("/api/locations?q=ground")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap().as_array().unwrap().len(), 2);

        let (status, body) = call(router(), get_req("/api/locations/hblock")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap()["name"], "H Block Hostel");

        let (status, _) = call(router(), get_req("/api/locations/pool")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_events() {
        let (status, body) = call(router(), get_req("/api/events")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap().as_array().unwrap().len(), 2);
    }
}
