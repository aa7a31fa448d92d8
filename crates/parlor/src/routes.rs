//! REST surface: lobby listing, session creation, lookup, and start.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;
use crate::ws;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// The uniform error response: `{"error": "..."}` with the given status.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// `GET /api/games` — registered game types, in registration order.
pub(crate) async fn list_games(State(state): State<AppState>) -> Response {
    Json(state.manager.registry().list()).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSessionRequest {
    #[serde(default)]
    game_type: Option<String>,
    #[serde(default)]
    player_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    code: String,
}

/// `POST /api/sessions` — creates a session with the caller pre-joined as
/// host.
pub(crate) async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "invalid request body");
    };
    let game_type = req.game_type.as_deref().unwrap_or("").trim();
    let player_id = req.player_id.as_deref().unwrap_or("").trim();
    if game_type.is_empty() || player_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "gameType and playerId required");
    }

    let session = match state.manager.create(game_type).await {
        Ok(session) => session,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    if let Err(e) = session.add_player(player_id).await {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
    if let Err(e) = state.manager.save_roster(&session).await {
        tracing::warn!(code = %session.code(), error = %e, "save roster failed");
    }

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            code: session.code().to_string(),
        }),
    )
        .into_response()
}

/// `GET /api/sessions/{code}` — session info snapshot.
pub(crate) async fn get_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match state.manager.get(&code).await {
        Some(session) => Json(session.info().await).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "session not found"),
    }
}

#[derive(Debug, Serialize)]
struct StartResponse {
    status: &'static str,
}

/// `POST /api/sessions/{code}/start` — flips the session to playing,
/// persists, and broadcasts the new state.
pub(crate) async fn start_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    let Some(session) = state.manager.get(&code).await else {
        return error_response(StatusCode::NOT_FOUND, "session not found");
    };
    if let Err(e) = session.start().await {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }
    if let Err(e) = state.manager.save_match_state(&session).await {
        tracing::error!(code = %session.code(), error = %e, "save match state failed");
    }
    ws::broadcast_state(&session).await;

    Json(StartResponse { status: "started" }).into_response()
}
