//! HTTP adapter: room creation, lobby and result endpoints.
//!
//! Every handler decodes its body with the JSON codec, calls one
//! [`RoomManager`] operation and returns the result as JSON. Failures
//! become `{"detail": "..."}` with a 400 or 404.
//!
//! | method & path | operation |
//! |---|---|
//! | `POST /create-room` | create a room → `{roomId}` |
//! | `GET /game/{room_id}` | room snapshot |
//! | `POST /game/{room_id}/result` | close the set → `{status, currentSet}` |
//! | `GET /lobby/{room_id}` | lobby status |
//! | `POST /lobby/{room_id}/join` | join the lobby → user |
//! | `PUT /lobby/{room_id}/users/{user_id}/team` | reseat a user → user |
//! | `PUT /lobby/{room_id}/users/{user_id}/ready` | set ready flag → user |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use draftroom_protocol::{
    Codec, CreatedRoom, JoinRequest, JsonCodec, LobbyStatus, LobbyUser,
    ReadyUpdate, RoomCode, RoomSettings, RoomSnapshot, SetProgress,
    SetResult, TeamUpdate, UserId,
};
use draftroom_room::{RoomError, RoomManager};
use serde::de::DeserializeOwned;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::DraftError;

type ApiResult<T> = Result<Json<T>, DraftError>;

/// Builds the HTTP router over a room manager.
///
/// `allowed_origins` restricts CORS; an empty list allows any origin.
pub fn router(rooms: Arc<RoomManager>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/create-room", post(create_room))
        .route("/game/{room_id}", get(get_room))
        .route("/game/{room_id}/result", post(submit_result))
        .route("/lobby/{room_id}", get(get_lobby_status))
        .route("/lobby/{room_id}/join", post(join_lobby))
        .route("/lobby/{room_id}/users/{user_id}/team", put(update_user_team))
        .route("/lobby/{room_id}/users/{user_id}/ready", put(update_user_ready))
        .layer(cors_layer(allowed_origins))
        .with_state(rooms)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Decodes a request body. Anything that does not decode into `T` is a
/// validation failure (400).
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DraftError> {
    Ok(JsonCodec.decode(body)?)
}

async fn create_room(
    State(rooms): State<Arc<RoomManager>>,
    body: Bytes,
) -> ApiResult<CreatedRoom> {
    let settings: RoomSettings = decode(&body)?;
    let room_id = rooms.create_room(settings)?;
    Ok(Json(CreatedRoom { room_id }))
}

async fn get_room(
    State(rooms): State<Arc<RoomManager>>,
    Path(room_id): Path<String>,
) -> ApiResult<RoomSnapshot> {
    Ok(Json(rooms.snapshot(&RoomCode::new(room_id)).await?))
}

async fn submit_result(
    State(rooms): State<Arc<RoomManager>>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> ApiResult<SetProgress> {
    let code = RoomCode::new(room_id);
    // An unknown room is a 404 even when the body is also bad.
    rooms.room(&code)?;
    let result: SetResult = decode(&body)?;
    Ok(Json(rooms.submit_result(&code, result).await?))
}

async fn get_lobby_status(
    State(rooms): State<Arc<RoomManager>>,
    Path(room_id): Path<String>,
) -> ApiResult<LobbyStatus> {
    Ok(Json(rooms.lobby_status(&RoomCode::new(room_id)).await?))
}

async fn join_lobby(
    State(rooms): State<Arc<RoomManager>>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> ApiResult<LobbyUser> {
    let code = RoomCode::new(room_id);
    rooms.room(&code)?;
    let JoinRequest { nickname } = decode(&body)?;
    Ok(Json(rooms.join_room(&code, nickname).await?))
}

async fn update_user_team(
    State(rooms): State<Arc<RoomManager>>,
    Path((room_id, user_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<LobbyUser> {
    let code = RoomCode::new(room_id);
    rooms.room(&code)?;
    let update: TeamUpdate = decode(&body)?;
    let user = rooms
        .update_user_team(&code, UserId::new(user_id), update)
        .await?;
    Ok(Json(user))
}

async fn update_user_ready(
    State(rooms): State<Arc<RoomManager>>,
    Path((room_id, user_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<LobbyUser> {
    let code = RoomCode::new(room_id);
    rooms.room(&code)?;
    let update: ReadyUpdate = decode(&body)?;
    let user = rooms
        .update_user_ready(&code, UserId::new(user_id), update)
        .await?;
    Ok(Json(user))
}

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

impl DraftError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Protocol(_) | Self::Room(RoomError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Room(RoomError::NotFound(_) | RoomError::UserNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            Self::Registry(_) | Self::Room(RoomError::Registry(_)) => {
                StatusCode::CONFLICT
            }
            Self::Room(RoomError::Unavailable(_) | RoomError::CodesExhausted(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Transport(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DraftError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use draftroom_protocol::ClientId;
    use draftroom_registry::RegistryError;

    use super::*;

    #[test]
    fn test_status_codes() {
        let code = RoomCode::new("ab12cd34");
        assert_eq!(
            DraftError::from(RoomError::NotFound(code.clone())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DraftError::from(RoomError::UserNotFound {
                room: code.clone(),
                user: UserId::new("a1b2c3"),
            })
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DraftError::from(RoomError::Validation(
                draftroom_protocol::ProtocolError::InvalidMessage("x".into())
            ))
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DraftError::from(RegistryError::AlreadyAttached {
                room: code,
                client: ClientId::new("a1b2c3"),
            })
            .status_code(),
            StatusCode::CONFLICT
        );
    }
}
