//! Error types for the room layer.

use draftroom_protocol::{ProtocolError, RoomCode, UserId};
use draftroom_registry::RegistryError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room exists but has no lobby user with this id.
    #[error("user {user} not found in room {room}")]
    UserNotFound { room: RoomCode, user: UserId },

    /// A payload decoded but was rejected (e.g. a spectator winner).
    #[error("validation failed: {0}")]
    Validation(#[from] ProtocolError),

    /// The attachment was refused by the connection registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Every generated room code collided with an existing room.
    #[error("no free room code after {0} attempts")]
    CodesExhausted(usize),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
