//! Error types for the registry layer.

use draftroom_protocol::{ClientId, PlayerCountMode, RoomCode};

/// Reasons an attachment is refused.
///
/// All of these end with the connection being closed; none carry a
/// payload back to the client.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The room's participant slots are all taken.
    #[error("room {room} is at participant capacity ({capacity})")]
    Capacity { room: RoomCode, capacity: usize },

    /// The room's mode is not served over the shared channel.
    #[error("room {room} uses {mode} mode, which has no shared channel")]
    UnsupportedMode { room: RoomCode, mode: PlayerCountMode },

    /// A connection with this client id is already bound in the room.
    #[error("client {client} is already attached to room {room}")]
    AlreadyAttached { room: RoomCode, client: ClientId },
}

/// Why a single frame could not be handed to an observer.
///
/// Never escapes the fan-out: it is logged and the observer skipped.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The observer's outbound queue is full (slow peer).
    #[error("outbound queue full")]
    Full,

    /// The observer's writer is gone (peer disconnected).
    #[error("observer closed")]
    Closed,
}
