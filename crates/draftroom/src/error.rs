//! Unified error type for draftroom.

use draftroom_protocol::ProtocolError;
use draftroom_registry::RegistryError;
use draftroom_room::RoomError;
use draftroom_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically. The HTTP
/// adapter maps this type to status codes (see `http.rs`).
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed body, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An attachment refused by the connection registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A room-level error (not found, validation, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Binding or serving the HTTP listener failed.
    #[error("http server: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use draftroom_protocol::{ClientId, RoomCode};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed(std::io::Error::other("gone"));
        let draft_err: DraftError = err.into();
        assert!(matches!(draft_err, DraftError::Transport(_)));
        assert!(draft_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let draft_err: DraftError = err.into();
        assert!(matches!(draft_err, DraftError::Protocol(_)));
    }

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::AlreadyAttached {
            room: RoomCode::new("ab12cd34"),
            client: ClientId::new("a1b2c3"),
        };
        let draft_err: DraftError = err.into();
        assert!(matches!(draft_err, DraftError::Registry(_)));
        assert!(draft_err.to_string().contains("a1b2c3"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomCode::new("ab12cd34"));
        let draft_err: DraftError = err.into();
        assert!(matches!(draft_err, DraftError::Room(_)));
        assert_eq!(draft_err.to_string(), "room ab12cd34 not found");
    }
}
