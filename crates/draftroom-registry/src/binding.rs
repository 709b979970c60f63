//! Binding types: what the registry knows about one attached connection.

use std::fmt;
use std::sync::Arc;

use draftroom_protocol::{ClientId, RoomCode};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::DeliveryError;

/// One serialized broadcast, shared by every observer it is sent to.
pub type Frame = Arc<[u8]>;

/// Whether a connection may mutate the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Counted against the mode's capacity; may send actions.
    Participant,
    /// Receives broadcasts only.
    Spectator,
}

impl Role {
    /// Maps the `spectator` connection flag to a role.
    pub fn from_spectator_flag(spectator: bool) -> Self {
        if spectator {
            Self::Spectator
        } else {
            Self::Participant
        }
    }

    pub fn is_participant(self) -> bool {
        matches!(self, Self::Participant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Participant => f.write_str("participant"),
            Self::Spectator => f.write_str("spectator"),
        }
    }
}

/// The sending side of one connection's outbound queue.
///
/// Cheap to clone. The registry keeps one per attached client and hands
/// clones to the fan-out, which delivers without holding any registry
/// lock.
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    client_id: ClientId,
    tx: mpsc::Sender<Frame>,
}

impl ObserverHandle {
    /// Creates a handle plus the receiver the connection's writer task
    /// drains. `capacity` bounds how far a slow peer may fall behind.
    pub fn channel(
        client_id: ClientId,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { client_id, tx }, rx)
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Queues a frame without waiting.
    pub fn deliver(&self, frame: &Frame) -> Result<(), DeliveryError> {
        self.tx.try_send(Arc::clone(frame)).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Proof of a successful attachment, held by the connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room: RoomCode,
    pub client_id: ClientId,
    pub role: Role,
}
