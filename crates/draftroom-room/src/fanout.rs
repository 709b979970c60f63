//! Broadcast fan-out: one task per room that turns room changes into
//! frames on every observer's outbound queue.

use std::sync::Arc;

use draftroom_protocol::{Codec, RoomCode, ServerMessage};
use draftroom_registry::{ConnectionRegistry, DeliveryError, Frame};

use crate::room::ChangeReceiver;

/// Drains a room's change channel until the room actor stops.
///
/// Each change is serialized once and the same frame is handed to every
/// observer. Nothing here can fail the task: an encode error or a refused
/// delivery is logged and the fan-out moves on.
pub(crate) async fn run_fanout<C: Codec>(
    code: RoomCode,
    mut changes: ChangeReceiver,
    registry: Arc<ConnectionRegistry>,
    codec: C,
) {
    while let Some(message) = changes.recv().await {
        broadcast(&code, &message, &registry, &codec);
    }
    tracing::debug!(room_code = %code, "fan-out stopped");
}

/// Delivers one message to every observer of `code`. Returns how many
/// observers accepted the frame.
pub(crate) fn broadcast<C: Codec>(
    code: &RoomCode,
    message: &ServerMessage,
    registry: &ConnectionRegistry,
    codec: &C,
) -> usize {
    let observers = registry.observers_of(code);
    if observers.is_empty() {
        return 0;
    }

    let frame: Frame = match codec.encode(message) {
        Ok(bytes) => Arc::from(bytes),
        Err(e) => {
            tracing::warn!(room_code = %code, error = %e, "failed to encode broadcast");
            return 0;
        }
    };

    let mut delivered = 0;
    for observer in &observers {
        match observer.deliver(&frame) {
            Ok(()) => delivered += 1,
            Err(DeliveryError::Full) => {
                tracing::warn!(
                    room_code = %code,
                    client_id = %observer.client_id(),
                    "outbound queue full, dropping frame"
                );
            }
            Err(DeliveryError::Closed) => {
                // Disconnecting; its guard will detach it shortly.
                tracing::debug!(
                    room_code = %code,
                    client_id = %observer.client_id(),
                    "observer closed, skipping"
                );
            }
        }
    }
    delivered
}
