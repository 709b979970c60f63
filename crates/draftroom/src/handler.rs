//! Per-connection handler: attachment, outbound writer, and action routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read `roomId`/`id`, `userId` and `spectator` from the upgrade query
//!   2. Attach to the room, or close the socket if refused
//!   3. Spawn a writer task draining the connection's outbound queue
//!   4. Loop: receive frames → decode `ClientAction` → dispatch

use std::sync::Arc;

use draftroom_protocol::{ClientAction, ClientId, Codec, RoomCode};
use draftroom_registry::{Binding, Frame, Role};
use draftroom_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::DraftError;
use crate::server::ServerState;

/// Query keys accepted for the room code, in lookup order.
const ROOM_PARAMS: &[&str] = &["roomId", "id"];

/// Drop guard that releases a connection's attachment when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async detach runs in a spawned task.
struct ConnectionGuard<C: Codec> {
    binding: Binding,
    writer: JoinHandle<()>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.writer.abort();
        let binding = self.binding.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = state.rooms.detach(&binding).await {
                tracing::debug!(
                    room_code = %binding.room,
                    client_id = %binding.client_id,
                    error = %e,
                    "detach failed"
                );
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), DraftError> {
    let conn_id = conn.id();
    let params = conn.params();

    let Some(room) = params.get_any(ROOM_PARAMS).map(RoomCode::new) else {
        tracing::warn!(%conn_id, "connection without room id, closing");
        let _ = conn.close().await;
        return Ok(());
    };
    let client_id = params
        .get("userId")
        .map(ClientId::new)
        .unwrap_or_else(ClientId::random);
    let role = Role::from_spectator_flag(params.flag("spectator"));

    // --- Step 1: Attach ---
    let attachment = match state.rooms.attach(&room, client_id, role).await {
        Ok(attachment) => attachment,
        Err(e) => {
            tracing::warn!(%conn_id, room_code = %room, %role, error = %e, "connection refused");
            let _ = conn.close().await;
            return Err(e.into());
        }
    };
    tracing::info!(
        %conn_id,
        room_code = %room,
        client_id = %attachment.binding.client_id,
        %role,
        "connection attached"
    );

    // --- Step 2: Writer ---
    let conn = Arc::new(conn);
    let writer = tokio::spawn(write_frames(Arc::clone(&conn), attachment.outbound));
    let _guard = ConnectionGuard {
        binding: attachment.binding.clone(),
        writer,
        state: Arc::clone(&state),
    };

    // --- Step 3: Action loop ---
    let dispatcher = attachment.dispatcher;
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, room_code = %room, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let action: ClientAction = match state.codec.decode(&data) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "undecodable frame, treating as unknown");
                ClientAction::Unknown
            }
        };
        dispatcher.dispatch(action).await?;
    }

    // _guard drops here → detach, lobby cleanup and final broadcast.
    Ok(())
}

/// Writes broadcast frames to the socket in the order they were queued.
/// Stops at the first failed send or when the queue's senders are gone.
async fn write_frames(conn: Arc<WebSocketConnection>, mut outbound: mpsc::Receiver<Frame>) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}
