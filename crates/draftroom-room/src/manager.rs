//! Room manager: creates rooms, runs lobby and result operations, and
//! attaches connections to rooms.

use std::sync::Arc;

use draftroom_protocol::{
    ClientId, LobbyStatus, LobbyUser, ReadyUpdate, RoomCode, RoomSettings,
    RoomSnapshot, SetProgress, SetResult, TeamUpdate, UserId,
};
use draftroom_registry::{
    Binding, ConnectionRegistry, Frame, ObserverHandle, Role,
};
use tokio::sync::mpsc;

use crate::{Dispatcher, Projection, RoomConfig, RoomError, RoomHandle, RoomStore};

/// A connection that was admitted to a room.
#[derive(Debug)]
pub struct Attachment {
    /// What the registry recorded. Pass it back to
    /// [`RoomManager::detach`] on disconnect.
    pub binding: Binding,
    /// Applies this connection's actions to the room.
    pub dispatcher: Dispatcher,
    /// Frames to write to this connection's socket, in broadcast order.
    pub outbound: mpsc::Receiver<Frame>,
}

/// Entry point for every room operation from the server layer.
///
/// Owns the room store and shares the connection registry with it. All
/// methods take `&self`: rooms serialize their own mutations and the
/// registry locks per room, so the manager itself needs no lock.
pub struct RoomManager {
    store: RoomStore,
    registry: Arc<ConnectionRegistry>,
    config: RoomConfig,
}

impl RoomManager {
    /// Creates a manager with no rooms.
    pub fn new(config: RoomConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            store: RoomStore::new(config.clone(), Arc::clone(&registry)),
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Returns the number of rooms.
    pub fn room_count(&self) -> usize {
        self.store.room_count()
    }

    /// Looks up a room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no room has this code.
    pub fn room(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.store
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Creates a room with the given settings and returns its code.
    ///
    /// Settings are already well-typed here; a body that failed to decode
    /// never reaches this point.
    pub fn create_room(&self, settings: RoomSettings) -> Result<RoomCode, RoomError> {
        let handle = self.store.create(settings)?;
        Ok(handle.code().clone())
    }

    /// Adds a user to a room's lobby. The first joiner becomes host.
    pub async fn join_room(
        &self,
        code: &RoomCode,
        nickname: String,
    ) -> Result<LobbyUser, RoomError> {
        self.room(code)?.join(nickname).await
    }

    /// Closes the current set of a room.
    ///
    /// # Errors
    /// [`RoomError::Validation`] for a spectator winner,
    /// [`RoomError::NotFound`] for an unknown room.
    pub async fn submit_result(
        &self,
        code: &RoomCode,
        result: SetResult,
    ) -> Result<SetProgress, RoomError> {
        let room = self.room(code)?;
        result.validate()?;
        room.submit_result(result).await
    }

    pub async fn snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, RoomError> {
        self.room(code)?.snapshot().await
    }

    pub async fn lobby_status(&self, code: &RoomCode) -> Result<LobbyStatus, RoomError> {
        self.room(code)?.lobby_status().await
    }

    pub async fn update_user_team(
        &self,
        code: &RoomCode,
        user_id: UserId,
        update: TeamUpdate,
    ) -> Result<LobbyUser, RoomError> {
        let room = self.room(code)?;
        room.update_team(user_id.clone(), update.team, update.position)
            .await?
            .ok_or_else(|| RoomError::UserNotFound {
                room: code.clone(),
                user: user_id,
            })
    }

    pub async fn update_user_ready(
        &self,
        code: &RoomCode,
        user_id: UserId,
        update: ReadyUpdate,
    ) -> Result<LobbyUser, RoomError> {
        let room = self.room(code)?;
        room.update_ready(user_id.clone(), update.is_ready)
            .await?
            .ok_or_else(|| RoomError::UserNotFound {
                room: code.clone(),
                user: user_id,
            })
    }

    // -----------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------

    /// Admits a connection to a room and broadcasts the room snapshot so
    /// the newcomer (and everyone else) sees the current state.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::Registry`]: solo room, participant capacity
    ///   reached, or client id already attached
    pub async fn attach(
        &self,
        code: &RoomCode,
        client_id: ClientId,
        role: Role,
    ) -> Result<Attachment, RoomError> {
        let room = self.room(code)?;
        let (handle, outbound) =
            ObserverHandle::channel(client_id.clone(), self.config.outbound_buffer);

        let binding = self.registry.attach(
            code,
            room.settings().player_count,
            role,
            handle,
        )?;

        if let Err(e) = room.refresh(Projection::Snapshot).await {
            self.registry.detach(code, &client_id);
            return Err(e);
        }

        Ok(Attachment {
            binding,
            dispatcher: Dispatcher::new(room, client_id, role),
            outbound,
        })
    }

    /// Releases a connection: detaches it, removes the lobby user it
    /// spoke for (if any), and announces the roster.
    ///
    /// Idempotent. A second call for the same binding does nothing. The
    /// room itself is never removed.
    pub async fn detach(&self, binding: &Binding) -> Result<(), RoomError> {
        if self
            .registry
            .detach(&binding.room, &binding.client_id)
            .is_none()
        {
            return Ok(());
        }

        match self.store.get(&binding.room) {
            Some(room) => room.leave(binding.client_id.as_user()).await,
            None => Ok(()),
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
