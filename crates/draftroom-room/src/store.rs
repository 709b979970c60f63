//! Room store: the mapping from room code to running room actor.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use draftroom_protocol::{JsonCodec, RoomCode, RoomSettings};
use draftroom_registry::ConnectionRegistry;

use crate::fanout::run_fanout;
use crate::room::spawn_room;
use crate::{Room, RoomConfig, RoomError, RoomHandle};

/// Owns every room for the lifetime of the process.
///
/// Rooms are created here and never removed: a room outlives all of its
/// connections.
pub struct RoomStore {
    rooms: DashMap<RoomCode, RoomHandle>,
    registry: Arc<ConnectionRegistry>,
    config: RoomConfig,
}

impl RoomStore {
    /// Creates an empty store whose rooms broadcast to `registry`'s
    /// observers.
    pub fn new(config: RoomConfig, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            rooms: DashMap::new(),
            registry,
            config,
        }
    }

    /// Creates a room under a fresh random code and starts its actor and
    /// fan-out tasks.
    ///
    /// # Errors
    /// [`RoomError::CodesExhausted`] if every attempted code was taken.
    pub fn create(&self, settings: RoomSettings) -> Result<RoomHandle, RoomError> {
        let attempts = self.config.code_attempts.max(1);
        for _ in 0..attempts {
            let code = RoomCode::random();
            // The vacant entry holds the shard lock, so two creators
            // cannot claim the same code.
            let Entry::Vacant(slot) = self.rooms.entry(code.clone()) else {
                tracing::debug!(room_code = %code, "room code collision, retrying");
                continue;
            };

            let (handle, changes) = spawn_room(
                Room::new(code.clone(), settings),
                self.config.command_buffer,
            );
            tokio::spawn(run_fanout(
                code.clone(),
                changes,
                Arc::clone(&self.registry),
                JsonCodec,
            ));
            slot.insert(handle.clone());

            tracing::info!(
                room_code = %code,
                mode = %handle.settings().player_count,
                "room created"
            );
            return Ok(handle);
        }
        Err(RoomError::CodesExhausted(attempts))
    }

    /// Returns a handle to the room, if it exists.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).map(|entry| entry.value().clone())
    }

    /// Returns the number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
