//! The connection registry: tracks every live observer of every room.
//!
//! The registry is independent of room state. It never reads or writes a
//! room beyond the participant mode the caller passes in for the capacity
//! check, and an entry disappearing here never removes the room itself.
//!
//! # Concurrency
//!
//! Entries live in a [`DashMap`] keyed by room code, so membership changes
//! in different rooms do not contend, while the capacity check and the
//! insertion for one room happen under that room's shard lock as a single
//! step. Two participants racing for the last slot cannot both win.

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use draftroom_protocol::{ClientId, PlayerCountMode, RoomCode};

use crate::{Binding, ObserverHandle, RegistryError, Role};

/// Everything attached to one room.
#[derive(Debug, Default)]
struct RoomObservers {
    participants: HashSet<ClientId>,
    spectators: HashSet<ClientId>,
    handles: HashMap<ClientId, ObserverHandle>,
}

impl RoomObservers {
    fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Removes a client from whichever role set it is in.
    fn remove(&mut self, client_id: &ClientId) -> Option<Role> {
        self.handles.remove(client_id)?;
        if self.participants.remove(client_id) {
            Some(Role::Participant)
        } else {
            self.spectators.remove(client_id);
            Some(Role::Spectator)
        }
    }
}

/// Maps each room to its attached observers.
///
/// ## Lifecycle of an entry
///
/// ```text
/// attach() ──→ [room entry created] ──→ attach()/detach() ...
///                                            │
///                                            ▼ (last handle detached)
///                                      [entry pruned]
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    rooms: DashMap<RoomCode, RoomObservers>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a connection to a room.
    ///
    /// `mode` is the room's participant mode, read by the caller from the
    /// room's settings.
    ///
    /// # Errors
    /// - [`RegistryError::UnsupportedMode`]: the room is a solo room
    /// - [`RegistryError::AlreadyAttached`]: the client id is taken in
    ///   this room
    /// - [`RegistryError::Capacity`]: a participant would exceed the
    ///   mode's capacity
    pub fn attach(
        &self,
        room: &RoomCode,
        mode: PlayerCountMode,
        role: Role,
        handle: ObserverHandle,
    ) -> Result<Binding, RegistryError> {
        if !mode.is_shared() {
            return Err(RegistryError::UnsupportedMode {
                room: room.clone(),
                mode,
            });
        }

        let client_id = handle.client_id().clone();
        let result = {
            let mut observers = self.rooms.entry(room.clone()).or_default();
            if observers.handles.contains_key(&client_id) {
                Err(RegistryError::AlreadyAttached {
                    room: room.clone(),
                    client: client_id.clone(),
                })
            } else if role.is_participant()
                && observers.participants.len() >= mode.capacity()
            {
                Err(RegistryError::Capacity {
                    room: room.clone(),
                    capacity: mode.capacity(),
                })
            } else {
                match role {
                    Role::Participant => {
                        observers.participants.insert(client_id.clone())
                    }
                    Role::Spectator => {
                        observers.spectators.insert(client_id.clone())
                    }
                };
                observers.handles.insert(client_id.clone(), handle);
                Ok(())
            }
        };

        if let Err(e) = result {
            // A concurrent detach may have emptied the entry meanwhile.
            self.rooms.remove_if(room, |_, observers| observers.is_empty());
            return Err(e);
        }

        tracing::info!(
            room_code = %room,
            %client_id,
            %role,
            "client attached"
        );
        Ok(Binding {
            room: room.clone(),
            client_id,
            role,
        })
    }

    /// Detaches a connection. Idempotent: returns the role it held, or
    /// `None` if it was not attached.
    ///
    /// Prunes the room's entry once its last handle is gone.
    pub fn detach(
        &self,
        room: &RoomCode,
        client_id: &ClientId,
    ) -> Option<Role> {
        let removed = self
            .rooms
            .get_mut(room)
            .and_then(|mut observers| observers.remove(client_id));
        self.rooms.remove_if(room, |_, observers| observers.is_empty());

        if let Some(role) = removed {
            tracing::info!(
                room_code = %room,
                %client_id,
                %role,
                "client detached"
            );
        }
        removed
    }

    /// Returns clones of every handle attached to `room`, participants
    /// and spectators alike.
    pub fn observers_of(&self, room: &RoomCode) -> Vec<ObserverHandle> {
        self.rooms
            .get(room)
            .map(|observers| observers.handles.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn participant_count(&self, room: &RoomCode) -> usize {
        self.rooms
            .get(room)
            .map_or(0, |observers| observers.participants.len())
    }

    pub fn spectator_count(&self, room: &RoomCode) -> usize {
        self.rooms
            .get(room)
            .map_or(0, |observers| observers.spectators.len())
    }

    pub fn is_attached(&self, room: &RoomCode, client_id: &ClientId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|observers| observers.handles.contains_key(client_id))
    }

    /// Number of rooms with at least one attached connection.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
