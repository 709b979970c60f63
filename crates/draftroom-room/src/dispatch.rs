//! Mutation dispatcher: applies one inbound channel action to a room.

use draftroom_protocol::{ClientAction, ClientId, SetResult};
use draftroom_registry::Role;

use crate::{Projection, RoomError, RoomHandle};

/// Interprets the actions of one attached connection.
///
/// Every call to [`dispatch`](Self::dispatch) results in exactly one
/// broadcast to the room, whether the action changed anything or not:
///
/// | action | effect | broadcast |
/// |---|---|---|
/// | `ban` / `pick` | append to bans / picks | snapshot |
/// | `update_team` / `update_ready` | update the target user | status |
/// | `submit_result` | close the set | snapshot |
/// | unknown target user | none | status |
/// | unknown action, spectator sender, rejected result | none | snapshot |
#[derive(Debug, Clone)]
pub struct Dispatcher {
    room: RoomHandle,
    client_id: ClientId,
    role: Role,
}

impl Dispatcher {
    pub fn new(room: RoomHandle, client_id: ClientId, role: Role) -> Self {
        Self {
            room,
            client_id,
            role,
        }
    }

    /// Applies one action.
    ///
    /// # Errors
    /// Only [`RoomError::Unavailable`], when the room actor is gone. No
    /// action content is ever an error.
    pub async fn dispatch(&self, action: ClientAction) -> Result<(), RoomError> {
        tracing::debug!(
            room_code = %self.room.code(),
            client_id = %self.client_id,
            role = %self.role,
            action = action.name(),
            "dispatching action"
        );

        if !self.role.is_participant() {
            return self.room.refresh(Projection::Snapshot).await;
        }

        match action {
            ClientAction::Ban { champion } => self.room.ban(champion).await,
            ClientAction::Pick { champion } => self.room.pick(champion).await,
            ClientAction::UpdateTeam {
                user_id,
                team,
                position,
            } => {
                let updated =
                    self.room.update_team(user_id, team, position).await?;
                if updated.is_none() {
                    self.room.refresh(Projection::Status).await?;
                }
                Ok(())
            }
            ClientAction::UpdateReady { user_id, is_ready } => {
                let updated = self.room.update_ready(user_id, is_ready).await?;
                if updated.is_none() {
                    self.room.refresh(Projection::Status).await?;
                }
                Ok(())
            }
            ClientAction::SubmitResult { winner, score } => {
                let result = SetResult { winner, score };
                if let Err(e) = result.validate() {
                    tracing::debug!(
                        room_code = %self.room.code(),
                        client_id = %self.client_id,
                        error = %e,
                        "ignoring invalid result"
                    );
                    return self.room.refresh(Projection::Snapshot).await;
                }
                self.room.submit_result(result).await.map(|_| ())
            }
            ClientAction::Unknown => {
                self.room.refresh(Projection::Snapshot).await
            }
        }
    }
}
