//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Every read-modify-write against a room goes through this actor's
//! command channel, so mutations are applied one at a time in arrival
//! order. After each mutation the actor projects the room and pushes the
//! result onto its change channel, which the room's fan-out task drains.
//! Because the projection is taken while the command is being handled,
//! no broadcast ever mixes two mutations, and broadcasts leave in
//! mutation order.

use std::sync::Arc;

use draftroom_protocol::{
    LobbyStatus, LobbyUser, RoomCode, RoomSettings, RoomSnapshot,
    ServerMessage, SetProgress, SetResult, Team, UserId,
};
use tokio::sync::{mpsc, oneshot};

use crate::{Projection, Room, RoomError};

/// Receiving end of a room's change channel.
pub(crate) type ChangeReceiver = mpsc::UnboundedReceiver<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// Variants with a `reply` are request/response; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    Join {
        nickname: String,
        reply: oneshot::Sender<LobbyUser>,
    },
    /// Remove a user (if present) and announce the roster either way.
    Leave {
        user_id: UserId,
    },
    UpdateTeam {
        user_id: UserId,
        team: Team,
        position: i32,
        reply: oneshot::Sender<Option<LobbyUser>>,
    },
    UpdateReady {
        user_id: UserId,
        is_ready: bool,
        reply: oneshot::Sender<Option<LobbyUser>>,
    },
    Ban {
        champion: String,
    },
    Pick {
        champion: String,
    },
    SubmitResult {
        result: SetResult,
        reply: oneshot::Sender<SetProgress>,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    LobbyStatus {
        reply: oneshot::Sender<LobbyStatus>,
    },
    /// Broadcast the current state without changing it.
    Refresh {
        projection: Projection,
    },
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone. The settings are carried alongside the channel because
/// they never change after creation, so capacity checks can read them
/// without a round trip through the actor.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    settings: Arc<RoomSettings>,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Adds a lobby user and announces the new roster.
    pub async fn join(&self, nickname: String) -> Result<LobbyUser, RoomError> {
        self.request(|reply| RoomCommand::Join { nickname, reply })
            .await
    }

    /// Removes a lobby user, if present, and announces the roster.
    pub async fn leave(&self, user_id: UserId) -> Result<(), RoomError> {
        self.send(RoomCommand::Leave { user_id }).await
    }

    /// Reseats a lobby user. Announces the roster only when the user
    /// exists.
    pub async fn update_team(
        &self,
        user_id: UserId,
        team: Team,
        position: i32,
    ) -> Result<Option<LobbyUser>, RoomError> {
        self.request(|reply| RoomCommand::UpdateTeam {
            user_id,
            team,
            position,
            reply,
        })
        .await
    }

    /// Sets a lobby user's ready flag. Announces the roster only when the
    /// user exists.
    pub async fn update_ready(
        &self,
        user_id: UserId,
        is_ready: bool,
    ) -> Result<Option<LobbyUser>, RoomError> {
        self.request(|reply| RoomCommand::UpdateReady {
            user_id,
            is_ready,
            reply,
        })
        .await
    }

    pub async fn ban(&self, champion: String) -> Result<(), RoomError> {
        self.send(RoomCommand::Ban { champion }).await
    }

    pub async fn pick(&self, champion: String) -> Result<(), RoomError> {
        self.send(RoomCommand::Pick { champion }).await
    }

    /// Records a set result. The result must already be validated.
    pub async fn submit_result(
        &self,
        result: SetResult,
    ) -> Result<SetProgress, RoomError> {
        self.request(|reply| RoomCommand::SubmitResult { result, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn lobby_status(&self) -> Result<LobbyStatus, RoomError> {
        self.request(|reply| RoomCommand::LobbyStatus { reply }).await
    }

    /// Re-broadcasts the current state in the given projection.
    pub async fn refresh(
        &self,
        projection: Projection,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Refresh { projection }).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
    changes: mpsc::UnboundedSender<ServerMessage>,
}

impl RoomActor {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::debug!(room_code = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle(cmd);
        }

        tracing::debug!(room_code = %self.room.code(), "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { nickname, reply } => {
                let user = self.room.join(nickname);
                tracing::info!(
                    room_code = %self.room.code(),
                    user_id = %user.id,
                    nickname = %user.nickname,
                    is_host = user.is_host,
                    "user joined"
                );
                self.publish(Projection::Status);
                let _ = reply.send(user);
            }
            RoomCommand::Leave { user_id } => {
                if self.room.remove_user(&user_id).is_some() {
                    tracing::info!(
                        room_code = %self.room.code(),
                        %user_id,
                        "user left"
                    );
                }
                self.publish(Projection::Status);
            }
            RoomCommand::UpdateTeam {
                user_id,
                team,
                position,
                reply,
            } => {
                let user = self.room.update_team(&user_id, team, position);
                if user.is_some() {
                    tracing::debug!(
                        room_code = %self.room.code(),
                        %user_id,
                        %team,
                        position,
                        "team updated"
                    );
                    self.publish(Projection::Status);
                }
                let _ = reply.send(user);
            }
            RoomCommand::UpdateReady {
                user_id,
                is_ready,
                reply,
            } => {
                let user = self.room.update_ready(&user_id, is_ready);
                if user.is_some() {
                    tracing::debug!(
                        room_code = %self.room.code(),
                        %user_id,
                        is_ready,
                        "ready updated"
                    );
                    self.publish(Projection::Status);
                }
                let _ = reply.send(user);
            }
            RoomCommand::Ban { champion } => {
                tracing::debug!(room_code = %self.room.code(), %champion, "ban");
                self.room.ban(champion);
                self.publish(Projection::Snapshot);
            }
            RoomCommand::Pick { champion } => {
                tracing::debug!(room_code = %self.room.code(), %champion, "pick");
                self.room.pick(champion);
                self.publish(Projection::Snapshot);
            }
            RoomCommand::SubmitResult { result, reply } => {
                let winner = result.winner;
                let progress = self.room.submit_result(result);
                tracing::info!(
                    room_code = %self.room.code(),
                    %winner,
                    current_set = progress.current_set,
                    "result submitted"
                );
                self.publish(Projection::Snapshot);
                let _ = reply.send(progress);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            RoomCommand::LobbyStatus { reply } => {
                let _ = reply.send(self.room.lobby_status());
            }
            RoomCommand::Refresh { projection } => {
                self.publish(projection);
            }
        }
    }

    /// Hands the current projection to the fan-out. A closed change
    /// channel only means nobody is broadcasting anymore.
    fn publish(&self, projection: Projection) {
        let _ = self.changes.send(self.room.project(projection));
    }
}

/// Spawns a new room actor task and returns a handle plus the receiving
/// end of its change channel.
///
/// `channel_size` controls backpressure on the command channel.
pub(crate) fn spawn_room(
    room: Room,
    channel_size: usize,
) -> (RoomHandle, ChangeReceiver) {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (changes_tx, changes_rx) = mpsc::unbounded_channel();

    let handle = RoomHandle {
        code: room.code().clone(),
        settings: Arc::new(room.settings().clone()),
        sender: tx,
    };

    let actor = RoomActor {
        room,
        receiver: rx,
        changes: changes_tx,
    };
    tokio::spawn(actor.run());

    (handle, changes_rx)
}
