//! Core wire types for draftroom.
//!
//! Every type here is something a client either sends or reads back:
//! identifiers, room settings, the lobby roster, set results, and the two
//! outbound views of a room (the raw snapshot and the lobby status
//! projection). Field names are camelCase on the wire because the browser
//! clients were written against that shape.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Position value meaning "no seat assigned yet".
pub const UNASSIGNED_POSITION: i32 = -1;

/// Formats `bytes` random bytes as lowercase hex.
fn random_hex(bytes: usize) -> String {
    let mut rng = rand::rng();
    (0..bytes)
        .map(|_| format!("{:02x}", rng.random::<u8>()))
        .collect()
}

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short code identifying a room, e.g. `"3f9a07c2"`.
///
/// Serialized as a plain string (`#[serde(transparent)]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Length of a generated room code, in characters.
    pub const LEN: usize = 8;

    /// Wraps an existing code (as received from a client).
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generates a fresh random code. Uniqueness is the store's job.
    pub fn random() -> Self {
        Self(random_hex(Self::LEN / 2))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a lobby user, scoped to one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Length of a generated user id, in characters.
    pub const LEN: usize = 6;

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        Self(random_hex(Self::LEN / 2))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one live connection within a room.
///
/// A client that opened its channel with a `userId` is known by that id;
/// anonymous clients get a server-minted one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints an id for a client that did not bring one.
    pub fn random() -> Self {
        Self(random_hex(UserId::LEN / 2))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lobby user this connection speaks for, if it was opened with
    /// one.
    pub fn as_user(&self) -> UserId {
        UserId::new(self.0.clone())
    }
}

impl From<UserId> for ClientId {
    fn from(id: UserId) -> Self {
        Self(id.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How many players act for the room, which fixes participant capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerCountMode {
    /// One player drafts both sides locally. No shared channel.
    Solo,
    /// One representative per team.
    Representative,
    /// Full five-a-side teams.
    Team,
}

impl PlayerCountMode {
    /// Maximum number of simultaneously attached participants.
    pub fn capacity(self) -> usize {
        match self {
            Self::Solo => 1,
            Self::Representative => 2,
            Self::Team => 10,
        }
    }

    /// Whether rooms in this mode are served over the shared channel.
    pub fn is_shared(self) -> bool {
        !matches!(self, Self::Solo)
    }
}

impl fmt::Display for PlayerCountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solo => f.write_str("solo"),
            Self::Representative => f.write_str("representative"),
            Self::Team => f.write_str("team"),
        }
    }
}

/// Room settings, fixed at creation.
///
/// All fields are required; a body missing one or carrying a wrong type
/// fails to decode and is rejected as a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub version: String,
    pub draft_mode: String,
    pub match_format: String,
    pub player_count: PlayerCountMode,
    pub time_limit: String,
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// Which side of the draft a lobby user sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    Blue,
    Red,
    #[default]
    Spectator,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blue => f.write_str("BLUE"),
            Self::Red => f.write_str("RED"),
            Self::Spectator => f.write_str("SPECTATOR"),
        }
    }
}

/// A member of a room's lobby roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyUser {
    pub id: UserId,
    pub nickname: String,
    pub team: Team,
    /// Seat within the team; [`UNASSIGNED_POSITION`] until chosen.
    pub position: i32,
    pub is_ready: bool,
    pub is_host: bool,
}

impl LobbyUser {
    /// A freshly joined user: spectating, unseated, not ready.
    pub fn new(id: UserId, nickname: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            team: Team::Spectator,
            position: UNASSIGNED_POSITION,
            is_ready: false,
            is_host,
        }
    }

    /// Whether this user counts as ready for the ready check. The host
    /// always does.
    pub fn counts_as_ready(&self) -> bool {
        self.is_ready || self.is_host
    }
}

/// Room lifecycle status.
///
/// ```text
/// waiting → ready → in_progress → completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Ready,
    InProgress,
    Completed,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("waiting"),
            Self::Ready => f.write_str("ready"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Per-team score of one finished set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub blue: u32,
    pub red: u32,
}

/// Outcome of one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResult {
    pub winner: Team,
    pub score: Score,
}

impl SetResult {
    /// Rejects results that decode but make no sense (a spectator
    /// cannot win a set).
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.winner == Team::Spectator {
            return Err(ProtocolError::InvalidMessage(
                "winner must be BLUE or RED".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outbound views
// ---------------------------------------------------------------------------

/// The full room state as observers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomCode,
    pub settings: RoomSettings,
    pub status: RoomStatus,
    pub current_set: u32,
    pub bans: Vec<String>,
    pub picks: Vec<String>,
    pub results: Vec<SetResult>,
    pub users: Vec<LobbyUser>,
}

/// The lobby-oriented projection of a room, with the derived ready
/// check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStatus {
    pub room_id: RoomCode,
    pub settings: RoomSettings,
    pub users: Vec<LobbyUser>,
    pub status: RoomStatus,
    pub current_set: u32,
    pub all_ready: bool,
}

/// Where a room stands after a result was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProgress {
    pub status: RoomStatus,
    pub current_set: u32,
}

/// Reply to room creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub room_id: RoomCode,
}

/// Typed notices pushed to observers: `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notice {
    StatusUpdate(LobbyStatus),
}

/// One frame pushed to every observer of a room.
///
/// Draft changes go out as the bare room snapshot, roster changes as a
/// `status_update` notice. `untagged` keeps the snapshot unwrapped on the
/// wire; decoding tries the tagged notice first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Notice(Notice),
    Room(RoomSnapshot),
}
