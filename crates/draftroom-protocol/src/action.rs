//! Inbound messages: channel actions and HTTP request bodies.

use serde::{Deserialize, Serialize};

use crate::{Score, Team, UNASSIGNED_POSITION, UserId};

fn unassigned() -> i32 {
    UNASSIGNED_POSITION
}

/// One action sent by a client over its room channel.
///
/// Internally tagged by `action`:
///
/// ```json
/// {"action": "ban", "champion": "Ahri"}
/// {"action": "update_ready", "userId": "a1b2c3", "isReady": true}
/// ```
///
/// Action names this server does not know decode to [`ClientAction::Unknown`]
/// instead of failing, so older or newer clients never get disconnected
/// for sending something unexpected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientAction {
    Ban {
        champion: String,
    },
    Pick {
        champion: String,
    },
    UpdateTeam {
        user_id: UserId,
        team: Team,
        #[serde(default = "unassigned")]
        position: i32,
    },
    UpdateReady {
        user_id: UserId,
        is_ready: bool,
    },
    SubmitResult {
        winner: Team,
        score: Score,
    },
    #[serde(other)]
    Unknown,
}

impl ClientAction {
    /// The action name as it appears on the wire, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ban { .. } => "ban",
            Self::Pick { .. } => "pick",
            Self::UpdateTeam { .. } => "update_team",
            Self::UpdateReady { .. } => "update_ready",
            Self::SubmitResult { .. } => "submit_result",
            Self::Unknown => "unknown",
        }
    }
}

/// Body of a lobby join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub nickname: String,
}

/// Body of a team/seat change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamUpdate {
    pub team: Team,
    #[serde(default = "unassigned")]
    pub position: i32,
}

/// Body of a ready toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyUpdate {
    pub is_ready: bool,
}
