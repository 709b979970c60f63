//! The authoritative in-memory room model.
//!
//! A [`Room`] is owned by exactly one room actor; nothing else holds a
//! reference to it. Every method here is synchronous and total: the actor
//! calls them one command at a time, so no method needs to worry about
//! interleaving.

use draftroom_protocol::{
    LobbyStatus, LobbyUser, Notice, RoomCode, RoomSettings, RoomSnapshot,
    RoomStatus, ServerMessage, SetProgress, SetResult, Team, UserId,
};

/// Which view of the room a broadcast carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// The raw room snapshot. Sent after draft changes and attachments.
    Snapshot,
    /// A `status_update` notice with the lobby status. Sent after roster
    /// changes.
    Status,
}

/// One draft room.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    settings: RoomSettings,
    status: RoomStatus,
    current_set: u32,
    bans: Vec<String>,
    picks: Vec<String>,
    results: Vec<SetResult>,
    /// Join order; the first entry is the host.
    users: Vec<LobbyUser>,
}

impl Room {
    /// A fresh room: waiting, on set 1, with nothing drafted and nobody in
    /// the lobby.
    pub fn new(code: RoomCode, settings: RoomSettings) -> Self {
        Self {
            code,
            settings,
            status: RoomStatus::Waiting,
            current_set: 1,
            bans: Vec::new(),
            picks: Vec::new(),
            results: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn bans(&self) -> &[String] {
        &self.bans
    }

    pub fn picks(&self) -> &[String] {
        &self.picks
    }

    pub fn users(&self) -> &[LobbyUser] {
        &self.users
    }

    /// Adds a user to the lobby. The first user to join an empty lobby
    /// becomes host.
    pub fn join(&mut self, nickname: impl Into<String>) -> LobbyUser {
        let id = self.fresh_user_id();
        let user = LobbyUser::new(id, nickname, self.users.is_empty());
        self.users.push(user.clone());
        user
    }

    /// Removes a user from the lobby. Host status is not handed on.
    pub fn remove_user(&mut self, id: &UserId) -> Option<LobbyUser> {
        let index = self.users.iter().position(|u| &u.id == id)?;
        Some(self.users.remove(index))
    }

    /// Moves a user to a team and seat. `None` if the user is unknown.
    pub fn update_team(
        &mut self,
        id: &UserId,
        team: Team,
        position: i32,
    ) -> Option<LobbyUser> {
        let user = self.user_mut(id)?;
        user.team = team;
        user.position = position;
        Some(user.clone())
    }

    /// Sets a user's ready flag. `None` if the user is unknown.
    pub fn update_ready(
        &mut self,
        id: &UserId,
        is_ready: bool,
    ) -> Option<LobbyUser> {
        let user = self.user_mut(id)?;
        user.is_ready = is_ready;
        Some(user.clone())
    }

    pub fn ban(&mut self, champion: impl Into<String>) {
        self.bans.push(champion.into());
    }

    pub fn pick(&mut self, champion: impl Into<String>) {
        self.picks.push(champion.into());
    }

    /// Closes the current set: records the result, advances to the next
    /// set and clears the draft, all in one step.
    pub fn submit_result(&mut self, result: SetResult) -> SetProgress {
        self.results.push(result);
        self.current_set += 1;
        self.bans.clear();
        self.picks.clear();
        SetProgress {
            status: self.status,
            current_set: self.current_set,
        }
    }

    /// True iff every seated (non-spectator) user is ready or is the host.
    /// Derived on every call; never stored.
    pub fn all_ready(&self) -> bool {
        self.users
            .iter()
            .filter(|u| u.team != Team::Spectator)
            .all(LobbyUser::counts_as_ready)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.code.clone(),
            settings: self.settings.clone(),
            status: self.status,
            current_set: self.current_set,
            bans: self.bans.clone(),
            picks: self.picks.clone(),
            results: self.results.clone(),
            users: self.users.clone(),
        }
    }

    pub fn lobby_status(&self) -> LobbyStatus {
        LobbyStatus {
            room_id: self.code.clone(),
            settings: self.settings.clone(),
            users: self.users.clone(),
            status: self.status,
            current_set: self.current_set,
            all_ready: self.all_ready(),
        }
    }

    /// Builds the outbound message for a projection.
    pub fn project(&self, projection: Projection) -> ServerMessage {
        match projection {
            Projection::Snapshot => ServerMessage::Room(self.snapshot()),
            Projection::Status => {
                ServerMessage::Notice(Notice::StatusUpdate(self.lobby_status()))
            }
        }
    }

    fn user_mut(&mut self, id: &UserId) -> Option<&mut LobbyUser> {
        self.users.iter_mut().find(|u| &u.id == id)
    }

    fn fresh_user_id(&self) -> UserId {
        loop {
            let id = UserId::random();
            if self.users.iter().all(|u| u.id != id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use draftroom_protocol::{PlayerCountMode, Score};

    use super::*;

    fn room() -> Room {
        Room::new(
            RoomCode::new("ab12cd34"),
            RoomSettings {
                version: "14.1".into(),
                draft_mode: "tournament".into(),
                match_format: "bo3".into(),
                player_count: PlayerCountMode::Team,
                time_limit: "30".into(),
            },
        )
    }

    #[test]
    fn test_new_room_starts_waiting_on_first_set() {
        let room = room();
        let snapshot = room.snapshot();
        assert_eq!(snapshot.status, RoomStatus::Waiting);
        assert_eq!(snapshot.current_set, 1);
        assert!(snapshot.bans.is_empty());
        assert!(snapshot.picks.is_empty());
        assert!(snapshot.results.is_empty());
        assert!(snapshot.users.is_empty());
    }

    #[test]
    fn test_first_joiner_is_host_and_later_joiners_are_not() {
        let mut room = room();
        let host = room.join("faker");
        let second = room.join("keria");
        let third = room.join("zeus");

        assert!(host.is_host);
        assert!(!second.is_host);
        assert!(!third.is_host);
        assert_eq!(room.users().len(), 3);
        assert_eq!(room.users()[0].nickname, "faker");
    }

    #[test]
    fn test_join_mints_distinct_ids() {
        let mut room = room();
        let a = room.join("a");
        let b = room.join("b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.as_str().len(), UserId::LEN);
    }

    #[test]
    fn test_host_is_not_reassigned_after_host_leaves() {
        let mut room = room();
        let host = room.join("host");
        room.join("guest");

        room.remove_user(&host.id).expect("host was present");
        assert_eq!(room.users().len(), 1);
        assert!(!room.users()[0].is_host);

        // Lobby is not empty, so a new joiner is not host either.
        assert!(!room.join("late").is_host);
    }

    #[test]
    fn test_bans_and_picks_keep_arrival_order() {
        let mut room = room();
        for champion in ["Ahri", "Zed", "Lux"] {
            room.ban(champion);
        }
        room.pick("Jinx");
        room.pick("Thresh");

        assert_eq!(room.bans(), ["Ahri", "Zed", "Lux"]);
        assert_eq!(room.picks(), ["Jinx", "Thresh"]);
    }

    #[test]
    fn test_submit_result_is_one_transition() {
        let mut room = room();
        room.ban("Ahri");
        room.pick("Jinx");

        let progress = room.submit_result(SetResult {
            winner: Team::Blue,
            score: Score { blue: 1, red: 0 },
        });

        assert_eq!(progress.current_set, 2);
        assert_eq!(progress.status, RoomStatus::Waiting);
        assert!(room.bans().is_empty());
        assert!(room.picks().is_empty());
        assert_eq!(room.snapshot().results.len(), 1);
    }

    #[test]
    fn test_update_unknown_user_is_none() {
        let mut room = room();
        room.join("faker");
        let ghost = UserId::new("ffffff");
        assert!(room.update_team(&ghost, Team::Red, 0).is_none());
        assert!(room.update_ready(&ghost, true).is_none());
        assert!(room.remove_user(&ghost).is_none());
    }

    #[test]
    fn test_all_ready_with_host_and_ready_players() {
        let mut room = room();
        let host = room.join("host");
        let a = room.join("a");
        let b = room.join("b");
        room.update_team(&host.id, Team::Blue, 0);
        room.update_team(&a.id, Team::Blue, 1);
        room.update_team(&b.id, Team::Red, 0);
        room.update_ready(&a.id, true);
        room.update_ready(&b.id, true);
        assert!(room.all_ready());

        // A fresh spectator is neither ready nor host: no effect.
        room.join("watcher");
        assert!(room.all_ready());
    }

    #[test]
    fn test_all_ready_false_when_seated_player_not_ready() {
        let mut room = room();
        room.join("host");
        let a = room.join("a");
        room.update_team(&a.id, Team::Red, 0);
        assert!(!room.all_ready());

        room.update_ready(&a.id, true);
        assert!(room.all_ready());
    }

    #[test]
    fn test_all_ready_vacuously_true_with_only_spectators() {
        let mut room = room();
        room.join("a");
        room.join("b");
        assert!(room.all_ready());
    }

    #[test]
    fn test_projections() {
        let mut room = room();
        room.join("faker");

        match room.project(Projection::Snapshot) {
            ServerMessage::Room(snapshot) => {
                assert_eq!(snapshot.room_id, RoomCode::new("ab12cd34"));
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
        match room.project(Projection::Status) {
            ServerMessage::Notice(Notice::StatusUpdate(status)) => {
                assert_eq!(status.users.len(), 1);
                assert!(status.all_ready);
            }
            other => panic!("expected status update, got {other:?}"),
        }
    }
}
