//! Wire protocol for draftroom.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`RoomSettings`], [`LobbyUser`], [`RoomSnapshot`],
//!   [`LobbyStatus`], [`ServerMessage`], …), the shapes that travel on
//!   the wire, outbound and in HTTP bodies.
//! - **Actions** ([`ClientAction`]): the tagged inbound messages of a
//!   room channel, decoded once at the boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes ↔ types.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about connections or rooms at runtime; it only
//! describes messages.

mod action;
mod codec;
mod error;
mod types;

pub use action::{ClientAction, JoinRequest, ReadyUpdate, TeamUpdate};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientId, CreatedRoom, LobbyStatus, LobbyUser, Notice, PlayerCountMode,
    RoomCode, RoomSettings, RoomSnapshot, RoomStatus, Score, ServerMessage,
    SetProgress, SetResult, Team, UNASSIGNED_POSITION, UserId,
};
