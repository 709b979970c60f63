//! # draftroom
//!
//! Real-time draft room server.
//!
//! Clients create a room over HTTP, join its lobby, then open a WebSocket
//! channel to the room. Every ban, pick, seat change, ready toggle and
//! set result is applied by the room's actor and pushed to every
//! connection watching that room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use draftroom::prelude::*;
//!
//! # async fn run() -> Result<(), DraftError> {
//! draftroom::init_tracing("info");
//! let server = DraftServer::builder()
//!     .bind_http("127.0.0.1:8000")
//!     .bind_ws("127.0.0.1:8001")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
pub mod http;
mod logging;
mod server;

pub use error::DraftError;
pub use logging::init_tracing;
pub use server::{DraftServer, DraftServerBuilder};

/// Re-exports for the common case.
pub mod prelude {
    pub use crate::{DraftError, DraftServer, DraftServerBuilder};
    pub use draftroom_protocol::{
        ClientAction, LobbyStatus, LobbyUser, PlayerCountMode, RoomCode,
        RoomSettings, RoomSnapshot, Team,
    };
    pub use draftroom_registry::Role;
    pub use draftroom_room::{RoomConfig, RoomManager};
}
