//! Room state synchronization for draftroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! authoritative [`Room`] and applies mutations one at a time. Every
//! mutation emits a "room changed" projection that the room's fan-out
//! task serializes once and delivers to every attached observer.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates rooms, runs lobby/result operations,
//!   attaches and detaches connections
//! - [`RoomStore`]: room code → running room actor
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Dispatcher`]: applies one connection's channel actions
//! - [`Room`]: the room model itself
//! - [`RoomConfig`]: buffer sizes and retry limits

mod config;
mod dispatch;
mod error;
mod fanout;
mod manager;
mod room;
mod state;
mod store;

pub use config::RoomConfig;
pub use dispatch::Dispatcher;
pub use error::RoomError;
pub use manager::{Attachment, RoomManager};
pub use room::RoomHandle;
pub use state::{Projection, Room};
pub use store::RoomStore;
