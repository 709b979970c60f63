//! Connection registry for draftroom.
//!
//! Knows which live connections observe which room, and in which role:
//!
//! 1. **Attachment**: capacity and mode checks, done atomically per room
//!    ([`ConnectionRegistry::attach`])
//! 2. **Detachment**: idempotent removal, pruning empty rooms
//! 3. **Observer sets**: the handles the broadcast fan-out delivers to
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)      ← reads observer sets to fan out broadcasts
//!     ↕
//! Registry (this crate)   ← who is connected to which room
//!     ↕
//! Protocol layer (below)  ← RoomCode, ClientId, PlayerCountMode
//! ```

mod binding;
mod error;
mod registry;

pub use binding::{Binding, Frame, ObserverHandle, Role};
pub use error::{DeliveryError, RegistryError};
pub use registry::ConnectionRegistry;
