//! Transport abstraction layer for draftroom.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol carrying room traffic, plus [`ConnectParams`], the
//! parameters a client supplied when it opened the connection.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    DEFAULT_HANDSHAKE_TIMEOUT, PendingWebSocket, WebSocketConnection,
    WebSocketTransport,
};

use std::collections::HashMap;
use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// The request path and query parameters a connection was opened with.
///
/// Room traffic carries its routing data (`roomId`, `userId`,
/// `spectator`) in the upgrade request's query string, so the transport
/// captures it before handing the connection over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    path: String,
    query: HashMap<String, String>,
}

impl ConnectParams {
    /// Builds parameters from a path and already-decoded query pairs.
    /// Later duplicates of a key win.
    pub fn new<I, K, V>(path: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The request path, e.g. `/ws/draft`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a query parameter, treating empty values as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Returns the first present parameter among `keys`.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Interprets a parameter as a boolean flag. Only a case-insensitive
    /// `"true"` (or `"1"`) counts as set.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            v.eq_ignore_ascii_case("true") || v == "1"
        })
    }
}

/// Accepts new incoming connections.
///
/// `accept` only takes the raw connection off the listener. The protocol
/// handshake happens in [`PendingConnection::upgrade`], so the caller can
/// run it in the connection's own task and keep accepting.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// A connection that has been accepted but not yet upgraded.
    type Pending: PendingConnection<Connection = Self::Connection, Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// An accepted connection still waiting for its handshake.
pub trait PendingConnection: Send + 'static {
    /// The connection type the handshake produces.
    type Connection: Connection;
    /// The error type for the handshake.
    type Error: std::error::Error + Send + Sync;

    /// Identifier the upgraded connection will carry.
    fn id(&self) -> ConnectionId;

    /// Completes the handshake. Fails if the peer does not finish it
    /// within the transport's handshake timeout.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// Implementations must allow `send` to make progress while another task
/// is parked in `recv`.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the parameters the connection was opened with.
    fn params(&self) -> &ConnectParams;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
        assert_eq!(id.into_inner(), 7);
    }

    #[test]
    fn test_params_get_skips_empty_values() {
        let params =
            ConnectParams::new("/ws/draft", [("id", "ab12cd34"), ("userId", "")]);
        assert_eq!(params.path(), "/ws/draft");
        assert_eq!(params.get("id"), Some("ab12cd34"));
        assert_eq!(params.get("userId"), None);
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_params_get_any_prefers_first_key() {
        let params =
            ConnectParams::new("/", [("id", "old"), ("roomId", "new")]);
        assert_eq!(params.get_any(&["roomId", "id"]), Some("new"));
        let params = ConnectParams::new("/", [("id", "old")]);
        assert_eq!(params.get_any(&["roomId", "id"]), Some("old"));
    }

    #[test]
    fn test_params_flag() {
        let params = ConnectParams::new(
            "/",
            [("a", "true"), ("b", "TRUE"), ("c", "false"), ("d", "1")],
        );
        assert!(params.flag("a"));
        assert!(params.flag("b"));
        assert!(!params.flag("c"));
        assert!(params.flag("d"));
        assert!(!params.flag("missing"));
    }
}
