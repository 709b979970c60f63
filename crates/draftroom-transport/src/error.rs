//! Error types for the transport layer.

/// Errors that can occur in the transport layer.
///
/// I/O variants carry the underlying error; WebSocket protocol
/// errors are wrapped into `std::io::Error` so callers never need to
/// depend on `tungstenite` directly.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed (peer gone, socket broken).
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting, or upgrading a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer did not finish the handshake in time.
    #[error("handshake not completed within {0:?}")]
    HandshakeTimeout(std::time::Duration),
}
