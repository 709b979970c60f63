//! `DraftServer` builder and server loop.
//!
//! This is the entry point for running a draftroom server. It ties
//! together all the layers: transport → protocol → registry → room, plus
//! the HTTP adapter on its own listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use draftroom_protocol::{Codec, JsonCodec};
use draftroom_room::{RoomConfig, RoomManager};
use draftroom_transport::{
    DEFAULT_HANDSHAKE_TIMEOUT, PendingConnection, Transport, WebSocketTransport,
};
use tokio::net::TcpListener;

use crate::DraftError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The room
/// manager needs no outer lock: rooms serialize their own mutations.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Arc<RoomManager>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a draftroom server.
///
/// # Example
///
/// ```rust,no_run
/// use draftroom::prelude::*;
///
/// # async fn run() -> Result<(), DraftError> {
/// let server = DraftServer::builder()
///     .bind_http("0.0.0.0:8000")
///     .bind_ws("0.0.0.0:8001")
///     .allow_origin("http://localhost:5173")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DraftServerBuilder {
    http_addr: String,
    ws_addr: String,
    allowed_origins: Vec<String>,
    room_config: RoomConfig,
    handshake_timeout: Duration,
}

impl DraftServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            http_addr: "127.0.0.1:8000".to_string(),
            ws_addr: "127.0.0.1:8001".to_string(),
            allowed_origins: Vec::new(),
            room_config: RoomConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address of the HTTP listener.
    pub fn bind_http(mut self, addr: &str) -> Self {
        self.http_addr = addr.to_string();
        self
    }

    /// Sets the address of the WebSocket listener.
    pub fn bind_ws(mut self, addr: &str) -> Self {
        self.ws_addr = addr.to_string();
        self
    }

    /// Adds an origin allowed by CORS. With none added, any origin is
    /// allowed.
    pub fn allow_origin(mut self, origin: &str) -> Self {
        self.allowed_origins.push(origin.to_string());
        self
    }

    /// Sets the room layer configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets how long a WebSocket peer may take to send its upgrade
    /// request before it is dropped.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds both listeners.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DraftServer<JsonCodec>, DraftError> {
        let transport = WebSocketTransport::bind(&self.ws_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);
        let http_listener = TcpListener::bind(&self.http_addr).await?;
        tracing::info!(addr = %self.http_addr, "HTTP listener bound");

        let state = Arc::new(ServerState {
            rooms: Arc::new(RoomManager::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(DraftServer {
            transport,
            http_listener,
            allowed_origins: self.allowed_origins,
            state,
        })
    }
}

impl Default for DraftServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound draftroom server.
///
/// Call [`run()`](Self::run) to start serving both listeners.
pub struct DraftServer<C: Codec> {
    transport: WebSocketTransport,
    http_listener: TcpListener,
    allowed_origins: Vec<String>,
    state: Arc<ServerState<C>>,
}

impl DraftServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DraftServerBuilder {
        DraftServerBuilder::new()
    }
}

impl<C: Codec> DraftServer<C> {
    /// Returns the address the WebSocket listener is bound to.
    pub fn ws_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address the HTTP listener is bound to.
    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http_listener.local_addr()
    }

    /// Returns the room manager shared by both listeners.
    pub fn rooms(&self) -> Arc<RoomManager> {
        Arc::clone(&self.state.rooms)
    }

    /// Runs the HTTP server and the WebSocket accept loop.
    ///
    /// Returns only if the HTTP server fails. The accept loop itself
    /// logs accept errors and keeps going.
    pub async fn run(self) -> Result<(), DraftError> {
        let Self {
            transport,
            http_listener,
            allowed_origins,
            state,
        } = self;
        tracing::info!("draftroom server running");

        let app = crate::http::router(Arc::clone(&state.rooms), &allowed_origins);
        let http = async move { axum::serve(http_listener, app).await };

        tokio::select! {
            result = http => result.map_err(DraftError::Io),
            () = accept_loop(transport, state) => Ok(()),
        }
    }
}

/// Accepts WebSocket connections forever, one handler task each.
///
/// The upgrade runs in the spawned task, so a peer that stalls its
/// handshake holds up only itself.
async fn accept_loop<C: Codec>(mut transport: WebSocketTransport, state: Arc<ServerState<C>>) {
    loop {
        match transport.accept().await {
            Ok(pending) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let conn_id = pending.id();
                    let conn = match pending.upgrade().await {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::debug!(%conn_id, error = %e, "handshake failed");
                            return;
                        }
                    };
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(
                            %conn_id,
                            error = %e,
                            "connection ended with error"
                        );
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}
