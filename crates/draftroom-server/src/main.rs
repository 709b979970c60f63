//! Runs a draftroom server.
//!
//! ```bash
//! draftroom --http-addr 0.0.0.0:8000 --ws-addr 0.0.0.0:8001 \
//!     --allow-origin http://localhost:5173
//! ```
//!
//! Every flag can also be set through the environment. Log verbosity
//! follows `RUST_LOG` (default `info`).

use clap::Parser;
use draftroom::prelude::*;

/// Real-time draft room server
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address for the HTTP lobby API
    #[arg(long, env = "DRAFTROOM_HTTP_ADDR", default_value = "127.0.0.1:8000")]
    http_addr: String,

    /// Address for the WebSocket room channels
    #[arg(long, env = "DRAFTROOM_WS_ADDR", default_value = "127.0.0.1:8001")]
    ws_addr: String,

    /// Origin allowed by CORS; repeat for several. Any origin if omitted.
    #[arg(long = "allow-origin", env = "DRAFTROOM_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Per-connection outbound queue length
    #[arg(long, default_value_t = RoomConfig::default().outbound_buffer)]
    outbound_buffer: usize,
}

#[tokio::main]
async fn main() -> Result<(), DraftError> {
    draftroom::init_tracing("info");
    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed arguments");

    let room_config = RoomConfig {
        outbound_buffer: cli.outbound_buffer,
        ..RoomConfig::default()
    };

    let builder = cli.allowed_origins.iter().fold(
        DraftServer::builder()
            .bind_http(&cli.http_addr)
            .bind_ws(&cli.ws_addr)
            .room_config(room_config),
        |builder, origin| builder.allow_origin(origin),
    );

    let server = builder.build().await?;
    tracing::info!(
        http = %cli.http_addr,
        ws = %cli.ws_addr,
        "listening"
    );
    server.run().await
}
