//! Integration tests for the WebSocket transport.
//!
//! A real listener on an OS-assigned port and a real client, so the
//! upgrade handshake and the split read/write halves are exercised
//! end to end.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use draftroom_transport::{
        Connection, PendingConnection, Transport, TransportError, WebSocketTransport,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    async fn connect_client(url: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_captures_query_params() {
        let (mut transport, addr) = bind().await;
        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.upgrade().await.expect("should upgrade")
        });

        let _client = connect_client(&format!(
            "ws://{addr}/ws/draft?id=ab12cd34&spectator=true"
        ))
        .await;
        let conn = server.await.expect("task should complete");

        assert!(conn.id().into_inner() > 0);
        assert_eq!(conn.params().path(), "/ws/draft");
        assert_eq!(conn.params().get("id"), Some("ab12cd34"));
        assert!(conn.params().flag("spectator"));
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive() {
        let (mut transport, addr) = bind().await;
        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.upgrade().await.expect("should upgrade")
        });

        let mut client = connect_client(&format!("ws://{addr}/")).await;
        let conn = server.await.unwrap();

        conn.send(br#"{"hello":"client"}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON should go out as a text frame");
        assert_eq!(msg.into_data().as_ref(), br#"{"hello":"client"}"#);

        client
            .send(Message::Text(r#"{"action":"ban"}"#.into()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("data");
        assert_eq!(received, br#"{"action":"ban"}"#);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_send_not_blocked_by_pending_recv() {
        let (mut transport, addr) = bind().await;
        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.upgrade().await.expect("should upgrade")
        });

        let mut client = connect_client(&format!("ws://{addr}/")).await;
        let conn = std::sync::Arc::new(server.await.unwrap());

        // Park a reader on the connection; the client sends nothing yet.
        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), conn.send(b"tick"))
            .await
            .expect("send must not wait for the reader")
            .expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"tick");

        client.send(Message::Close(None)).await.unwrap();
        let result = reader.await.unwrap().expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_idle_peer_times_out_in_upgrade() {
        let (transport, addr) = bind().await;
        let mut transport =
            transport.with_handshake_timeout(Duration::from_millis(100));

        let _idle = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let pending = transport.accept().await.expect("should accept");

        let result = pending.upgrade().await;
        assert!(
            matches!(result, Err(TransportError::HandshakeTimeout(_))),
            "an idle peer should time out"
        );
    }

    #[tokio::test]
    async fn test_accept_does_not_wait_for_handshake() {
        let (mut transport, addr) = bind().await;

        let _idle = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let stalled = transport.accept().await.expect("should accept");

        // The idle peer's handshake is still pending; the next peer is
        // accepted and upgraded regardless.
        let url = format!("ws://{addr}/ws/draft?id=ab12cd34");
        let client = tokio::spawn(async move { connect_client(&url).await });
        let pending = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must not be blocked by the idle peer")
            .expect("should accept");
        assert_ne!(pending.id(), stalled.id());

        let conn = pending.upgrade().await.expect("should upgrade");
        assert_eq!(conn.params().get("id"), Some("ab12cd34"));
        let _client = client.await.unwrap();
    }
}
