//! Test fixtures shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{ServerConfig, domain::UserId, ui};
use tokio::{net::TcpStream, time::Duration};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Staff identity configured on every test server
pub const STAFF_USER: i64 = 99;

/// Room id used for the readiness round trip; never joined by tests
const READY_ROOM: i64 = 999_999;

/// In-process server bound to an ephemeral port.
///
/// Room 1 is "General" (open) and room 2 is "Staff" (staff only).
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let config = ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            staff: vec![UserId::new(STAFF_USER).unwrap()],
            ..config
        };
        let server = ui::start(config, std::future::pending::<()>())
            .await
            .expect("Failed to start server");
        Self {
            addr: server.addr(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, user_id: i64) -> String {
        format!("ws://{}/ws?user_id={}", self.addr, user_id)
    }

    /// Connect and wait until the session receives fan-out.
    ///
    /// The session subscribes after the handshake completes, so a command
    /// round trip (leaving a room never joined) is used as the ready signal.
    pub async fn connect(&self, user_id: i64) -> WsStream {
        let (mut stream, _) = connect_async(self.ws_url(user_id))
            .await
            .expect("Failed to connect");
        send_json(
            &mut stream,
            serde_json::json!({"command": "leave", "room": READY_ROOM}),
        )
        .await;
        let frame = recv_json(&mut stream).await;
        assert_eq!(frame["status"], 409, "Unexpected ready frame: {frame}");
        stream
    }
}

pub async fn send_json(stream: &mut WsStream, value: serde_json::Value) {
    stream
        .send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, failing after a short timeout.
pub async fn recv_json(stream: &mut WsStream) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("Timed out waiting for frame")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

/// Assert that nothing arrives within a short window.
pub async fn assert_silent(stream: &mut WsStream) {
    let result = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
    assert!(result.is_err(), "Unexpected frame: {:?}", result);
}
