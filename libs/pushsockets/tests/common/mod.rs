//! Common test utilities for PushSockets integration tests

use futures::{SinkExt, StreamExt};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// What the mock server should do next on its single connection
#[derive(Debug)]
pub enum ServerAction {
    Send(String),
    Close { code: u16, reason: String },
}

/// Mock push server that accepts one connection
///
/// Frames received from the client show up on `received`; frames to push are
/// queued on `actions`.
pub struct MockPushServer {
    pub addr: SocketAddr,
    pub actions: UnboundedSender<ServerAction>,
    pub received: UnboundedReceiver<String>,
}

impl MockPushServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (actions_tx, actions_rx) = unbounded_channel();
        let (received_tx, received_rx) = unbounded_channel();

        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                Self::handle_connection(stream, actions_rx, received_tx).await;
            }
        });

        Self {
            addr,
            actions: actions_tx,
            received: received_rx,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        mut actions: UnboundedReceiver<ServerAction>,
        received: UnboundedSender<String>,
    ) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let _ = received.send(text);
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                action = actions.recv() => {
                    match action {
                        Some(ServerAction::Send(text)) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Some(ServerAction::Close { code, reason }) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: Cow::Owned(reason),
                            };
                            let _ = write.send(Message::Close(Some(frame))).await;
                        }
                        None => break,
                    }
                }
            }
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn push(&self, text: &str) {
        self.actions.send(ServerAction::Send(text.to_string())).unwrap();
    }

    pub fn close(&self, code: u16, reason: &str) {
        self.actions
            .send(ServerAction::Close {
                code,
                reason: reason.to_string(),
            })
            .unwrap();
    }

    /// Next frame the client sent, failing the test after two seconds
    pub async fn next_received(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.received.recv())
            .await
            .expect("timed out waiting for client frame")
            .expect("server connection ended")
    }
}

/// Next transport event, failing the test after two seconds
pub async fn next_event<T>(rx: &mut UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("event channel closed")
}

/// An address nothing listens on
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
