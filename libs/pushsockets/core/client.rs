use crate::core::config::TransportConfig;
use crate::core::connection_state::{AtomicConnectionState, ConnectionState};
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Event sink shared with the I/O task; `None` once the transport is closed
type SharedSink = Arc<Mutex<Option<EventSender>>>;

/// Close code reported when the stream ends without a close frame
const ABNORMAL_CLOSURE: u16 = 1006;
/// Close code reported when a close frame carried no status
const NO_STATUS_RECEIVED: u16 = 1005;

/// Internal command messages for the I/O task
#[derive(Debug)]
enum TransportCommand {
    /// Write a text frame
    Send(String),
    /// Close the socket and exit
    Close,
}

/// How the message loop ended
#[derive(Debug)]
enum LoopExit {
    /// `close()` was called; observers are already gone
    ClosedByUser,
    /// The peer closed or the stream ended
    Closed {
        code: u16,
        reason: String,
        clean: bool,
    },
    /// Reading or writing failed
    Failed(TransportError),
}

/// WebSocket transport owning exactly one physical connection
///
/// `connect` spawns a tokio task that performs the handshake and then pumps
/// frames in both directions. Everything observable is reported through the
/// event sink passed to [`PushTransport::new`]:
///
/// - `Connected` once the handshake completes
/// - `Message` for every text frame that is not a passive ping
/// - `Error` for connect/send/read failures
/// - `Closed` when the connection ends for any reason other than `close()`
pub struct PushTransport {
    config: Arc<TransportConfig>,
    state: Arc<AtomicConnectionState>,
    events: SharedSink,
    command_tx: Mutex<Option<UnboundedSender<TransportCommand>>>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PushTransport {
    pub fn new(config: Arc<TransportConfig>, events: EventSender) -> Self {
        Self {
            config,
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected)),
            events: Arc::new(Mutex::new(Some(events))),
            command_tx: Mutex::new(None),
            task_handle: Mutex::new(None),
        }
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Get a reference to the configured URL
    pub fn url(&self) -> &str {
        self.config.url()
    }
}

impl Transport for PushTransport {
    fn connect(&self) {
        let mut task_handle = self.task_handle.lock();
        if task_handle.is_some() {
            warn!("[PushTransport] connect() called twice, ignoring");
            return;
        }
        if self.events.lock().is_none() {
            debug!("[PushTransport] Transport already closed, ignoring connect()");
            return;
        }

        self.state.set(ConnectionState::Connecting);

        let (command_tx, command_rx) = unbounded_channel();
        *self.command_tx.lock() = Some(command_tx);

        let config = Arc::clone(&self.config);
        let state = Arc::clone(&self.state);
        let events = Arc::clone(&self.events);

        *task_handle = Some(tokio::spawn(async move {
            run_transport(config, state, events, command_rx).await;
        }));
    }

    fn send(&self, payload: String) {
        if !self.state.is_connected() {
            warn!("[PushTransport] {}", TransportError::NotConnected);
            emit(
                &self.events,
                TransportEvent::Error(TransportError::NotConnected.to_string()),
            );
            return;
        }

        debug!("[PushTransport] Sending frame: {}", payload);
        let queued = self
            .command_tx
            .lock()
            .as_ref()
            .map(|tx| tx.send(TransportCommand::Send(payload)).is_ok())
            .unwrap_or(false);

        if !queued {
            let error = TransportError::SendFailed("transport task has stopped".to_string());
            warn!("[PushTransport] {}", error);
            emit(&self.events, TransportEvent::Error(error.to_string()));
        }
    }

    fn close(&self) {
        // Dropping the sink unregisters every observer
        let had_observers = self.events.lock().take().is_some();
        let previous = self.state.get();
        self.state.set(ConnectionState::ShuttingDown);

        if let Some(tx) = self.command_tx.lock().take() {
            let _ = tx.send(TransportCommand::Close);
        }

        if let Some(handle) = self.task_handle.lock().take() {
            // A pending handshake is abandoned outright; an open socket gets a close frame
            if previous == ConnectionState::Connecting {
                handle.abort();
                self.state.set(ConnectionState::Disconnected);
            }
        } else {
            self.state.set(ConnectionState::Disconnected);
        }

        if had_observers {
            debug!("[PushTransport] Closed transport for {}", self.config.url());
        }
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }
}

impl Drop for PushTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Creates [`PushTransport`]s that share one configuration
pub struct PushTransportFactory {
    config: Arc<TransportConfig>,
}

impl PushTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl TransportFactory for PushTransportFactory {
    fn create(&self, events: EventSender) -> Arc<dyn Transport> {
        Arc::new(PushTransport::new(Arc::clone(&self.config), events))
    }
}

fn emit(events: &SharedSink, event: TransportEvent) {
    if let Some(tx) = events.lock().as_ref() {
        let _ = tx.send(event);
    }
}

/// I/O task: handshake, then the message loop
async fn run_transport(
    config: Arc<TransportConfig>,
    state: Arc<AtomicConnectionState>,
    events: SharedSink,
    mut command_rx: UnboundedReceiver<TransportCommand>,
) {
    let url = config.url().to_string();
    debug!("[PushTransport] Connecting to {}", url);

    let connect_result = tokio::time::timeout(config.connect_timeout(), connect_async(url.as_str())).await;

    let ws_stream = match connect_result {
        Ok(Ok((ws_stream, _response))) => ws_stream,
        Ok(Err(e)) => {
            let error = TransportError::ConnectFailed {
                url,
                reason: e.to_string(),
            };
            fail_connect(&state, &events, error);
            return;
        }
        Err(_) => {
            fail_connect(&state, &events, TransportError::ConnectTimeout(url));
            return;
        }
    };

    if !state.transition_unless_shutting_down(ConnectionState::Connected) {
        debug!("[PushTransport] Closed while connecting, dropping connection");
        let mut ws_stream = ws_stream;
        let _ = ws_stream.close(None).await;
        state.set(ConnectionState::Disconnected);
        return;
    }

    info!("[PushTransport] Connected to {}", url);
    emit(&events, TransportEvent::Connected);

    let exit = message_loop(ws_stream, &config, &events, &mut command_rx).await;

    match exit {
        LoopExit::ClosedByUser => {
            state.set(ConnectionState::Disconnected);
            debug!("[PushTransport] Connection released");
        }
        LoopExit::Closed {
            code,
            reason,
            clean,
        } => {
            state.transition_unless_shutting_down(ConnectionState::Disconnected);
            info!(
                "[PushTransport] Connection closed with the status code: {} and reason: \"{}\"",
                code, reason
            );
            emit(
                &events,
                TransportEvent::Closed {
                    code,
                    reason,
                    clean,
                },
            );
        }
        LoopExit::Failed(error) => {
            state.transition_unless_shutting_down(ConnectionState::Disconnected);
            warn!("[PushTransport] {}", error);
            let reason = error.to_string();
            emit(&events, TransportEvent::Error(reason.clone()));
            emit(
                &events,
                TransportEvent::Closed {
                    code: ABNORMAL_CLOSURE,
                    reason,
                    clean: false,
                },
            );
        }
    }
}

fn fail_connect(state: &AtomicConnectionState, events: &SharedSink, error: TransportError) {
    state.transition_unless_shutting_down(ConnectionState::Disconnected);
    warn!("[PushTransport] {}", error);
    emit(events, TransportEvent::Error(error.to_string()));
}

/// Pump frames until the connection ends or `close()` is requested
async fn message_loop(
    ws_stream: WsStream,
    config: &TransportConfig,
    events: &SharedSink,
    command_rx: &mut UnboundedReceiver<TransportCommand>,
) -> LoopExit {
    let (mut write, mut read) = ws_stream.split();
    let mut close_frame: Option<(u16, String)> = None;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(ref detector) = config.passive_ping {
                            if detector.is_ping(&text) {
                                debug!("[PushTransport] Passive ping from server, answering");
                                if let Err(e) = write.send(Message::Text(detector.pong_response())).await {
                                    return LoopExit::Failed(TransportError::SendFailed(e.to_string()));
                                }
                                continue;
                            }
                        }

                        debug!("[PushTransport] Received frame: {}", text);
                        emit(events, TransportEvent::Message(text));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!("[PushTransport] Ignoring binary frame ({} bytes)", data.len());
                    }
                    Some(Ok(Message::Close(frame))) => {
                        close_frame = Some(
                            frame
                                .map(|f| (u16::from(f.code), f.reason.to_string()))
                                .unwrap_or((NO_STATUS_RECEIVED, String::new())),
                        );
                    }
                    // Control frames are answered by tungstenite itself
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return match close_frame {
                            Some((code, reason)) => LoopExit::Closed { code, reason, clean: true },
                            None => LoopExit::Failed(TransportError::WebSocket(e.to_string())),
                        };
                    }
                    None => {
                        return match close_frame {
                            Some((code, reason)) => LoopExit::Closed { code, reason, clean: true },
                            None => LoopExit::Closed {
                                code: ABNORMAL_CLOSURE,
                                reason: "Stream ended".to_string(),
                                clean: false,
                            },
                        };
                    }
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(TransportCommand::Send(payload)) => {
                        if let Err(e) = write.send(Message::Text(payload)).await {
                            return LoopExit::Failed(TransportError::SendFailed(e.to_string()));
                        }
                    }
                    Some(TransportCommand::Close) | None => {
                        let _ = write.close().await;
                        return LoopExit::ClosedByUser;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_before_connect_reports_error() {
        let (tx, mut rx) = unbounded_channel();
        let transport = PushTransport::new(Arc::new(TransportConfig::new("ws://127.0.0.1:1")), tx);

        transport.send("{}".to_string());

        assert_eq!(
            rx.recv().await,
            Some(TransportEvent::Error(TransportError::NotConnected.to_string()))
        );
    }

    #[tokio::test]
    async fn test_close_before_connect_is_idempotent() {
        let (tx, mut rx) = unbounded_channel();
        let transport = PushTransport::new(Arc::new(TransportConfig::new("ws://127.0.0.1:1")), tx);

        transport.close();
        transport.close();
        transport.connect();

        assert!(!transport.is_connected());
        assert_eq!(transport.connection_state(), ConnectionState::Disconnected);
        // Sink dropped, so the receiver sees the channel close with no events
        assert_eq!(rx.recv().await, None);
    }
}
