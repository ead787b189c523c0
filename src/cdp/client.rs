//! WebSocket client for a single DevTools target.
//!
//! Commands carry auto-incrementing ids and are correlated with their
//! responses by a background reader task. Events are queued on an unbounded
//! channel, so an event that arrives before anyone waits for it is kept.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::error::ProtocolError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>;

/// Default time allowed for a single command round-trip.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// An event pushed by the target (e.g. `Page.loadEventFired`).
#[derive(Debug, Clone)]
pub struct CdpEvent {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone, serde::Serialize)]
struct CdpCommand<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

/// A response correlated to a command id.
#[derive(Debug, Clone)]
pub struct CdpResponse {
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<CdpResponseError>,
}

/// Error object carried by a failed response.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CdpResponseError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl CdpResponseError {
    /// Decode an `error` member. A malformed object still yields an error,
    /// carrying the raw JSON as its message.
    pub fn from_json(raw: &Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or_else(|_| Self {
            code: raw.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: raw
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("malformed error response: {raw}")),
            data: raw.get("data").cloned(),
        })
    }

    fn data_text(&self) -> Option<String> {
        self.data.as_ref().map(|data| match data {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// An inbound frame, classified.
#[derive(Debug, Clone)]
pub enum Incoming {
    Response(CdpResponse),
    Event(CdpEvent),
}

/// Connection to one target's WebSocket debugger URL.
pub struct CdpClient {
    url: String,
    next_id: AtomicU64,
    pending: PendingMap,
    writer: Mutex<WsSink>,
    event_rx: mpsc::UnboundedReceiver<CdpEvent>,
    command_timeout: Duration,
    reader: JoinHandle<()>,
}

impl CdpClient {
    /// Connect to `ws://host:port/devtools/page/{id}`.
    pub async fn connect(ws_url: &str, command_timeout: Duration) -> Result<Self, ProtocolError> {
        tracing::debug!(url = ws_url, "connecting to DevTools target");

        let (stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| ProtocolError::ConnectionFailed {
                url: ws_url.to_string(),
                reason: e.to_string(),
            })?;

        let (writer, reader) = stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(read_loop(reader, Arc::clone(&pending), event_tx));

        Ok(Self {
            url: ws_url.to_string(),
            next_id: AtomicU64::new(1),
            pending,
            writer: Mutex::new(writer),
            event_rx,
            command_timeout,
            reader,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a command and wait for its result, bounded by the command timeout.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let json = serde_json::to_string(&CdpCommand { id, method, params })
            .map_err(|e| ProtocolError::protocol(format!("failed to serialize command: {e}")))?;

        tracing::trace!(id, method, "sending CDP command");

        // Register before sending so a fast response cannot be missed.
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let sent = {
            let mut writer = self.writer.lock().await;
            writer.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(ProtocolError::protocol(format!(
                "failed to send WebSocket message: {e}"
            )));
        }

        let response = match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(ProtocolError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(ProtocolError::Timeout {
                    method: method.to_string(),
                    duration: self.command_timeout,
                });
            }
        };

        if let Some(err) = response.error {
            return Err(ProtocolError::Command {
                code: err.code,
                data: err.data_text(),
                message: err.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Next queued event, or `None` once the connection is gone.
    pub async fn next_event(&mut self) -> Option<CdpEvent> {
        self.event_rx.recv().await
    }

    /// Wait until an event named `method` arrives, discarding others.
    pub async fn wait_for_event(&mut self, method: &str) -> Result<Value, ProtocolError> {
        while let Some(event) = self.next_event().await {
            if event.method == method {
                return Ok(event.params);
            }
            tracing::trace!(event = %event.method, "skipping CDP event");
        }
        Err(ProtocolError::Closed)
    }

    /// Close the socket. Errors are logged and swallowed.
    pub async fn close(&mut self) {
        let closed = {
            let mut writer = self.writer.lock().await;
            writer.close().await
        };
        if let Err(e) = closed {
            tracing::debug!(url = %self.url, error = %e, "error closing DevTools socket");
        }
        self.reader.abort();
        self.pending.lock().await.clear();
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop(
    mut reader: SplitStream<WsStream>,
    pending: PendingMap,
    event_tx: mpsc::UnboundedSender<CdpEvent>,
) {
    while let Some(frame) = reader.next().await {
        let text = match frame {
            Ok(Message::Text(t)) => t.as_str().to_owned(),
            Ok(Message::Binary(b)) => match String::from_utf8(b.to_vec()) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => {
                tracing::debug!("DevTools socket closed by remote");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "DevTools socket read error, stopping reader");
                break;
            }
        };

        let json: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse CDP message as JSON");
                continue;
            }
        };

        match classify(&json) {
            Some(Incoming::Response(response)) => {
                if let Some(tx) = pending.lock().await.remove(&response.id) {
                    let _ = tx.send(response);
                } else {
                    tracing::debug!(id = response.id, "response for unknown command id");
                }
            }
            Some(Incoming::Event(event)) => {
                let _ = event_tx.send(event);
            }
            None => tracing::debug!("ignoring unrecognised CDP frame"),
        }
    }

    // Dropping the senders fails every outstanding command with `Closed`.
    pending.lock().await.clear();
}

/// Classify a decoded frame as a response (has `id`) or an event (has
/// `method` and no `id`).
pub fn classify(json: &Value) -> Option<Incoming> {
    if let Some(id) = json.get("id").and_then(Value::as_u64) {
        return Some(Incoming::Response(CdpResponse {
            id,
            result: json.get("result").cloned(),
            error: json
                .get("error")
                .filter(|e| !e.is_null())
                .map(CdpResponseError::from_json),
        }));
    }
    let method = json.get("method")?.as_str()?.to_string();
    let params = json.get("params").cloned().unwrap_or(Value::Null);
    Some(Incoming::Event(CdpEvent { method, params }))
}
