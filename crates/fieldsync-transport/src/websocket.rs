//! Client-side WebSocket transport using `tokio-tungstenite`.
//!
//! The read and write halves of the stream are split so a consumer can
//! park in `recv` while another task sends. Reconnection happens inside
//! `recv`: one call reports the drop, the next call performs the backoff
//! dial loop and reports the outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, Transport, TransportError, TransportEvent};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

// ---------------------------------------------------------------------------
// ReconnectPolicy
// ---------------------------------------------------------------------------

/// Controls how a [`WebSocketConnection`] retries after the link drops.
///
/// Delays grow exponentially from `base_delay` up to `max_delay`, with up
/// to 25% random jitter added so a fleet of clients dropped by the same
/// outage doesn't redial in lockstep.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// How many dial attempts to make before giving up.
    /// 0 disables reconnection entirely — a drop is terminal.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Cap on the exponential growth.
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given attempt (1-based), jitter included.
    fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let capped = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);
        let jitter_ceil = capped.as_millis() as u64 / 4;
        if jitter_ceil == 0 {
            return capped;
        }
        let jitter = rand::rng().random_range(0..=jitter_ceil);
        capped + Duration::from_millis(jitter)
    }
}

// ---------------------------------------------------------------------------
// WebSocketTransport
// ---------------------------------------------------------------------------

/// A [`Transport`] that dials a WebSocket URL.
pub struct WebSocketTransport {
    url: String,
    policy: ReconnectPolicy,
}

impl WebSocketTransport {
    /// Creates a transport for the given `ws://` / `wss://` URL with the
    /// default reconnect policy.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: ReconnectPolicy::default(),
        }
    }

    /// Overrides the reconnect policy.
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    async fn connect(&self) -> Result<Self::Connection, TransportError> {
        WebSocketConnection::connect_with(&self.url, self.policy.clone())
            .await
    }
}

// ---------------------------------------------------------------------------
// WebSocketConnection
// ---------------------------------------------------------------------------

/// Where the read half currently stands.
enum ReadState {
    Open(WsSource),
    /// Link lost; the next `recv` call runs the redial loop.
    Dropped,
    /// Terminal. Every subsequent `recv` reports `Closed`.
    Closed,
}

/// A client WebSocket connection with automatic reconnection.
pub struct WebSocketConnection {
    url: String,
    policy: ReconnectPolicy,
    closed_locally: AtomicBool,
    writer: Mutex<Option<WsSink>>,
    reader: Mutex<ReadState>,
}

impl WebSocketConnection {
    /// Dials the given URL with the default reconnect policy.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        Self::connect_with(url, ReconnectPolicy::default()).await
    }

    /// Dials the given URL with an explicit reconnect policy.
    pub async fn connect_with(
        url: &str,
        policy: ReconnectPolicy,
    ) -> Result<Self, TransportError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::info!(url, "WebSocket connected");

        let (sink, source) = ws.split();
        Ok(Self {
            url: url.to_string(),
            policy,
            closed_locally: AtomicBool::new(false),
            writer: Mutex::new(Some(sink)),
            reader: Mutex::new(ReadState::Open(source)),
        })
    }

    /// Runs the backoff dial loop. Returns the new stream, or the last
    /// dial error once attempts are exhausted.
    async fn redial(&self) -> Result<WsStream, String> {
        let mut last_error = String::from("no attempts made");

        for attempt in 1..=self.policy.max_attempts {
            let delay = self.policy.delay_for(attempt);
            tracing::info!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "redialing"
            );
            tokio::time::sleep(delay).await;

            match tokio_tungstenite::connect_async(self.url.as_str()).await
            {
                Ok((ws, _)) => {
                    tracing::info!(attempt, "link re-established");
                    return Ok(ws);
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "redial failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(last_error)
    }
}

impl Connection for WebSocketConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or_else(|| {
            TransportError::ConnectionClosed("no open link".into())
        })?;
        sink.send(Message::Binary(data.to_vec().into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    async fn recv(&self) -> Result<TransportEvent, TransportError> {
        loop {
            let mut reader = self.reader.lock().await;
            match &mut *reader {
                ReadState::Closed => {
                    return Ok(TransportEvent::Closed(
                        "connection closed".into(),
                    ));
                }

                ReadState::Dropped => {
                    match self.redial().await {
                        Ok(ws) => {
                            let (sink, source) = ws.split();
                            *self.writer.lock().await = Some(sink);
                            *reader = ReadState::Open(source);
                            return Ok(TransportEvent::Reconnected);
                        }
                        Err(last_error) => {
                            *reader = ReadState::Closed;
                            return Ok(TransportEvent::Closed(format!(
                                "reconnect attempts exhausted: {last_error}"
                            )));
                        }
                    }
                }

                ReadState::Open(source) => match source.next().await {
                    Some(Ok(Message::Binary(data))) => {
                        return Ok(TransportEvent::Message(data.into()));
                    }
                    Some(Ok(Message::Text(text))) => {
                        return Ok(TransportEvent::Message(
                            text.as_bytes().to_vec(),
                        ));
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        *reader = ReadState::Closed;
                        self.writer.lock().await.take();
                        return Ok(TransportEvent::Closed(
                            "closed by server".into(),
                        ));
                    }
                    Some(Ok(_)) => continue, // skip ping/pong/frame
                    Some(Err(e)) => {
                        self.writer.lock().await.take();
                        let local =
                            self.closed_locally.load(Ordering::Acquire);
                        if local || self.policy.max_attempts == 0 {
                            *reader = ReadState::Closed;
                            return Ok(TransportEvent::Closed(format!(
                                "link dropped: {e}"
                            )));
                        }
                        tracing::debug!(error = %e, "link dropped");
                        *reader = ReadState::Dropped;
                        return Ok(TransportEvent::Reconnecting);
                    }
                },
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed_locally.store(true, Ordering::Release);
        let mut writer = self.writer.lock().await;
        if let Some(mut sink) = writer.take() {
            sink.close().await.map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })?;
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
