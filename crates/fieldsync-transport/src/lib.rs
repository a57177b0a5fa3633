//! Client transport abstraction layer for Fieldsync.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the duplex pipe to the challenge server, plus the [`TransportEvent`]
//! stream a connection surfaces to its consumer.
//!
//! The transport owns reconnection entirely: when the link drops, a
//! [`Connection`] yields [`TransportEvent::Reconnecting`], retries on its
//! own schedule, and yields [`TransportEvent::Reconnected`] or
//! [`TransportEvent::Closed`]. Consumers observe; they never retry.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{ReconnectPolicy, WebSocketConnection, WebSocketTransport};

/// What a [`Connection`] hands back from [`Connection::recv`].
///
/// Lifecycle events are in-band with payloads so the consumer sees them
/// in the order they happened — a payload received before the drop is
/// always delivered before `Reconnecting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete inbound wire payload.
    Message(Vec<u8>),

    /// The link dropped; the transport is about to retry on its own.
    Reconnecting,

    /// The link was re-established after a drop. Any registration the
    /// consumer had on the old link is gone — re-establishing identity
    /// is the consumer's job.
    Reconnected,

    /// The connection is gone for good (clean close, local close, or
    /// reconnect attempts exhausted). No further events will follow.
    Closed(String),
}

/// Establishes connections to a remote endpoint.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Dials the endpoint and returns an established connection.
    async fn connect(&self) -> Result<Self::Connection, TransportError>;
}

/// An established duplex connection that can send and receive.
pub trait Connection: Send + Sync + 'static {
    /// Sends a wire payload to the server.
    async fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Waits for the next transport event.
    ///
    /// Terminal failures surface as [`TransportEvent::Closed`], not as
    /// `Err` — an `Err` here is a transient fault the consumer may log
    /// and keep receiving through.
    fn recv(
        &self,
    ) -> impl std::future::Future<Output = Result<TransportEvent, TransportError>>
    + Send;

    /// Closes the connection. Subsequent sends fail; `recv` reports
    /// [`TransportEvent::Closed`].
    async fn close(&self) -> Result<(), TransportError>;
}
