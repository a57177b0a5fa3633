//! The session controller: owns the connection, drives the lifecycle,
//! and runs the background receive loop.
//!
//! Inbound flow per payload:
//!   1. `Connection::recv` yields the raw bytes
//!   2. the codec decodes them into a typed `Message` (failures are
//!      logged and dropped — one bad payload never stalls the stream)
//!   3. `dispatch` mutates `SessionState` and hands back at most one
//!      `Notification`
//!   4. the notification goes out on the host's channel
//!
//! Outbound operations are plain async methods returning explicit
//! `Result`s — the host decides whether to log, retry, or give up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use fieldsync_protocol::{
    ActivityEvent, ActivityRecord, ChallengeId, Codec, DeviceId,
    GeoPosition, JsonCodec, MapObject, Message, TimelineEntry,
};
use fieldsync_session::{
    Notification, SessionError, SessionIdentity, SessionState, dispatch,
};
use fieldsync_transport::{Connection, Transport, TransportEvent};

use crate::{FieldsyncError, LinkState};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`SessionController`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The player name carried in `Join` messages.
    pub username: String,

    /// Capacity of the notification channel. When the host cannot keep
    /// up, non-terminal notifications are dropped with a warning rather
    /// than blocking the receive loop; `Closed` is always delivered.
    pub notify_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: "guest".to_string(),
            notify_capacity: 256,
        }
    }
}

impl SessionConfig {
    /// Creates a config with the given username and default settings.
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared between the controller handle and the receive loop task.
///
/// Both sides take the same coarse locks; neither calls back into the
/// other while holding one, so there is no lock cycle. Dispatch happens
/// entirely inside the `session` critical section — a mutation is
/// committed before its notification is emitted.
struct Shared {
    lifecycle: Mutex<LinkState>,
    /// Overlay on top of Connected-or-later while the transport redials.
    reconnecting: AtomicBool,
    session: Mutex<SessionState>,
    notify_tx: mpsc::Sender<Notification>,
}

impl Shared {
    fn lifecycle(&self) -> LinkState {
        *self.lifecycle.lock().expect("lifecycle lock poisoned")
    }

    fn set_lifecycle(&self, next: LinkState) {
        let mut lifecycle =
            self.lifecycle.lock().expect("lifecycle lock poisoned");
        if *lifecycle != next {
            tracing::debug!(from = %*lifecycle, to = %next, "lifecycle transition");
            *lifecycle = next;
        }
    }

    /// Best-effort notification delivery: a full channel drops the value
    /// (the state mutation already committed), a gone receiver is fine.
    fn notify(&self, notification: Notification) {
        match self.notify_tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                tracing::warn!(
                    ?dropped,
                    "notification channel full, dropping"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("notification receiver dropped");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Client session controller for a multiplayer activity feed.
///
/// Create one with [`SessionController::new`], which also hands back the
/// notification channel. All methods take `&self`; the controller may be
/// shared behind an `Arc` and called from multiple tasks — access to the
/// derived state is serialized internally.
pub struct SessionController<T: Transport> {
    transport: T,
    codec: JsonCodec,
    config: SessionConfig,
    shared: Arc<Shared>,
    conn: Mutex<Option<Arc<T::Connection>>>,
    recv_task: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> SessionController<T> {
    /// Creates a controller and the channel its notifications arrive on.
    ///
    /// The channel lives for the controller's lifetime and spans
    /// connect/disconnect cycles.
    pub fn new(
        transport: T,
        config: SessionConfig,
    ) -> (Self, mpsc::Receiver<Notification>) {
        let (notify_tx, notify_rx) =
            mpsc::channel(config.notify_capacity.max(1));

        let controller = Self {
            transport,
            codec: JsonCodec,
            config,
            shared: Arc::new(Shared {
                lifecycle: Mutex::new(LinkState::Disconnected),
                reconnecting: AtomicBool::new(false),
                session: Mutex::new(SessionState::new()),
                notify_tx,
            }),
            conn: Mutex::new(None),
            recv_task: Mutex::new(None),
        };

        (controller, notify_rx)
    }

    // -- Lifecycle operations ---------------------------------------------

    /// Establishes the connection and starts the receive loop.
    ///
    /// On transport failure the state stays `Disconnected` and the error
    /// is returned — the caller may simply retry.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyConnected`] if a connection is already up
    /// - [`TransportError`](fieldsync_transport::TransportError) if the
    ///   dial fails
    pub async fn connect(&self) -> Result<(), FieldsyncError> {
        {
            let mut lifecycle = self
                .shared
                .lifecycle
                .lock()
                .expect("lifecycle lock poisoned");
            if *lifecycle != LinkState::Disconnected {
                return Err(SessionError::AlreadyConnected.into());
            }
            *lifecycle = LinkState::Connecting;
        }

        let conn = match self.transport.connect().await {
            Ok(conn) => Arc::new(conn),
            Err(e) => {
                tracing::warn!(error = %e, "could not connect");
                self.shared.set_lifecycle(LinkState::Disconnected);
                return Err(e.into());
            }
        };

        *self.conn.lock().expect("conn lock poisoned") =
            Some(Arc::clone(&conn));
        self.shared.set_lifecycle(LinkState::Connected);
        tracing::info!("connected to multiplayer server");

        let task = tokio::spawn(receive_loop(
            conn,
            Arc::clone(&self.shared),
            self.codec,
        ));
        *self.recv_task.lock().expect("task lock poisoned") = Some(task);

        Ok(())
    }

    /// Registers this device for a challenge.
    ///
    /// Valid from `Connected` or later; a repeated call replaces the
    /// previous registration. The identity is recorded and the state
    /// advances only after the `Register` message was handed to the
    /// transport.
    pub async fn register(
        &self,
        device_id: DeviceId,
        challenge_id: ChallengeId,
    ) -> Result<(), FieldsyncError> {
        if !self.shared.lifecycle().is_connected() {
            return Err(SessionError::NotConnected.into());
        }

        self.send_message(&Message::Register {
            device_id: device_id.clone(),
            challenge_id,
        })
        .await?;

        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .set_identity(SessionIdentity {
                device_id,
                challenge_id,
            });
        self.shared.set_lifecycle(LinkState::Registered);
        tracing::info!(%challenge_id, "registered");
        Ok(())
    }

    /// Asks the server to join the challenge under the configured
    /// username.
    ///
    /// Valid from `Registered`. Optimistic: the state advances to
    /// `Joined` once the message is sent; the server's verdict arrives
    /// later as a [`Notification::JoinAccepted`] or
    /// [`Notification::JoinRejected`].
    pub async fn join(
        &self,
        challenge_id: ChallengeId,
    ) -> Result<(), FieldsyncError> {
        if !self.shared.lifecycle().is_registered() {
            return Err(SessionError::NotRegistered.into());
        }

        self.send_message(&Message::Join {
            username: self.config.username.clone(),
            challenge_id,
        })
        .await?;

        self.shared.set_lifecycle(LinkState::Joined);
        tracing::info!(%challenge_id, "join requested");
        Ok(())
    }

    /// Ends the registration: sends `Deregister` and clears the
    /// timeline.
    ///
    /// Map objects and player positions deliberately survive — only the
    /// timeline resets with the registration. The recorded identity also
    /// survives, for [`deregister_and_disconnect`](Self::deregister_and_disconnect)
    /// to reuse.
    pub async fn deregister(
        &self,
        device_id: DeviceId,
        challenge_id: ChallengeId,
    ) -> Result<(), FieldsyncError> {
        if !self.shared.lifecycle().is_connected() {
            return Err(SessionError::NotConnected.into());
        }

        self.send_message(&Message::Deregister {
            device_id,
            challenge_id,
        })
        .await?;

        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .clear_timeline();
        if self.shared.lifecycle().is_registered() {
            self.shared.set_lifecycle(LinkState::Connected);
        }
        tracing::info!(%challenge_id, "deregistered");
        Ok(())
    }

    /// Deregisters (if a registration is still active) and then tears
    /// the connection down.
    ///
    /// After an explicit prior [`deregister`](Self::deregister) no second
    /// `Deregister` goes out and the timeline is not cleared again; the
    /// stored identity is cleared either way.
    pub async fn deregister_and_disconnect(
        &self,
    ) -> Result<(), FieldsyncError> {
        if self.shared.lifecycle().is_registered() {
            let identity = self
                .shared
                .session
                .lock()
                .expect("state lock poisoned")
                .identity()
                .cloned();
            if let Some(identity) = identity {
                self.send_message(&Message::Deregister {
                    device_id: identity.device_id,
                    challenge_id: identity.challenge_id,
                })
                .await?;
                self.shared
                    .session
                    .lock()
                    .expect("state lock poisoned")
                    .clear_timeline();
                self.shared.set_lifecycle(LinkState::Connected);
            }
        }

        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .take_identity();
        self.disconnect().await;
        Ok(())
    }

    /// Closes the connection and stops the receive loop.
    ///
    /// Derived state is kept — a later [`connect`](Self::connect) resumes
    /// with the (possibly stale) collections intact.
    pub async fn disconnect(&self) {
        let task = self
            .recv_task
            .lock()
            .expect("task lock poisoned")
            .take();
        if let Some(task) = task {
            task.abort();
        }

        let conn = self.conn.lock().expect("conn lock poisoned").take();
        if let Some(conn) = conn {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "close reported an error");
            }
        }

        self.shared.reconnecting.store(false, Ordering::Release);
        self.shared.set_lifecycle(LinkState::Disconnected);
        tracing::info!("disconnected");
    }

    // -- Caller-originated payloads ---------------------------------------

    /// Uploads a completed-activity summary.
    pub async fn send_activity_record(
        &self,
        record: ActivityRecord,
    ) -> Result<(), FieldsyncError> {
        self.send_message(&Message::ActivityRecord { record }).await
    }

    /// Uploads a point-in-time activity event.
    pub async fn send_activity_event(
        &self,
        event: ActivityEvent,
    ) -> Result<(), FieldsyncError> {
        self.send_message(&Message::ActivityEvent { event }).await
    }

    /// Encodes and sends any message. The typed operations above are
    /// built on this; it is public for callers with unusual needs.
    pub async fn send_message(
        &self,
        message: &Message,
    ) -> Result<(), FieldsyncError> {
        let conn = self
            .conn
            .lock()
            .expect("conn lock poisoned")
            .clone()
            .ok_or(SessionError::NotConnected)?;
        let bytes = self.codec.encode(message)?;
        tracing::debug!(?message, "sending");
        conn.send(&bytes).await?;
        Ok(())
    }

    // -- Read-only state --------------------------------------------------

    /// Current lifecycle state.
    pub fn link_state(&self) -> LinkState {
        self.shared.lifecycle()
    }

    /// Whether the transport is currently redialing a dropped link.
    pub fn is_reconnecting(&self) -> bool {
        self.shared.reconnecting.load(Ordering::Acquire)
    }

    /// Snapshot of the timeline, in arrival order.
    pub fn timeline_entries(&self) -> Vec<TimelineEntry> {
        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .timeline_entries()
            .to_vec()
    }

    /// Snapshot of the visible map objects, keyed by id.
    pub fn map_objects(&self) -> HashMap<String, MapObject> {
        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .map_objects()
            .clone()
    }

    /// Snapshot of the latest known position per player.
    pub fn player_positions(&self) -> HashMap<String, GeoPosition> {
        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .player_positions()
            .clone()
    }

    /// The current registration identity, if any.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.shared
            .session
            .lock()
            .expect("state lock poisoned")
            .identity()
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Receive loop
// ---------------------------------------------------------------------------

/// Pulls transport events until the connection closes for good.
///
/// Failure isolation is per payload: a decode error drops that payload
/// and the loop keeps going. Transient transport errors are reported and
/// the loop keeps receiving — a terminal condition always arrives as
/// `TransportEvent::Closed`.
async fn receive_loop<C: Connection>(
    conn: Arc<C>,
    shared: Arc<Shared>,
    codec: JsonCodec,
) {
    tracing::debug!("receive loop started");

    loop {
        match conn.recv().await {
            Ok(TransportEvent::Message(data)) => {
                let message: Message = match codec.decode(&data) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            len = data.len(),
                            "dropping undecodable payload"
                        );
                        continue;
                    }
                };

                let notification = {
                    let mut session = shared
                        .session
                        .lock()
                        .expect("state lock poisoned");
                    dispatch(message, &mut session)
                };
                if let Some(notification) = notification {
                    shared.notify(notification);
                }
            }

            Ok(TransportEvent::Reconnecting) => {
                shared.reconnecting.store(true, Ordering::Release);
                shared.notify(Notification::Reconnecting);
            }

            Ok(TransportEvent::Reconnected) => {
                shared.reconnecting.store(false, Ordering::Release);
                // The new link carries no registration — the caller must
                // register and join again.
                shared.set_lifecycle(LinkState::Connected);
                shared.notify(Notification::Reconnected);
            }

            Ok(TransportEvent::Closed(reason)) => {
                tracing::info!(%reason, "connection closed");
                shared.reconnecting.store(false, Ordering::Release);
                shared.set_lifecycle(LinkState::Disconnected);
                // Terminal — deliver even if the channel is momentarily
                // full.
                let _ = shared
                    .notify_tx
                    .send(Notification::Closed { reason })
                    .await;
                break;
            }

            Err(e) => {
                tracing::warn!(error = %e, "transport fault");
                shared.notify(Notification::TransportError {
                    detail: e.to_string(),
                });
            }
        }
    }

    tracing::debug!("receive loop stopped");
}
