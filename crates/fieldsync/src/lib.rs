//! # Fieldsync
//!
//! Client-side session layer for real-time multiplayer activity feeds.
//!
//! Fieldsync maintains one logical connection to a challenge server,
//! exchanges typed messages over it, and keeps three derived collections
//! consistent with the inbound stream: an append-only activity timeline,
//! the set of visible map objects, and the latest position per player.
//! A [`SessionController`] drives the connect / register / join /
//! deregister / disconnect lifecycle and surfaces everything the host
//! should react to as [`Notification`] values on a single channel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fieldsync::prelude::*;
//!
//! # async fn run() -> Result<(), fieldsync::FieldsyncError> {
//! let transport = WebSocketTransport::new("ws://challenge.example:9000/feed");
//! let (controller, mut notifications) =
//!     SessionController::new(transport, SessionConfig::default());
//!
//! controller.connect().await?;
//! controller
//!     .register(DeviceId::new("device-1"), ChallengeId::random())
//!     .await?;
//!
//! while let Some(notification) = notifications.recv().await {
//!     match notification {
//!         Notification::TimelineEntryReceived(entry) => {
//!             println!("{}: {}", entry.username, entry.text);
//!         }
//!         Notification::Closed { .. } => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod controller;
mod error;
mod link;

pub use controller::{SessionConfig, SessionController};
pub use error::FieldsyncError;
pub use link::LinkState;

/// One-stop imports for hosting applications.
pub mod prelude {
    pub use crate::{
        FieldsyncError, LinkState, SessionConfig, SessionController,
    };
    pub use fieldsync_protocol::{
        ActivityEvent, ActivityRecord, ChallengeId, DeviceId, GeoPosition,
        MapObject, Message, TimelineEntry,
    };
    pub use fieldsync_session::Notification;
    pub use fieldsync_transport::{Connection, Transport, TransportEvent};
    #[cfg(feature = "websocket")]
    pub use fieldsync_transport::{
        ReconnectPolicy, WebSocketConnection, WebSocketTransport,
    };
}

pub use fieldsync_protocol::ProtocolError;
pub use fieldsync_session::{Notification, SessionError};
pub use fieldsync_transport::TransportError;
