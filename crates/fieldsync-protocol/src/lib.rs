//! Wire protocol for Fieldsync.
//!
//! This crate defines the "language" spoken between the activity-feed
//! client and the challenge server:
//!
//! - **Types** ([`Message`], [`TimelineEntry`], [`MapObject`], etc.) —
//!   the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (derived client state). It doesn't know about connections or the
//! lifecycle state machine — it only knows how to serialize and
//! deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Session (derived state)
//! ```
//!
//! Every wire payload carries an explicit `"type"` discriminator, so the
//! exact [`Message`] variant is recovered on decode without any runtime
//! type registry. An unknown discriminator fails decode; the connection
//! is never torn down over a single bad payload.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ActivityEvent, ActivityRecord, ChallengeId, DeviceId, GeoPosition,
    MapObject, Message, TimelineEntry,
};
