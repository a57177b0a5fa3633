//! Core protocol types for Fieldsync's wire format.
//!
//! Everything in this module travels "on the wire" — these structures are
//! serialized to bytes, sent over the duplex connection, and deserialized
//! on the other side. The server speaks the same language.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a multiplayer challenge.
///
/// Newtype over [`uuid::Uuid`] so a challenge id can't be confused with
/// any other GUID floating through the host application.
///
/// `#[serde(transparent)]` makes it serialize as the bare UUID string,
/// not as `{ "0": "..." }` — the server expects a plain GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(pub uuid::Uuid);

impl ChallengeId {
    /// Generates a fresh random (v4) challenge id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

/// The device identifier presented when registering with the server.
///
/// Opaque to this layer — the host application decides what goes in it
/// (an installation id, a hardware id, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Creates a device id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Record types carried inside messages
// ---------------------------------------------------------------------------

/// One immutable entry of the shared activity timeline.
///
/// Created by the server; the client appends entries in arrival order and
/// never mutates or reorders them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Server-assigned entry id.
    pub id: String,
    /// The player this entry is about.
    pub username: String,
    /// Human-readable feed text ("alice reached checkpoint 3").
    pub text: String,
    /// Milliseconds since the Unix epoch, server clock.
    pub timestamp: u64,
}

/// A map object the server wants shown on the client's map.
///
/// Keyed by `id` — receiving the same id again replaces the fields
/// (idempotent upsert), it never duplicates the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    /// Stable object key.
    pub id: String,
    /// Object category ("checkpoint", "bonus", ...). Opaque to this layer.
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Display label.
    pub label: String,
}

/// A geographic position reported for a player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// A completed-activity summary the host application uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Activity name ("run", "ride", ...).
    pub activity: String,
    /// Milliseconds since the Unix epoch.
    pub started_at: u64,
    pub duration_ms: u64,
    pub distance_m: f64,
}

/// A point-in-time activity event the host application uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event name ("checkpoint_reached", "paused", ...).
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub occurred_at: u64,
}

// ---------------------------------------------------------------------------
// Message — the top-level wire format
// ---------------------------------------------------------------------------

/// Every payload on the wire is exactly one of these variants.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON — an explicit
/// `"type"` discriminator next to the variant's fields:
///
/// ```json
/// { "type": "Register", "device_id": "d1", "challenge_id": "..." }
/// ```
///
/// The discriminator is the *only* type metadata on the wire. A closed
/// enum plus an explicit tag means decode can never instantiate anything
/// outside this fixed set, and adding a variant is a compile-time-checked
/// change to every match over `Message`.
///
/// Client → server variants: `Register`, `Deregister`, `Join`,
/// `ActivityRecord`, `ActivityEvent`. Server → client: everything else.
/// The split is a convention, not a wire-level rule — the dispatcher
/// ignores outbound-only variants that a confused server echoes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    // -- Registration lifecycle --
    /// Client → Server: "this device is participating in this challenge."
    Register {
        device_id: DeviceId,
        challenge_id: ChallengeId,
    },

    /// Client → Server: "this device is done with this challenge."
    Deregister {
        device_id: DeviceId,
        challenge_id: ChallengeId,
    },

    // -- Joining --
    /// Client → Server: "put this player into the challenge."
    Join {
        username: String,
        challenge_id: ChallengeId,
    },

    /// Server → Client: another player invites this one to a challenge.
    Invite {
        challenge_id: ChallengeId,
        from: String,
        message: String,
    },

    /// Server → Client: the join request was accepted.
    JoinAccept { challenge_id: ChallengeId },

    /// Server → Client: the join request was rejected.
    JoinReject {
        challenge_id: ChallengeId,
        reason: String,
    },

    // -- Caller-originated activity payloads --
    /// Client → Server: upload a completed-activity summary.
    ActivityRecord { record: ActivityRecord },

    /// Client → Server: upload a point-in-time activity event.
    ActivityEvent { event: ActivityEvent },

    // -- Derived-state updates --
    /// Server → Client: append one entry to the activity timeline.
    TimelineEntry { entry: TimelineEntry },

    /// Server → Client: show (or refresh) a map object.
    ShowMapObject { object: MapObject },

    /// Server → Client: a map object is no longer relevant.
    HideMapObject { object_id: String },

    /// Server → Client: a player's latest position.
    LocationUpdate {
        username: String,
        position: GeoPosition,
    },

    /// Server → Client: the challenge has ended.
    ChallengeFinished { challenge_id: ChallengeId },
}

// =========================================================================
// Tests
// =========================================================================
