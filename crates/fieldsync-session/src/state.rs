//! The client-local derived state: timeline, map objects, player
//! positions, and the current registration identity.

use std::collections::HashMap;

use fieldsync_protocol::{
    ChallengeId, DeviceId, GeoPosition, MapObject, TimelineEntry,
};

/// The `(device, challenge)` pair identifying the current registration
/// with the server. At most one per controller instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub device_id: DeviceId,
    pub challenge_id: ChallengeId,
}

/// All state derived from the inbound message stream.
///
/// Invariants:
/// - the timeline is append-only, in arrival order, never reordered;
/// - map objects are keyed by id — repeated ids replace, never duplicate;
/// - player positions are last-write-wins per username, no history.
///
/// Mutators are infallible and leave the struct internally consistent at
/// every return point; callers emit notifications only after the mutation
/// has committed.
#[derive(Debug, Default)]
pub struct SessionState {
    timeline: Vec<TimelineEntry>,
    map_objects: HashMap<String, MapObject>,
    player_positions: HashMap<String, GeoPosition>,
    identity: Option<SessionIdentity>,
}

impl SessionState {
    /// Creates an empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Timeline ---------------------------------------------------------

    /// Appends one entry at the end of the timeline.
    pub fn append_timeline_entry(&mut self, entry: TimelineEntry) {
        self.timeline.push(entry);
    }

    /// Empties the timeline. Map objects and player positions are
    /// untouched — only the timeline resets with the registration.
    pub fn clear_timeline(&mut self) {
        self.timeline.clear();
    }

    /// The timeline in arrival order.
    pub fn timeline_entries(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    // -- Map objects ------------------------------------------------------

    /// Inserts or replaces the object under its id.
    pub fn upsert_map_object(&mut self, object: MapObject) {
        self.map_objects.insert(object.id.clone(), object);
    }

    /// The currently visible map objects, keyed by id.
    pub fn map_objects(&self) -> &HashMap<String, MapObject> {
        &self.map_objects
    }

    // -- Player positions -------------------------------------------------

    /// Records the latest position for a player, replacing any previous
    /// one.
    pub fn set_player_position(
        &mut self,
        username: impl Into<String>,
        position: GeoPosition,
    ) {
        self.player_positions.insert(username.into(), position);
    }

    /// Latest known position per player.
    pub fn player_positions(&self) -> &HashMap<String, GeoPosition> {
        &self.player_positions
    }

    // -- Registration identity --------------------------------------------

    /// Records the registration identity, replacing any previous one.
    pub fn set_identity(&mut self, identity: SessionIdentity) {
        self.identity = Some(identity);
    }

    /// The current registration identity, if any.
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    /// Removes and returns the registration identity.
    pub fn take_identity(&mut self) -> Option<SessionIdentity> {
        self.identity.take()
    }
}

// =========================================================================
// Tests
// =========================================================================
