//! Notifications surfaced to the host application.

use fieldsync_protocol::{ChallengeId, TimelineEntry};

/// A tagged value describing something the host may want to react to.
///
/// The controller delivers these over one channel, in dispatch order: a
/// notification for message N is always observed before the notification
/// for message N+1. By the time the host sees one, the corresponding
/// state mutation has already committed — a slow or crashing consumer
/// can never roll back or corrupt session state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Another player invites this one to a challenge.
    InvitationReceived {
        challenge_id: ChallengeId,
        from: String,
        message: String,
    },

    /// The server accepted an earlier join request.
    JoinAccepted { challenge_id: ChallengeId },

    /// The server rejected an earlier join request.
    JoinRejected {
        challenge_id: ChallengeId,
        reason: String,
    },

    /// A new entry was appended to the timeline.
    TimelineEntryReceived(TimelineEntry),

    /// The set of visible map objects changed.
    MapObjectsChanged,

    /// A player position changed.
    PlayerPositionsChanged,

    /// The transport lost the link and is retrying.
    Reconnecting,

    /// The transport re-established the link. Lifecycle state is back
    /// to connected — the host must re-register and re-join.
    Reconnected,

    /// The connection is gone for good.
    Closed { reason: String },

    /// A transient transport fault that did not change lifecycle state.
    TransportError { detail: String },
}
