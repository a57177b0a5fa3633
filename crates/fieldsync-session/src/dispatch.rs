//! Message dispatch: the single routing step from a decoded [`Message`]
//! to its designated state mutation and/or notification.

use fieldsync_protocol::Message;

use crate::{Notification, SessionState};

/// Routes one decoded message to exactly one effect.
///
/// This is a total function over the closed [`Message`] enum — adding a
/// variant without a row here is a compile error, not a silent lookup
/// miss. Per call, at most one mutation runs and at most one
/// notification is returned, and the mutation has committed by the time
/// the notification exists.
///
/// | Variant | Effect |
/// |---|---|
/// | `Invite` | `InvitationReceived` |
/// | `JoinAccept` | `JoinAccepted` |
/// | `JoinReject` | `JoinRejected` |
/// | `TimelineEntry` | append; `TimelineEntryReceived` |
/// | `ShowMapObject` | upsert; `MapObjectsChanged` |
/// | `HideMapObject` | log only |
/// | `LocationUpdate` | set position; `PlayerPositionsChanged` |
/// | `ChallengeFinished` | log only |
/// | outbound-only variants | log only (server echo) |
///
/// Returning the notification (instead of invoking subscribers here)
/// keeps failure isolation structural: nothing a consumer does can abort
/// dispatch of subsequent messages.
pub fn dispatch(
    message: Message,
    state: &mut SessionState,
) -> Option<Notification> {
    match message {
        Message::Invite {
            challenge_id,
            from,
            message,
        } => {
            tracing::debug!(%challenge_id, %from, "invitation received");
            Some(Notification::InvitationReceived {
                challenge_id,
                from,
                message,
            })
        }

        Message::JoinAccept { challenge_id } => {
            tracing::debug!(%challenge_id, "join accepted");
            Some(Notification::JoinAccepted { challenge_id })
        }

        Message::JoinReject {
            challenge_id,
            reason,
        } => {
            tracing::debug!(%challenge_id, %reason, "join rejected");
            Some(Notification::JoinRejected {
                challenge_id,
                reason,
            })
        }

        Message::TimelineEntry { entry } => {
            tracing::debug!(entry_id = %entry.id, "timeline entry received");
            state.append_timeline_entry(entry.clone());
            Some(Notification::TimelineEntryReceived(entry))
        }

        Message::ShowMapObject { object } => {
            tracing::debug!(object_id = %object.id, "map object shown");
            state.upsert_map_object(object);
            Some(Notification::MapObjectsChanged)
        }

        Message::HideMapObject { object_id } => {
            // Observed server behavior only ever logs hides; there is no
            // confirmed removal semantics to implement yet.
            tracing::info!(%object_id, "map object hidden upstream");
            None
        }

        Message::LocationUpdate { username, position } => {
            tracing::trace!(%username, "location update");
            state.set_player_position(username, position);
            Some(Notification::PlayerPositionsChanged)
        }

        Message::ChallengeFinished { challenge_id } => {
            tracing::info!(%challenge_id, "challenge finished");
            None
        }

        // Outbound-only variants have no inbound meaning. A server that
        // echoes them gets a diagnostic, never a state change.
        msg @ (Message::Register { .. }
        | Message::Deregister { .. }
        | Message::Join { .. }
        | Message::ActivityRecord { .. }
        | Message::ActivityEvent { .. }) => {
            tracing::debug!(?msg, "ignoring outbound-only message from server");
            None
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! One test per dispatch row: the designated effect fires, and
    //! nothing else does.

    use super::*;
    use fieldsync_protocol::{
        ActivityEvent, ActivityRecord, ChallengeId, DeviceId, GeoPosition,
        MapObject, TimelineEntry,
    };

    fn cid() -> ChallengeId {
        ChallengeId(uuid::Uuid::nil())
    }

    fn entry(id: &str) -> TimelineEntry {
        TimelineEntry {
            id: id.into(),
            username: "alice".into(),
            text: "did a thing".into(),
            timestamp: 1000,
        }
    }

    fn object(id: &str, label: &str) -> MapObject {
        MapObject {
            id: id.into(),
            kind: "checkpoint".into(),
            latitude: 1.0,
            longitude: 2.0,
            label: label.into(),
        }
    }

    /// Asserts that all three derived collections are empty.
    fn assert_untouched(state: &SessionState) {
        assert!(state.timeline_entries().is_empty());
        assert!(state.map_objects().is_empty());
        assert!(state.player_positions().is_empty());
    }

    #[test]
    fn test_dispatch_invite_notifies_without_mutation() {
        let mut state = SessionState::new();

        let notification = dispatch(
            Message::Invite {
                challenge_id: cid(),
                from: "bob".into(),
                message: "join us".into(),
            },
            &mut state,
        );

        assert_eq!(
            notification,
            Some(Notification::InvitationReceived {
                challenge_id: cid(),
                from: "bob".into(),
                message: "join us".into(),
            })
        );
        assert_untouched(&state);
    }

    #[test]
    fn test_dispatch_join_accept_notifies_without_mutation() {
        let mut state = SessionState::new();

        let notification =
            dispatch(Message::JoinAccept { challenge_id: cid() }, &mut state);

        assert_eq!(
            notification,
            Some(Notification::JoinAccepted { challenge_id: cid() })
        );
        assert_untouched(&state);
    }

    #[test]
    fn test_dispatch_join_reject_notifies_without_mutation() {
        let mut state = SessionState::new();

        let notification = dispatch(
            Message::JoinReject {
                challenge_id: cid(),
                reason: "full".into(),
            },
            &mut state,
        );

        assert_eq!(
            notification,
            Some(Notification::JoinRejected {
                challenge_id: cid(),
                reason: "full".into(),
            })
        );
        assert_untouched(&state);
    }

    #[test]
    fn test_dispatch_timeline_entry_appends_then_notifies() {
        let mut state = SessionState::new();

        let notification = dispatch(
            Message::TimelineEntry { entry: entry("t1") },
            &mut state,
        );

        assert_eq!(state.timeline_entries(), [entry("t1")]);
        assert_eq!(
            notification,
            Some(Notification::TimelineEntryReceived(entry("t1")))
        );
    }

    #[test]
    fn test_dispatch_timeline_entries_keep_arrival_order() {
        let mut state = SessionState::new();

        for id in ["t1", "t2", "t3"] {
            dispatch(Message::TimelineEntry { entry: entry(id) }, &mut state);
        }

        let ids: Vec<&str> = state
            .timeline_entries()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, ["t1", "t2", "t3"]);
    }

    #[test]
    fn test_dispatch_show_map_object_upserts_then_notifies() {
        let mut state = SessionState::new();

        let notification = dispatch(
            Message::ShowMapObject {
                object: object("m1", "CP 1"),
            },
            &mut state,
        );
        assert_eq!(notification, Some(Notification::MapObjectsChanged));

        // Same id again with updated fields — replaced, not duplicated.
        let notification = dispatch(
            Message::ShowMapObject {
                object: object("m1", "CP 1 (moved)"),
            },
            &mut state,
        );
        assert_eq!(notification, Some(Notification::MapObjectsChanged));

        assert_eq!(state.map_objects().len(), 1);
        assert_eq!(state.map_objects()["m1"].label, "CP 1 (moved)");
    }

    #[test]
    fn test_dispatch_hide_map_object_is_log_only() {
        let mut state = SessionState::new();
        dispatch(
            Message::ShowMapObject {
                object: object("m1", "CP 1"),
            },
            &mut state,
        );

        let notification = dispatch(
            Message::HideMapObject {
                object_id: "m1".into(),
            },
            &mut state,
        );

        assert_eq!(notification, None);
        // The object stays — hides are not removals (yet).
        assert_eq!(state.map_objects().len(), 1);
    }

    #[test]
    fn test_dispatch_location_update_is_last_write_wins() {
        let mut state = SessionState::new();

        let n1 = dispatch(
            Message::LocationUpdate {
                username: "alice".into(),
                position: GeoPosition {
                    latitude: 1.0,
                    longitude: 2.0,
                },
            },
            &mut state,
        );
        let n2 = dispatch(
            Message::LocationUpdate {
                username: "alice".into(),
                position: GeoPosition {
                    latitude: 3.0,
                    longitude: 4.0,
                },
            },
            &mut state,
        );

        // Both dispatches notify; only the latest position survives.
        assert_eq!(n1, Some(Notification::PlayerPositionsChanged));
        assert_eq!(n2, Some(Notification::PlayerPositionsChanged));
        let pos = state.player_positions()["alice"];
        assert_eq!((pos.latitude, pos.longitude), (3.0, 4.0));
    }

    #[test]
    fn test_dispatch_challenge_finished_is_log_only() {
        let mut state = SessionState::new();

        let notification = dispatch(
            Message::ChallengeFinished { challenge_id: cid() },
            &mut state,
        );

        assert_eq!(notification, None);
        assert_untouched(&state);
    }

    #[test]
    fn test_dispatch_echoed_outbound_variants_do_nothing() {
        let mut state = SessionState::new();

        let echoes = vec![
            Message::Register {
                device_id: DeviceId::new("d1"),
                challenge_id: cid(),
            },
            Message::Deregister {
                device_id: DeviceId::new("d1"),
                challenge_id: cid(),
            },
            Message::Join {
                username: "alice".into(),
                challenge_id: cid(),
            },
            Message::ActivityRecord {
                record: ActivityRecord {
                    activity: "run".into(),
                    started_at: 0,
                    duration_ms: 0,
                    distance_m: 0.0,
                },
            },
            Message::ActivityEvent {
                event: ActivityEvent {
                    name: "paused".into(),
                    occurred_at: 0,
                },
            },
        ];

        for msg in echoes {
            let notification = dispatch(msg, &mut state);
            assert_eq!(notification, None);
        }
        assert_untouched(&state);
    }
}
