//! Connection-lifecycle state machine.

/// Where the controller currently stands with the server.
///
/// ```text
/// Disconnected → Connecting → Connected → Registered → Joined
///       ↑             │
///       └─(failure)───┘
/// ```
///
/// A transport drop overlays "reconnecting" on top of `Connected` or
/// later (tracked separately, see
/// [`SessionController::is_reconnecting`](crate::SessionController::is_reconnecting));
/// when the link comes back the state resolves to `Connected` — the
/// registered/joined context is NOT restored automatically, the caller
/// must register and join again.
///
/// - **Disconnected**: no connection. The starting and terminal state.
/// - **Connecting**: a dial is in flight.
/// - **Connected**: the duplex link is up; nothing registered yet.
/// - **Registered**: a `(device, challenge)` registration was sent.
/// - **Joined**: a join was sent. The server's accept/reject arrives
///   asynchronously through the dispatcher; the machine is optimistic
///   and does not block on the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Registered,
    Joined,
}

impl LinkState {
    /// Returns `true` if a live connection exists (`Connected` or later).
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Registered | Self::Joined)
    }

    /// Returns `true` if a registration is active (`Registered` or later).
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered | Self::Joined)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Registered => write!(f, "Registered"),
            Self::Joined => write!(f, "Joined"),
        }
    }
}
