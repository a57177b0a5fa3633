//! Error types for the session layer.

/// Lifecycle precondition violations.
///
/// These are returned by controller operations invoked in the wrong
/// state — they never originate from inbound message processing, which
/// degrades to diagnostics instead of failing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The operation needs a live connection and there is none.
    #[error("not connected")]
    NotConnected,

    /// The operation needs a registration (`register` first).
    #[error("not registered")]
    NotRegistered,

    /// `connect` was called while a connection is already up.
    #[error("already connected")]
    AlreadyConnected,
}
