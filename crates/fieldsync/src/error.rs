//! Unified error type for the Fieldsync client.

use fieldsync_protocol::ProtocolError;
use fieldsync_session::SessionError;
use fieldsync_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Hosts using the `fieldsync` meta-crate deal with this single error
/// type; the `#[from]` attributes let `?` convert sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum FieldsyncError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lifecycle precondition violation (wrong state for the call).
    #[error(transparent)]
    Session(#[from] SessionError),
}
