//! Error types for the protocol layer.
//!
//! Each crate in Fieldsync defines its own error enum. A `ProtocolError`
//! always means serialization/deserialization went wrong — never
//! networking, never session bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    /// Should not occur for well-formed message values.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed payload, missing fields, or a
    /// discriminator outside the known variant set.
    ///
    /// Non-fatal by contract — the offending payload is dropped and the
    /// session keeps processing subsequent messages.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level: it deserialized but
    /// violates a protocol rule (e.g., an empty device id in a Register).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
