//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between Rust types and raw bytes. The protocol layer
//! doesn't care HOW messages are serialized — callers pick something that
//! implements the [`Codec`] trait. [`JsonCodec`] (human-readable, easy to
//! inspect in logs and proxies) is the default; a binary codec can be
//! added later without touching any other layer.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared with the
/// background receive task and must not borrow temporary data.
///
/// `decode` takes `DeserializeOwned` (rather than plain `Deserialize`)
/// so the result owns all its data — the input buffer is dropped as soon
/// as decoding finishes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails. This
    /// should not happen for well-formed [`Message`](crate::Message)
    /// values.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or carry a discriminator outside the known set.
    /// Decode failure is non-fatal to the session — the caller drops the
    /// payload and keeps processing subsequent ones.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use fieldsync_protocol::{ChallengeId, Codec, DeviceId, JsonCodec, Message};
///
/// let codec = JsonCodec;
///
/// let msg = Message::Register {
///     device_id: DeviceId::new("d1"),
///     challenge_id: ChallengeId::random(),
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
