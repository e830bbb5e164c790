//! Codec trait and implementations for turning envelopes into bytes.
//!
//! A codec (coder/decoder) converts between Rust values and the raw bytes a
//! link carries. The session layer never calls `serde_json` directly for
//! link traffic: it holds something that implements [`Codec`] and asks it
//! to encode or decode. That is the strategy pattern. The interface stays
//! fixed and the implementation behind it can be swapped.
//!
//! Today there is one implementation, [`JsonCodec`], because browser peers
//! exchange JSON text. A binary codec for native-only rooms would slot in
//! without changing routing code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: the session actor may run on any worker thread of the
///   Tokio runtime, and the codec goes with it.
/// - `'static`: the codec owns whatever it needs and borrows nothing
///   short-lived, so it can be stored in a task that outlives its caller.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value type. Any `T` works as
/// long as it implements the matching serde trait:
///
/// - `encode<T: Serialize>`: `T` can be written out as bytes.
/// - `decode<T: DeserializeOwned>`: `T` can be built from bytes.
///
/// `DeserializeOwned`, rather than plain `Deserialize<'de>`, means the
/// decoded value owns all of its data instead of borrowing from the input.
/// The receive buffer can then be dropped as soon as decoding returns.
///
/// Because the methods are generic, `Codec` is not object safe. Code that
/// needs a codec takes a type parameter instead of a `dyn Codec`:
///
/// ```rust
/// use peerchat_protocol::{Codec, Envelope, JsonCodec, Payload, PeerId, ProtocolError};
///
/// fn reencode<C: Codec>(codec: &C, bytes: &[u8]) -> Result<Vec<u8>, ProtocolError> {
///     let envelope: Envelope = codec.decode(bytes)?;
///     codec.encode(&envelope)
/// }
///
/// let envelope = Envelope::new(Payload::chat("hi"), PeerId::new("c1"), "Alice", 1);
/// let bytes = JsonCodec.encode(&envelope).unwrap();
/// assert_eq!(reencode(&JsonCodec, &bytes).unwrap(), bytes);
/// ```
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails, for example
    /// when the value holds something this format cannot represent.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or carry an unknown tag.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks JSON, the format browser peers exchange.
///
/// JSON is readable, so link traffic can be inspected in browser devtools
/// or in a `debug` log line. It is larger than a binary format, which does
/// not matter at chat message sizes.
///
/// Gated behind the `json` feature, enabled by default, so a build that
/// brings its own codec can leave `serde_json` out.
///
/// ## Example
///
/// ```rust
/// use peerchat_protocol::{Codec, Envelope, JsonCodec, Payload, PeerId};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(Payload::chat("hi"), PeerId::new("c1"), "Alice", 1);
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
