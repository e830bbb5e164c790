//! Error types for the protocol layer.
//!
//! When you see a `ProtocolError`, the problem is in turning envelopes into
//! bytes and back, or in an envelope that breaks the protocol's rules. It
//! never means a link or identity failed.

use crate::{Event, Role};

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an envelope into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or an
    /// `event` tag this protocol does not know.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload does not belong to the requested event tag.
    #[error("payload is `{found}` but event `{expected}` was requested")]
    EventMismatch { expected: Event, found: Event },

    /// The role may not originate this kind of message.
    #[error("a {role} may not send `{event}` messages")]
    NotPermitted { event: Event, role: Role },
}
