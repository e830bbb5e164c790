//! Transport abstraction layer for PeerChat.
//!
//! The transport is the black box that gives a participant a globally unique
//! [`PeerId`] and carries bytes over direct links between two identities.
//! NAT traversal, signalling and the actual channel all live behind the
//! [`PeerTransport`] trait.
//!
//! The trait is command/event shaped: commands (`open`, `connect`, `send`,
//! ...) are synchronous calls, and everything the transport learns later
//! (identity assigned, link opened, data arrived, link closed) is delivered
//! as a [`TransportEvent`] on the channel handed out when the transport was
//! created.
//!
//! # Feature Flags
//!
//! - `memory` (default) — in-process [`MemoryNetwork`] used by tests and demos

mod error;
#[cfg(feature = "memory")]
mod memory;

pub use error::TransportError;
#[cfg(feature = "memory")]
pub use memory::{MemoryNetwork, MemoryTransport};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, globally unique name of a participant.
///
/// Assigned by the transport once it is open. Serialized as a bare string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wraps a raw identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty placeholder used before an identity exists.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Handle for one direct link, local to the transport that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u64);

impl LinkId {
    /// Creates a new `LinkId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

/// Something the transport reports asynchronously.
#[derive(Debug)]
pub enum TransportEvent {
    /// The identity requested by [`PeerTransport::open`] (or restored by
    /// [`PeerTransport::reconnect`]) is now registered.
    IdentityAssigned(PeerId),

    /// The identity could not be assigned.
    IdentityError(TransportError),

    /// The identity lost its signalling registration. Existing links may
    /// survive, but no new links can be opened until `reconnect`.
    Disconnected,

    /// A link is open and ready to carry data. `inbound` is `true` when the
    /// remote side initiated it.
    LinkOpened {
        link: LinkId,
        remote: PeerId,
        inbound: bool,
    },

    /// A payload arrived on a link.
    LinkData { link: LinkId, data: Vec<u8> },

    /// The link is gone (either side closed it, or it never opened).
    LinkClosed { link: LinkId },

    /// The transport reported a problem on a link.
    LinkError { link: LinkId, error: TransportError },
}

/// A peer-to-peer transport primitive.
///
/// Implementations must deliver link events for a given link in order, and
/// must stop emitting events for an identity once it has been destroyed.
pub trait PeerTransport: Send + 'static {
    /// Requests an identity, reusing `desired` when it is free.
    ///
    /// The outcome arrives as [`TransportEvent::IdentityAssigned`] or
    /// [`TransportEvent::IdentityError`].
    fn open(&mut self, desired: Option<&PeerId>);

    /// The identity this transport currently holds, if any.
    fn local_id(&self) -> Option<&PeerId>;

    /// `true` when no identity is registered for new links.
    fn is_disconnected(&self) -> bool;

    /// Re-registers the current identity after a signalling disconnect.
    fn reconnect(&mut self);

    /// Starts opening a link to `remote`. The returned handle reports
    /// [`TransportEvent::LinkOpened`] or [`TransportEvent::LinkClosed`] later.
    fn connect(&mut self, remote: &PeerId) -> Result<LinkId, TransportError>;

    /// Sends bytes on an open link.
    ///
    /// # Errors
    /// [`TransportError::LinkNotReady`] when the link is not open.
    fn send(&mut self, link: LinkId, data: &[u8]) -> Result<(), TransportError>;

    /// Closes a link. Both sides observe [`TransportEvent::LinkClosed`].
    fn close_link(&mut self, link: LinkId);

    /// Releases the identity and closes every link it owns.
    fn destroy(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_id_new_and_into_inner() {
        let id = LinkId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_link_id_display() {
        assert_eq!(LinkId::new(7).to_string(), "link-7");
    }

    #[test]
    fn test_peer_id_display_is_raw_string() {
        let id = PeerId::new("a1b2");
        assert_eq!(id.to_string(), "a1b2");
        assert_eq!(id.as_str(), "a1b2");
    }

    #[test]
    fn test_peer_id_serializes_transparently() {
        let id = PeerId::from("host-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"host-1\"");
        let back: PeerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_peer_id_empty_placeholder() {
        assert!(PeerId::new("").is_empty());
        assert!(!PeerId::new("x").is_empty());
    }
}
