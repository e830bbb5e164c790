use crate::{LinkId, PeerId};

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The requested identity is already registered by someone else.
    #[error("identity {0} is unavailable")]
    UnavailableId(PeerId),

    /// No peer with that identity is reachable.
    #[error("peer {0} is unavailable")]
    PeerUnavailable(PeerId),

    /// The transport has no registered identity to act from.
    #[error("transport has no open identity")]
    NotOpen,

    /// The link is not open (never opened, or already closed).
    #[error("{0} is not ready")]
    LinkNotReady(LinkId),

    /// The underlying network failed.
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    /// `true` when retrying with a fresh, unconstrained identity may help.
    pub fn is_unavailable_id(&self) -> bool {
        matches!(self, Self::UnavailableId(_))
    }
}
