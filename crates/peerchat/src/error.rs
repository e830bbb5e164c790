//! Unified error type for PeerChat.

use peerchat_protocol::ProtocolError;
use peerchat_session::{PersistError, SessionError};
use peerchat_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `peerchat` crate you deal with this single error type
/// instead of importing errors from each layer. `?` converts layer errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum PeerChatError {
    /// A transport-level error (identity, link, network).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, event not permitted).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (offline, wrong role).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The snapshot store failed.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The session runtime has stopped and accepts no more intents.
    #[error("peer chat session is closed")]
    Closed,
}

impl PeerChatError {
    /// `true` if the intent failed only because the network is down.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Session(SessionError::NoNetwork))
    }
}
