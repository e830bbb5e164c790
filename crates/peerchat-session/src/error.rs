//! Error types for the session layer.

use peerchat_protocol::{ProtocolError, Role};
use peerchat_transport::TransportError;

/// Errors returned by session intents.
///
/// Link and identity trouble never surfaces here: the manager absorbs it
/// into state flags and retries. What remains is misuse of an intent, or
/// the local network being down when one is issued.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The network path is unavailable. The intent was dropped.
    #[error("no network connection")]
    NoNetwork,

    /// The intent only makes sense for the other role.
    #[error("`{operation}` is not available to a {role}")]
    WrongRole {
        operation: &'static str,
        role: Role,
    },

    /// The envelope could not be built or encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The transport rejected a request outright.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The snapshot could not be written or erased.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Errors from a [`SnapshotStore`](crate::SnapshotStore).
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
