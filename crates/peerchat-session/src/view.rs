//! A read-only snapshot of everything the UI shows.

use peerchat_protocol::{Envelope, PeerId, Role};

use crate::Connection;

/// Observable session state at one instant.
///
/// Produced by [`PeerSessionManager::view`](crate::PeerSessionManager::view);
/// owning a view never blocks the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub role: Role,
    pub peer_id: Option<PeerId>,
    pub name: String,
    pub connections: Vec<Connection>,
    pub messages: Vec<Envelope>,
    pub online: bool,
    pub connecting: bool,
    pub connected_to_host: bool,
    /// The host a client is (or wants to be) linked to. Always `None` on a
    /// host.
    pub connected_host_id: Option<PeerId>,
}
