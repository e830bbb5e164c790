//! The connection registry: which peers this session has links to.
//!
//! Two tables are kept side by side:
//!
//! - **entries**: open links, in the order they opened. A host broadcasts
//!   to all of them; a client's first (and only) entry is its host link.
//! - **pending**: outbound links that were requested but have not opened
//!   yet.
//!
//! A peer id appears in `entries` at most once. The manager is the only
//! writer.

use std::collections::HashMap;

use peerchat_protocol::{ConnectionStatus, PeerId};
use peerchat_transport::LinkId;

/// One open peer link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub peer_id: PeerId,
    pub name: String,
    pub status: ConnectionStatus,
    pub link: LinkId,
}

impl Connection {
    /// A freshly opened link.
    pub fn new(peer_id: PeerId, link: LinkId, name: impl Into<String>) -> Self {
        Self {
            peer_id,
            name: name.into(),
            status: ConnectionStatus::Connected,
            link,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// Open and pending links, keyed by peer identity.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: Vec<Connection>,
    pending: HashMap<LinkId, PeerId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an open link, replacing any entry for the same peer.
    ///
    /// The replacement goes to the end, since it is the newest link.
    /// Returns the replaced entry so the caller can close its link.
    pub fn upsert(&mut self, connection: Connection) -> Option<Connection> {
        let stale = self
            .entries
            .iter()
            .position(|c| c.peer_id == connection.peer_id)
            .map(|i| self.entries.remove(i));
        self.entries.push(connection);
        stale
    }

    /// Removes the entry that owns `link`.
    ///
    /// An entry whose link was already replaced is left alone.
    pub fn remove_by_link(&mut self, link: LinkId) -> Option<Connection> {
        let i = self.entries.iter().position(|c| c.link == link)?;
        Some(self.entries.remove(i))
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Connection> {
        self.entries.iter().find(|c| &c.peer_id == peer_id)
    }

    pub fn get_by_link(&self, link: LinkId) -> Option<&Connection> {
        self.entries.iter().find(|c| c.link == link)
    }

    /// Updates the display name of the peer on `link`.
    pub fn rename_by_link(&mut self, link: LinkId, name: impl Into<String>) -> Option<&Connection> {
        let entry = self.entries.iter_mut().find(|c| c.link == link)?;
        entry.name = name.into();
        Some(entry)
    }

    /// The oldest entry. For a client this is the host link.
    pub fn first(&self) -> Option<&Connection> {
        self.entries.first()
    }

    /// Entries in connection order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Connection] {
        &self.entries
    }

    /// Links of connected entries, in connection order, skipping `except`.
    pub fn connected_links_except(&self, except: Option<LinkId>) -> Vec<LinkId> {
        self.entries
            .iter()
            .filter(|c| c.is_connected() && Some(c.link) != except)
            .map(|c| c.link)
            .collect()
    }

    // -- Pending outbound links ----------------------------------------------

    pub fn add_pending(&mut self, link: LinkId, peer_id: PeerId) {
        self.pending.insert(link, peer_id);
    }

    /// Forgets a pending link, returning who it was for.
    pub fn take_pending(&mut self, link: LinkId) -> Option<PeerId> {
        self.pending.remove(&link)
    }

    pub fn is_pending(&self, link: LinkId) -> bool {
        self.pending.contains_key(&link)
    }

    /// `true` if there is an open or pending link to `peer_id`.
    pub fn has_link_to(&self, peer_id: &PeerId) -> bool {
        self.get(peer_id).is_some() || self.pending.values().any(|p| p == peer_id)
    }

    // -- Bulk ----------------------------------------------------------------

    /// Empties both tables, returning every link that was in them.
    pub fn clear(&mut self) -> Vec<LinkId> {
        let mut links: Vec<LinkId> = self.entries.drain(..).map(|c| c.link).collect();
        links.extend(self.pending.drain().map(|(link, _)| link));
        links
    }

    /// Number of open entries. Pending links are not counted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when there are no open entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
