//! Debounced join announcements on the host.
//!
//! When a client links up it immediately sends its name. The host waits a
//! moment before writing "X joined" to history, and writes it at most once
//! per peer inside the de-duplication window, so a client that flaps its
//! link does not flood the history with join lines.

use std::collections::HashMap;
use std::time::Duration;

use peerchat_protocol::PeerId;
use peerchat_timer::KeyedTimers;
use tracing::{debug, trace};

/// Tracks pending and recently made join announcements.
#[derive(Debug)]
pub struct JoinAnnouncer {
    debounce_for: Duration,
    window: Duration,
    debounce: KeyedTimers<PeerId>,
    recent: KeyedTimers<PeerId>,
    names: HashMap<PeerId, String>,
}

impl JoinAnnouncer {
    pub fn new(debounce_for: Duration, window: Duration) -> Self {
        Self {
            debounce_for,
            window,
            debounce: KeyedTimers::new("join-debounce"),
            recent: KeyedTimers::new("join-dedup"),
            names: HashMap::new(),
        }
    }

    /// Called for every `name` message from a peer.
    ///
    /// Returns `true` if this scheduled a new announcement. A later name
    /// for a peer whose announcement is still pending replaces the name it
    /// will be announced under.
    pub fn name_received(&mut self, peer: &PeerId, name: &str) -> bool {
        if self.recent.contains(peer) {
            if let Some(pending) = self.names.get_mut(peer) {
                *pending = name.to_owned();
            }
            debug!(%peer, "join already announced recently");
            return false;
        }
        self.recent.start(peer.clone(), self.window);
        self.debounce.start(peer.clone(), self.debounce_for);
        self.names.insert(peer.clone(), name.to_owned());
        true
    }

    /// Takes the pending announcement for `peer`, if any, disarming its
    /// debounce. Used when the link closes before the debounce fires.
    pub fn flush(&mut self, peer: &PeerId) -> Option<String> {
        self.debounce.cancel(peer);
        self.names.remove(peer)
    }

    pub fn is_pending(&self, peer: &PeerId) -> bool {
        self.names.contains_key(peer)
    }

    pub fn recently_announced(&self, peer: &PeerId) -> bool {
        self.recent.contains(peer)
    }

    /// Drops every pending announcement and forgets the window.
    pub fn clear(&mut self) {
        self.debounce.cancel_all();
        self.recent.cancel_all();
        self.names.clear();
    }

    /// Waits for a debounce to elapse and returns the peer and the name to
    /// announce. Cancel-safe.
    pub async fn next_due(&mut self) -> (PeerId, String) {
        loop {
            tokio::select! {
                peer = self.debounce.next_expired() => {
                    if let Some(name) = self.names.remove(&peer) {
                        return (peer, name);
                    }
                }
                peer = self.recent.next_expired() => {
                    trace!(%peer, "join dedup window closed");
                }
            }
        }
    }
}
