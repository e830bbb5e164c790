//! In-process transport: every endpoint lives in the same address space and
//! a shared [`MemoryNetwork`] plays the role of the signalling server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tokio::sync::mpsc;

use crate::{LinkId, PeerId, PeerTransport, TransportError, TransportEvent};

type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// One side of a link. Each link has two ends, one per endpoint.
#[derive(Debug, Clone)]
struct LinkEnd {
    endpoint: u64,
    local: PeerId,
    remote: PeerId,
    peer: LinkId,
}

#[derive(Debug, Default)]
struct NetworkState {
    next_link: u64,
    next_endpoint: u64,
    /// Signalling registry: which endpoint currently holds each identity.
    registry: HashMap<PeerId, u64>,
    endpoints: HashMap<u64, EventSender>,
    links: HashMap<LinkId, LinkEnd>,
}

impl NetworkState {
    fn emit(&self, endpoint: u64, event: TransportEvent) -> bool {
        match self.endpoints.get(&endpoint) {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    fn allocate_link(&mut self) -> LinkId {
        self.next_link += 1;
        LinkId::new(self.next_link)
    }

    /// Removes both ends of a link and tells both owners.
    fn close(&mut self, link: LinkId) {
        let Some(end) = self.links.remove(&link) else {
            return;
        };
        let other = self.links.remove(&end.peer);
        self.emit(end.endpoint, TransportEvent::LinkClosed { link });
        if let Some(other) = other {
            self.emit(other.endpoint, TransportEvent::LinkClosed { link: end.peer });
        }
        tracing::debug!(%link, local = %end.local, remote = %end.remote, "memory link closed");
    }

    fn owns_identity(&self, id: &PeerId, endpoint: u64) -> bool {
        self.registry.get(id) == Some(&endpoint)
    }
}

/// A shared in-process network.
///
/// Cloning yields another handle to the same network. Endpoints created from
/// it can reach each other by [`PeerId`].
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MemoryNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new endpoint and the receiver for its events.
    pub fn endpoint(&self) -> (MemoryTransport, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = {
            let mut state = self.lock();
            state.next_endpoint += 1;
            let endpoint = state.next_endpoint;
            state.endpoints.insert(endpoint, tx);
            endpoint
        };
        let transport = MemoryTransport {
            network: self.clone(),
            endpoint,
            id: None,
        };
        (transport, rx)
    }

    /// `true` if some endpoint currently holds `id`.
    pub fn is_registered(&self, id: &PeerId) -> bool {
        self.lock().registry.contains_key(id)
    }

    /// Number of open links, counting each direction once.
    pub fn link_count(&self) -> usize {
        self.lock().links.len() / 2
    }

    /// Drops `id`'s signalling registration without touching its links.
    /// The owning endpoint observes [`TransportEvent::Disconnected`].
    pub fn disconnect_peer(&self, id: &PeerId) {
        let mut state = self.lock();
        if let Some(endpoint) = state.registry.remove(id) {
            tracing::debug!(peer = %id, "memory peer lost signalling");
            state.emit(endpoint, TransportEvent::Disconnected);
        }
    }

    /// Closes every link between `a` and `b`.
    pub fn sever(&self, a: &PeerId, b: &PeerId) {
        let mut state = self.lock();
        let doomed: Vec<LinkId> = state
            .links
            .iter()
            .filter(|(_, end)| &end.local == a && &end.remote == b)
            .map(|(link, _)| *link)
            .collect();
        for link in doomed {
            state.close(link);
        }
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`PeerTransport`] endpoint on a [`MemoryNetwork`].
///
/// Dropping the endpoint destroys its identity and closes its links.
#[derive(Debug)]
pub struct MemoryTransport {
    network: MemoryNetwork,
    endpoint: u64,
    id: Option<PeerId>,
}

impl PeerTransport for MemoryTransport {
    fn open(&mut self, desired: Option<&PeerId>) {
        if self.id.is_some() {
            self.destroy();
        }

        let mut state = self.network.lock();
        let id = match desired {
            Some(id) if state.registry.contains_key(id) => {
                tracing::debug!(peer = %id, "memory identity taken");
                state.emit(
                    self.endpoint,
                    TransportEvent::IdentityError(TransportError::UnavailableId(id.clone())),
                );
                return;
            }
            Some(id) => id.clone(),
            None => loop {
                let candidate = random_id();
                if !state.registry.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        state.registry.insert(id.clone(), self.endpoint);
        state.emit(self.endpoint, TransportEvent::IdentityAssigned(id.clone()));
        drop(state);

        tracing::debug!(peer = %id, endpoint = self.endpoint, "memory identity assigned");
        self.id = Some(id);
    }

    fn local_id(&self) -> Option<&PeerId> {
        self.id.as_ref()
    }

    fn is_disconnected(&self) -> bool {
        match &self.id {
            Some(id) => !self.network.lock().owns_identity(id, self.endpoint),
            None => true,
        }
    }

    fn reconnect(&mut self) {
        let Some(id) = self.id.clone() else {
            return;
        };
        let mut state = self.network.lock();
        match state.registry.get(&id) {
            Some(&owner) if owner == self.endpoint => {}
            Some(_) => {
                state.emit(
                    self.endpoint,
                    TransportEvent::IdentityError(TransportError::UnavailableId(id)),
                );
            }
            None => {
                state.registry.insert(id.clone(), self.endpoint);
                state.emit(self.endpoint, TransportEvent::IdentityAssigned(id));
            }
        }
    }

    fn connect(&mut self, remote: &PeerId) -> Result<LinkId, TransportError> {
        let local = match &self.id {
            Some(id) if !self.is_disconnected() => id.clone(),
            _ => return Err(TransportError::NotOpen),
        };

        let mut state = self.network.lock();
        let link = state.allocate_link();

        let target = state
            .registry
            .get(remote)
            .copied()
            .filter(|endpoint| *endpoint != self.endpoint);

        match target {
            Some(endpoint) => {
                let peer = state.allocate_link();
                state.links.insert(
                    link,
                    LinkEnd {
                        endpoint: self.endpoint,
                        local: local.clone(),
                        remote: remote.clone(),
                        peer,
                    },
                );
                state.links.insert(
                    peer,
                    LinkEnd {
                        endpoint,
                        local: remote.clone(),
                        remote: local.clone(),
                        peer: link,
                    },
                );
                state.emit(
                    self.endpoint,
                    TransportEvent::LinkOpened {
                        link,
                        remote: remote.clone(),
                        inbound: false,
                    },
                );
                state.emit(
                    endpoint,
                    TransportEvent::LinkOpened {
                        link: peer,
                        remote: local,
                        inbound: true,
                    },
                );
            }
            None => {
                state.emit(
                    self.endpoint,
                    TransportEvent::LinkError {
                        link,
                        error: TransportError::PeerUnavailable(remote.clone()),
                    },
                );
                state.emit(self.endpoint, TransportEvent::LinkClosed { link });
            }
        }

        Ok(link)
    }

    fn send(&mut self, link: LinkId, data: &[u8]) -> Result<(), TransportError> {
        let state = self.network.lock();
        let end = state
            .links
            .get(&link)
            .filter(|end| end.endpoint == self.endpoint)
            .ok_or(TransportError::LinkNotReady(link))?;
        let remote_end = state
            .links
            .get(&end.peer)
            .ok_or(TransportError::LinkNotReady(link))?;

        let delivered = state.emit(
            remote_end.endpoint,
            TransportEvent::LinkData {
                link: end.peer,
                data: data.to_vec(),
            },
        );
        if delivered {
            Ok(())
        } else {
            Err(TransportError::LinkNotReady(link))
        }
    }

    fn close_link(&mut self, link: LinkId) {
        let mut state = self.network.lock();
        let owned = state
            .links
            .get(&link)
            .is_some_and(|end| end.endpoint == self.endpoint);
        if owned {
            state.close(link);
        }
    }

    fn destroy(&mut self) {
        let mut state = self.network.lock();
        let owned: Vec<LinkId> = state
            .links
            .iter()
            .filter(|(_, end)| end.endpoint == self.endpoint)
            .map(|(link, _)| *link)
            .collect();
        for link in owned {
            state.close(link);
        }
        if let Some(id) = self.id.take() {
            if state.owns_identity(&id, self.endpoint) {
                state.registry.remove(&id);
            }
            tracing::debug!(peer = %id, "memory identity destroyed");
        }
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.destroy();
        self.network.lock().endpoints.remove(&self.endpoint);
    }
}

/// A random 32-character hex identity (128 bits).
fn random_id() -> PeerId {
    let bytes: [u8; 16] = rand::rng().random();
    PeerId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}
