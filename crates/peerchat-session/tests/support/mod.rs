//! Shared fixtures: a recording transport and a harness around the manager.
//!
//! The mock never emits events on its own. Tests play the network by
//! feeding `TransportEvent`s to the manager, then look at what the manager
//! asked the transport to do.

#![allow(dead_code)]

use std::collections::HashSet;
use std::time::Duration;

use peerchat_protocol::{ConnectionStatus, Envelope, Event, Payload, PeerId};
use peerchat_session::{
    AvailabilityMonitor, AvailabilitySwitch, MemoryStore, PeerSessionManager, SessionConfig,
    SessionSnapshot, SnapshotStore, Transition,
};
use peerchat_transport::{LinkId, PeerTransport, TransportError, TransportEvent};
use tokio::time::Instant;

// =========================================================================
// MockTransport
// =========================================================================

#[derive(Debug, Default)]
pub struct MockTransport {
    pub id: Option<PeerId>,
    pub disconnected: bool,
    /// Identities `open` refuses to hand out.
    pub taken: HashSet<PeerId>,
    /// Links whose `send` fails.
    pub broken: HashSet<LinkId>,

    pub opens: Vec<Option<PeerId>>,
    pub connects: Vec<PeerId>,
    pub sent: Vec<(LinkId, Vec<u8>)>,
    pub closed: Vec<LinkId>,
    pub destroyed: usize,
    pub reconnects: usize,
    next_link: u64,
}

impl PeerTransport for MockTransport {
    fn open(&mut self, desired: Option<&PeerId>) {
        self.opens.push(desired.cloned());
        self.disconnected = false;
        self.id = match desired {
            Some(id) if self.taken.contains(id) => None,
            Some(id) => Some(id.clone()),
            None => Some(PeerId::new(format!("fresh-{}", self.opens.len()))),
        };
    }

    fn local_id(&self) -> Option<&PeerId> {
        self.id.as_ref()
    }

    fn is_disconnected(&self) -> bool {
        self.id.is_none() || self.disconnected
    }

    fn reconnect(&mut self) {
        self.reconnects += 1;
        self.disconnected = false;
    }

    fn connect(&mut self, remote: &PeerId) -> Result<LinkId, TransportError> {
        if self.is_disconnected() {
            return Err(TransportError::NotOpen);
        }
        self.next_link += 1;
        self.connects.push(remote.clone());
        Ok(LinkId::new(1000 + self.next_link))
    }

    fn send(&mut self, link: LinkId, data: &[u8]) -> Result<(), TransportError> {
        if self.broken.contains(&link) {
            return Err(TransportError::LinkNotReady(link));
        }
        self.sent.push((link, data.to_vec()));
        Ok(())
    }

    fn close_link(&mut self, link: LinkId) {
        self.closed.push(link);
    }

    fn destroy(&mut self) {
        self.destroyed += 1;
        self.id = None;
    }
}

// =========================================================================
// Harness
// =========================================================================

pub type Manager = PeerSessionManager<MockTransport, AvailabilityMonitor, MemoryStore>;

pub struct Harness {
    pub mgr: Manager,
    pub switch: AvailabilitySwitch,
    pub store: MemoryStore,
}

impl Harness {
    /// An online session that has not been started.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_store(config, MemoryStore::new())
    }

    pub fn with_store(config: SessionConfig, store: MemoryStore) -> Self {
        Self::with_transport(config, store, MockTransport::default())
    }

    pub fn with_transport(config: SessionConfig, store: MemoryStore, transport: MockTransport) -> Self {
        let switch = AvailabilitySwitch::new(true);
        let mgr = PeerSessionManager::new(config, transport, switch.monitor(), store.clone());
        Self { mgr, switch, store }
    }

    /// A started host whose identity is `h`.
    pub fn host() -> Self {
        let mut h = Self::with_store(SessionConfig::host(), stored_id("h"));
        h.mgr.start().unwrap();
        h.assign_identity();
        h
    }

    /// A started client whose identity is `c1`.
    pub fn client() -> Self {
        let mut h = Self::with_store(SessionConfig::client(), stored_id("c1"));
        h.mgr.start().unwrap();
        h.assign_identity();
        h
    }

    /// A client linked to host `h` on the returned link.
    pub fn linked_client() -> (Self, LinkId) {
        let mut h = Self::client();
        h.mgr.connect_to_host(pid("h")).unwrap();
        let link = h.last_connect_link();
        h.event(TransportEvent::LinkOpened {
            link,
            remote: pid("h"),
            inbound: false,
        });
        (h, link)
    }

    pub fn transport(&self) -> &MockTransport {
        self.mgr.transport()
    }

    pub fn transport_mut(&mut self) -> &mut MockTransport {
        self.mgr.transport_mut()
    }

    pub fn event(&mut self, event: TransportEvent) {
        self.mgr.handle_transport_event(event);
    }

    /// Confirms whatever identity the transport currently holds.
    pub fn assign_identity(&mut self) -> PeerId {
        let id = self
            .transport()
            .id
            .clone()
            .expect("transport holds no identity");
        self.event(TransportEvent::IdentityAssigned(id.clone()));
        id
    }

    /// The link handed out by the most recent `connect`.
    pub fn last_connect_link(&self) -> LinkId {
        LinkId::new(1000 + self.transport().connects.len() as u64)
    }

    pub fn open_inbound(&mut self, remote: &str, link: u64) -> LinkId {
        let link = LinkId::new(link);
        self.event(TransportEvent::LinkOpened {
            link,
            remote: pid(remote),
            inbound: true,
        });
        link
    }

    pub fn deliver(&mut self, link: LinkId, envelope: &Envelope) {
        let data = serde_json::to_vec(envelope).unwrap();
        self.event(TransportEvent::LinkData { link, data });
    }

    pub fn close(&mut self, link: LinkId) {
        self.event(TransportEvent::LinkClosed { link });
    }

    /// Everything the manager sent on `link`, decoded.
    pub fn sent_on(&self, link: LinkId) -> Vec<Envelope> {
        self.transport()
            .sent
            .iter()
            .filter(|(l, _)| *l == link)
            .map(|(_, data)| serde_json::from_slice(data).unwrap())
            .collect()
    }

    pub fn go_offline(&mut self) {
        self.switch.set(false);
        self.mgr.handle_availability(Transition::BecameUnavailable);
    }

    pub fn go_online(&mut self) {
        self.switch.set(true);
        self.mgr.handle_availability(Transition::BecameAvailable);
    }

    /// Serves session timers for `duration` of virtual time.
    pub async fn run_timers_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                timer = self.mgr.next_timer() => self.mgr.handle_timer(timer),
                () = tokio::time::sleep_until(deadline) => break,
            }
        }
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.store.load()
    }

    /// Status lines in history with the given status.
    pub fn status_lines(&self, status: ConnectionStatus) -> Vec<(PeerId, String)> {
        self.mgr
            .messages()
            .iter()
            .filter_map(|m| match &m.payload {
                Payload::Status {
                    status: s,
                    client_id,
                    client_name,
                } if *s == status => Some((client_id.clone(), client_name.clone())),
                _ => None,
            })
            .collect()
    }
}

// =========================================================================
// Builders
// =========================================================================

pub fn pid(id: &str) -> PeerId {
    PeerId::new(id)
}

pub fn chat(from: &str, name: &str, content: &str) -> Envelope {
    Envelope::new(Payload::chat(content), pid(from), name, 1)
}

pub fn name_msg(from: &str, name: &str) -> Envelope {
    Envelope::new(Payload::name(name), pid(from), name, 1)
}

/// A store that remembers identity `id` and nothing else.
pub fn stored_id(id: &str) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .save(&SessionSnapshot {
            peer_id: Some(pid(id)),
            ..SessionSnapshot::default()
        })
        .unwrap();
    store
}

pub fn events(envelopes: &[Envelope]) -> Vec<Event> {
    envelopes.iter().map(Envelope::event).collect()
}
