//! The peer session manager: identity, links, routing and recovery.
//!
//! [`PeerSessionManager`] is a plain state machine. It never spawns a task
//! and never awaits a network operation. Three things drive it:
//!
//! - **Intents** from the UI: [`start`](PeerSessionManager::start),
//!   [`connect_to_host`](PeerSessionManager::connect_to_host),
//!   [`send_message`](PeerSessionManager::send_message),
//!   [`set_name`](PeerSessionManager::set_name),
//!   [`reset`](PeerSessionManager::reset).
//! - **Transport events**, fed to
//!   [`handle_transport_event`](PeerSessionManager::handle_transport_event).
//! - **Timers and availability**, via
//!   [`next_timer`](PeerSessionManager::next_timer) /
//!   [`handle_timer`](PeerSessionManager::handle_timer) and
//!   [`handle_availability`](PeerSessionManager::handle_availability).
//!
//! Whoever owns the manager runs one loop over those sources and calls the
//! matching handler. Every handler leaves the session consistent, so the
//! order in which sources are served does not matter.
//!
//! # Topology
//!
//! ```text
//!            ┌──────────┐
//!   C1 ◄────►│   Host   │◄────► C2
//!            │ history  │
//!            └──────────┘
//! ```
//!
//! The host keeps the authoritative history, replays it to every client
//! that links up and relays chat between clients. A client links only to
//! its host and keeps a display-only copy of the history.
//!
//! # Identity lifecycle
//!
//! ```text
//! initialize() ──open──→ [awaiting] ──IdentityAssigned──→ [live]
//!                            │                              │
//!                     IdentityError                    Disconnected
//!                   (id taken: open fresh)         (client: arm retry)
//! ```

use peerchat_protocol::{
    Codec, ConnectionStatus, Envelope, Event, JsonCodec, Payload, PeerId, Role, timestamp_now,
};
use peerchat_transport::{LinkId, PeerTransport, TransportError, TransportEvent};
use tracing::{debug, info, warn};

use crate::{
    AvailabilitySource, Connection, ConnectionRegistry, DEFAULT_NAME, JoinAnnouncer,
    ReconnectScheduler, SessionConfig, SessionError, SessionSnapshot, SessionView,
    SnapshotStore, Transition, Trigger,
};

/// A timer that fired and needs handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTimer {
    /// The reconnect retry or host probe fired.
    Reconnect(Trigger),
    /// A join announcement's debounce elapsed.
    JoinDue { peer: PeerId, name: String },
}

/// One participant's session.
///
/// Generic over the transport, the availability source and the snapshot
/// store so each can be swapped out (in tests, for recording fakes).
pub struct PeerSessionManager<T, A, S> {
    config: SessionConfig,
    transport: T,
    availability: A,
    store: S,
    codec: JsonCodec,

    registry: ConnectionRegistry,
    scheduler: ReconnectScheduler,
    announcer: JoinAnnouncer,

    history: Vec<Envelope>,
    name: String,
    /// Identity confirmed by the transport.
    peer_id: Option<PeerId>,
    /// Identity to ask for when none is confirmed yet (from the snapshot).
    resume_id: Option<PeerId>,
    /// Client only: the host to keep a link to.
    host_id: Option<PeerId>,

    awaiting_identity: bool,
    connecting: bool,
    connected_to_host: bool,
}

impl<T, A, S> PeerSessionManager<T, A, S>
where
    T: PeerTransport,
    A: AvailabilitySource,
    S: SnapshotStore,
{
    /// Creates an idle session. Nothing happens until [`start`](Self::start)
    /// or [`initialize`](Self::initialize).
    pub fn new(config: SessionConfig, transport: T, availability: A, store: S) -> Self {
        let config = config.validated();
        Self {
            registry: ConnectionRegistry::new(),
            scheduler: ReconnectScheduler::new(config.reconnect_interval, config.probe_jitter),
            announcer: JoinAnnouncer::new(config.join_debounce, config.dedup_window),
            history: Vec::new(),
            name: config.default_name.clone(),
            peer_id: None,
            resume_id: None,
            host_id: None,
            awaiting_identity: false,
            connecting: false,
            connected_to_host: false,
            codec: JsonCodec,
            config,
            transport,
            availability,
            store,
        }
    }

    // =====================================================================
    // Intents
    // =====================================================================

    /// Resumes from the stored snapshot, then requests an identity.
    ///
    /// Restores the display name, the host's history or the client's last
    /// host, and asks the transport for the stored identity. A client with a
    /// known host links up as soon as the identity opens.
    ///
    /// # Errors
    /// [`SessionError::NoNetwork`] while offline. State is still restored,
    /// and the identity is requested when the network returns.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if let Some(snapshot) = self.store.load() {
            self.restore(snapshot);
        }
        if self.is_client() && self.host_id.is_some() {
            self.scheduler.start_probe();
        }
        let resume = self.resume_id.clone();
        self.initialize(resume)
    }

    /// Requests an identity from the transport, reusing `stored` when it is
    /// free. Any identity the transport already holds is destroyed first.
    ///
    /// # Errors
    /// [`SessionError::NoNetwork`] while offline.
    pub fn initialize(&mut self, stored: Option<PeerId>) -> Result<(), SessionError> {
        if !self.availability.is_available() {
            info!("offline, identity request deferred");
            self.connecting = false;
            return Err(SessionError::NoNetwork);
        }
        self.open_identity(stored);
        Ok(())
    }

    /// Records `host_id` as this client's host and links to it.
    ///
    /// Without a live identity one is requested first and the link follows
    /// once it opens. While offline the attempt waits for the network.
    ///
    /// # Errors
    /// [`SessionError::WrongRole`] on a host.
    pub fn connect_to_host(&mut self, host_id: PeerId) -> Result<(), SessionError> {
        if !self.is_client() {
            return Err(SessionError::WrongRole {
                operation: "connect_to_host",
                role: self.config.role,
            });
        }

        if self.host_id.as_ref() != Some(&host_id) {
            for link in self.registry.clear() {
                self.transport.close_link(link);
            }
            self.connected_to_host = false;
        }
        info!(host = %host_id, "host selected");
        self.host_id = Some(host_id.clone());
        self.persist();
        self.scheduler.start_probe();

        if !self.availability.is_available() {
            info!(host = %host_id, "offline, host link deferred");
            return Ok(());
        }
        self.attempt_host_link(&host_id);
        Ok(())
    }

    /// Builds an envelope and sends it to the peers this role talks to.
    ///
    /// Chat is appended to local history before sending. A host sends to
    /// every connected peer, a client to its host link. Nothing is queued:
    /// a client that reaches nobody just drops its "connected to host" flag.
    ///
    /// # Errors
    /// - [`SessionError::NoNetwork`] while offline (nothing is echoed)
    /// - [`SessionError::Protocol`] if `payload` does not match `event` or
    ///   this role may not send `event`
    pub fn send_message(&mut self, event: Event, payload: Payload) -> Result<(), SessionError> {
        if !self.availability.is_available() {
            debug!(%event, "offline, message dropped");
            return Err(SessionError::NoNetwork);
        }
        let envelope = Envelope::build(
            event,
            payload,
            self.config.role,
            self.stamp_id(),
            self.name.clone(),
            timestamp_now(),
        )?;
        let bytes = self.codec.encode(&envelope)?;

        if event == Event::Chat {
            self.append_history(envelope);
        }

        let sent = self.transmit(&bytes, None);
        if !sent && self.is_client() {
            debug!(%event, "message reached no host");
            self.connected_to_host = false;
        }
        Ok(())
    }

    /// Sends `text` as chat after trimming it. Blank text is ignored.
    ///
    /// # Errors
    /// As [`send_message`](Self::send_message).
    pub fn send_chat(&mut self, text: &str) -> Result<(), SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.send_message(Event::Chat, Payload::chat(text))
    }

    /// Changes the display name, persists it and tells linked peers.
    ///
    /// # Errors
    /// [`SessionError::Protocol`] if the announcement cannot be encoded.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.name = name.into();
        info!(name = %self.name, "display name changed");
        self.persist();

        let envelope = self.stamp(Payload::name(self.name.clone()));
        let bytes = self.codec.encode(&envelope)?;
        self.transmit(&bytes, None);
        Ok(())
    }

    /// Forgets everything and starts over with a fresh identity.
    ///
    /// Destroys the transport identity, cancels every timer, empties the
    /// registry and history, erases the snapshot and requests a new,
    /// unconstrained identity.
    ///
    /// # Errors
    /// [`SessionError::NoNetwork`] if offline; the reset itself still
    /// happened and the identity is requested when the network returns.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        info!(peer_id = ?self.peer_id, "resetting session");
        self.teardown();
        self.history.clear();
        self.name = self.config.default_name.clone();
        self.peer_id = None;
        self.resume_id = None;
        self.host_id = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not erase session snapshot");
        }
        self.initialize(None)
    }

    /// Releases the transport identity and cancels every timer.
    ///
    /// History and name are kept so a final [`view`](Self::view) still
    /// shows them.
    pub fn shutdown(&mut self) {
        info!(peer_id = ?self.peer_id, "shutting down session");
        self.teardown();
    }

    // =====================================================================
    // Transport events
    // =====================================================================

    /// Applies one event reported by the transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::IdentityAssigned(id) => self.on_identity_assigned(id),
            TransportEvent::IdentityError(error) => self.on_identity_error(error),
            TransportEvent::Disconnected => self.on_signalling_lost(),
            TransportEvent::LinkOpened {
                link,
                remote,
                inbound,
            } => self.on_link_opened(link, remote, inbound),
            TransportEvent::LinkData { link, data } => self.on_link_data(link, &data),
            TransportEvent::LinkClosed { link } => self.on_link_closed(link),
            TransportEvent::LinkError { link, error } => self.on_link_error(link, error),
        }
    }

    fn on_identity_assigned(&mut self, id: PeerId) {
        if self.transport.local_id() != Some(&id) {
            debug!(peer_id = %id, "ignoring stale identity");
            return;
        }
        info!(peer_id = %id, "identity assigned");
        self.peer_id = Some(id);
        self.awaiting_identity = false;
        self.connecting = false;
        self.persist();

        if let Some(host) = self.client_host() {
            self.attempt_host_link(&host);
        }
    }

    fn on_identity_error(&mut self, error: TransportError) {
        if let TransportError::UnavailableId(id) = &error {
            if self.transport.local_id().is_some_and(|current| current != id) {
                debug!(peer_id = %id, "ignoring stale identity error");
                return;
            }
        }
        warn!(error = %error, "identity error");
        self.awaiting_identity = false;
        self.connecting = false;

        if error.is_unavailable_id() && self.availability.is_available() {
            info!("stored identity unavailable, requesting a fresh one");
            self.peer_id = None;
            self.resume_id = None;
            self.open_identity(None);
        } else if self.is_client() {
            self.connected_to_host = false;
            self.scheduler.schedule_retry();
        }
    }

    fn on_signalling_lost(&mut self) {
        info!(peer_id = ?self.peer_id, "signalling connection lost");
        self.connecting = false;
        if self.is_client() {
            self.connected_to_host = false;
            if self.availability.is_available() {
                self.scheduler.schedule_retry();
            }
        }
    }

    fn on_link_opened(&mut self, link: LinkId, remote: PeerId, inbound: bool) {
        if self.is_client() {
            if inbound {
                debug!(peer = %remote, %link, "client refuses inbound link");
                self.transport.close_link(link);
                return;
            }
            let expected = self.registry.take_pending(link);
            if expected.is_none() || expected != self.host_id {
                debug!(peer = %remote, %link, "closing link that is not to the current host");
                self.transport.close_link(link);
                return;
            }
        }

        let connection = Connection::new(remote.clone(), link, DEFAULT_NAME);
        if let Some(stale) = self.registry.upsert(connection) {
            debug!(peer = %remote, stale = %stale.link, "replacing stale link");
            self.transport.close_link(stale.link);
        }
        info!(peer = %remote, %link, inbound, "link opened");
        self.connecting = false;

        match self.config.role {
            Role::Host => {
                let replay = self.stamp(Payload::AllHistory {
                    messages: self.history.clone(),
                });
                self.send_on(link, &replay);
            }
            Role::Client => {
                let hello = self.stamp(Payload::name(self.name.clone()));
                self.send_on(link, &hello);
                self.connected_to_host = true;
                self.scheduler.cancel_retry();
            }
        }
    }

    fn on_link_data(&mut self, link: LinkId, data: &[u8]) {
        let Some(sender) = self.registry.get_by_link(link).map(|c| c.peer_id.clone()) else {
            debug!(%link, "data on unknown link");
            return;
        };
        let envelope: Envelope = match self.codec.decode(data) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(%link, error = %e, "ignoring undecodable message");
                return;
            }
        };

        let role = self.config.role;
        match envelope.payload {
            Payload::Chat { .. } => {
                debug!(%sender, "chat received");
                self.append_history(envelope);
                if role == Role::Host {
                    self.transmit(data, Some(link));
                }
            }
            Payload::Name { name } if role == Role::Host => {
                debug!(%sender, %name, "peer named itself");
                self.registry.rename_by_link(link, name.clone());
                if self.announcer.name_received(&sender, &name) {
                    debug!(%sender, "join announcement scheduled");
                }
            }
            Payload::AllHistory { messages } if role == Role::Client => {
                info!(count = messages.len(), "history replaced from host");
                self.history = messages;
            }
            other => debug!(event = %other.event(), %sender, "ignoring message"),
        }
    }

    fn on_link_closed(&mut self, link: LinkId) {
        if let Some(peer) = self.registry.take_pending(link) {
            debug!(%peer, %link, "link closed before opening");
            if self.is_client() && self.host_id.as_ref() == Some(&peer) {
                self.connecting = false;
                self.host_link_lost();
            }
            return;
        }
        let Some(closed) = self.registry.remove_by_link(link) else {
            debug!(%link, "close for unknown link");
            return;
        };
        info!(peer = %closed.peer_id, %link, "link closed");

        match self.config.role {
            Role::Client => {
                if self.host_id.as_ref() == Some(&closed.peer_id) {
                    self.host_link_lost();
                }
            }
            Role::Host => {
                if let Some(name) = self.announcer.flush(&closed.peer_id) {
                    self.announce(closed.peer_id.clone(), ConnectionStatus::Connected, name);
                }
                self.announce(closed.peer_id, ConnectionStatus::Disconnected, closed.name);
            }
        }
    }

    fn on_link_error(&mut self, link: LinkId, error: TransportError) {
        warn!(%link, error = %error, "link error");
        if !self.is_client() {
            return;
        }
        // A failed host link is closed and forgotten; its close event is
        // then ignored.
        let was_pending = self.registry.take_pending(link).is_some();
        let was_open = !was_pending && self.registry.remove_by_link(link).is_some();
        if was_pending || was_open {
            self.transport.close_link(link);
            self.connecting = false;
            self.host_link_lost();
        }
    }

    // =====================================================================
    // Timers and availability
    // =====================================================================

    /// Waits for the next session timer. Pends forever when none is armed.
    ///
    /// Cancel-safe: drop the future to serve another event source, then
    /// call again.
    pub async fn next_timer(&mut self) -> SessionTimer {
        tokio::select! {
            trigger = self.scheduler.next_trigger() => SessionTimer::Reconnect(trigger),
            (peer, name) = self.announcer.next_due() => SessionTimer::JoinDue { peer, name },
        }
    }

    /// Acts on a timer returned by [`next_timer`](Self::next_timer).
    pub fn handle_timer(&mut self, timer: SessionTimer) {
        match timer {
            SessionTimer::Reconnect(trigger) => self.on_reconnect_timer(trigger),
            SessionTimer::JoinDue { peer, name } => {
                info!(%peer, %name, "announcing join");
                self.announce(peer, ConnectionStatus::Connected, name);
            }
        }
    }

    fn on_reconnect_timer(&mut self, trigger: Trigger) {
        let Some(host) = self.client_host() else {
            return;
        };
        if self.registry.has_link_to(&host) {
            debug!(?trigger, "host link present");
            return;
        }
        if !self.scheduler.permits(&self.availability) {
            return;
        }
        info!(?trigger, %host, "reconnecting to host");
        self.attempt_host_link(&host);
    }

    /// Reacts to the network going away or coming back.
    ///
    /// Going offline only clears `connecting`; timers keep running and
    /// their firings are suppressed. Coming back online re-requests the
    /// identity if there is none, re-registers it if signalling was lost,
    /// and otherwise has a client link to its host right away.
    pub fn handle_availability(&mut self, transition: Transition) {
        match transition {
            Transition::BecameUnavailable => {
                info!("network unavailable");
                self.connecting = false;
            }
            Transition::BecameAvailable => {
                info!("network available");
                if self.awaiting_identity {
                    return;
                }
                if self.transport.local_id().is_none() {
                    let resume = self.resumable_id();
                    self.open_identity(resume);
                } else if self.transport.is_disconnected() {
                    info!("re-registering identity");
                    self.awaiting_identity = true;
                    self.connecting = true;
                    self.transport.reconnect();
                } else if let Some(host) = self.client_host() {
                    if !self.registry.has_link_to(&host) {
                        self.scheduler.cancel_retry();
                        self.attempt_host_link(&host);
                    }
                }
            }
        }
    }

    // =====================================================================
    // Observables
    // =====================================================================

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The identity confirmed by the transport.
    pub fn peer_id(&self) -> Option<&PeerId> {
        self.peer_id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open links in connection order.
    pub fn connections(&self) -> &[Connection] {
        self.registry.as_slice()
    }

    /// Chat history (and, on the host, join/leave lines).
    pub fn messages(&self) -> &[Envelope] {
        &self.history
    }

    pub fn is_online(&self) -> bool {
        self.availability.is_available()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn is_connected_to_host(&self) -> bool {
        self.connected_to_host
    }

    /// The host this client links to. Always `None` on a host.
    pub fn connected_host_id(&self) -> Option<&PeerId> {
        self.host_id.as_ref().filter(|_| self.is_client())
    }

    pub fn scheduler(&self) -> &ReconnectScheduler {
        &self.scheduler
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Clones the observable state.
    pub fn view(&self) -> SessionView {
        SessionView {
            role: self.config.role,
            peer_id: self.peer_id.clone(),
            name: self.name.clone(),
            connections: self.registry.as_slice().to_vec(),
            messages: self.history.clone(),
            online: self.is_online(),
            connecting: self.connecting,
            connected_to_host: self.connected_to_host,
            connected_host_id: self.connected_host_id().cloned(),
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn is_client(&self) -> bool {
        self.config.role == Role::Client
    }

    /// The host to link to, if this is a client that has one.
    fn client_host(&self) -> Option<PeerId> {
        if self.is_client() { self.host_id.clone() } else { None }
    }

    fn resumable_id(&self) -> Option<PeerId> {
        self.peer_id.clone().or_else(|| self.resume_id.clone())
    }

    fn identity_live(&self) -> bool {
        !self.awaiting_identity && self.peer_id.is_some() && !self.transport.is_disconnected()
    }

    fn restore(&mut self, snapshot: SessionSnapshot) {
        self.name = if snapshot.name.trim().is_empty() {
            self.config.default_name.clone()
        } else {
            snapshot.name
        };
        match self.config.role {
            Role::Host => self.history = snapshot.messages,
            Role::Client => self.host_id = snapshot.last_host_id,
        }
        self.resume_id = snapshot.peer_id;
        info!(
            peer_id = ?self.resume_id,
            name = %self.name,
            messages = self.history.len(),
            host = ?self.host_id,
            "session restored"
        );
    }

    fn open_identity(&mut self, desired: Option<PeerId>) {
        if self.transport.local_id().is_some() {
            self.transport.destroy();
        }
        info!(desired = ?desired, "requesting identity");
        self.awaiting_identity = true;
        self.connecting = true;
        self.transport.open(desired.as_ref());
    }

    /// Opens a link to `host` unless one is open or pending.
    fn attempt_host_link(&mut self, host: &PeerId) {
        if !self.availability.is_available() {
            debug!(%host, "offline, host link deferred");
            return;
        }
        if self.registry.has_link_to(host) {
            debug!(%host, "host link already open or pending");
            return;
        }
        if !self.identity_live() {
            if !self.awaiting_identity {
                let resume = self.resumable_id();
                self.open_identity(resume);
            }
            return;
        }

        self.scheduler.record_attempt();
        self.connecting = true;
        match self.transport.connect(host) {
            Ok(link) => {
                info!(%host, %link, "opening host link");
                self.registry.add_pending(link, host.clone());
            }
            Err(e) => {
                warn!(%host, error = %e, "could not open host link");
                self.connecting = false;
                self.scheduler.schedule_retry();
            }
        }
    }

    fn host_link_lost(&mut self) {
        self.connected_to_host = false;
        self.scheduler.schedule_retry();
    }

    fn teardown(&mut self) {
        self.transport.destroy();
        self.scheduler.cancel_all();
        self.announcer.clear();
        self.registry.clear();
        self.awaiting_identity = false;
        self.connecting = false;
        self.connected_to_host = false;
    }

    fn stamp_id(&self) -> PeerId {
        self.peer_id.clone().unwrap_or_else(|| PeerId::new(String::new()))
    }

    /// Wraps a payload this session originates itself.
    fn stamp(&self, payload: Payload) -> Envelope {
        Envelope::new(payload, self.stamp_id(), self.name.clone(), timestamp_now())
    }

    fn announce(&mut self, peer: PeerId, status: ConnectionStatus, name: String) {
        let line = self.stamp(Payload::status(status, peer, name));
        self.append_history(line);
    }

    /// Appends to history if this role keeps messages of that kind.
    fn append_history(&mut self, envelope: Envelope) {
        let keep = match envelope.event() {
            Event::Chat => true,
            Event::Status => self.config.role == Role::Host,
            Event::Name | Event::AllHistory => false,
        };
        if !keep {
            return;
        }
        self.history.push(envelope);
        if self.config.role == Role::Host {
            self.persist();
        }
    }

    /// Sends encoded bytes to this role's audience. Returns `true` if at
    /// least one link took them.
    fn transmit(&mut self, bytes: &[u8], except: Option<LinkId>) -> bool {
        let links = match self.config.role {
            Role::Host => self.registry.connected_links_except(except),
            Role::Client => self.registry.first().map(|c| c.link).into_iter().collect(),
        };
        let mut sent = false;
        for link in links {
            match self.transport.send(link, bytes) {
                Ok(()) => sent = true,
                Err(e) => warn!(%link, error = %e, "send failed"),
            }
        }
        sent
    }

    fn send_on(&mut self, link: LinkId, envelope: &Envelope) {
        let result = self
            .codec
            .encode(envelope)
            .map_err(SessionError::from)
            .and_then(|bytes| self.transport.send(link, &bytes).map_err(SessionError::from));
        if let Err(e) = result {
            warn!(%link, event = %envelope.event(), error = %e, "send failed");
        }
    }

    fn persist(&mut self) {
        let snapshot = SessionSnapshot {
            peer_id: self.resumable_id(),
            name: self.name.clone(),
            messages: match self.config.role {
                Role::Host => self.history.clone(),
                Role::Client => Vec::new(),
            },
            last_host_id: self.client_host(),
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "could not persist session snapshot");
        }
    }
}

impl<T, A, S> std::fmt::Debug for PeerSessionManager<T, A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerSessionManager")
            .field("role", &self.config.role)
            .field("peer_id", &self.peer_id)
            .field("name", &self.name)
            .field("connections", &self.registry.len())
            .field("messages", &self.history.len())
            .field("host_id", &self.host_id)
            .finish_non_exhaustive()
    }
}
