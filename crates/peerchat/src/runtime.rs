//! Session actor: a Tokio task that owns one [`PeerSessionManager`].
//!
//! The actor is the only place the manager is touched. It serves four
//! sources from one loop (UI commands, transport events, availability
//! transitions and session timers) and publishes a fresh [`SessionView`]
//! after each one. The outside world talks to it through a cloneable
//! [`PeerChat`] handle.
//!
//! ```text
//! PeerChat ──Command──→ ┌──────────────┐ ←──TransportEvent── transport
//!                       │ SessionActor │ ←──Transition────── availability
//! watch<SessionView> ←──│   manager    │ ←──SessionTimer──── timers
//!                       └──────────────┘
//! ```

use std::ops::ControlFlow;

use peerchat_protocol::{Event, Payload, PeerId};
use peerchat_session::{
    AvailabilityMonitor, AvailabilitySwitch, PeerSessionManager, SessionConfig, SessionError,
    SessionView, SnapshotStore,
};
use peerchat_transport::{PeerTransport, TransportEvent};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::PeerChatError;

/// Default capacity of the command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

type Reply = oneshot::Sender<Result<(), SessionError>>;

/// Intents sent to the session actor. Each carries a reply channel.
enum Command {
    ConnectToHost { host: PeerId, reply: Reply },
    Send { event: Event, payload: Payload, reply: Reply },
    SendChat { text: String, reply: Reply },
    SetName { name: String, reply: Reply },
    Reset { reply: Reply },
    Shutdown { reply: oneshot::Sender<()> },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and spawning a session.
///
/// # Example
///
/// ```rust,ignore
/// use peerchat::prelude::*;
///
/// let network = MemoryNetwork::new();
/// let (transport, events) = network.endpoint();
/// let chat = PeerChat::builder()
///     .config(SessionConfig::host())
///     .spawn(transport, events, MemoryStore::new());
/// ```
#[derive(Debug)]
pub struct PeerChatBuilder {
    config: SessionConfig,
    command_buffer: usize,
    availability: Option<AvailabilityMonitor>,
}

impl PeerChatBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
            availability: None,
        }
    }

    /// Sets the session configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many intents may queue before callers wait. Minimum 1.
    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity.max(1);
        self
    }

    /// Follows the network reachability reported through `monitor`.
    /// Without one, the session assumes it is always online.
    pub fn availability(mut self, monitor: AvailabilityMonitor) -> Self {
        self.availability = Some(monitor);
        self
    }

    /// Spawns the session actor on the current Tokio runtime and starts the
    /// session: the snapshot in `store` is restored and an identity is
    /// requested from `transport`.
    ///
    /// `events` must be the receiver paired with `transport`.
    pub fn spawn<T, S>(
        self,
        transport: T,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        store: S,
    ) -> PeerChat
    where
        T: PeerTransport,
        S: SnapshotStore,
    {
        let availability = self
            .availability
            .unwrap_or_else(|| AvailabilitySwitch::new(true).monitor());
        let manager =
            PeerSessionManager::new(self.config, transport, availability.clone(), store);

        let (command_tx, command_rx) = mpsc::channel(self.command_buffer);
        let (view_tx, view_rx) = watch::channel(manager.view());

        let actor = SessionActor {
            manager,
            commands: command_rx,
            events,
            availability,
            view: view_tx,
        };
        tokio::spawn(actor.run());

        PeerChat {
            commands: command_tx,
            view: view_rx,
        }
    }
}

impl Default for PeerChatBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session. Cheap to clone.
///
/// The session stops when [`shutdown`](Self::shutdown) is called or the last
/// handle is dropped. After that every intent returns
/// [`PeerChatError::Closed`].
#[derive(Debug, Clone)]
pub struct PeerChat {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<SessionView>,
}

impl PeerChat {
    /// Creates a new builder.
    pub fn builder() -> PeerChatBuilder {
        PeerChatBuilder::new()
    }

    /// Links this client to `host`. See
    /// [`PeerSessionManager::connect_to_host`].
    pub async fn connect_to_host(&self, host: impl Into<PeerId>) -> Result<(), PeerChatError> {
        let host = host.into();
        self.request(|reply| Command::ConnectToHost { host, reply }).await
    }

    /// Sends an arbitrary message. See [`PeerSessionManager::send_message`].
    pub async fn send_message(&self, event: Event, payload: Payload) -> Result<(), PeerChatError> {
        self.request(|reply| Command::Send {
            event,
            payload,
            reply,
        })
        .await
    }

    /// Sends `text` as chat. Blank text is ignored.
    pub async fn send_chat(&self, text: impl Into<String>) -> Result<(), PeerChatError> {
        let text = text.into();
        self.request(|reply| Command::SendChat { text, reply }).await
    }

    /// Changes the display name and tells linked peers.
    pub async fn set_name(&self, name: impl Into<String>) -> Result<(), PeerChatError> {
        let name = name.into();
        self.request(|reply| Command::SetName { name, reply }).await
    }

    /// Forgets everything and starts over with a fresh identity.
    pub async fn reset(&self) -> Result<(), PeerChatError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Releases the identity and stops the session. Waits until the
    /// transport has been torn down.
    pub async fn shutdown(&self) -> Result<(), PeerChatError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| PeerChatError::Closed)?;
        reply_rx.await.map_err(|_| PeerChatError::Closed)
    }

    /// The latest published state.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified whenever the state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Waits until the published state satisfies `predicate` and returns
    /// that state.
    ///
    /// # Errors
    /// [`PeerChatError::Closed`] if the session stops first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionView) -> bool,
    ) -> Result<SessionView, PeerChatError> {
        let mut rx = self.view.clone();
        let view = rx
            .wait_for(|view| predicate(view))
            .await
            .map_err(|_| PeerChatError::Closed)?;
        Ok(view.clone())
    }

    /// `true` once the session actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<(), PeerChatError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| PeerChatError::Closed)?;
        reply_rx.await.map_err(|_| PeerChatError::Closed)??;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<T, S> {
    manager: PeerSessionManager<T, AvailabilityMonitor, S>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    availability: AvailabilityMonitor,
    view: watch::Sender<SessionView>,
}

impl<T, S> SessionActor<T, S>
where
    T: PeerTransport,
    S: SnapshotStore,
{
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        info!(role = %self.manager.role(), "session actor started");

        if let Err(e) = self.manager.start() {
            info!(error = %e, "session start deferred");
        }
        self.publish();

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("all session handles dropped");
                        self.stop();
                        break;
                    };
                    if self.handle_command(command).is_break() {
                        break;
                    }
                }
                Some(event) = self.events.recv() => {
                    self.manager.handle_transport_event(event);
                }
                Some(transition) = self.availability.next_transition() => {
                    self.manager.handle_availability(transition);
                }
                timer = self.manager.next_timer() => {
                    self.manager.handle_timer(timer);
                }
            }
            self.publish();
        }

        info!("session actor stopped");
    }

    fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        let (result, reply) = match command {
            Command::ConnectToHost { host, reply } => (self.manager.connect_to_host(host), reply),
            Command::Send {
                event,
                payload,
                reply,
            } => (self.manager.send_message(event, payload), reply),
            Command::SendChat { text, reply } => (self.manager.send_chat(&text), reply),
            Command::SetName { name, reply } => (self.manager.set_name(name), reply),
            Command::Reset { reply } => (self.manager.reset(), reply),
            Command::Shutdown { reply } => {
                self.stop();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        };
        let _ = reply.send(result);
        ControlFlow::Continue(())
    }

    fn stop(&mut self) {
        self.manager.shutdown();
        self.publish();
    }

    fn publish(&self) {
        let next = self.manager.view();
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
