//! # PeerChat
//!
//! Serverless chat over direct peer links.
//!
//! One participant runs as the **host**: it keeps the authoritative history,
//! replays it to every client that links up, relays chat between clients
//! and records who joined and left. Every other participant is a **client**
//! that links only to its host. Clients survive flaky networks: a lost host
//! link is retried on a timer, probed periodically and re-established as
//! soon as the network comes back.
//!
//! The layers, bottom up:
//!
//! - [`transport`]: peer identities and links ([`PeerTransport`](transport::PeerTransport))
//! - [`protocol`]: the JSON envelope spoken on every link
//! - [`session`]: the per-participant state machine
//! - this crate: a Tokio actor that drives a session ([`PeerChat`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use peerchat::prelude::*;
//!
//! # async fn run() -> Result<(), PeerChatError> {
//! let network = MemoryNetwork::new();
//!
//! let (transport, events) = network.endpoint();
//! let host = PeerChat::builder()
//!     .config(SessionConfig::host())
//!     .spawn(transport, events, MemoryStore::new());
//! let host_view = host.wait_for(|v| v.peer_id.is_some()).await?;
//!
//! let (transport, events) = network.endpoint();
//! let client = PeerChat::builder()
//!     .config(SessionConfig::client())
//!     .spawn(transport, events, MemoryStore::new());
//! client.wait_for(|v| v.peer_id.is_some()).await?;
//!
//! if let Some(host_id) = host_view.peer_id {
//!     client.connect_to_host(host_id).await?;
//!     client.wait_for(|v| v.connected_to_host).await?;
//!     client.send_chat("hello").await?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod runtime;

pub use error::PeerChatError;
pub use runtime::{DEFAULT_COMMAND_BUFFER, PeerChat, PeerChatBuilder};

pub use peerchat_protocol as protocol;
pub use peerchat_session as session;
pub use peerchat_transport as transport;

/// Everything needed to run a session.
pub mod prelude {
    pub use crate::{PeerChat, PeerChatBuilder, PeerChatError};
    pub use peerchat_protocol::{ConnectionStatus, Envelope, Event, Payload, Role};
    pub use peerchat_session::{
        AvailabilityMonitor, AvailabilitySwitch, Connection, FileStore, MemoryStore,
        SessionConfig, SessionView, SnapshotStore,
    };
    pub use peerchat_transport::{LinkId, MemoryNetwork, PeerId, PeerTransport};
}
