//! Peer session management for PeerChat.
//!
//! This crate owns everything that happens between "the transport gave us
//! an identity" and "the UI shows a message":
//!
//! 1. **Session manager**: identity, link acceptance, routing and relay
//!    ([`PeerSessionManager`])
//! 2. **Connection registry**: who we are linked to ([`ConnectionRegistry`])
//! 3. **Reconnection**: retry and probe timers for a client's host link
//!    ([`ReconnectScheduler`]), debounced join lines on the host
//!    ([`JoinAnnouncer`])
//! 4. **Persistence**: the resumable snapshot ([`SnapshotStore`])
//! 5. **Availability**: whether the network is usable ([`AvailabilitySource`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Runtime (above)   ← drives the manager from one event loop
//!     ↕
//! Session (this crate)
//!     ↕
//! Protocol / Transport (below) ← envelopes, peer ids, links
//! ```

mod announce;
mod availability;
mod config;
mod error;
mod manager;
mod persistence;
mod registry;
mod scheduler;
mod view;

pub use announce::JoinAnnouncer;
pub use availability::{
    AlwaysAvailable, AvailabilityMonitor, AvailabilitySource, AvailabilitySwitch, Transition,
};
pub use config::{DEFAULT_NAME, MIN_INTERVAL, SessionConfig};
pub use error::{PersistError, SessionError};
pub use manager::{PeerSessionManager, SessionTimer};
pub use persistence::{FileStore, MemoryStore, SNAPSHOT_FILE, SessionSnapshot, SnapshotStore};
pub use registry::{Connection, ConnectionRegistry};
pub use scheduler::{ReconnectScheduler, Trigger};
pub use view::SessionView;
