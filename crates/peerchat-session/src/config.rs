//! Session configuration.

use std::time::Duration;

use peerchat_protocol::Role;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Display name used until the user picks one.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Shortest interval any session timer accepts.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for one peer session.
///
/// Start from [`SessionConfig::host`] or [`SessionConfig::client`] and
/// override the fields you care about:
///
/// ```rust
/// use std::time::Duration;
/// use peerchat_session::SessionConfig;
///
/// let config = SessionConfig {
///     reconnect_interval: Duration::from_secs(2),
///     ..SessionConfig::client()
/// };
/// assert_eq!(config.default_name, "Anonymous");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Which side of the hub this session plays.
    pub role: Role,

    /// Name used before the user sets one, and when a stored name is blank.
    pub default_name: String,

    /// Delay of the one-shot retry and period of the host-link probe.
    pub reconnect_interval: Duration,

    /// How long the host waits after a peer's first `name` message before
    /// announcing the join.
    pub join_debounce: Duration,

    /// A peer that announced a join is not announced again inside this
    /// window, however often it reconnects.
    pub dedup_window: Duration,

    /// Random extra delay before the first probe tick.
    pub probe_jitter: Duration,
}

impl SessionConfig {
    /// Defaults for the relaying host.
    pub fn host() -> Self {
        Self {
            role: Role::Host,
            ..Self::default()
        }
    }

    /// Defaults for a client.
    pub fn client() -> Self {
        Self {
            role: Role::Client,
            ..Self::default()
        }
    }

    /// Returns a copy with out-of-range values fixed up.
    ///
    /// Intervals below [`MIN_INTERVAL`] are raised to it, probe jitter is
    /// capped at one reconnect interval and a blank default name becomes
    /// [`DEFAULT_NAME`]. Each fix is logged.
    pub fn validated(mut self) -> Self {
        for (field, value) in [
            ("reconnect_interval", &mut self.reconnect_interval),
            ("join_debounce", &mut self.join_debounce),
            ("dedup_window", &mut self.dedup_window),
        ] {
            if *value < MIN_INTERVAL {
                warn!(field, requested_ms = value.as_millis() as u64, "interval too short, clamping");
                *value = MIN_INTERVAL;
            }
        }
        if self.probe_jitter > self.reconnect_interval {
            warn!(
                requested_ms = self.probe_jitter.as_millis() as u64,
                "probe jitter longer than the reconnect interval, capping"
            );
            self.probe_jitter = self.reconnect_interval;
        }
        if self.default_name.trim().is_empty() {
            warn!("blank default name, using {DEFAULT_NAME:?}");
            self.default_name = DEFAULT_NAME.to_owned();
        }
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            role: Role::Client,
            default_name: DEFAULT_NAME.to_owned(),
            reconnect_interval: Duration::from_secs(5),
            join_debounce: Duration::from_secs(1),
            dedup_window: Duration::from_secs(5),
            probe_jitter: Duration::ZERO,
        }
    }
}
