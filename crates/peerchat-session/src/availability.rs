//! Local network availability.
//!
//! The manager only ever asks one question, "is the network usable right
//! now?", through [`AvailabilitySource`]. Whoever owns the event loop also
//! wants to be woken when the answer flips; that is what
//! [`AvailabilityMonitor::next_transition`] is for.
//!
//! ```text
//! platform signal ──set()──→ AvailabilitySwitch ──watch──→ AvailabilityMonitor(s)
//! ```

use tokio::sync::watch;
use tracing::debug;

/// Answers whether the local network path is usable.
pub trait AvailabilitySource: Send + 'static {
    fn is_available(&self) -> bool;
}

/// A source that never goes offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl AvailabilitySource for AlwaysAvailable {
    fn is_available(&self) -> bool {
        true
    }
}

/// A change in availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BecameAvailable,
    BecameUnavailable,
}

impl Transition {
    fn to(available: bool) -> Self {
        if available {
            Self::BecameAvailable
        } else {
            Self::BecameUnavailable
        }
    }
}

// ---------------------------------------------------------------------------
// AvailabilitySwitch
// ---------------------------------------------------------------------------

/// The writing side: feed it the platform's reachability signal.
#[derive(Debug)]
pub struct AvailabilitySwitch {
    tx: watch::Sender<bool>,
}

impl AvailabilitySwitch {
    pub fn new(available: bool) -> Self {
        let (tx, _) = watch::channel(available);
        Self { tx }
    }

    /// Records the current reachability. Returns `true` if it changed.
    pub fn set(&self, available: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == available {
                false
            } else {
                *current = available;
                true
            }
        });
        if changed {
            debug!(available, "network availability changed");
        }
        changed
    }

    pub fn is_available(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new reader that starts from the current value.
    pub fn monitor(&self) -> AvailabilityMonitor {
        let rx = self.tx.subscribe();
        let last = *rx.borrow();
        AvailabilityMonitor { rx, last }
    }
}

impl Default for AvailabilitySwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

// ---------------------------------------------------------------------------
// AvailabilityMonitor
// ---------------------------------------------------------------------------

/// The reading side. Cheap to clone; each clone tracks transitions
/// independently.
#[derive(Debug, Clone)]
pub struct AvailabilityMonitor {
    rx: watch::Receiver<bool>,
    last: bool,
}

impl AvailabilityMonitor {
    /// Waits until availability differs from the last value this monitor
    /// reported.
    ///
    /// A quick off-and-on flip that happens entirely between two polls is
    /// not reported. Returns `None` once the switch is dropped.
    /// Cancel-safe.
    pub async fn next_transition(&mut self) -> Option<Transition> {
        loop {
            self.rx.changed().await.ok()?;
            let now = *self.rx.borrow_and_update();
            if now != self.last {
                self.last = now;
                return Some(Transition::to(now));
            }
        }
    }
}

impl AvailabilitySource for AvailabilityMonitor {
    fn is_available(&self) -> bool {
        *self.rx.borrow()
    }
}
