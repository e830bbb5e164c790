//! Cancelable timers for PeerChat.
//!
//! Three shapes cover every timed behavior of a peer session:
//!
//! - [`CancelableTimer`] — a single one-shot deadline. Re-arming replaces
//!   the pending deadline.
//! - [`PeriodicTimer`] — a fixed-interval probe that can be stopped and
//!   restarted.
//! - [`KeyedTimers`] — one one-shot deadline per key (per peer, say).
//!
//! None of them spawns a task. Each exposes an `async` wait method that
//! pends forever while nothing is armed, so the timers sit inside the
//! owner's `tokio::select!` loop and cancellation is just clearing a
//! deadline:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* may call retry.cancel() */ }
//!         () = retry.expired() => { /* attempt reconnect */ }
//!         n = probe.tick() => { /* periodic check */ }
//!     }
//! }
//! ```
//!
//! All waits are cancel-safe: dropping a wait future before it completes
//! leaves the timer unchanged. Deadlines use [`tokio::time::Instant`], so
//! tests can drive them with `tokio::time::pause()`.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Shortest period a [`PeriodicTimer`] accepts.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

// ---------------------------------------------------------------------------
// CancelableTimer
// ---------------------------------------------------------------------------

/// A one-shot timer with an optional pending deadline.
#[derive(Debug, Clone)]
pub struct CancelableTimer {
    label: &'static str,
    deadline: Option<Instant>,
}

impl CancelableTimer {
    /// Creates an unarmed timer. `label` only appears in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            deadline: None,
        }
    }

    /// Arms the timer to fire `after` from now, replacing any pending
    /// deadline.
    pub fn start(&mut self, after: Duration) {
        if self.deadline.is_some() {
            trace!(timer = self.label, "re-arming pending timer");
        }
        self.deadline = Some(Instant::now() + after);
    }

    /// Disarms the timer. Returns `true` if a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Waits for the pending deadline, then disarms.
    ///
    /// Pends forever while unarmed.
    pub async fn expired(&mut self) {
        let Some(deadline) = self.deadline else {
            return std::future::pending().await;
        };
        time::sleep_until(deadline).await;
        self.deadline = None;
        trace!(timer = self.label, "timer fired");
    }
}

// ---------------------------------------------------------------------------
// PeriodicTimer
// ---------------------------------------------------------------------------

/// A fixed-interval timer.
///
/// Ticks that fire late are not caught up: the next tick is always
/// scheduled one period after the moment the late tick was observed.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    label: &'static str,
    period: Duration,
    jitter: Duration,
    next: Option<Instant>,
    ticks: u64,
}

impl PeriodicTimer {
    /// Creates a stopped timer. Periods below [`MIN_PERIOD`] are raised to it.
    pub fn new(label: &'static str, period: Duration) -> Self {
        Self {
            label,
            period: period.max(MIN_PERIOD),
            jitter: Duration::ZERO,
            next: None,
            ticks: 0,
        }
    }

    /// Adds a random delay of up to `jitter` before the first tick after
    /// each [`start`](Self::start), so peers started together don't probe
    /// in lockstep.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Starts ticking. Idempotent: a running timer keeps its schedule.
    pub fn start(&mut self) {
        if self.next.is_some() {
            return;
        }
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let max = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
            Duration::from_nanos(rand::rng().random_range(0..max))
        };
        self.next = Some(Instant::now() + self.period + jitter);
        debug!(timer = self.label, period_ms = self.period.as_millis() as u64, "periodic timer started");
    }

    /// Stops ticking. Idempotent.
    pub fn stop(&mut self) {
        if self.next.take().is_some() {
            debug!(timer = self.label, ticks = self.ticks, "periodic timer stopped");
        }
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks fired since creation.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// When the next tick is due, if running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next
    }

    /// Waits for the next tick and returns its number (starting at 1).
    ///
    /// Pends forever while stopped.
    pub async fn tick(&mut self) -> u64 {
        let Some(next) = self.next else {
            return std::future::pending().await;
        };
        time::sleep_until(next).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(next);
        if late_by >= self.period {
            debug!(
                timer = self.label,
                late_ms = late_by.as_millis() as u64,
                "periodic tick late, skipping missed ticks"
            );
        }
        self.next = Some(now + self.period);
        self.ticks += 1;
        trace!(timer = self.label, tick = self.ticks, "periodic tick");
        self.ticks
    }
}

// ---------------------------------------------------------------------------
// KeyedTimers
// ---------------------------------------------------------------------------

/// A set of independent one-shot deadlines, one per key.
#[derive(Debug, Clone)]
pub struct KeyedTimers<K> {
    label: &'static str,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> KeyedTimers<K> {
    /// Creates an empty set.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            deadlines: HashMap::new(),
        }
    }

    /// Arms `key` to fire `after` from now, replacing its pending deadline.
    pub fn start(&mut self, key: K, after: Duration) {
        self.deadlines.insert(key, Instant::now() + after);
    }

    /// Disarms `key`. Returns `true` if it was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Disarms every key.
    pub fn cancel_all(&mut self) {
        if !self.deadlines.is_empty() {
            trace!(timer = self.label, pending = self.deadlines.len(), "cancelling keyed timers");
        }
        self.deadlines.clear();
    }

    /// Whether `key` has a deadline still in the future.
    ///
    /// A deadline that has passed but was not yet collected by
    /// [`next_expired`](Self::next_expired) no longer counts.
    pub fn contains(&self, key: &K) -> bool {
        self.deadlines
            .get(key)
            .is_some_and(|deadline| *deadline > Instant::now())
    }

    /// Number of armed keys, including passed deadlines not yet collected.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// `true` if no key is armed.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Waits for the earliest pending deadline, disarms it and returns its
    /// key. Pends forever while empty.
    pub async fn next_expired(&mut self) -> K {
        let earliest = self
            .deadlines
            .iter()
            .min_by_key(|(_, deadline)| **deadline)
            .map(|(key, deadline)| (key.clone(), *deadline));
        let Some((key, deadline)) = earliest else {
            return std::future::pending().await;
        };
        time::sleep_until(deadline).await;
        self.deadlines.remove(&key);
        trace!(timer = self.label, "keyed timer fired");
        key
    }
}
