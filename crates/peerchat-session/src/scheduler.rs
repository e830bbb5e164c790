//! Reconnection scheduling for a client's host link.
//!
//! Two timers restore a dropped host link:
//!
//! - a **retry**: one-shot, armed whenever something goes wrong (host link
//!   closed, identity error, signalling lost). Arming again replaces it.
//! - a **probe**: periodic, runs while the client knows a host.
//!
//! Both only say *when* to look. Whether an attempt actually happens is
//! decided by [`ReconnectScheduler::permits`] at fire time: the network
//! must be up and the previous attempt must be at least one interval old.
//! A suppressed firing is simply consumed; nothing is cancelled.

use std::time::Duration;

use peerchat_timer::{CancelableTimer, PeriodicTimer};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::AvailabilitySource;

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Retry,
    Probe,
}

/// Owns the retry and probe timers for one session.
#[derive(Debug)]
pub struct ReconnectScheduler {
    interval: Duration,
    retry: CancelableTimer,
    probe: PeriodicTimer,
    last_attempt: Option<Instant>,
}

impl ReconnectScheduler {
    pub fn new(interval: Duration, probe_jitter: Duration) -> Self {
        Self {
            interval,
            retry: CancelableTimer::new("reconnect-retry"),
            probe: PeriodicTimer::new("host-probe", interval).with_jitter(probe_jitter),
            last_attempt: None,
        }
    }

    /// Arms the one-shot retry one interval from now.
    pub fn schedule_retry(&mut self) {
        debug!(after_ms = self.interval.as_millis() as u64, "reconnect retry scheduled");
        self.retry.start(self.interval);
    }

    pub fn cancel_retry(&mut self) -> bool {
        self.retry.cancel()
    }

    pub fn is_retry_armed(&self) -> bool {
        self.retry.is_armed()
    }

    pub fn start_probe(&mut self) {
        self.probe.start();
    }

    pub fn is_probing(&self) -> bool {
        self.probe.is_running()
    }

    /// Notes that a link attempt was made just now.
    pub fn record_attempt(&mut self) {
        self.last_attempt = Some(Instant::now());
    }

    /// `true` if no attempt was made during the last interval.
    pub fn attempt_due(&self) -> bool {
        self.last_attempt
            .is_none_or(|at| Instant::now().saturating_duration_since(at) >= self.interval)
    }

    /// Whether a timer firing may turn into a link attempt.
    pub fn permits(&self, availability: &impl AvailabilitySource) -> bool {
        if !availability.is_available() {
            debug!("reconnect suppressed: offline");
            return false;
        }
        if !self.attempt_due() {
            debug!("reconnect suppressed: attempted recently");
            return false;
        }
        true
    }

    /// Disarms everything and forgets the last attempt.
    pub fn cancel_all(&mut self) {
        self.retry.cancel();
        self.probe.stop();
        self.last_attempt = None;
    }

    /// Waits for the next retry or probe firing. Cancel-safe.
    pub async fn next_trigger(&mut self) -> Trigger {
        let trigger = tokio::select! {
            () = self.retry.expired() => Trigger::Retry,
            _ = self.probe.tick() => Trigger::Probe,
        };
        trace!(?trigger, "reconnect timer fired");
        trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlwaysAvailable, AvailabilitySwitch};

    const INTERVAL: Duration = Duration::from_secs(5);

    fn scheduler() -> ReconnectScheduler {
        ReconnectScheduler::new(INTERVAL, Duration::ZERO)
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_trigger_retry_after_interval() {
        let mut s = scheduler();
        let start = Instant::now();
        s.schedule_retry();

        assert_eq!(s.next_trigger().await, Trigger::Retry);
        assert_eq!(Instant::now() - start, INTERVAL);
        assert!(!s.is_retry_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_retry_rearm_replaces_previous() {
        let mut s = scheduler();
        let start = Instant::now();
        s.schedule_retry();
        tokio::time::advance(Duration::from_secs(3)).await;
        s.schedule_retry();

        assert_eq!(s.next_trigger().await, Trigger::Retry);
        assert_eq!(Instant::now() - start, Duration::from_secs(8));
        assert!(tokio::time::timeout(Duration::from_secs(30), s.next_trigger()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_trigger_probe_repeats() {
        let mut s = scheduler();
        s.start_probe();

        assert_eq!(s.next_trigger().await, Trigger::Probe);
        assert_eq!(s.next_trigger().await, Trigger::Probe);
        assert!(s.is_probing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_silences_timers() {
        let mut s = scheduler();
        s.schedule_retry();
        s.start_probe();
        s.record_attempt();

        s.cancel_all();

        assert!(s.attempt_due());
        assert!(tokio::time::timeout(Duration::from_secs(60), s.next_trigger()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_due_waits_one_interval() {
        let mut s = scheduler();
        assert!(s.attempt_due());

        s.record_attempt();
        assert!(!s.attempt_due());

        tokio::time::advance(INTERVAL - Duration::from_millis(1)).await;
        assert!(!s.attempt_due());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(s.attempt_due());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permits_requires_network() {
        let s = scheduler();
        let switch = AvailabilitySwitch::new(false);

        assert!(!s.permits(&switch.monitor()));
        switch.set(true);
        assert!(s.permits(&switch.monitor()));
        assert!(s.permits(&AlwaysAvailable));
    }
}
