//! Refresh timer: fixed interval, paused while the dashboard is not visible,
//! plus one-shot retry slots for linear backoff.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    next_due: Instant,
    retry_at: Option<Instant>,
    auto_refresh: bool,
    visible: bool,
}

impl RefreshTimer {
    /// First tick is due immediately.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now,
            retry_at: None,
            auto_refresh: true,
            visible: true,
        }
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Suspended timers never fire on the interval; pending retries still do.
    pub fn is_suspended(&self) -> bool {
        !(self.auto_refresh && self.visible)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        let interval_due = !self.is_suspended() && now >= self.next_due;
        let retry_due = self.retry_at.is_some_and(|t| now >= t);
        interval_due || retry_due
    }

    /// A fetch started at `now`: restart the interval and drop any pending retry.
    pub fn mark_fired(&mut self, now: Instant) {
        self.next_due = now + self.interval;
        self.retry_at = None;
    }

    pub fn schedule_retry(&mut self, delay: Duration, now: Instant) {
        self.retry_at = Some(now + delay);
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_at.is_some()
    }

    /// Returns true when the caller should refresh right away.
    pub fn set_visible(&mut self, visible: bool, now: Instant) -> bool {
        let was = self.visible;
        self.visible = visible;
        if visible && !was && self.auto_refresh {
            self.next_due = now;
            return true;
        }
        false
    }

    /// Flip auto-refresh. Turning it back on waits one full interval.
    pub fn toggle_auto_refresh(&mut self, now: Instant) -> bool {
        self.auto_refresh = !self.auto_refresh;
        if self.auto_refresh {
            self.next_due = now + self.interval;
        }
        self.auto_refresh
    }

    /// Manual refresh request.
    pub fn trigger(&mut self, now: Instant) {
        self.next_due = now;
        self.retry_at = Some(now);
    }

    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        let interval = (!self.is_suspended()).then_some(self.next_due);
        let next = match (interval, self.retry_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }?;
        Some(next.saturating_duration_since(now))
    }
}

/// Linear backoff: the n-th consecutive failure waits `base * n`.
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn fires_immediately_then_on_interval() {
        let t0 = Instant::now();
        let mut t = RefreshTimer::new(30 * SEC, t0);
        assert!(t.is_due(t0));
        t.mark_fired(t0);
        assert!(!t.is_due(t0 + 29 * SEC));
        assert!(t.is_due(t0 + 30 * SEC));
    }

    #[test]
    fn hidden_suspends_and_return_refreshes_now() {
        let t0 = Instant::now();
        let mut t = RefreshTimer::new(30 * SEC, t0);
        t.mark_fired(t0);
        assert!(!t.set_visible(false, t0 + SEC));
        assert!(!t.is_due(t0 + 120 * SEC));
        assert!(t.until_next(t0 + 120 * SEC).is_none());

        let back = t0 + 121 * SEC;
        assert!(t.set_visible(true, back));
        assert!(t.is_due(back));
        // repeated focus-gained does not trigger again
        t.mark_fired(back);
        assert!(!t.set_visible(true, back + SEC));
    }

    #[test]
    fn auto_refresh_off_ignores_visibility() {
        let t0 = Instant::now();
        let mut t = RefreshTimer::new(30 * SEC, t0);
        t.mark_fired(t0);
        assert!(!t.toggle_auto_refresh(t0));
        t.set_visible(false, t0);
        assert!(!t.set_visible(true, t0 + SEC));
        assert!(!t.is_due(t0 + 600 * SEC));

        assert!(t.toggle_auto_refresh(t0 + 600 * SEC));
        assert!(!t.is_due(t0 + 601 * SEC));
        assert!(t.is_due(t0 + 630 * SEC));
    }

    #[test]
    fn retry_fires_before_interval() {
        let t0 = Instant::now();
        let mut t = RefreshTimer::new(30 * SEC, t0);
        t.mark_fired(t0);
        t.schedule_retry(5 * SEC, t0);
        assert!(t.retry_pending());
        assert_eq!(t.until_next(t0), Some(5 * SEC));
        assert!(t.is_due(t0 + 5 * SEC));
        t.mark_fired(t0 + 5 * SEC);
        assert!(!t.retry_pending());
    }

    #[test]
    fn backoff_is_linear() {
        let base = 5 * SEC;
        assert_eq!(linear_backoff(base, 1), 5 * SEC);
        assert_eq!(linear_backoff(base, 2), 10 * SEC);
        assert_eq!(linear_backoff(base, 3), 15 * SEC);
        assert_eq!(linear_backoff(base, 0), 5 * SEC);
    }
}
