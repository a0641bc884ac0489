use std::time::{Duration, Instant};

/// Quiet period before a burst of view changes is flushed.
pub const VIEW_CHANGE_WINDOW: Duration = Duration::from_millis(250);

/// Pure coalescing timer: every event pushes the deadline out by one window.
///
/// Time is supplied by the caller, so the host's event loop (or a test)
/// decides when to poll.
#[derive(Debug, Clone)]
pub struct CoalescingTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl CoalescingTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record an event at `now`, rescheduling any pending fire.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending fire, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Returns true exactly once per burst, when the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for CoalescingTimer {
    fn default() -> Self {
        Self::new(VIEW_CHANGE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_coalesces_into_one_fire() {
        let t0 = Instant::now();
        let mut timer = CoalescingTimer::default();
        assert!(!timer.poll(t0));

        timer.schedule(t0);
        timer.schedule(t0 + ms(100));
        timer.schedule(t0 + ms(200));
        assert!(!timer.poll(t0 + ms(300)));
        assert_eq!(timer.remaining(t0 + ms(300)), Some(ms(150)));
        assert!(timer.poll(t0 + ms(450)));
        assert!(!timer.poll(t0 + ms(900)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_fires_at_exact_deadline() {
        let t0 = Instant::now();
        let mut timer = CoalescingTimer::new(ms(10));
        timer.schedule(t0);
        assert!(!timer.poll(t0 + ms(9)));
        assert!(timer.poll(t0 + ms(10)));
    }
}
