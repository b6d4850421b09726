use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source the player schedules against
pub trait Clock {
    /// Time since the clock was created
    fn elapsed(&self) -> Duration;

    /// Block the calling thread for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `Instant` and `thread::sleep`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock that only moves when slept on.
///
/// Clones share the same time, so a sink and a player can observe one clock.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without anyone sleeping (simulates slow sinks)
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let mut a = ManualClock::new();
        let b = a.clone();
        a.sleep(Duration::from_millis(500));
        b.advance(Duration::from_millis(20));
        assert_eq!(a.elapsed(), Duration::from_millis(520));
        assert_eq!(b.elapsed(), a.elapsed());
    }

    #[test]
    fn system_clock_sleeps_at_least_requested() {
        let mut clock = SystemClock::new();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.elapsed() >= Duration::from_millis(5));
    }
}
