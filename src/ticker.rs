use crate::clock::Clock;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// The deadline after `last` on a fixed cadence. Deadlines already in the past are
/// skipped rather than replayed.
pub fn next_deadline(last: Instant, now: Instant, interval: Duration) -> Instant {
    let next = last + interval;
    if next > now {
        return next;
    }

    let behind = now.duration_since(last).as_nanos();
    let missed = behind / interval.as_nanos().max(1);
    let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
    last + interval.saturating_mul(steps)
}

/// Fixed-interval tick source. Each tick reads the clock once, and that single `now` is
/// shared by every duration computed during the pass.
pub struct Ticker<C: Clock> {
    clock: C,
    interval: Duration,
    deadline: Instant,
}

impl<C: Clock> Ticker<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval: interval.max(Duration::from_millis(1)),
            deadline: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until the next tick is due and return the time for this pass
    pub fn wait(&mut self) -> DateTime<Utc> {
        let now = Instant::now();
        if self.deadline > now {
            std::thread::sleep(self.deadline - now);
        }
        self.deadline = next_deadline(self.deadline, Instant::now(), self.interval);
        self.clock.now()
    }
}
