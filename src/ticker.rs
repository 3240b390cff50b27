//! Periodic timers.
//!
//! Both loops block on a fixed-rate timer between iterations instead of
//! spinning. The supervisor's scan timer lives for the whole run and keeps its
//! schedule during a session; nobody waits on it until the poller's frame
//! timer, created per session, has been dropped.

use std::time::{Duration, Instant};

use crate::error::Result;

/// A started periodic timer.
pub trait Ticker {
    /// Block until the next period boundary.
    fn wait(&mut self) -> Result<()>;
}

/// Creates periodic timers.
pub trait TickerFactory {
    type Ticker: Ticker;

    /// Start a timer whose first tick is one `period` from now.
    fn periodic(&self, period: Duration) -> Result<Self::Ticker>;
}

/// Portable fixed-rate ticker built on `thread::sleep`.
///
/// Deadlines advance by whole periods from the start time, so a slow iteration
/// shortens the next wait rather than shifting every later tick. If the caller
/// falls more than one period behind, missed ticks are skipped.
#[derive(Debug)]
pub struct IntervalTicker {
    period: Duration,
    next: Instant,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    fn advance(&mut self, now: Instant) {
        self.next += self.period;
        if self.next <= now && !self.period.is_zero() {
            let behind = now.duration_since(self.next).as_nanos() / self.period.as_nanos();
            self.next += self.period * (behind as u32 + 1);
        }
    }
}

impl Ticker for IntervalTicker {
    fn wait(&mut self) -> Result<()> {
        let now = Instant::now();
        if let Some(remaining) = self.next.checked_duration_since(now) {
            std::thread::sleep(remaining);
        }
        self.advance(Instant::now());
        Ok(())
    }
}

/// Factory for [`IntervalTicker`].
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalTickers;

impl TickerFactory for IntervalTickers {
    type Ticker = IntervalTicker;

    fn periodic(&self, period: Duration) -> Result<IntervalTicker> {
        Ok(IntervalTicker::new(period))
    }
}
