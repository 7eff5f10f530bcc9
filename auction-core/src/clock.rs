use std::cell::Cell;
use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};

/// Source of trade timestamps.
///
/// Round timing does not read the clock: rounds are driven by explicit ticks.
/// The clock only stamps admitted trades.
pub trait Clock: Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock. On wasm this reads the browser's `Date`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Clock pinned at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::default())
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let clock = FixedClock::at_epoch();
        assert_eq!(clock.now().timestamp(), 0);
        assert_eq!(clock.now(), clock.now());

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now().timestamp(), 90);
    }
}
