//! # Time Source
//!
//! Every "now" in cardbox comes from a [`TimeSource`]. Nothing reads the wall
//! clock directly: categories hold an `Rc<dyn TimeSource>` that attached cards
//! reach through their container reference, and the read-only state queries
//! (`is_learned`, `is_expired`) take one as an argument.
//!
//! - [`SystemClock`]: the wall clock.
//! - [`ManualClock`]: a clock that only moves when told to. Tests use it to
//!   step across expiration boundaries without sleeping.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Source of the current time.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that holds a fixed instant until it is set or advanced.
///
/// Uses `Cell` since cardbox is single-threaded; share it as
/// `Rc<ManualClock>` and hand a clone to the category tree.
#[derive(Debug)]
pub struct ManualClock {
    current: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Cell::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.current.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}
