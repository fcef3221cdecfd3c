#![allow(dead_code)]

use labnote_core::Clock;
use std::cell::Cell;

/// 2023-11-14T22:13:20Z.
pub const T0: i64 = 1_700_000_000_000;

/// Test clock advanced by hand.
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}
