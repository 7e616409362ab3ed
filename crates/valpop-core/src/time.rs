//! Clock abstraction.
//!
//! Generation ids and retention ages are whole seconds since the Unix epoch.
//! Publishing and collection read time through [`Clock`] so tests can pin it.

use std::sync::atomic::{AtomicI64, Ordering};

pub trait Clock {
    /// Current time in whole seconds since the Unix epoch.
    fn now_seconds(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock {
    seconds: AtomicI64,
}

impl FixedClock {
    pub fn new(seconds: i64) -> Self {
        Self {
            seconds: AtomicI64::new(seconds),
        }
    }

    pub fn set(&self, seconds: i64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_seconds(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_seconds(&self) -> i64 {
        (**self).now_seconds()
    }
}
