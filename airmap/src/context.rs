//! Cancellation for repeated queries, in the spirit of Golang's Context.
//!
//! A watch loop holds a [`Context`]; a signal handler holds a clone and
//! cancels it. The loop sleeps with [`Context::wait_timeout`], so it wakes
//! as soon as it is cancelled rather than at the end of the interval.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: Mutex<bool>,
    cv: Condvar,
}

impl Shared {
    // A panic while holding the flag can't leave it inconsistent.
    fn flag(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the context, waking every waiter.
    pub fn cancel(&self) {
        *self.inner.flag() = true;
        self.inner.cv.notify_all();
    }

    /// Returns true iff the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.flag()
    }

    /// Wait until the duration expires or the context is cancelled.
    /// Returns true if the context has been cancelled.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let guard = self.inner.flag();
        let (cancelled, _) = self
            .inner
            .cv
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled
    }

    /// Run `tick` now and then every `interval` until cancelled.
    /// Returns the number of ticks run.
    pub fn every(&self, interval: Duration, mut tick: impl FnMut()) -> usize {
        let mut ticks = 0;
        while !self.is_cancelled() {
            tick();
            ticks += 1;
            if self.wait_timeout(interval) {
                break;
            }
        }
        ticks
    }
}
