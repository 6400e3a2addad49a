// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Counting semaphore with `k_sem` semantics.
//!
//! The semaphore has both an upper and lower bound on the count.  Note that calling 'give' on a
//! semaphore that is at the maximum count will discard the 'give' operation, which in situation
//! where counting is actually desired, will result in the count being incorrect.

use core::fmt;

use parking_lot::Condvar;

use crate::error::{Error, Result};
use crate::time::Timeout;

struct State {
    count: u32,
    limit: u32,
    // Bumped by `reset`, so that threads waiting across a reset can tell their wait was aborted.
    resets: u32,
}

/// A counting semaphore usable through explicit take and give calls.
pub struct Semaphore {
    state: parking_lot::Mutex<State>,
    cond: Condvar,
}

impl Semaphore {
    /// Construct a semaphore with the given initial count and count limit.
    pub const fn new(count: u32, limit: u32) -> Semaphore {
        Semaphore {
            state: parking_lot::const_mutex(State { count, limit, resets: 0 }),
            cond: Condvar::new(),
        }
    }

    /// Set the count and limit, as when the semaphore was first declared.
    pub fn init(&self, count: u32, limit: u32) {
        let mut state = self.state.lock();
        state.count = count.min(limit);
        state.limit = limit;
        drop(state);
        self.cond.notify_all();
    }

    /// Take a semaphore.
    ///
    /// Waits up to `timeout` for the count to be nonzero, and decrements it.  The error is
    /// [`Error::Busy`] if the timeout was `NoWait`, and [`Error::Timeout`] if the wait expired or
    /// the semaphore was reset while waiting.
    pub fn take<T>(&self, timeout: T) -> Result<()>
        where T: Into<Timeout>,
    {
        let timeout: Timeout = timeout.into();
        let mut state = self.state.lock();

        if state.count == 0 && timeout.is_no_wait() {
            return Err(Error::Busy);
        }

        let resets = state.resets;
        let ready = super::wait_until(&self.cond, &mut state, timeout.deadline(), |s| {
            s.count > 0 || s.resets != resets
        });
        if !ready || state.resets != resets {
            return Err(Error::Timeout);
        }

        state.count -= 1;
        Ok(())
    }

    /// Give a semaphore.
    ///
    /// This routine gives to the semaphore, unless the semaphore is already at its maximum
    /// permitted count.
    pub fn give(&self) {
        let mut state = self.state.lock();
        if state.count < state.limit {
            state.count += 1;
        }
        drop(state);
        self.cond.notify_one();
    }

    /// Resets a semaphore's count to zero.
    ///
    /// Any outstanding [`take`] calls will be aborted with [`Error::Timeout`].
    ///
    /// [`take`]: Self::take
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.count = 0;
        state.resets = state.resets.wrapping_add(1);
        drop(state);
        self.cond.notify_all();
    }

    /// Get a semaphore's count.
    pub fn count_get(&self) -> u32 {
        self.state.lock().count
    }

    /// The highest count the semaphore can reach.
    pub fn limit(&self) -> u32 {
        self.state.lock().limit
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        write!(f, "sys::Semaphore ({} of {})", state.count, state.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Duration, NoWait};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_semaphore_take_and_give() {
        let sem = Semaphore::new(2, 2);

        sem.take(NoWait).unwrap();
        sem.take(NoWait).unwrap();
        assert_eq!(sem.take(NoWait), Err(Error::Busy));

        sem.give();
        assert_eq!(sem.count_get(), 1);
    }

    #[test]
    fn test_semaphore_give_saturates() {
        let sem = Semaphore::new(1, 2);

        sem.give();
        sem.give();
        sem.give();
        assert_eq!(sem.count_get(), 2);
        assert_eq!(sem.limit(), 2);
    }

    #[test]
    fn test_semaphore_timeout() {
        let sem = Semaphore::new(0, 1);

        let start = Instant::now();
        assert_eq!(sem.take(Duration::millis(50)), Err(Error::Timeout));
        let waited = start.elapsed();
        assert!(waited >= core::time::Duration::from_millis(45));
        assert!(waited < core::time::Duration::from_secs(5));
    }

    #[test]
    fn test_semaphore_give_wakes_taker() {
        let sem = Arc::new(Semaphore::new(0, 1));

        let other = sem.clone();
        let taker = thread::spawn(move || other.take(Duration::secs(5)));

        thread::sleep(core::time::Duration::from_millis(20));
        sem.give();
        assert_eq!(taker.join().unwrap(), Ok(()));
        assert_eq!(sem.count_get(), 0);
    }

    #[test]
    fn test_semaphore_reset_aborts_waiters() {
        let sem = Arc::new(Semaphore::new(0, 3));

        let other = sem.clone();
        let taker = thread::spawn(move || other.take(Duration::secs(5)));

        thread::sleep(core::time::Duration::from_millis(20));
        sem.reset();
        assert_eq!(taker.join().unwrap(), Err(Error::Timeout));
        assert_eq!(sem.count_get(), 0);
    }
}
