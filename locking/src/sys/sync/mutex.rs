// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Reentrant mutex with `k_mutex` semantics.
//!
//! The mutex records its owning thread and a lock count.  The owner may lock it again, which only
//! increments the count, and must unlock it as many times as it locked it before another thread
//! can acquire it.

use core::fmt;
use std::thread::{self, Thread};

use parking_lot::Condvar;

use crate::error::{Error, Result};
use crate::time::Timeout;

struct State {
    owner: Option<Thread>,
    lock_count: u32,
}

impl State {
    const UNLOCKED: State = State { owner: None, lock_count: 0 };

    fn owned_by(&self, thread: &Thread) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id() == thread.id())
    }
}

/// A mutex usable through explicit lock and unlock calls.
///
/// Note that this is safe in the sense that memory safety is guaranteed.  Incorrect nesting, or
/// two threads locking two mutexes in opposite orders, can easily result in deadlock.
pub struct Mutex {
    state: parking_lot::Mutex<State>,
    cond: Condvar,
}

impl Mutex {
    /// Construct an unlocked mutex.
    pub const fn new() -> Mutex {
        Mutex {
            state: parking_lot::const_mutex(State::UNLOCKED),
            cond: Condvar::new(),
        }
    }

    /// Put the mutex into its initial, unlocked, state.
    pub fn init(&self) {
        *self.state.lock() = State::UNLOCKED;
        self.cond.notify_all();
    }

    /// Lock the mutex.
    ///
    /// Will wait for the lock, returning status, with `Ok(())` indicating the lock has been
    /// acquired.  A thread that already owns the mutex gets it again immediately, with the lock
    /// count incremented.  Otherwise the error is [`Error::Busy`] if the timeout was `NoWait`,
    /// and [`Error::Timeout`] if the wait expired.
    pub fn lock<T>(&self, timeout: T) -> Result<()>
        where T: Into<Timeout>,
    {
        let timeout: Timeout = timeout.into();
        let me = thread::current();
        let mut state = self.state.lock();

        if state.owned_by(&me) {
            state.lock_count += 1;
            return Ok(());
        }

        if state.owner.is_some() && timeout.is_no_wait() {
            return Err(Error::Busy);
        }

        if !super::wait_until(&self.cond, &mut state, timeout.deadline(), |s| s.owner.is_none()) {
            return Err(Error::Timeout);
        }

        state.owner = Some(me);
        state.lock_count = 1;
        Ok(())
    }

    /// Unlock the mutex.
    ///
    /// Releases one level of ownership.  The mutex must be locked by the calling thread: unlocking
    /// a mutex nobody holds is [`Error::InvalidArgument`], and unlocking one held by another
    /// thread is [`Error::NotOwner`].
    pub fn unlock(&self) -> Result<()> {
        let me = thread::current();
        let mut state = self.state.lock();

        if state.owner.is_none() {
            return Err(Error::InvalidArgument);
        }
        if !state.owned_by(&me) {
            return Err(Error::NotOwner);
        }

        state.lock_count -= 1;
        if state.lock_count == 0 {
            state.owner = None;
            drop(state);
            self.cond.notify_one();
        }
        Ok(())
    }

    /// How many times the owner has locked the mutex.  Zero when unlocked.
    pub fn lock_count(&self) -> u32 {
        self.state.lock().lock_count
    }

    /// The thread currently holding the mutex.
    pub fn owner(&self) -> Option<Thread> {
        self.state.lock().owner.clone()
    }

    /// The holding thread and its lock count, read together.
    pub fn holder(&self) -> Option<(Thread, u32)> {
        let state = self.state.lock();
        state.owner.clone().map(|owner| (owner, state.lock_count))
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Mutex::new()
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sys::Mutex (lock_count: {})", self.lock_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Duration, Forever, NoWait};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_mutex_reentrant() {
        let mutex = Mutex::new();

        mutex.lock(Forever).unwrap();
        mutex.lock(NoWait).unwrap();
        assert_eq!(mutex.lock_count(), 2);
        assert_eq!(mutex.owner().map(|t| t.id()), Some(thread::current().id()));

        mutex.unlock().unwrap();
        assert_eq!(mutex.lock_count(), 1);
        mutex.unlock().unwrap();
        assert_eq!(mutex.lock_count(), 0);
        assert!(mutex.owner().is_none());
    }

    #[test]
    fn test_mutex_unlock_when_unlocked() {
        let mutex = Mutex::new();
        assert_eq!(mutex.unlock(), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_mutex_held_elsewhere() {
        let mutex = Arc::new(Mutex::new());
        mutex.lock(Forever).unwrap();

        let other = mutex.clone();
        let (busy, unlock, timed) = thread::spawn(move || {
            let busy = other.lock(NoWait);
            let unlock = other.unlock();
            let start = Instant::now();
            let timed = other.lock(Duration::millis(50));
            assert!(start.elapsed() >= core::time::Duration::from_millis(45));
            (busy, unlock, timed)
        })
        .join()
        .unwrap();

        assert_eq!(busy, Err(Error::Busy));
        assert_eq!(unlock, Err(Error::NotOwner));
        assert_eq!(timed, Err(Error::Timeout));
        mutex.unlock().unwrap();
    }

    #[test]
    fn test_mutex_handoff() {
        let mutex = Arc::new(Mutex::new());
        mutex.lock(Forever).unwrap();

        let other = mutex.clone();
        let waiter = thread::spawn(move || {
            other.lock(Duration::secs(5)).unwrap();
            other.unlock().unwrap();
        });

        thread::sleep(core::time::Duration::from_millis(20));
        mutex.unlock().unwrap();
        waiter.join().unwrap();
        assert_eq!(mutex.lock_count(), 0);
    }

    #[test]
    fn test_mutex_init_clears() {
        let mutex = Mutex::new();
        mutex.lock(Forever).unwrap();
        mutex.init();
        assert_eq!(mutex.lock_count(), 0);
        assert!(mutex.owner().is_none());
    }
}
