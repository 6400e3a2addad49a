// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! # Low-level synchronization primitives.
//!
//! These are the objects a lock table entry owns.  Unlike the guard based types in `std::sync`,
//! they use explicit lock/unlock and take/give calls, because the lock table hands out access by
//! ID rather than by reference, and a lock taken in one call is given back in another.
//!
//! Both types can be constructed in a `const` context, so they can live inside a `static` table,
//! and both have an `init` call that puts them back into their declared initial state.

pub mod mutex;
pub mod semaphore;

pub use mutex::Mutex;
pub use semaphore::Semaphore;

/// Wait on `cond` until `ready` holds, honoring the deadline.
///
/// Returns false if the deadline passed with `ready` still false.
fn wait_until<T, F>(
    cond: &parking_lot::Condvar,
    guard: &mut parking_lot::MutexGuard<'_, T>,
    deadline: Option<std::time::Instant>,
    mut ready: F,
) -> bool
where
    F: FnMut(&T) -> bool,
{
    while !ready(&**guard) {
        match deadline {
            None => cond.wait(guard),
            Some(deadline) => {
                if cond.wait_until(guard, deadline).timed_out() {
                    return ready(&**guard);
                }
            }
        }
    }
    true
}
