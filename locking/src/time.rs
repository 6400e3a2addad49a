// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Time types for waiting on locks.
//!
//! Timeouts are counted in kernel ticks.  [`Duration`] is a [`fugit`] duration at the tick rate,
//! and any of it, [`Forever`], [`NoWait`] or a [`core::time::Duration`] can be turned into the
//! [`Timeout`] that the blocking calls take.
//!
//! ```
//! use locking::time::{Duration, NoWait, Timeout};
//!
//! let three_secs: Timeout = Duration::secs(3).into();
//! let poll: Timeout = NoWait.into();
//! assert!(poll.is_no_wait());
//! assert!(!three_secs.is_forever());
//! ```

use std::time::Instant;

use crate::sys::{RawTimeout, K_FOREVER, K_NO_WAIT};

/// The unit of time used by the kernel.
pub type Tick = u64;

/// The number of ticks per second.
pub const SYS_FREQUENCY: u32 = 10_000;

/// A duration, measured in ticks.
pub type Duration = fugit::Duration<Tick, 1, SYS_FREQUENCY>;

/// Wait as long as necessary.
#[derive(Clone, Copy, Debug)]
pub struct Forever;

/// Don't wait at all.
#[derive(Clone, Copy, Debug)]
pub struct NoWait;

/// How long a blocking call may wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeout(pub RawTimeout);

impl Timeout {
    /// Does this timeout wait indefinitely?
    pub fn is_forever(&self) -> bool {
        self.0.ticks < 0
    }

    /// Does this timeout refuse to wait?
    pub fn is_no_wait(&self) -> bool {
        self.0.ticks == 0
    }

    /// The length of the wait, or `None` for [`Forever`].
    pub fn to_std(&self) -> Option<core::time::Duration> {
        if self.is_forever() {
            return None;
        }
        let nanos = self.0.ticks as u128 * 1_000_000_000 / SYS_FREQUENCY as u128;
        Some(core::time::Duration::from_nanos(nanos.min(u64::MAX as u128) as u64))
    }

    /// The instant at which a wait starting now gives up.  `None` means never.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.to_std().and_then(|wait| Instant::now().checked_add(wait))
    }
}

impl From<Forever> for Timeout {
    fn from(_: Forever) -> Timeout {
        Timeout(K_FOREVER)
    }
}

impl From<NoWait> for Timeout {
    fn from(_: NoWait) -> Timeout {
        Timeout(K_NO_WAIT)
    }
}

impl From<Duration> for Timeout {
    fn from(value: Duration) -> Timeout {
        let ticks = i64::try_from(value.ticks()).unwrap_or(i64::MAX);
        Timeout(RawTimeout { ticks })
    }
}

impl From<core::time::Duration> for Timeout {
    /// Rounds up to the next whole tick, so a nonzero wait never becomes [`NoWait`].
    fn from(value: core::time::Duration) -> Timeout {
        let ticks = (value.as_nanos() * SYS_FREQUENCY as u128).div_ceil(1_000_000_000);
        let ticks = i64::try_from(ticks).unwrap_or(i64::MAX);
        Timeout(RawTimeout { ticks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_in_ticks() {
        let t: Timeout = Duration::secs(3).into();
        assert_eq!(t.0.ticks, 3 * SYS_FREQUENCY as i64);
        assert_eq!(t.to_std(), Some(core::time::Duration::from_secs(3)));
    }

    #[test]
    fn forever_has_no_deadline() {
        let t: Timeout = Forever.into();
        assert!(t.is_forever());
        assert!(t.deadline().is_none());
    }

    #[test]
    fn std_duration_rounds_up() {
        let t: Timeout = core::time::Duration::from_nanos(1).into();
        assert_eq!(t.0.ticks, 1);
        assert!(!t.is_no_wait());

        let t: Timeout = core::time::Duration::ZERO.into();
        assert!(t.is_no_wait());
    }
}
