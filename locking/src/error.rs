// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! # Locking errors
//!
//! This module contains an `Error` and `Result` type for the lock table and the primitives
//! underneath it.  The kernel calls these wrap report failures as negative errnos, and each
//! variant here keeps the errno it corresponds to, so that diagnostics (notably the shell) can
//! print the same numbers a C caller would see.

use core::fmt;

/// The errno values used by this crate.
pub mod errno {
    /// Operation not permitted.
    pub const EPERM: i32 = 1;
    /// Try again.
    pub const EAGAIN: i32 = 11;
    /// Device or resource busy.
    pub const EBUSY: i32 = 16;
    /// Invalid argument.
    pub const EINVAL: i32 = 22;
    /// Operation already in progress.
    pub const EALREADY: i32 = 114;
}

/// A locking error.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The lock ID is above the largest configured ID, or maps to an unused slot.
    InvalidId,
    /// A malformed argument, or a mutex released while not locked.
    InvalidArgument,
    /// The lock was unavailable and the caller asked not to wait.
    Busy,
    /// The wait for the lock expired (or the wait was aborted by a semaphore reset).
    Timeout,
    /// A mutex released by a thread that does not hold it.
    NotOwner,
    /// The lock table has already been initialised.
    Already,
}

impl Error {
    /// The negative errno for this error, as returned by the underlying kernel call.
    pub fn errno(&self) -> i32 {
        let code = match self {
            Error::InvalidId | Error::InvalidArgument => errno::EINVAL,
            Error::Busy => errno::EBUSY,
            Error::Timeout => errno::EAGAIN,
            Error::NotOwner => errno::EPERM,
            Error::Already => errno::EALREADY,
        };
        -code
    }

    fn description(&self) -> &'static str {
        match self {
            Error::InvalidId => "invalid lock id",
            Error::InvalidArgument => "invalid argument",
            Error::Busy => "lock busy",
            Error::Timeout => "timed out waiting for lock",
            Error::NotOwner => "lock not held by caller",
            Error::Already => "already initialised",
        }
    }
}

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (errno:{})", self.description(), self.errno())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "locking error errno:{} ({})", self.errno(), self.description())
    }
}

/// Wraps a value with a possible locking error.
pub type Result<T> = core::result::Result<T, Error>;
