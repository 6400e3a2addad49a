// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Locking 'sys' module.
//!
//! This module contains the kernel primitives that lock table entries own: a reentrant mutex with
//! `k_mutex` semantics, and a counting semaphore with `k_sem` semantics.  They are thin, and kept
//! as close as possible to the contract of the kernel calls they stand in for, including the
//! errors those calls report.

pub mod sync;
pub mod thread;

/// The raw form of a timeout, in ticks.
///
/// Negative values wait forever, zero does not wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawTimeout {
    /// Number of ticks to wait.
    pub ticks: i64,
}

/// Represents a timeout with an infinite delay.
///
/// Calls using this value will wait as long as necessary to perform the requested operation.
pub const K_FOREVER: RawTimeout = RawTimeout { ticks: -1 };

/// Represents a null timeout delay.
///
/// Calls using this value will not wait if the operation cannot be performed immediately.
pub const K_NO_WAIT: RawTimeout = RawTimeout { ticks: 0 };
