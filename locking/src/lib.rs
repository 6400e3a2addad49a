// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Locks addressed by ID
//!
//! This crate provides a fixed table of mutexes and semaphores that code refers to by a small
//! numeric ID instead of by reference.  The table is declared once, with [`lock_table!`], and each
//! lock gets a `LOCKING_ID_<NAME>` constant.  Locks are then taken and given through the table:
//!
//! ```
//! use locking::time::{Duration, NoWait};
//!
//! locking::lock_table! {
//!     pub static LOCKING;
//!     adc = 0 => Mutex;
//! }
//!
//! LOCKING.initialise().unwrap();
//! LOCKING.take(LOCKING_ID_ADC, Duration::secs(3)).unwrap();
//! LOCKING.take(LOCKING_ID_ADC, NoWait).unwrap();
//! LOCKING.give(LOCKING_ID_ADC).unwrap();
//! LOCKING.give(LOCKING_ID_ADC).unwrap();
//! assert_eq!(LOCKING.take(1, NoWait), Err(locking::Error::InvalidId));
//! ```
//!
//! Behaviour is selected at build time by the Kconfig style settings in `prj.conf` (or the file
//! named by `DOTCONFIG`).  See [`kconfig`] for the values of this build.

#![allow(unexpected_cfgs)]
#![warn(missing_docs)]

pub mod error;
pub mod lock;
pub mod logging;
pub mod printk;
pub mod sys;
pub mod table;
pub mod time;

#[cfg(CONFIG_LOCKING_SHELL)]
pub mod shell;

pub use error::{Error, Result};
pub use lock::{EntryStatus, LockState};
pub use logging::set_logger;
pub use table::{Lock, LockEntry, LockId, LockIndex, LockTable, LockType, INVALID_ID};

/// Re-exported for local macro use.
#[doc(hidden)]
pub use paste::paste;

// Bring in the generated kconfig module
pub mod kconfig {
    //! Kconfig values.
    //!
    //! This module contains an auto-generated set of constants corresponding to the numeric and
    //! string values of the configuration used for the build.  Boolean settings are not here;
    //! they are visible as `cfg` flags instead.

    #![allow(missing_docs)]

    include!(concat!(env!("OUT_DIR"), "/kconfig.rs"));
}
