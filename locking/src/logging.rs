//! Logging for the lock table.
//!
//! All logging in this crate goes through the `log` crate.  Messages are sent as fully formatted
//! strings to the console, through the printk mechanism.
//!
//! - `CONFIG_LOCKING_LOG_LEVEL`: the most verbose level that is emitted, from 0 (off) through 4
//!   (debug).
//!
//! An application that installs its own `log` implementation does not need to call
//! [`set_logger`]; the crate only ever uses the `log` macros.

use log::{LevelFilter, Log, SetLoggerError};

use crate::kconfig::CONFIG_LOCKING_LOG_LEVEL;

mod impl_printk;

pub use impl_printk::set_logger;

/// The max level selected by `CONFIG_LOCKING_LOG_LEVEL`.
pub fn configured_level() -> LevelFilter {
    match CONFIG_LOCKING_LOG_LEVEL {
        i if i <= 0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

// The Rust logging system has different entry points based on whether or not we are on a target
// with atomic pointers.  We will provide a single function for this, which will be safe or unsafe
// depending on this.  The safety has to do with initialization order, and as long as this is called
// before any other threads run, it should be safe.
cfg_if::cfg_if! {
    if #[cfg(target_has_atomic = "ptr")] {
        unsafe fn set_logger_internal(logger: &'static dyn Log) -> Result<(), SetLoggerError> {
            log::set_logger(logger)?;
            log::set_max_level(configured_level());
            Ok(())
        }
    } else {
        unsafe fn set_logger_internal(logger: &'static dyn Log) -> Result<(), SetLoggerError> {
            log::set_logger_racy(logger)?;
            log::set_max_level_racy(configured_level());
            Ok(())
        }
    }
}
