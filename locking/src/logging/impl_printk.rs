//! Logging through printk
//!
//! This module implements a log handler (for the [`log`] crate) that logs messages through the
//! printk mechanism.
//!
//! Filtering is global, set from `CONFIG_LOCKING_LOG_LEVEL`.

use log::{Log, Metadata, Record, SetLoggerError};

use crate::printkln;

/// A simple log handler, built around printk.
struct PrintkLogger;

impl Log for PrintkLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            printkln!("{}:{}: {}", record.level(), record.target(), record.args());
        }
    }

    // Flush is not needed.
    fn flush(&self) {}
}

static PRINTK_LOGGER: PrintkLogger = PrintkLogger;

/// Set the log handler to log messages through printk.
///
/// # Safety
///
/// This is unsafe due to racy issues in the log framework on targets that do not support atomic
/// pointers.  As long as this is called ever by a single thread, it is safe to use.
pub unsafe fn set_logger() -> Result<(), SetLoggerError> {
    super::set_logger_internal(&PRINTK_LOGGER)
}
