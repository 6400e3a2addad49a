// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Printk implementation for Rust.
//!
//! Output goes to the console, which on a host is standard error.  Each message is written while
//! holding the console lock, so messages from different threads do not interleave.

use std::fmt::Arguments;
use std::io::Write;

/// Print to the console, without a newline.
///
/// This macro uses the same syntax as std's [`format!`], but writes to the console instead.
#[macro_export]
macro_rules! printk {
    ($($arg:tt)*) => {{
        $crate::printk::printk(format_args!($($arg)*));
    }};
}

/// Print to the console, with a newline.
///
/// This macro uses the same syntax as std's [`format!`], but writes to the console instead.
#[macro_export]
macro_rules! printkln {
    ($($arg:tt)*) => {{
        $crate::printk::printkln(format_args!($($arg)*));
    }};
}

// Console output is best effort: there is nowhere left to report a failed write to the console.

#[doc(hidden)]
pub fn printk(args: Arguments<'_>) {
    let mut console = std::io::stderr().lock();
    let _ = console.write_fmt(args);
    let _ = console.flush();
}

#[doc(hidden)]
pub fn printkln(args: Arguments<'_>) {
    let mut console = std::io::stderr().lock();
    let _ = console.write_fmt(args);
    let _ = console.write_all(b"\n");
}
