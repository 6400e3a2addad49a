// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Thread identity, as shown in lock status output.

use std::thread::Thread;

use crate::kconfig::CONFIG_THREAD_MAX_NAME_LEN;

/// Size of the owner name buffer, including its terminator.  Never less than 11.
const NAME_SIZE: usize = if CONFIG_THREAD_MAX_NAME_LEN > 11 {
    CONFIG_THREAD_MAX_NAME_LEN as usize
} else {
    11
};

/// The name to show for a thread holding a lock.
///
/// Named threads are shown by name, cut to one less than the name buffer size, which is
/// `CONFIG_THREAD_MAX_NAME_LEN` but at least 11.  Unnamed threads are shown by their id.
pub fn name_of(thread: &Thread) -> String {
    match thread.name() {
        Some(name) => name.chars().take(NAME_SIZE - 1).collect(),
        None => format!("{:?}", thread.id()),
    }
}
