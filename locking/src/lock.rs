// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Taking and giving locks by ID.
//!
//! These calls resolve an ID through the table and forward to the primitive behind it: a mutex
//! is locked and unlocked, a semaphore is taken and given.  Nothing is queued or retried here; the
//! waiting, ordering and ownership rules are all those of the primitive.
//!
//! With `CONFIG_LOCKING_VERBOSE_DEBUGGING`, every take and give on a valid ID logs the entry's
//! status afterwards.

use core::fmt;

#[allow(unused_imports)]
use log::{debug, info};

use crate::error::{Error, Result};
use crate::kconfig::CONFIG_LOCKING_NAME_WIDTH;
use crate::sys::thread;
use crate::table::{Lock, LockEntry, LockId, LockTable, LockType, INVALID_ID};
use crate::time::Timeout;

impl<'a> LockTable<'a> {
    /// The kind of lock behind an ID, or [`LockType::Unknown`] if the ID is not valid.
    pub fn get_type(&self, id: LockId) -> LockType {
        self.map(id).map_or(LockType::Unknown, LockEntry::lock_type)
    }

    /// Does this ID name a lock?
    pub fn is_valid(&self, id: LockId) -> bool {
        self.map(id).is_some()
    }

    /// The name of a lock.
    ///
    /// Empty if the ID is not valid, or if names are not kept (`CONFIG_LOCKING_STRING_NAME`).
    pub fn get_name(&self, id: LockId) -> &'static str {
        self.map(id).map_or("", LockEntry::name)
    }

    /// Find a lock by name.
    ///
    /// Returns [`INVALID_ID`] if there is no lock by that name, or if names are not kept.
    pub fn get_id(&self, name: &str) -> LockId {
        if !cfg!(CONFIG_LOCKING_STRING_NAME) {
            return INVALID_ID;
        }
        self.entries()
            .iter()
            .find(|entry| entry.name() == name)
            .map_or(INVALID_ID, LockEntry::id)
    }

    /// Take a lock, waiting up to `timeout` for it to become available.
    ///
    /// A mutex already held by the calling thread is taken again, and must be given back as many
    /// times as it was taken.
    pub fn take<T>(&self, id: LockId, timeout: T) -> Result<()>
        where T: Into<Timeout>,
    {
        let entry = self.map(id).ok_or(Error::InvalidId)?;
        let result = match entry.lock() {
            Lock::Mutex(mutex) => mutex.lock(timeout),
            Lock::Semaphore { sem, .. } => sem.take(timeout),
        };

        if let Err(err) = result {
            debug!("take {} failed: {}", id, err);
        }
        verbose(entry);
        result
    }

    /// Give a lock back.
    ///
    /// A mutex must be given by the thread that holds it.  Giving a semaphore that is at its limit
    /// leaves the count at the limit.
    pub fn give(&self, id: LockId) -> Result<()> {
        let entry = self.map(id).ok_or(Error::InvalidId)?;
        let result = match entry.lock() {
            Lock::Mutex(mutex) => mutex.unlock(),
            Lock::Semaphore { sem, .. } => {
                sem.give();
                Ok(())
            }
        };

        if let Err(err) = result {
            debug!("give {} failed: {}", id, err);
        }
        verbose(entry);
        result
    }

    /// The current status of one lock.
    pub fn show(&self, id: LockId) -> Result<EntryStatus> {
        self.map(id).map(EntryStatus::of).ok_or(Error::InvalidId)
    }

    /// The current status of every lock, in table order.
    pub fn statuses(&self) -> impl Iterator<Item = EntryStatus> + 'a {
        self.entries().iter().map(EntryStatus::of)
    }
}

#[cfg(CONFIG_LOCKING_VERBOSE_DEBUGGING)]
fn verbose(entry: &LockEntry) {
    info!("{}", EntryStatus::of(entry));
}

#[cfg(not(CONFIG_LOCKING_VERBOSE_DEBUGGING))]
fn verbose(_entry: &LockEntry) {}

/// A snapshot of a lock, for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryStatus {
    /// ID of the lock.
    pub id: LockId,
    /// Name of the lock (empty if names are not kept).
    pub name: &'static str,
    /// What the lock was doing when the snapshot was taken.
    pub state: LockState,
}

/// The state part of an [`EntryStatus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockState {
    /// A mutex, locked `lock_count` times by `owner`.
    Mutex {
        /// How many times the owner has locked it.  Zero when unlocked.
        lock_count: u32,
        /// The display name of the holding thread.
        owner: Option<String>,
    },
    /// A semaphore with `free` of `limit` units available.
    Semaphore {
        /// Current count.
        free: u32,
        /// Declared limit.
        limit: u32,
    },
}

impl EntryStatus {
    /// Take a snapshot of an entry.
    pub fn of(entry: &LockEntry) -> EntryStatus {
        let state = match entry.lock() {
            Lock::Mutex(mutex) => match mutex.holder() {
                Some((owner, lock_count)) => LockState::Mutex {
                    lock_count,
                    owner: Some(thread::name_of(&owner)),
                },
                None => LockState::Mutex { lock_count: 0, owner: None },
            },
            Lock::Semaphore { sem, limit, .. } => LockState::Semaphore {
                free: sem.count_get(),
                limit: *limit as u32,
            },
        };

        EntryStatus {
            id: entry.id(),
            name: entry.name(),
            state,
        }
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = CONFIG_LOCKING_NAME_WIDTH.max(0) as usize;
        write!(f, "[{:03}] {:<width$}: ", self.id, self.name, width = width)?;

        match &self.state {
            LockState::Mutex { lock_count, owner } => {
                write!(f, "mutex ({} lock{} held", lock_count, plural(*lock_count))?;
                if let Some(owner) = owner {
                    write!(f, " by {}", owner)?;
                }
                write!(f, ")")
            }
            LockState::Semaphore { free, limit } => {
                write!(f, "semaphore ({} of {} lock{} free)", free, limit, plural(*limit))
            }
        }
    }
}
