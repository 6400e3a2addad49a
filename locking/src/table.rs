// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! # The lock table
//!
//! A lock table is a fixed array of [`LockEntry`] values, each of which owns one primitive, plus
//! a map from lock ID to position in that array.  IDs do not have to be dense: slots in the map for
//! IDs that are not used hold `None`.  The table is declared once, with [`lock_table!`], and is
//! read-only after that, apart from the state of the primitives themselves.
//!
//! ```
//! locking::lock_table! {
//!     /// Locks used by the sensor code.
//!     pub static LOCKS;
//!     adc = 0 => Mutex;
//!     sample_ready = 2 => Semaphore { count: 0, limit: 4 };
//! }
//!
//! LOCKS.initialise().unwrap();
//! assert_eq!(LOCKS.len(), 2);
//! assert!(LOCKS.map(LOCKING_ID_SAMPLE_READY).is_some());
//! assert!(LOCKS.map(1).is_none());
//! ```
//!
//! [`lock_table!`]: crate::lock_table

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sys::sync::{Mutex, Semaphore};

/// Identifies a lock.  IDs are small, and mostly dense.
pub type LockId = u16;

/// Position of an entry within the table.
pub type LockIndex = u16;

/// Reserved ID that never names a lock.  Returned by name lookups that fail.
pub const INVALID_ID: LockId = u16::MAX - 1;

/// The kind of primitive behind an ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockType {
    /// The ID does not name a lock.
    Unknown,
    /// A reentrant mutex.
    Mutex,
    /// A counting semaphore.
    Semaphore,
}

/// The primitive owned by an entry.
pub enum Lock {
    /// A reentrant mutex.
    Mutex(Mutex),
    /// A counting semaphore, with the count and limit it was declared with.
    Semaphore {
        /// The semaphore itself.
        sem: Semaphore,
        /// The initial count.
        count: u8,
        /// The maximum count.
        limit: u8,
    },
}

impl Lock {
    /// The kind of this lock.
    pub fn lock_type(&self) -> LockType {
        match self {
            Lock::Mutex(_) => LockType::Mutex,
            Lock::Semaphore { .. } => LockType::Semaphore,
        }
    }

    fn init(&self) {
        match self {
            Lock::Mutex(mutex) => mutex.init(),
            Lock::Semaphore { sem, count, limit } => sem.init(*count as u32, *limit as u32),
        }
    }
}

/// One entry in the lock table.
pub struct LockEntry {
    id: LockId,
    name: &'static str,
    lock: Lock,
}

impl LockEntry {
    /// Declare a mutex entry.
    pub const fn mutex(id: LockId, name: &'static str) -> LockEntry {
        LockEntry { id, name, lock: Lock::Mutex(Mutex::new()) }
    }

    /// Declare a semaphore entry, starting at `count`, and never going above `limit`.
    ///
    /// The limit must be at least 1, and the count may not exceed it.  In a `static` these are
    /// checked when the crate is built.
    pub const fn semaphore(id: LockId, name: &'static str, count: u8, limit: u8) -> LockEntry {
        assert!(limit >= 1, "semaphore limit must be at least 1");
        assert!(count <= limit, "semaphore count must not exceed its limit");
        LockEntry {
            id,
            name,
            lock: Lock::Semaphore {
                sem: Semaphore::new(count as u32, limit as u32),
                count,
                limit,
            },
        }
    }

    /// The ID of this entry.
    pub fn id(&self) -> LockId {
        self.id
    }

    /// The name of this entry.  Empty unless `CONFIG_LOCKING_STRING_NAME` is set.
    pub fn name(&self) -> &'static str {
        if cfg!(CONFIG_LOCKING_STRING_NAME) {
            self.name
        } else {
            ""
        }
    }

    /// The primitive behind this entry.
    pub fn lock(&self) -> &Lock {
        &self.lock
    }

    /// The kind of primitive behind this entry.
    pub fn lock_type(&self) -> LockType {
        self.lock.lock_type()
    }
}

/// A table of locks, addressed by ID.
pub struct LockTable<'a> {
    entries: &'a [LockEntry],
    map: &'a [Option<LockIndex>],
    initialised: AtomicBool,
}

impl<'a> LockTable<'a> {
    /// Build a table from its entries and its ID map.
    ///
    /// Slot `n` of `map` holds the position in `entries` of the entry with ID `n`.  This is
    /// normally produced by [`lock_table!`](crate::lock_table), which computes the map at compile
    /// time.
    pub const fn new(entries: &'a [LockEntry], map: &'a [Option<LockIndex>]) -> LockTable<'a> {
        LockTable {
            entries,
            map,
            initialised: AtomicBool::new(false),
        }
    }

    /// Put every lock into its declared initial state.
    ///
    /// This must be called once, at startup, before any lock is used.  Later calls are refused
    /// with [`Error::Already`], and leave the locks alone.
    ///
    /// # Panics
    ///
    /// If the ID map does not agree with the entries.  That can only come from a table built by
    /// hand with [`LockTable::new`].
    pub fn initialise(&self) -> Result<()> {
        if self.initialised.swap(true, Ordering::AcqRel) {
            warn!("lock table already initialised");
            return Err(Error::Already);
        }

        for (slot, index) in self.map.iter().enumerate() {
            if let Some(index) = index {
                let entry = self.entries.get(*index as usize);
                assert!(
                    entry.is_some_and(|entry| entry.id as usize == slot),
                    "lock map slot {} does not match its entry",
                    slot,
                );
            }
        }

        for entry in self.entries {
            entry.lock.init();
        }

        debug!("initialised {} locks", self.entries.len());
        Ok(())
    }

    /// Has [`initialise`](Self::initialise) been called?
    pub fn is_initialised(&self) -> bool {
        self.initialised.load(Ordering::Acquire)
    }

    /// Look up the entry for an ID.
    ///
    /// Returns `None` if the ID is above the largest ID in the table, or is not used.
    pub fn map(&self, id: LockId) -> Option<&'a LockEntry> {
        let index = (*self.map.get(id as usize)?)?;
        self.entries.get(index as usize)
    }

    /// The position of an entry within this table.
    ///
    /// # Panics
    ///
    /// If `entry` is not part of this table.
    pub fn index(&self, entry: &LockEntry) -> LockIndex {
        let range = self.entries.as_ptr_range();
        let ptr: *const LockEntry = entry;
        assert!(range.contains(&ptr), "Invalid entry");
        ((ptr as usize - range.start as usize) / core::mem::size_of::<LockEntry>()) as LockIndex
    }

    /// Reset every semaphore's count to zero (debug use only).
    ///
    /// Threads waiting on a semaphore give up with [`Error::Timeout`].  Mutexes are not touched.
    pub fn reset(&self) {
        for entry in self.entries {
            if let Lock::Semaphore { sem, .. } = &entry.lock {
                sem.reset();
            }
        }
        info!("lock table reset");
    }

    /// All of the entries, in table order.
    pub fn entries(&self) -> &'a [LockEntry] {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The largest ID in the table.
    pub fn max_id(&self) -> Option<LockId> {
        self.map.len().checked_sub(1).map(|id| id as LockId)
    }
}

/// Length of the ID map needed for these IDs.
#[doc(hidden)]
pub const fn map_len(ids: &[LockId]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < ids.len() {
        if ids[i] as usize >= len {
            len = ids[i] as usize + 1;
        }
        i += 1;
    }
    len
}

/// Build the ID map for entries declared with these IDs, in this order.
#[doc(hidden)]
pub const fn build_map<const M: usize>(ids: &[LockId]) -> [Option<LockIndex>; M] {
    assert!(ids.len() <= LockIndex::MAX as usize, "too many locks");
    let mut map = [None; M];
    let mut i = 0;
    while i < ids.len() {
        let id = ids[i];
        assert!(id < INVALID_ID, "lock id is reserved");
        assert!(map[id as usize].is_none(), "duplicate lock id");
        map[id as usize] = Some(i as LockIndex);
        i += 1;
    }
    map
}

/// Declare a lock table.
///
/// Each line names a lock, gives its ID, and says what it is.  Semaphores also give their initial
/// count and their limit.  For each lock, a `LOCKING_ID_<NAME>` constant is declared next to the
/// table, with the same visibility.
///
/// ```
/// locking::lock_table! {
///     pub static LOCKING;
///     adc = 0 => Mutex;
///     modem_tx = 3 => Semaphore { count: 1, limit: 1 };
/// }
///
/// assert_eq!(LOCKING_ID_MODEM_TX, 3);
/// assert_eq!(LOCKING.max_id(), Some(3));
/// ```
///
/// The constants go into the module the macro is invoked in, so two tables in one module cannot
/// both have a lock with the same name.  Give each table its own module:
///
/// ```
/// mod board {
///     locking::lock_table! {
///         pub static LOCKING;
///         adc = 0 => Mutex;
///     }
/// }
///
/// mod test_rig {
///     locking::lock_table! {
///         pub static LOCKING;
///         adc = 4 => Mutex;
///     }
/// }
///
/// assert_eq!(board::LOCKING_ID_ADC, 0);
/// assert_eq!(test_rig::LOCKING_ID_ADC, 4);
/// ```
///
/// The table is checked as it is built.  Duplicate IDs, the reserved ID, and semaphores with a
/// limit of zero or a count above their limit all fail to compile:
///
/// ```compile_fail
/// locking::lock_table! {
///     static LOCKING;
///     adc = 0 => Mutex;
///     uart = 0 => Mutex;
/// }
/// ```
#[macro_export]
macro_rules! lock_table {
    (@entry $name:ident $id:literal Mutex) => {
        $crate::table::LockEntry::mutex($id, stringify!($name))
    };
    (@entry $name:ident $id:literal Semaphore $count:expr, $limit:expr) => {
        $crate::table::LockEntry::semaphore($id, stringify!($name), $count, $limit)
    };
    (
        $(#[$attr:meta])*
        $vis:vis static $table:ident;
        $(
            $name:ident = $id:literal => $kind:ident $({ count: $count:expr, limit: $limit:expr })?;
        )*
    ) => {
        $(#[$attr])*
        $vis static $table: $crate::table::LockTable<'static> = {
            const IDS: &[$crate::table::LockId] = &[$($id),*];
            static ENTRIES: [$crate::table::LockEntry; IDS.len()] = [
                $( $crate::lock_table!(@entry $name $id $kind $($count, $limit)?) ),*
            ];
            static MAP: [::core::option::Option<$crate::table::LockIndex>;
                         $crate::table::map_len(IDS)] = $crate::table::build_map(IDS);
            $crate::table::LockTable::new(&ENTRIES, &MAP)
        };

        $crate::paste! {
            $(
                #[allow(dead_code)]
                $vis const [<LOCKING_ID_ $name:upper>]: $crate::table::LockId = $id;
            )*
        }
    };
}
