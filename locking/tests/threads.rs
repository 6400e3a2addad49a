// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

// Locks shared between threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;
use std::thread;

use locking::time::{Duration, Forever, NoWait};
use locking::{Error, LockState};

locking::lock_table! {
    static LOCKING;
    adc = 0 => Mutex;
    modem_tx = 1 => Semaphore { count: 0, limit: 1 };
    pool = 2 => Semaphore { count: 2, limit: 2 };
}

fn setup() {
    static INIT: Once = Once::new();
    INIT.call_once(|| LOCKING.initialise().unwrap());
}

#[test]
fn mutex_is_owned_by_one_thread() {
    setup();
    LOCKING.take(LOCKING_ID_ADC, Forever).unwrap();

    let (busy, stolen) = thread::spawn(|| {
        (LOCKING.take(LOCKING_ID_ADC, NoWait), LOCKING.give(LOCKING_ID_ADC))
    })
    .join()
    .unwrap();
    assert_eq!(busy, Err(Error::Busy));
    assert_eq!(stolen, Err(Error::NotOwner));

    let status = LOCKING.show(LOCKING_ID_ADC).unwrap();
    assert!(matches!(status.state, LockState::Mutex { lock_count: 1, owner: Some(_) }));

    let waiter = thread::Builder::new()
        .name("waiter".into())
        .spawn(|| {
            LOCKING.take(LOCKING_ID_ADC, Duration::secs(5))?;
            let status = LOCKING.show(LOCKING_ID_ADC)?;
            LOCKING.give(LOCKING_ID_ADC)?;
            Ok::<_, Error>(status)
        })
        .unwrap();

    thread::sleep(core::time::Duration::from_millis(20));
    LOCKING.give(LOCKING_ID_ADC).unwrap();

    let status = waiter.join().unwrap().unwrap();
    assert_eq!(
        status.state,
        LockState::Mutex { lock_count: 1, owner: Some("waiter".into()) }
    );
}

#[test]
fn semaphore_signals_across_threads() {
    setup();
    let taker = thread::spawn(|| LOCKING.take(LOCKING_ID_MODEM_TX, Duration::secs(5)));

    thread::sleep(core::time::Duration::from_millis(20));
    LOCKING.give(LOCKING_ID_MODEM_TX).unwrap();
    assert_eq!(taker.join().unwrap(), Ok(()));
}

#[test]
fn semaphore_bounds_concurrency() {
    setup();
    static INSIDE: AtomicU32 = AtomicU32::new(0);
    static MOST: AtomicU32 = AtomicU32::new(0);

    let workers: Vec<_> = (0..6)
        .map(|_| {
            thread::spawn(|| {
                for _ in 0..20 {
                    LOCKING.take(LOCKING_ID_POOL, Forever).unwrap();
                    let now = INSIDE.fetch_add(1, Ordering::SeqCst) + 1;
                    MOST.fetch_max(now, Ordering::SeqCst);
                    thread::yield_now();
                    INSIDE.fetch_sub(1, Ordering::SeqCst);
                    LOCKING.give(LOCKING_ID_POOL).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(MOST.load(Ordering::SeqCst) <= 2);
    assert_eq!(
        LOCKING.show(LOCKING_ID_POOL).unwrap().state,
        LockState::Semaphore { free: 2, limit: 2 }
    );
}
