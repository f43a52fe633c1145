//! End-to-end scenarios with real threads and real contention.

use std::collections::HashMap;
use std::sync::atomic::Ordering::{Relaxed, SeqCst};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use plock::raw::RawPlock64;
use plock::Plock;

/// One reader against seven writers. The writers bump a counter under
/// exclusive access; the reader zeroes it on entry and then asserts it
/// stays zero for a random while, which any reader/writer overlap breaks
/// immediately.
#[test]
fn readers_never_observe_writer_traffic() {
    const WRITERS: usize = 7;

    let lock: Arc<Plock<AtomicU32>> = Arc::new(Plock::new(AtomicU32::new(0)));
    let stop = Arc::new(AtomicBool::new(false));
    let read_loops = Arc::new(AtomicUsize::new(0));
    let write_loops = Arc::new(AtomicUsize::new(0));

    let reader = {
        let (lock, stop, loops) = (Arc::clone(&lock), Arc::clone(&stop), Arc::clone(&read_loops));
        thread::spawn(move || {
            while !stop.load(SeqCst) {
                let guard = lock.read();
                guard.store(0, Relaxed);
                for _ in 0..rand::random::<u16>() % 1000 {
                    assert_eq!(guard.load(Relaxed), 0);
                }
                drop(guard);
                loops.fetch_add(1, SeqCst);
            }
        })
    };

    let writers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let (lock, stop, loops) =
                (Arc::clone(&lock), Arc::clone(&stop), Arc::clone(&write_loops));
            thread::spawn(move || {
                while !stop.load(SeqCst) {
                    let guard = lock.write();
                    guard.fetch_add(1, Relaxed);
                    drop(guard);
                    loops.fetch_add(1, SeqCst);
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(250));
    stop.store(true, SeqCst);

    reader.join().unwrap();
    for writer in writers {
        writer.join().unwrap();
    }

    // Both sides made progress.
    assert!(read_loops.load(SeqCst) > 0);
    assert!(write_loops.load(SeqCst) > 0);
}

/// The shared-cache access pattern: look up under read access; on a miss,
/// re-check as the seeker and insert under the upgraded writer.
#[test]
fn cache_stays_consistent_under_mixed_traffic() {
    const THREADS: usize = 4;
    const KEYS: u32 = 64;

    let cache: Arc<Plock<HashMap<u32, u64>>> = Arc::new(Plock::new(HashMap::new()));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_millis(200);
                while Instant::now() < deadline {
                    let key = rand::random::<u32>() % KEYS;
                    let read = cache.read();
                    if read.contains_key(&key) {
                        continue;
                    }
                    drop(read);
                    let seek = cache.seek();
                    // Another thread may have inserted it since the lookup.
                    if !seek.contains_key(&key) {
                        let mut write = seek.upgrade();
                        write.insert(key, u64::from(key) * 3);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let cache = cache.read();
    assert!(cache.len() <= KEYS as usize);
    assert!(!cache.is_empty());
    for (key, value) in cache.iter() {
        assert_eq!(*value, u64::from(*key) * 3);
    }
}

/// Failed direct upgrades hand the read side back; releasing it before
/// retrying is what keeps the contenders from deadlocking each other.
#[test]
fn failed_direct_upgrades_recover_by_releasing_read() {
    const THREADS: usize = 4;

    let lock: Arc<Plock<u64>> = Arc::new(Plock::new(0u64));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || loop {
                let read = lock.read();
                match read.try_write() {
                    Ok(mut write) => {
                        *write += 1;
                        break;
                    }
                    Err(read) => {
                        drop(read);
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*lock.read(), THREADS as u64);
}

/// Seek and atomic traffic excludes each other but neither starves, and
/// the word winds down to zero.
#[test]
fn atomic_and_seek_traffic_interleaves_cleanly() {
    const ITERS: usize = 2000;

    let lock = Arc::new(RawPlock64::new());

    let seeker = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            for _ in 0..ITERS {
                lock.take_s();
                lock.drop_s();
            }
        })
    };

    let atomics: Vec<_> = (0..2)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..ITERS {
                    lock.take_a();
                    lock.drop_a();
                }
            })
        })
        .collect();

    seeker.join().unwrap();
    for handle in atomics {
        handle.join().unwrap();
    }

    assert_eq!(lock.value(), 0);
}

/// A solitary join claim drains the readers before granting exclusivity,
/// then walks the claim point into atomic mode and winds down cleanly
/// under reader churn.
#[test]
fn solitary_join_claim_waits_for_readers() {
    const READERS: usize = 3;

    let lock: Arc<Plock<AtomicUsize>> = Arc::new(Plock::new(AtomicUsize::new(0)));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..300 {
                    let guard = lock.read();
                    guard.load(SeqCst);
                    drop(guard);
                }
            })
        })
        .collect();

    let joiner = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            for _ in 0..50 {
                let join = lock.join();
                // Readers have drained and nobody else joined.
                assert!(join.last_writer());
                let claim = join.claim();
                let atomic = claim.atomic();
                atomic.fetch_add(1, SeqCst);
                drop(atomic);
            }
        })
    };

    for handle in readers {
        handle.join().unwrap();
    }
    joiner.join().unwrap();

    assert_eq!(lock.read().load(SeqCst), 50);
    assert!(lock.try_write().is_some());
}
