//! Shared concurrency scenarios, run against both lock word widths.

#[cfg(not(loom))]
pub(crate) mod tests {
    use std::sync::atomic::Ordering::SeqCst;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::{Duration, Instant};
    use std::vec::Vec;

    use crate::word::Word;
    use crate::Plock;

    const THREADS: usize = 4;
    const ITERS: usize = 300;

    fn spawn_all<F>(count: usize, f: F) -> Vec<thread::JoinHandle<()>>
    where
        F: Fn(usize) + Clone + Send + Sync + 'static,
    {
        (0..count)
            .map(|i| {
                let f = f.clone();
                thread::spawn(move || f(i))
            })
            .collect()
    }

    fn join_all(handles: Vec<thread::JoinHandle<()>>) {
        for handle in handles {
            handle.join().unwrap();
        }
    }

    pub fn writers_serialize<W: Word>() {
        let data = Arc::new(Plock::<usize, W>::new(0));
        let lock = Arc::clone(&data);
        join_all(spawn_all(THREADS, move |_| {
            for _ in 0..ITERS {
                *lock.write() += 1;
            }
        }));
        assert_eq!(*data.read(), THREADS * ITERS);
    }

    pub fn readers_coexist<W: Word>() {
        let lock = Arc::new(Plock::<u32, W>::new(0));
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (l, i, p) = (Arc::clone(&lock), Arc::clone(&inside), Arc::clone(&peak));
        join_all(spawn_all(THREADS, move |_| {
            let guard = l.read();
            let now = i.fetch_add(1, SeqCst) + 1;
            p.fetch_max(now, SeqCst);
            // Linger so the read sections overlap; bail out in case a
            // thread never gets scheduled in time.
            let start = Instant::now();
            while i.load(SeqCst) < THREADS && start.elapsed() < Duration::from_secs(2) {
                thread::yield_now();
            }
            i.fetch_sub(1, SeqCst);
            drop(guard);
        }));

        assert!(peak.load(SeqCst) >= 2);
    }

    pub fn writer_blocks_readers<W: Word>() {
        let lock = Arc::new(Plock::<u32, W>::new(0));
        let released = Arc::new(AtomicBool::new(false));

        let mut write = lock.write();
        let (l, r) = (Arc::clone(&lock), Arc::clone(&released));
        let readers = spawn_all(2, move |_| {
            let guard = l.read();
            // Read access is only granted once the writer has left.
            assert!(r.load(SeqCst));
            assert_eq!(*guard, 1);
        });

        thread::sleep(Duration::from_millis(50));
        *write = 1;
        released.store(true, SeqCst);
        drop(write);

        join_all(readers);
    }

    pub fn seeker_is_unique<W: Word>() {
        let lock = Arc::new(Plock::<u32, W>::new(0));
        let seeking = Arc::new(AtomicBool::new(false));

        let (l, s) = (Arc::clone(&lock), Arc::clone(&seeking));
        join_all(spawn_all(THREADS, move |_| {
            for _ in 0..ITERS {
                let guard = l.seek();
                assert!(!s.swap(true, SeqCst));
                s.store(false, SeqCst);
                drop(guard);
            }
        }));
    }

    pub fn seek_walk_upgrade_mutate<W: Word>() {
        let lock = Arc::new(Plock::<Vec<usize>, W>::new(Vec::new()));
        let committed = Arc::new(AtomicUsize::new(0));
        let mutating = Arc::new(AtomicBool::new(false));

        let (l, c, m) = (Arc::clone(&lock), Arc::clone(&committed), Arc::clone(&mutating));
        join_all(spawn_all(2, move |id| {
            for i in 0..ITERS {
                // The walk: a seeker observes a stable structure.
                let seek = l.seek();
                assert_eq!(seek.len(), c.load(SeqCst));
                // The mutation: never overlaps another thread's.
                let mut write = seek.upgrade();
                assert!(!m.swap(true, SeqCst));
                write.push(id * ITERS + i);
                c.fetch_add(1, SeqCst);
                m.store(false, SeqCst);
            }
        }));

        assert_eq!(lock.read().len(), 2 * ITERS);
        assert_eq!(committed.load(SeqCst), 2 * ITERS);
    }

    pub fn atomic_claims_run_in_parallel<W: Word>() {
        let lock = Arc::new(Plock::<AtomicUsize, W>::new(AtomicUsize::new(0)));
        let granted = Arc::new(AtomicUsize::new(0));

        let (l, g) = (Arc::clone(&lock), Arc::clone(&granted));
        join_all(spawn_all(THREADS, move |_| loop {
            let read = l.read();
            match read.try_atomic() {
                Ok(atomic) => {
                    atomic.fetch_add(1, SeqCst);
                    g.fetch_add(1, SeqCst);
                    break;
                }
                // A failed upgrade keeps the read side; release it
                // before trying again.
                Err(read) => {
                    drop(read);
                    thread::yield_now();
                }
            }
        }));

        assert_eq!(granted.load(SeqCst), THREADS);
        assert_eq!(lock.read().load(SeqCst), THREADS);
    }

    pub fn join_group_enters_atomic_mode_together<W: Word>() {
        const GROUP: usize = 3;
        let lock = Arc::new(Plock::<AtomicUsize, W>::new(AtomicUsize::new(0)));
        let barrier = Arc::new(Barrier::new(GROUP));

        let (l, b) = (Arc::clone(&lock), Arc::clone(&barrier));
        join_all(spawn_all(GROUP, move |_| {
            let read = l.read();
            // Everyone holds read access before anyone tries to claim, so
            // the group forms from the full reader set.
            b.wait();
            let claim = read.claim();
            let atomic = claim.atomic();
            atomic.fetch_add(1, SeqCst);
            drop(atomic);
        }));

        assert_eq!(lock.read().load(SeqCst), GROUP);
        // The pipeline wound down completely.
        assert!(lock.try_write().is_some());
    }

    pub fn joiners_claim_and_enter_atomic_mode<W: Word>() {
        const GROUP: usize = 3;
        let lock = Arc::new(Plock::<AtomicUsize, W>::new(AtomicUsize::new(0)));
        let barrier = Arc::new(Barrier::new(GROUP));

        let (l, b) = (Arc::clone(&lock), Arc::clone(&barrier));
        join_all(spawn_all(GROUP, move |_| {
            let read = l.read();
            b.wait();
            // Walk the pipeline one stage at a time: declare intent, mark
            // the claim point (one joiner raises it, the rest observe it
            // raised), then enter atomic mode once the group is complete.
            let join = read.join();
            let claim = join.claim();
            let atomic = claim.atomic();
            atomic.fetch_add(1, SeqCst);
            drop(atomic);
        }));

        assert_eq!(lock.read().load(SeqCst), GROUP);
        assert!(lock.try_write().is_some());
    }
}
