use core::fmt::{self, Debug, Formatter};

use crate::atomic::{barrier, cpu_relax, AtomicInt};
use crate::backoff::{wait_unlock, JoinBackoff};
use crate::word::Word;

/// The bare progressive lock state machine over a single word.
///
/// Every transition is one atomic read-modify-write of a signed delta,
/// followed by an inspection of the returned prior value. If the prior
/// value shows an incompatible holder, the claim is rolled back with the
/// inverse delta and the operation backs off before retrying. The one
/// exception is a writer waiting for readers to drain: its claim already
/// blocks further incompatible acquires, so it keeps it.
///
/// Operations never report errors. Blocking forms (`take_*`, the upgrades
/// and downgrades, `drop_*`) retry until granted or succeed
/// unconditionally; non-blocking forms (`try_*`) return `false` and leave
/// the word unchanged on net.
///
/// Release/acquire pairing: dropping any state makes the writes performed
/// under it visible to the next thread whose acquire of the same lock
/// succeeds. Two concurrent atomic (A) holders are *not* ordered against
/// each other; data mutated under A must itself use the operations of
/// [`atomic`](crate::atomic).
///
/// The two low-order bits of the word are never touched by the lock and
/// stay available to the surrounding code, e.g. for pointer tags; see
/// [`as_atomic`](Self::as_atomic).
///
/// # Examples
///
/// ```
/// use plock::raw::RawPlock32;
///
/// static LOCK: RawPlock32 = RawPlock32::new();
///
/// LOCK.take_w();
/// // exclusive section
/// LOCK.drop_w();
/// assert_eq!(LOCK.value(), 0);
/// ```
pub struct RawPlock<W: Word> {
    word: W::Atomic,
}

impl<W: Word> RawPlock<W> {
    /// Creates a new, unlocked lock.
    #[cfg(not(all(loom, test)))]
    #[must_use]
    pub const fn new() -> Self {
        Self { word: W::Atomic::ZERO }
    }

    /// Creates a new, unlocked and loom based lock (non-const).
    #[cfg(all(loom, test))]
    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn new() -> Self {
        Self { word: W::Atomic::new(W::ZERO) }
    }

    /// Returns the current raw value of the lock word.
    #[inline]
    pub fn value(&self) -> W {
        self.word.load()
    }

    /// Returns the backing atomic cell.
    ///
    /// The lock never touches the two low-order bits of the word, so the
    /// surrounding code may keep tags there, manipulated directly through
    /// the cell. Touching any other bit corrupts the lock.
    #[inline]
    pub fn as_atomic(&self) -> &W::Atomic {
        &self.word
    }

    /// Requests shared read access (R), returning `false` if a writer is
    /// present.
    pub fn try_r(&self) -> bool {
        let r = self.word.load() & W::WL_ANY;
        barrier();
        if !r.is_zero() {
            return false;
        }
        let r = self.word.fetch_add(W::RL_ONE) & W::WL_ANY;
        if !r.is_zero() {
            self.word.sub(W::RL_ONE);
            return false;
        }
        true
    }

    /// Takes shared read access (R), waiting as long as a writer is
    /// present.
    ///
    /// The writer mask is checked before claiming so that a writer waiting
    /// for the readers to drain is not disturbed by short-lived reader
    /// claims.
    pub fn take_r(&self) {
        loop {
            if !(self.word.load() & W::WL_ANY).is_zero() {
                wait_unlock(&self.word, W::WL_ANY);
            }
            if (self.word.fetch_add(W::RL_ONE) & W::WL_ANY).is_zero() {
                break;
            }
            self.word.sub(W::RL_ONE);
        }
        barrier();
    }

    /// Releases read access (R).
    pub fn drop_r(&self) {
        barrier();
        self.word.sub(W::RL_ONE);
    }

    /// Requests seek access (S), returning `false` if a writer or another
    /// seeker is present.
    pub fn try_s(&self) -> bool {
        let mask = W::WL_ANY | W::SL_ANY;
        let r = self.word.load();
        barrier();
        if !(r & mask).is_zero() {
            return false;
        }
        let set = W::SL_ONE | W::RL_ONE;
        let r = self.word.fetch_add(set) & mask;
        if !r.is_zero() {
            self.word.sub(set);
            return false;
        }
        true
    }

    /// Takes seek access (S), waiting as long as a writer or another
    /// seeker is present.
    ///
    /// The claim is staked immediately and only rolled back on failure:
    /// seekers rarely compete with writers, and an S lock used as a
    /// spinlock must be grabbed as fast as possible.
    pub fn take_s(&self) {
        let set = W::SL_ONE | W::RL_ONE;
        let mask = W::WL_ANY | W::SL_ANY;
        loop {
            if (self.word.fetch_add(set) & mask).is_zero() {
                break;
            }
            self.word.sub(set);
            wait_unlock(&self.word, mask);
        }
        barrier();
    }

    /// Releases seek access (S).
    pub fn drop_s(&self) {
        barrier();
        self.word.sub(W::SL_ONE | W::RL_ONE);
    }

    /// Downgrades seek access (S) to plain read access (R).
    pub fn stor(&self) {
        barrier();
        self.word.sub(W::SL_ONE);
    }

    /// Upgrades seek access (S) to exclusive write access (W), waiting for
    /// the other readers to leave.
    ///
    /// Holding S already excludes every other write contender, so the
    /// writer unit is added unconditionally; the wait ends when only the
    /// seeker's own reader unit remains.
    pub fn stow(&self) {
        let mut r = self.word.fetch_add(W::WL_ONE);
        while (r & W::RL_ANY) != W::RL_ONE {
            cpu_relax();
            r = self.word.load();
        }
        barrier();
    }

    /// Downgrades write access (W) back to seek access (S).
    pub fn wtos(&self) {
        barrier();
        self.word.sub(W::WL_ONE);
    }

    /// Downgrades write access (W) to plain read access (R).
    pub fn wtor(&self) {
        barrier();
        self.word.sub(W::WL_ONE | W::SL_ONE);
    }

    /// Requests exclusive write access (W), returning `false` if a writer
    /// or seeker is present. On success, waits for the readers to leave.
    ///
    /// The claim adds one unit to each of the three fields. Since the
    /// seeker field is two bits wide, the combined writer:seeker word
    /// advances by 5 per writer while its largest representable value is a
    /// multiple of 5 minus one, so the writer field can never wrap to zero
    /// while any writer is present; and even at the wrap point the reader
    /// field is nonzero, which keeps such a word distinguishable from a
    /// pure atomic (A) claim. On 32-bit words the wrap needs 13108
    /// simultaneous writers (leaving W=1, S=0, R=13108), on 64-bit words
    /// about 858 million.
    pub fn try_w(&self) -> bool {
        let set = W::WL_ONE | W::SL_ONE | W::RL_ONE;
        let mask = W::WL_ANY | W::SL_ANY;
        let r = self.word.load();
        barrier();
        if !(r & mask).is_zero() {
            return false;
        }
        let mut r = self.word.fetch_add(set);
        if !(r & mask).is_zero() {
            self.word.sub(set);
            return false;
        }
        while !(r & W::RL_ANY).is_zero() {
            cpu_relax();
            r = self.word.load().wrapping_sub(set);
        }
        true
    }

    /// Takes exclusive write access (W), waiting until granted, then waits
    /// for the readers to leave.
    ///
    /// The claim is staked immediately; only a failed claim backs off. See
    /// [`try_w`](Self::try_w) for why the claim cannot be confused with an
    /// atomic (A) claim even when the writer field wraps.
    pub fn take_w(&self) {
        let set = W::WL_ONE | W::SL_ONE | W::RL_ONE;
        let mask = W::WL_ANY | W::SL_ANY;
        let mut r;
        loop {
            r = self.word.fetch_add(set);
            if (r & mask).is_zero() {
                break;
            }
            self.word.sub(set);
            wait_unlock(&self.word, mask);
        }
        // The claim blocks new readers; wait for the present ones to leave.
        while !(r & W::RL_ANY).is_zero() {
            cpu_relax();
            r = self.word.load().wrapping_sub(set);
        }
        barrier();
    }

    /// Releases exclusive write access (W).
    pub fn drop_w(&self) {
        barrier();
        self.word.sub(W::WL_ONE | W::SL_ONE | W::RL_ONE);
    }

    /// Attempts to upgrade read access (R) to seek access (S), returning
    /// `false` if a writer or another seeker is present.
    ///
    /// On failure the caller **must drop R before retrying**: a seeker
    /// upgrading to W waits for the readers to leave, so retrying while
    /// still holding R can spin against it forever.
    pub fn try_rtos(&self) -> bool {
        let mask = W::WL_ANY | W::SL_ANY;
        let r = self.word.load();
        barrier();
        if !(r & mask).is_zero() {
            return false;
        }
        let r = self.word.fetch_add(W::SL_ONE) & mask;
        if !r.is_zero() {
            self.word.sub(W::SL_ONE);
            return false;
        }
        true
    }

    /// Attempts to upgrade read access (R) directly to exclusive write
    /// access (W), returning `false` if a writer or seeker is present. On
    /// success, waits for the other readers to leave.
    ///
    /// A failed attempt never releases the caller's R; as with
    /// [`try_rtos`](Self::try_rtos), the caller **must drop R before
    /// retrying** or the retry can deadlock against a writer waiting for
    /// the readers to drain.
    pub fn try_rtow(&self) -> bool {
        let set = W::WL_ONE | W::SL_ONE;
        let mask = W::WL_ANY | W::SL_ANY;
        barrier();
        let mut r = self.word.fetch_add(set);
        if !(r & mask).is_zero() {
            self.word.sub(set);
            return false;
        }
        // Sole write contender now; wait for the other readers to leave.
        let own = W::WL_ONE | W::SL_ONE | W::RL_ONE;
        while !(r & W::RL_ANY).is_zero() {
            cpu_relax();
            r = self.word.load().wrapping_sub(own);
        }
        true
    }

    /// Attempts to upgrade read access (R) to an atomic write claim (A),
    /// returning `false` if a seeker is present or appears while waiting.
    /// On success, waits until no plain reader remains (each has either
    /// left or upgraded).
    ///
    /// A seeker may be disguised as a writer by a wrapped writer field,
    /// but then the reader field is still nonzero, so the wait cannot end
    /// before the conflict becomes visible. The same recovery contract as
    /// [`try_rtos`](Self::try_rtos) applies: on failure, drop R before any
    /// retry.
    pub fn try_rtoa(&self) -> bool {
        let delta = W::WL_ONE.wrapping_sub(W::RL_ONE);
        let r = self.word.load() & W::SL_ANY;
        barrier();
        if !r.is_zero() {
            return false;
        }
        let mut r = self.word.fetch_add(delta);
        loop {
            if !(r & W::SL_ANY).is_zero() {
                self.word.sub(delta);
                return false;
            }
            if (r & W::RL_ANY).is_zero() {
                return true;
            }
            cpu_relax();
            r = self.word.load();
        }
    }

    /// Requests an atomic write claim (A), returning `false` if a seeker
    /// is present or appears while the readers drain.
    pub fn try_a(&self) -> bool {
        let r = self.word.load() & W::SL_ANY;
        barrier();
        if !r.is_zero() {
            return false;
        }
        let mut r = self.word.fetch_add(W::WL_ONE);
        loop {
            if !(r & W::SL_ANY).is_zero() {
                self.word.sub(W::WL_ONE);
                return false;
            }
            if (r & W::RL_ANY).is_zero() {
                return true;
            }
            cpu_relax();
            r = self.word.load();
        }
    }

    /// Takes an atomic write claim (A), waiting for the readers to drain.
    ///
    /// Other atomic claims may be held concurrently: only the writer field
    /// is used, and a seeker forces a rollback and a wait, since a seeker
    /// is on its way to exclusive access.
    pub fn take_a(&self) {
        let mut r = self.word.fetch_add(W::WL_ONE);
        while !(r & W::RL_ANY).is_zero() {
            if !(r & W::SL_ANY).is_zero() {
                self.word.sub(W::WL_ONE);
                wait_unlock(&self.word, W::SL_ANY);
                r = self.word.fetch_add(W::WL_ONE);
                continue;
            }
            cpu_relax();
            cpu_relax();
            cpu_relax();
            r = self.word.load();
        }
        barrier();
    }

    /// Releases an atomic write claim (A).
    pub fn drop_a(&self) {
        barrier();
        self.word.sub(W::WL_ONE);
    }

    /// Downgrades an atomic write claim (A) to read access (R), waiting
    /// for the writer field to drain fully, which covers the other atomic
    /// holders.
    pub fn ator(&self) {
        let delta = W::RL_ONE.wrapping_sub(W::WL_ONE);
        let mut r = self.word.fetch_add(delta).wrapping_add(delta);
        while !(r & W::WL_ANY).is_zero() {
            r = wait_unlock(&self.word, W::WL_ANY);
        }
        barrier();
    }

    /// Declares intent to write while holding read access: upgrades R to
    /// J, waiting until every other reader has either joined or left
    /// (writer count equals reader count), or until a claim point (C) has
    /// been marked by someone else.
    pub fn rtoj(&self) {
        let mut r = self.word.fetch_add(W::WL_ONE).wrapping_add(W::WL_ONE);
        let mut backoff = JoinBackoff::new();
        while (r & W::SL_ANY).is_zero() && r.writers() != r.readers() {
            backoff.pause();
            r = self.word.load();
        }
        barrier();
    }

    /// Marks the claim point: upgrades J to C by raising the seeker bit.
    ///
    /// Idempotent, so the joiners may race to it: the first one wins and
    /// the others observe the bit already set.
    pub fn jtoc(&self) {
        let r = self.word.load();
        if (r & W::SL_ANY).is_zero() {
            self.word.or(W::SL_ONE);
        }
        barrier();
    }

    /// Upgrades R straight to C: joins, and the joiner that observes the
    /// group complete marks the claim point itself.
    pub fn rtoc(&self) {
        let mut r = self.word.fetch_add(W::WL_ONE).wrapping_add(W::WL_ONE);
        let mut backoff = JoinBackoff::new();
        while (r & W::SL_ANY).is_zero() {
            if r.writers() == r.readers() {
                self.word.or(W::SL_ONE);
                break;
            }
            backoff.pause();
            r = self.word.load();
        }
        barrier();
    }

    /// Releases a claim (C): drops the reader and writer units and clears
    /// the claim point if no reader remains.
    pub fn drop_c(&self) {
        let delta = (W::RL_ONE | W::WL_ONE).wrapping_neg();
        let r = self.word.fetch_add(delta).wrapping_add(delta);
        if (r & W::RL_ANY).is_zero() {
            self.word.and(!W::SL_ONE);
        }
        barrier();
    }

    /// Upgrades a claim (C) to an atomic write claim (A): drops the reader
    /// unit, then waits for the claim point to clear, clearing it itself
    /// upon observing that no reader remains.
    pub fn ctoa(&self) {
        let mut r = self.word.fetch_sub(W::RL_ONE).wrapping_sub(W::RL_ONE);
        while !(r & W::SL_ANY).is_zero() {
            if (r & W::RL_ANY).is_zero() {
                self.word.and(!W::SL_ONE);
                break;
            }
            cpu_relax();
            cpu_relax();
            r = self.word.load();
        }
        barrier();
    }

    /// Downgrades an atomic write claim (A) to join state (J).
    pub fn atoj(&self) {
        barrier();
        self.word.add(W::RL_ONE);
    }

    /// Attempts to take an exclusive write claim through the join state
    /// (U to J): waits for the writer field to clear, claims a writer and
    /// a reader unit, then waits for the other readers to leave. Returns
    /// `false` if another writer joins meanwhile, after rolling the claim
    /// back.
    ///
    /// At most one thread can succeed; a concurrent [`take_a`] waits for
    /// it to finish first.
    ///
    /// [`take_a`]: Self::take_a
    pub fn try_j(&self) -> bool {
        let set = W::WL_ONE | W::RL_ONE;
        wait_unlock(&self.word, W::WL_ANY);
        let mut r = self.word.fetch_add(set).wrapping_add(set);
        let mut backoff = JoinBackoff::new();
        while !(r & W::RL_MANY).is_zero() {
            if !(r & W::WL_MANY).is_zero() {
                self.word.sub(set);
                return false;
            }
            backoff.pause();
            r = self.word.load();
        }
        barrier();
        true
    }

    /// Takes an exclusive write claim through the join state (U to J),
    /// retrying from the start whenever another writer joins meanwhile.
    /// See [`try_j`](Self::try_j).
    pub fn take_j(&self) {
        let set = W::WL_ONE | W::RL_ONE;
        'retry: loop {
            wait_unlock(&self.word, W::WL_ANY);
            let mut r = self.word.fetch_add(set).wrapping_add(set);
            let mut backoff = JoinBackoff::new();
            while !(r & W::RL_MANY).is_zero() {
                if !(r & W::WL_MANY).is_zero() {
                    self.word.sub(set);
                    continue 'retry;
                }
                backoff.pause();
                r = self.word.load();
            }
            break;
        }
        barrier();
    }

    /// Releases a join claim (J).
    pub fn drop_j(&self) {
        barrier();
        self.word.sub(W::WL_ONE | W::RL_ONE);
    }

    /// Whether the calling thread is the only writer left.
    ///
    /// Meant to be called while holding J, C or A, before the matching
    /// drop, to run once-only epilogues.
    pub fn last_writer(&self) -> bool {
        (self.word.load() & W::WL_MANY).is_zero()
    }
}

#[cfg(not(tarpaulin_include))]
impl<W: Word> Default for RawPlock<W> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Word> Debug for RawPlock<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let v = self.value();
        f.debug_struct("RawPlock")
            .field("readers", &v.readers())
            .field("seekers", &v.seekers())
            .field("writers", &v.writers())
            .finish()
    }
}

#[cfg(all(loom, test))]
mod model {
    use loom::sync::atomic::{AtomicUsize, Ordering::SeqCst};
    use loom::sync::Arc;
    use loom::{model, thread};

    use super::RawPlock;

    #[test]
    fn atomic_claims_coexist() {
        model(|| {
            let lock = Arc::new(RawPlock::<u64>::new());
            let count = Arc::new(AtomicUsize::new(0));
            let handles = [(); 2].map(|()| {
                let lock = Arc::clone(&lock);
                let count = Arc::clone(&count);
                thread::spawn(move || {
                    lock.take_a();
                    count.fetch_add(1, SeqCst);
                    lock.drop_a();
                })
            });
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(count.load(SeqCst), 2);
            assert_eq!(lock.value(), 0);
        });
    }

    #[test]
    fn seeker_is_unique() {
        model(|| {
            let lock = Arc::new(RawPlock::<u64>::new());
            let seekers = Arc::new(AtomicUsize::new(0));
            let handles = [(); 2].map(|()| {
                let lock = Arc::clone(&lock);
                let seekers = Arc::clone(&seekers);
                thread::spawn(move || {
                    if lock.try_s() {
                        assert_eq!(seekers.fetch_add(1, SeqCst), 0);
                        seekers.fetch_sub(1, SeqCst);
                        lock.drop_s();
                    }
                })
            });
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(lock.value(), 0);
        });
    }
}

#[cfg(all(not(loom), test))]
mod test {
    use super::RawPlock;
    use crate::atomic::{AtomicInt, Int};
    use crate::word::Word;

    fn elementary_pairs<W: Word>() {
        let lock = RawPlock::<W>::new();

        lock.take_r();
        assert_eq!(lock.value(), W::RL_ONE);
        lock.drop_r();
        assert!(lock.value().is_zero());

        lock.take_s();
        assert_eq!(lock.value(), W::SL_ONE | W::RL_ONE);
        lock.drop_s();
        assert!(lock.value().is_zero());

        lock.take_w();
        assert_eq!(lock.value(), W::WL_ONE | W::SL_ONE | W::RL_ONE);
        lock.drop_w();
        assert!(lock.value().is_zero());

        lock.take_a();
        assert_eq!(lock.value(), W::WL_ONE);
        lock.drop_a();
        assert!(lock.value().is_zero());

        lock.take_j();
        assert_eq!(lock.value(), W::WL_ONE | W::RL_ONE);
        assert!(lock.last_writer());
        lock.drop_j();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn elementary_acquire_release_restores_the_word() {
        elementary_pairs::<u32>();
        elementary_pairs::<u64>();
    }

    fn upgrade_paths<W: Word>() {
        let lock = RawPlock::<W>::new();

        lock.take_s();
        lock.stow();
        assert_eq!(lock.value(), W::WL_ONE | W::SL_ONE | W::RL_ONE);
        lock.wtos();
        assert_eq!(lock.value(), W::SL_ONE | W::RL_ONE);
        lock.drop_s();
        assert!(lock.value().is_zero());

        lock.take_s();
        lock.stor();
        assert_eq!(lock.value(), W::RL_ONE);
        lock.drop_r();

        lock.take_w();
        lock.wtor();
        assert_eq!(lock.value(), W::RL_ONE);
        lock.drop_r();

        lock.take_r();
        assert!(lock.try_rtos());
        lock.stow();
        lock.drop_w();
        assert!(lock.value().is_zero());

        lock.take_r();
        assert!(lock.try_rtow());
        assert_eq!(lock.value(), W::WL_ONE | W::SL_ONE | W::RL_ONE);
        lock.drop_w();

        lock.take_r();
        assert!(lock.try_rtoa());
        assert_eq!(lock.value(), W::WL_ONE);
        lock.ator();
        assert_eq!(lock.value(), W::RL_ONE);
        lock.drop_r();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn upgrades_and_downgrades_restore_the_word() {
        upgrade_paths::<u32>();
        upgrade_paths::<u64>();
    }

    fn join_pipeline<W: Word>() {
        let lock = RawPlock::<W>::new();

        // A single thread forms a complete group by itself.
        lock.take_r();
        lock.rtoj();
        assert_eq!(lock.value(), W::WL_ONE | W::RL_ONE);
        lock.jtoc();
        assert_eq!(lock.value(), W::WL_ONE | W::SL_ONE | W::RL_ONE);
        // Racing joiners may all call it; only the first one changes it.
        lock.jtoc();
        assert_eq!(lock.value(), W::WL_ONE | W::SL_ONE | W::RL_ONE);
        lock.drop_c();
        assert!(lock.value().is_zero());

        lock.take_r();
        lock.rtoc();
        lock.ctoa();
        assert_eq!(lock.value(), W::WL_ONE);
        assert!(lock.last_writer());
        lock.atoj();
        assert_eq!(lock.value(), W::WL_ONE | W::RL_ONE);
        lock.drop_j();
        assert!(lock.value().is_zero());

        assert!(lock.try_j());
        lock.drop_j();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn join_claim_pipeline_restores_the_word() {
        join_pipeline::<u32>();
        join_pipeline::<u64>();
    }

    fn writer_blocks_everyone<W: Word>() {
        let lock = RawPlock::<W>::new();
        lock.take_w();
        let held = lock.value();

        assert!(!lock.try_r());
        assert!(!lock.try_s());
        assert!(!lock.try_w());
        assert!(!lock.try_a());
        assert_eq!(lock.value(), held);

        lock.drop_w();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn exclusive_writer_rejects_all_newcomers() {
        writer_blocks_everyone::<u32>();
        writer_blocks_everyone::<u64>();
    }

    fn seeker_compatibility<W: Word>() {
        let lock = RawPlock::<W>::new();
        lock.take_s();

        // Readers may still come and go under a seeker.
        assert!(lock.try_r());
        lock.drop_r();

        // But no second seeker, writer or atomic claim.
        assert!(!lock.try_s());
        assert!(!lock.try_w());
        assert!(!lock.try_a());
        assert_eq!(lock.value(), W::SL_ONE | W::RL_ONE);

        lock.drop_s();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn seeker_admits_readers_only() {
        seeker_compatibility::<u32>();
        seeker_compatibility::<u64>();
    }

    fn atomic_claims_stack<W: Word>() {
        let lock = RawPlock::<W>::new();
        lock.take_a();
        assert!(lock.try_a());
        assert!(!lock.last_writer());
        assert!(!lock.try_r());
        assert!(!lock.try_s());
        lock.drop_a();
        assert!(lock.last_writer());
        lock.drop_a();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn atomic_holders_coexist_and_exclude_readers() {
        atomic_claims_stack::<u32>();
        atomic_claims_stack::<u64>();
    }

    fn failed_upgrade_is_clean<W: Word>() {
        let lock = RawPlock::<W>::new();

        // A seeker is already in place...
        lock.take_s();
        let held = lock.value();

        // ...so a reader cannot become one, and its failed attempts leave
        // no trace once it backs out.
        lock.take_r();
        assert!(!lock.try_rtos());
        assert!(!lock.try_rtow());
        assert!(!lock.try_rtoa());
        lock.drop_r();
        assert_eq!(lock.value(), held);

        lock.drop_s();
        assert!(lock.value().is_zero());
    }

    #[test]
    fn failed_upgrades_leave_the_word_unchanged() {
        failed_upgrade_is_clean::<u32>();
        failed_upgrade_is_clean::<u64>();
    }

    #[test]
    fn stacked_writer_claims_never_clear_the_writer_field() {
        // 13108 simultaneous write claims wrap the combined writer:seeker
        // field of a 32-bit word to W=1, S=0 while R holds the full count,
        // so the word still reads as write-locked, not as atomic-only.
        let lock = RawPlock::<u32>::new();
        let set = u32::WL_ONE | u32::SL_ONE | u32::RL_ONE;
        for _ in 0..13_108 {
            AtomicInt::fetch_add(lock.as_atomic(), set);
        }
        let v = lock.value();
        assert!(!(v & u32::WL_ANY).is_zero());
        assert!((v & u32::SL_ANY).is_zero());
        assert_eq!(v.writers(), 1);
        assert_eq!(v.readers(), 13_108);

        for _ in 0..13_108 {
            AtomicInt::fetch_sub(lock.as_atomic(), set);
        }
        assert!(lock.value().is_zero());
    }

    #[test]
    fn reserved_bits_survive_lock_traffic() {
        let lock = RawPlock::<u64>::new();
        lock.as_atomic().or(0b11);

        lock.take_w();
        lock.drop_w();
        lock.take_s();
        lock.stow();
        lock.wtor();
        lock.drop_r();
        lock.take_a();
        lock.drop_a();
        lock.take_r();
        lock.rtoc();
        lock.ctoa();
        lock.drop_a();

        assert_eq!(lock.value(), 0b11);
        lock.as_atomic().and(!0b11);
        assert_eq!(lock.value(), 0);
    }

    #[test]
    fn debug_shows_field_counts() {
        let lock = RawPlock::<u32>::new();
        lock.take_w();
        let s = std::format!("{lock:?}");
        assert!(s.contains("readers: 1"));
        assert!(s.contains("seekers: 1"));
        assert!(s.contains("writers: 1"));
        lock.drop_w();
    }
}
