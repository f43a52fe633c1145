//! A progressive lock that owns the data it protects.
//!
//! [`Plock`] pairs a [`RawPlock`] with the protected value and hands out
//! RAII guards, one type per lock state. Transitions between states consume
//! the guard and return the guard of the target state, so the compiler
//! tracks which accesses are legal:
//!
//! | guard | state | data access |
//! |---|---|---|
//! | [`ReadGuard`] | R | shared |
//! | [`SeekGuard`] | S | shared, while planning a write |
//! | [`WriteGuard`] | W | exclusive |
//! | [`AtomicGuard`] | A | shared; mutations must go through atomics |
//! | [`JoinGuard`] | J | none, pure synchronization point |
//! | [`ClaimGuard`] | C | shared; claim marks through atomics |
//!
//! Fallible upgrades return the original guard in the `Err` variant. This
//! is deliberate: a failed upgrade must not release the read side behind
//! the caller's back, and the caller must drop it before retrying (see
//! [`ReadGuard::try_seek`]).
//!
//! The lock is unfair and never blocks in the OS; see the
//! [crate documentation](crate) for when that is and is not a good idea.

use core::fmt::{self, Debug, Display, Formatter};
use core::mem;
use core::ops::{Deref, DerefMut};

use crate::cfg::cell::UnsafeCell;
use crate::raw::RawPlock;
use crate::word::Word;

/// A progressive reader/writer lock protecting a value of type `T`.
///
/// The second type parameter selects the lock word width and defaults to
/// `u64`; `u32` halves the footprint at the cost of a far lower bound on
/// simultaneous writers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use plock::Plock;
///
/// let lock: Arc<Plock<i32>> = Arc::new(Plock::new(0));
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let lock = Arc::clone(&lock);
///         thread::spawn(move || *lock.write() += 1)
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(*lock.read(), 4);
/// ```
///
/// The seek state makes the lookup-then-insert pattern cheap: the
/// structure walk runs concurrently with the readers and only the final
/// mutation is exclusive.
///
/// ```
/// use plock::Plock;
///
/// let cache: Plock<Vec<(u32, u32)>> = Plock::new(Vec::new());
///
/// let probe = cache.read();
/// if probe.iter().all(|&(k, _)| k != 7) {
///     drop(probe);
///     // Plan the insertion while readers keep running.
///     let seek = cache.seek();
///     let position = seek.partition_point(|&(k, _)| k < 7);
///     // Serialize only the splice itself.
///     let mut write = seek.upgrade();
///     write.insert(position, (7, 49));
/// }
/// assert_eq!(*cache.read(), [(7, 49)]);
/// ```
pub struct Plock<T: ?Sized, W: Word = u64> {
    raw: RawPlock<W>,
    data: UnsafeCell<T>,
}

// Same unsafe impls as `std::sync::RwLock`.
unsafe impl<T: ?Sized + Send, W: Word> Send for Plock<T, W> {}
unsafe impl<T: ?Sized + Send + Sync, W: Word> Sync for Plock<T, W> {}

impl<T, W: Word> Plock<T, W> {
    /// Creates a new, unlocked lock holding `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use plock::Plock;
    ///
    /// static COUNTER: Plock<u64> = Plock::new(0);
    /// ```
    #[cfg(not(all(loom, test)))]
    pub const fn new(value: T) -> Self {
        Self { raw: RawPlock::new(), data: UnsafeCell::new(value) }
    }

    /// Creates a new, unlocked and loom based lock (non-const).
    #[cfg(all(loom, test))]
    #[cfg(not(tarpaulin_include))]
    pub fn new(value: T) -> Self {
        Self { raw: RawPlock::new(), data: UnsafeCell::new(value) }
    }
}

impl<T: ?Sized, W: Word> Plock<T, W> {
    /// Takes shared read access, waiting while a writer is present.
    #[inline]
    pub fn read(&self) -> ReadGuard<'_, T, W> {
        self.raw.take_r();
        ReadGuard { lock: self }
    }

    /// Requests shared read access, returning `None` if a writer is
    /// present.
    #[inline]
    pub fn try_read(&self) -> Option<ReadGuard<'_, T, W>> {
        self.raw.try_r().then(|| ReadGuard { lock: self })
    }

    /// Takes seek access: shared reading plus the exclusive right to later
    /// upgrade to a writer without competing with other seekers.
    #[inline]
    pub fn seek(&self) -> SeekGuard<'_, T, W> {
        self.raw.take_s();
        SeekGuard { lock: self }
    }

    /// Requests seek access, returning `None` if a writer or another
    /// seeker is present.
    #[inline]
    pub fn try_seek(&self) -> Option<SeekGuard<'_, T, W>> {
        self.raw.try_s().then(|| SeekGuard { lock: self })
    }

    /// Takes exclusive write access, waiting until every other holder has
    /// left.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_, T, W> {
        self.raw.take_w();
        WriteGuard { lock: self }
    }

    /// Requests exclusive write access, returning `None` if a writer or
    /// seeker is present.
    #[inline]
    pub fn try_write(&self) -> Option<WriteGuard<'_, T, W>> {
        self.raw.try_w().then(|| WriteGuard { lock: self })
    }

    /// Takes an atomic write claim, waiting for the plain readers to
    /// drain. Several atomic claims may run in parallel; see
    /// [`AtomicGuard`].
    #[inline]
    pub fn atomic(&self) -> AtomicGuard<'_, T, W> {
        self.raw.take_a();
        AtomicGuard { lock: self }
    }

    /// Requests an atomic write claim, returning `None` if a seeker is
    /// present or appears while the readers drain.
    #[inline]
    pub fn try_atomic(&self) -> Option<AtomicGuard<'_, T, W>> {
        self.raw.try_a().then(|| AtomicGuard { lock: self })
    }

    /// Takes a solitary join claim, waiting for all writers and then all
    /// readers to leave. Offers exclusive access within the join/claim
    /// protocol: a concurrent [`atomic`](Self::atomic) waits for it.
    #[inline]
    pub fn join(&self) -> JoinGuard<'_, T, W> {
        self.raw.take_j();
        JoinGuard { lock: self }
    }

    /// Requests a solitary join claim, returning `None` if another writer
    /// joins meanwhile.
    #[inline]
    pub fn try_join(&self) -> Option<JoinGuard<'_, T, W>> {
        self.raw.try_j().then(|| JoinGuard { lock: self })
    }

    /// Acquires read access and runs the closure against its guard.
    #[inline]
    pub fn read_with<F, Ret>(&self, f: F) -> Ret
    where
        F: FnOnce(ReadGuard<'_, T, W>) -> Ret,
    {
        f(self.read())
    }

    /// Acquires write access and runs the closure against its guard.
    #[inline]
    pub fn write_with<F, Ret>(&self, f: F) -> Ret
    where
        F: FnOnce(WriteGuard<'_, T, W>) -> Ret,
    {
        f(self.write())
    }

    /// Returns a mutable reference to the underlying data.
    ///
    /// Since this call borrows the lock mutably, no actual locking needs
    /// to take place - the mutable borrow statically guarantees no guards
    /// exist.
    #[cfg(not(all(loom, test)))]
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: We hold exclusive access to the data.
        unsafe { &mut *self.data.get() }
    }
}

impl<T: Default, W: Word> Default for Plock<T, W> {
    /// Creates a `Plock<T, W>` with the `Default` value for `T`.
    #[inline]
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl<T, W: Word> From<T> for Plock<T, W> {
    /// Creates a `Plock<T, W>` from an instance of `T`.
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(not(all(loom, test)))]
impl<T: ?Sized + Debug, W: Word> Debug for Plock<T, W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Plock");
        match self.try_read() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish()
    }
}

/// Shared read access (R). Any number may coexist, also with one seeker.
///
/// Returned by [`Plock::read`] and by the downgrades; the upgrades consume
/// it. When the guard is dropped the read side is released.
#[must_use = "if unused the read access is immediately released"]
pub struct ReadGuard<'a, T: ?Sized, W: Word = u64> {
    lock: &'a Plock<T, W>,
}

/// Seek access (S): shared reading plus the unique right to upgrade.
///
/// At most one seeker exists per lock; plain readers keep flowing around
/// it. The typical use is walking a structure to the modification site and
/// only then calling [`upgrade`](Self::upgrade).
#[must_use = "if unused the seek access is immediately released"]
pub struct SeekGuard<'a, T: ?Sized, W: Word = u64> {
    lock: &'a Plock<T, W>,
}

/// Exclusive write access (W).
#[must_use = "if unused the write access is immediately released"]
pub struct WriteGuard<'a, T: ?Sized, W: Word = u64> {
    lock: &'a Plock<T, W>,
}

/// An atomic write claim (A).
///
/// Several atomic claims may be held at once and they are not ordered
/// against each other: the guard only hands out a shared reference, and
/// every mutation of the protected data must go through the data's own
/// atomics (see the [`atomic`](crate::atomic) module).
#[must_use = "if unused the atomic claim is immediately released"]
pub struct AtomicGuard<'a, T: ?Sized, W: Word = u64> {
    lock: &'a Plock<T, W>,
}

/// A join claim (J): a declared intent to write, before the group's claim
/// point. Grants no data access.
#[must_use = "if unused the join claim is immediately released"]
pub struct JoinGuard<'a, T: ?Sized, W: Word = u64> {
    lock: &'a Plock<T, W>,
}

/// A claim (C): the synchronization point is marked and per-item claims
/// may be staked through the data's own atomics.
#[must_use = "if unused the claim is immediately released"]
pub struct ClaimGuard<'a, T: ?Sized, W: Word = u64> {
    lock: &'a Plock<T, W>,
}

// Read-side guards hand out shared references only, so sending them to
// another thread is fine whenever the data can be shared across threads.
// `std` keeps its guards !Send for pthread compatibility; nothing here is
// thread-affine.
unsafe impl<T: ?Sized + Sync, W: Word> Send for ReadGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Sync for ReadGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Send for SeekGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Sync for SeekGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Send for AtomicGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Sync for AtomicGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Send for ClaimGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Sync for ClaimGuard<'_, T, W> {}
// Same unsafe impls as `std::sync::RwLockWriteGuard` would permit.
unsafe impl<T: ?Sized + Send, W: Word> Send for WriteGuard<'_, T, W> {}
unsafe impl<T: ?Sized + Sync, W: Word> Sync for WriteGuard<'_, T, W> {}

impl<'a, T: ?Sized, W: Word> ReadGuard<'a, T, W> {
    /// Consumes the guard without releasing the read side.
    #[inline]
    fn into_lock(self) -> &'a Plock<T, W> {
        let lock = self.lock;
        mem::forget(self);
        lock
    }

    /// Attempts to become the seeker while keeping read access.
    ///
    /// Fails if a writer or another seeker is present and hands the read
    /// guard back. **Drop it before retrying**: a seeker upgrading to a
    /// writer waits for the readers to leave, so a retry loop that keeps
    /// the read side held can spin against it forever.
    ///
    /// # Examples
    ///
    /// ```
    /// use plock::Plock;
    ///
    /// let lock: Plock<i32> = Plock::new(1);
    /// loop {
    ///     match lock.read().try_seek() {
    ///         Ok(seek) => {
    ///             *seek.upgrade() = 2;
    ///             break;
    ///         }
    ///         // Releases the read side before the next attempt.
    ///         Err(read) => drop(read),
    ///     }
    /// }
    /// assert_eq!(*lock.read(), 2);
    /// ```
    #[inline]
    pub fn try_seek(self) -> Result<SeekGuard<'a, T, W>, Self> {
        if self.lock.raw.try_rtos() {
            Ok(SeekGuard { lock: self.into_lock() })
        } else {
            Err(self)
        }
    }

    /// Attempts to upgrade straight to exclusive write access.
    ///
    /// Fails if a writer or seeker is present, handing the read guard
    /// back; the same drop-before-retry rule as [`try_seek`] applies. On
    /// success the other readers have drained by the time the write guard
    /// is returned.
    ///
    /// [`try_seek`]: Self::try_seek
    #[inline]
    pub fn try_write(self) -> Result<WriteGuard<'a, T, W>, Self> {
        if self.lock.raw.try_rtow() {
            Ok(WriteGuard { lock: self.into_lock() })
        } else {
            Err(self)
        }
    }

    /// Attempts to convert read access into an atomic write claim.
    ///
    /// Fails if a seeker is present or appears while the remaining readers
    /// drain, handing the read guard back; the same drop-before-retry rule
    /// as [`try_seek`] applies.
    ///
    /// [`try_seek`]: Self::try_seek
    #[inline]
    pub fn try_atomic(self) -> Result<AtomicGuard<'a, T, W>, Self> {
        if self.lock.raw.try_rtoa() {
            Ok(AtomicGuard { lock: self.into_lock() })
        } else {
            Err(self)
        }
    }

    /// Declares intent to write, waiting until every other reader has
    /// joined or left.
    #[inline]
    pub fn join(self) -> JoinGuard<'a, T, W> {
        self.lock.raw.rtoj();
        JoinGuard { lock: self.into_lock() }
    }

    /// Joins and proceeds to the claim point in one step; the joiner that
    /// completes the group marks the point itself.
    #[inline]
    pub fn claim(self) -> ClaimGuard<'a, T, W> {
        self.lock.raw.rtoc();
        ClaimGuard { lock: self.into_lock() }
    }
}

impl<'a, T: ?Sized, W: Word> SeekGuard<'a, T, W> {
    #[inline]
    fn into_lock(self) -> &'a Plock<T, W> {
        let lock = self.lock;
        mem::forget(self);
        lock
    }

    /// Upgrades to exclusive write access, waiting for the other readers
    /// to leave. Cannot fail: the seeker is alone among write contenders.
    #[inline]
    pub fn upgrade(self) -> WriteGuard<'a, T, W> {
        self.lock.raw.stow();
        WriteGuard { lock: self.into_lock() }
    }

    /// Steps back to plain read access, letting another seeker in.
    #[inline]
    pub fn downgrade(self) -> ReadGuard<'a, T, W> {
        self.lock.raw.stor();
        ReadGuard { lock: self.into_lock() }
    }
}

impl<'a, T: ?Sized, W: Word> WriteGuard<'a, T, W> {
    #[inline]
    fn into_lock(self) -> &'a Plock<T, W> {
        let lock = self.lock;
        mem::forget(self);
        lock
    }

    /// Downgrades to plain read access, releasing both the writer and the
    /// seeker claim.
    #[inline]
    pub fn downgrade(self) -> ReadGuard<'a, T, W> {
        self.lock.raw.wtor();
        ReadGuard { lock: self.into_lock() }
    }

    /// Downgrades to seek access, keeping the right to upgrade again
    /// without competition.
    #[inline]
    pub fn downgrade_to_seek(self) -> SeekGuard<'a, T, W> {
        self.lock.raw.wtos();
        SeekGuard { lock: self.into_lock() }
    }
}

impl<'a, T: ?Sized, W: Word> AtomicGuard<'a, T, W> {
    #[inline]
    fn into_lock(self) -> &'a Plock<T, W> {
        let lock = self.lock;
        mem::forget(self);
        lock
    }

    /// Downgrades to plain read access, waiting for the other atomic
    /// claims to finish.
    #[inline]
    pub fn downgrade(self) -> ReadGuard<'a, T, W> {
        self.lock.raw.ator();
        ReadGuard { lock: self.into_lock() }
    }

    /// Steps back to the join state of the multi-writer pipeline.
    #[inline]
    pub fn join(self) -> JoinGuard<'a, T, W> {
        self.lock.raw.atoj();
        JoinGuard { lock: self.into_lock() }
    }

    /// Whether the calling thread holds the only remaining write claim.
    #[inline]
    pub fn last_writer(&self) -> bool {
        self.lock.raw.last_writer()
    }
}

impl<'a, T: ?Sized, W: Word> JoinGuard<'a, T, W> {
    #[inline]
    fn into_lock(self) -> &'a Plock<T, W> {
        let lock = self.lock;
        mem::forget(self);
        lock
    }

    /// Marks the claim point (idempotent across the group's joiners).
    #[inline]
    pub fn claim(self) -> ClaimGuard<'a, T, W> {
        self.lock.raw.jtoc();
        ClaimGuard { lock: self.into_lock() }
    }

    /// Whether the calling thread holds the only remaining write claim.
    #[inline]
    pub fn last_writer(&self) -> bool {
        self.lock.raw.last_writer()
    }
}

impl<'a, T: ?Sized, W: Word> ClaimGuard<'a, T, W> {
    #[inline]
    fn into_lock(self) -> &'a Plock<T, W> {
        let lock = self.lock;
        mem::forget(self);
        lock
    }

    /// Enters atomic write mode once the whole group has claimed.
    #[inline]
    pub fn atomic(self) -> AtomicGuard<'a, T, W> {
        self.lock.raw.ctoa();
        AtomicGuard { lock: self.into_lock() }
    }

    /// Whether the calling thread holds the only remaining write claim.
    #[inline]
    pub fn last_writer(&self) -> bool {
        self.lock.raw.last_writer()
    }
}

impl<T: ?Sized, W: Word> Drop for ReadGuard<'_, T, W> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.drop_r();
    }
}

impl<T: ?Sized, W: Word> Drop for SeekGuard<'_, T, W> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.drop_s();
    }
}

impl<T: ?Sized, W: Word> Drop for WriteGuard<'_, T, W> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.drop_w();
    }
}

impl<T: ?Sized, W: Word> Drop for AtomicGuard<'_, T, W> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.drop_a();
    }
}

impl<T: ?Sized, W: Word> Drop for JoinGuard<'_, T, W> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.drop_j();
    }
}

impl<T: ?Sized, W: Word> Drop for ClaimGuard<'_, T, W> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.drop_c();
    }
}

macro_rules! shared_deref {
    ($($guard:ident),* $(,)?) => {$(
        #[cfg(not(all(loom, test)))]
        impl<T: ?Sized, W: Word> Deref for $guard<'_, T, W> {
            type Target = T;

            /// Dereferences the guard to access the underlying data.
            #[inline(always)]
            fn deref(&self) -> &T {
                // SAFETY: A guard instance holds its state acquired, which
                // excludes every exclusive writer.
                unsafe { &*self.lock.data.get() }
            }
        }

        #[cfg(not(all(loom, test)))]
        impl<T: ?Sized + Debug, W: Word> Debug for $guard<'_, T, W> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                (**self).fmt(f)
            }
        }

        #[cfg(not(all(loom, test)))]
        impl<T: ?Sized + Display, W: Word> Display for $guard<'_, T, W> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                (**self).fmt(f)
            }
        }
    )*};
}

shared_deref!(ReadGuard, SeekGuard, WriteGuard, AtomicGuard, ClaimGuard);

#[cfg(not(all(loom, test)))]
impl<T: ?Sized, W: Word> DerefMut for WriteGuard<'_, T, W> {
    /// Mutably dereferences the guard to access the underlying data.
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: A write guard holds the lock exclusively.
        unsafe { &mut *self.lock.data.get() }
    }
}

/// SAFETY: These guards exclude every exclusive writer for their whole
/// lifetime, so shared access to the underlying data is sound.
#[cfg(all(loom, test))]
#[cfg(not(tarpaulin_include))]
mod loom_guards {
    use super::{AtomicGuard, ClaimGuard, ReadGuard, SeekGuard, WriteGuard};
    use crate::loom::{Exclusive, Shared};
    use crate::word::Word;
    use loom::cell::UnsafeCell;

    macro_rules! shared {
        ($($guard:ident),* $(,)?) => {$(
            unsafe impl<T: ?Sized, W: Word> Shared for $guard<'_, T, W> {
                type Target = T;

                fn cell(&self) -> &UnsafeCell<Self::Target> {
                    &self.lock.data
                }
            }
        )*};
    }

    shared!(ReadGuard, SeekGuard, WriteGuard, AtomicGuard, ClaimGuard);

    // SAFETY: A write guard holds the lock exclusively.
    unsafe impl<T: ?Sized, W: Word> Exclusive for WriteGuard<'_, T, W> {}
}

#[cfg(all(loom, test))]
mod model {
    use crate::loom::models;

    #[test]
    fn writers_serialize() {
        models::writers_serialize::<u64>();
    }

    #[test]
    fn reader_excludes_writer() {
        models::reader_excludes_writer::<u64>();
    }

    #[test]
    fn seeker_serializes_with_writer() {
        models::seeker_serializes_with_writer::<u64>();
    }
}

#[cfg(all(not(loom), test))]
mod test {
    use crate::test::tests;

    #[test]
    fn writers_serialize() {
        tests::writers_serialize::<u32>();
        tests::writers_serialize::<u64>();
    }

    #[test]
    fn readers_coexist() {
        tests::readers_coexist::<u32>();
        tests::readers_coexist::<u64>();
    }

    #[test]
    fn writer_blocks_readers() {
        tests::writer_blocks_readers::<u32>();
        tests::writer_blocks_readers::<u64>();
    }

    #[test]
    fn seeker_is_unique() {
        tests::seeker_is_unique::<u32>();
        tests::seeker_is_unique::<u64>();
    }

    #[test]
    fn seek_walk_upgrade_mutate() {
        tests::seek_walk_upgrade_mutate::<u32>();
        tests::seek_walk_upgrade_mutate::<u64>();
    }

    #[test]
    fn atomic_claims_run_in_parallel() {
        tests::atomic_claims_run_in_parallel::<u32>();
        tests::atomic_claims_run_in_parallel::<u64>();
    }

    #[test]
    fn join_group_enters_atomic_mode_together() {
        tests::join_group_enters_atomic_mode_together::<u32>();
        tests::join_group_enters_atomic_mode_together::<u64>();
    }

    #[test]
    fn joiners_claim_and_enter_atomic_mode() {
        tests::joiners_claim_and_enter_atomic_mode::<u32>();
        tests::joiners_claim_and_enter_atomic_mode::<u64>();
    }

    #[test]
    fn guard_debug_display() {
        let lock = crate::Plock::<_, u32>::new(42);
        let guard = lock.read();
        assert_eq!(std::format!("{guard:?}"), "42");
        assert_eq!(std::format!("{guard}"), "42");
        drop(guard);
        assert_eq!(std::format!("{lock:?}"), "Plock { data: 42 }");
        let _w = lock.write();
        assert_eq!(std::format!("{lock:?}"), "Plock { data: <locked> }");
    }

    #[test]
    fn get_mut_and_conversions() {
        let mut lock = crate::Plock::<u32>::from(10);
        *lock.get_mut() = 20;
        assert_eq!(*lock.read(), 20);

        let lock: crate::Plock<u32> = Default::default();
        assert_eq!(lock.read_with(|g| *g), 0);
        lock.write_with(|mut g| *g = 3);
        assert_eq!(*lock.read(), 3);
    }

    #[test]
    fn try_forms_fail_under_writer() {
        let lock = crate::Plock::<_, u64>::new(0);
        let write = lock.write();
        assert!(lock.try_read().is_none());
        assert!(lock.try_seek().is_none());
        assert!(lock.try_write().is_none());
        assert!(lock.try_atomic().is_none());
        drop(write);
        assert!(lock.try_read().is_some());
    }

    #[test]
    fn downgrade_chain_keeps_data_accessible() {
        let lock = crate::Plock::<_, u32>::new(1);
        let mut write = lock.write();
        *write = 2;
        let seek = write.downgrade_to_seek();
        assert_eq!(*seek, 2);
        let mut write = seek.upgrade();
        *write = 3;
        let read = write.downgrade();
        assert_eq!(*read, 3);
        drop(read);

        let atomic = lock.atomic();
        assert!(atomic.last_writer());
        let read = atomic.downgrade();
        assert_eq!(*read, 3);
    }
}
