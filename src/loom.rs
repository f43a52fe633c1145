use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use loom::cell::{ConstPtr, MutPtr, UnsafeCell};

/// A trait for guard types that hold at least shared access to the
/// underlying data behind Loom's [`UnsafeCell`].
///
/// # Safety
///
/// Must guarantee that an instance of the guard excludes every exclusive
/// writer through all its lifetime.
pub(crate) unsafe trait Shared: Sized {
    /// The target type after dereferencing [`SharedRef`].
    type Target: ?Sized;

    /// Returns a shared reference to the underlying [`UnsafeCell`].
    fn cell(&self) -> &UnsafeCell<Self::Target>;

    /// Get a Loom immutable pointer bounded by this guard lifetime.
    fn get(&self) -> SharedRef<'_, Self> {
        SharedRef::new(self)
    }
}

/// A trait for guard types that hold exclusive access to the underlying
/// data behind Loom's [`UnsafeCell`].
///
/// # Safety
///
/// Must guarantee that an instance of the guard holds exclusive access to
/// its underlying data through all its lifetime.
pub(crate) unsafe trait Exclusive: Shared {
    /// Get a Loom mutable pointer bounded by this guard lifetime.
    fn get_mut(&self) -> ExclusiveRef<'_, Self> {
        ExclusiveRef::new(self)
    }
}

/// A Loom immutable pointer borrowed from a guard instance.
pub(crate) struct SharedRef<'a, G: Shared> {
    ptr: ConstPtr<G::Target>,
    marker: PhantomData<(&'a G::Target, &'a G)>,
}

impl<G: Shared> SharedRef<'_, G> {
    fn new(guard: &G) -> Self {
        let ptr = guard.cell().get();
        Self { ptr, marker: PhantomData }
    }
}

impl<G: Shared> Deref for SharedRef<'_, G> {
    type Target = G::Target;

    fn deref(&self) -> &Self::Target {
        // SAFETY: Our lifetime is bounded by the guard borrow.
        unsafe { self.ptr.deref() }
    }
}

/// A Loom mutable pointer borrowed from a guard instance.
pub(crate) struct ExclusiveRef<'a, G: Exclusive> {
    ptr: MutPtr<G::Target>,
    marker: PhantomData<(&'a G::Target, &'a G)>,
}

impl<G: Exclusive> ExclusiveRef<'_, G> {
    fn new(guard: &G) -> Self {
        let ptr = guard.cell().get_mut();
        Self { ptr, marker: PhantomData }
    }
}

impl<G: Exclusive> Deref for ExclusiveRef<'_, G> {
    type Target = G::Target;

    fn deref(&self) -> &Self::Target {
        // SAFETY: Our lifetime is bounded by the guard borrow.
        unsafe { self.ptr.deref() }
    }
}

impl<G: Exclusive> DerefMut for ExclusiveRef<'_, G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: Our lifetime is bounded by the guard borrow.
        unsafe { self.ptr.deref() }
    }
}

pub(crate) mod models {
    use loom::sync::Arc;
    use loom::{model, thread};

    use crate::loom::{Exclusive, Shared};
    use crate::word::Word;
    use crate::Plock;

    /// Concurrent write acquisitions serialize all mutations against the
    /// shared data, therefore no data races.
    pub(crate) fn writers_serialize<W: Word>() {
        model(|| {
            let lock = Arc::new(Plock::<usize, W>::new(0));
            let handles = [(); 2].map(|()| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || *lock.write().get_mut() += 1)
            });
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(*lock.read().get(), 2);
        });
    }

    /// A reader never observes a half-done write.
    pub(crate) fn reader_excludes_writer<W: Word>() {
        model(|| {
            let lock = Arc::new(Plock::<usize, W>::new(0));
            let writer = {
                let lock = Arc::clone(&lock);
                thread::spawn(move || *lock.write().get_mut() = 1)
            };
            let seen = *lock.read().get();
            assert!(seen == 0 || seen == 1);
            writer.join().unwrap();
        });
    }

    /// A seeker's upgrade serializes against a plain writer.
    pub(crate) fn seeker_serializes_with_writer<W: Word>() {
        model(|| {
            let lock = Arc::new(Plock::<usize, W>::new(0));
            let seeker = {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    let seek = lock.seek();
                    let write = seek.upgrade();
                    *write.get_mut() += 1;
                })
            };
            *lock.write().get_mut() += 1;
            seeker.join().unwrap();
            assert_eq!(*lock.read().get(), 2);
        });
    }
}
