//! Atomic primitives over 8, 16, 32 and 64-bit unsigned words.
//!
//! This module is the lowest layer of the crate: every mutation of a lock
//! word goes through it, and it is public so that callers can run the same
//! read-modify-write operations on their own shared data (the atomic lock
//! states require exactly that discipline, see [`RawPlock::take_a`]).
//!
//! Loads are acquire-ordered, stores are release-ordered and every
//! read-modify-write is sequentially consistent. [`mb`], [`mb_load`] and
//! [`mb_store`] expose the standalone fences for callers that mix in plain
//! accesses, while [`barrier`] only pins the compiler.
//!
//! [`RawPlock::take_a`]: crate::raw::RawPlock::take_a

use crate::cfg::atomic::Ordering::{Acquire, Release, SeqCst};
use crate::cfg::atomic::{compiler_fence, fence, AtomicU16, AtomicU32, AtomicU64, AtomicU8};
use crate::cfg::hint;

mod sealed {
    pub trait Sealed {}
}

/// An unsigned machine integer that can live inside an atomic cell.
///
/// Implemented for `u8`, `u16`, `u32` and `u64`. The trait carries the small
/// amount of arithmetic the lock algorithms need so that they can be written
/// once, generically over the word width.
pub trait Int:
    sealed::Sealed
    + Copy
    + Eq
    + core::fmt::Debug
    + core::ops::BitAnd<Output = Self>
    + core::ops::BitOr<Output = Self>
    + core::ops::BitXor<Output = Self>
    + core::ops::Not<Output = Self>
    + 'static
{
    /// The value with all bits clear.
    const ZERO: Self;

    /// The value one.
    const ONE: Self;

    /// Returns the value with only bit `n` set.
    fn bit(n: u32) -> Self;

    /// Wrapping (modular) addition.
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Wrapping (modular) subtraction.
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Wrapping (modular) negation.
    fn wrapping_neg(self) -> Self;

    /// Whether all bits are clear.
    #[inline(always)]
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! int {
    ($($int:ty),* $(,)?) => {$(
        impl sealed::Sealed for $int {}

        impl Int for $int {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline(always)]
            fn bit(n: u32) -> Self {
                (1 as $int).wrapping_shl(n)
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$int>::wrapping_add(self, rhs)
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$int>::wrapping_sub(self, rhs)
            }

            #[inline(always)]
            fn wrapping_neg(self) -> Self {
                <$int>::wrapping_neg(self)
            }
        }
    )*};
}

int!(u8, u16, u32, u64);

/// An atomic cell holding an unsigned machine integer.
///
/// Implemented for [`AtomicU8`], [`AtomicU16`], [`AtomicU32`] and
/// [`AtomicU64`]. None of the operations can fail and none of them allocate.
///
/// [`AtomicU8`]: core::sync::atomic::AtomicU8
/// [`AtomicU16`]: core::sync::atomic::AtomicU16
/// [`AtomicU32`]: core::sync::atomic::AtomicU32
/// [`AtomicU64`]: core::sync::atomic::AtomicU64
pub trait AtomicInt: sealed::Sealed + Send + Sync + Sized + 'static {
    /// The integer type held by the cell.
    type Int: Int;

    /// A cell holding zero, usable in constant initializers.
    #[cfg(not(all(loom, test)))]
    const ZERO: Self;

    /// Creates a new cell holding `value`.
    fn new(value: Self::Int) -> Self;

    /// Acquire-ordered load.
    fn load(&self) -> Self::Int;

    /// Release-ordered store.
    fn store(&self, value: Self::Int);

    /// Swaps in `value`, returning the prior value.
    fn swap(&self, value: Self::Int) -> Self::Int;

    /// Stores `new` if the cell holds `current`. Returns the prior value:
    /// the exchange took place if and only if it equals `current`.
    fn compare_exchange(&self, current: Self::Int, new: Self::Int) -> Self::Int;

    /// Adds `value`, returning the prior value.
    fn fetch_add(&self, value: Self::Int) -> Self::Int;

    /// Subtracts `value`, returning the prior value.
    fn fetch_sub(&self, value: Self::Int) -> Self::Int;

    /// Bitwise-ors `value` in, returning the prior value.
    fn fetch_or(&self, value: Self::Int) -> Self::Int;

    /// Bitwise-ands `value` in, returning the prior value.
    fn fetch_and(&self, value: Self::Int) -> Self::Int;

    /// Bitwise-xors `value` in, returning the prior value.
    fn fetch_xor(&self, value: Self::Int) -> Self::Int;

    /// Adds `value`, discarding the result.
    #[inline(always)]
    fn add(&self, value: Self::Int) {
        self.fetch_add(value);
    }

    /// Subtracts `value`, discarding the result.
    #[inline(always)]
    fn sub(&self, value: Self::Int) {
        self.fetch_sub(value);
    }

    /// Bitwise-ors `value` in, discarding the result.
    #[inline(always)]
    fn or(&self, value: Self::Int) {
        self.fetch_or(value);
    }

    /// Bitwise-ands `value` in, discarding the result.
    #[inline(always)]
    fn and(&self, value: Self::Int) {
        self.fetch_and(value);
    }

    /// Bitwise-xors `value` in, discarding the result.
    #[inline(always)]
    fn xor(&self, value: Self::Int) {
        self.fetch_xor(value);
    }

    /// Increments the cell, returning `true` iff the result is nonzero.
    #[inline(always)]
    fn inc(&self) -> bool {
        !self.fetch_add(Self::Int::ONE).wrapping_add(Self::Int::ONE).is_zero()
    }

    /// Decrements the cell, returning `true` iff the result is nonzero.
    #[inline(always)]
    fn dec(&self) -> bool {
        !self.fetch_sub(Self::Int::ONE).wrapping_sub(Self::Int::ONE).is_zero()
    }

    /// Increments the cell.
    #[inline(always)]
    fn inc_noret(&self) {
        self.add(Self::Int::ONE);
    }

    /// Decrements the cell.
    #[inline(always)]
    fn dec_noret(&self) {
        self.sub(Self::Int::ONE);
    }

    /// Atomically sets bit `n`, returning its prior value.
    #[inline(always)]
    fn bit_test_set(&self, n: u32) -> bool {
        let mask = Self::Int::bit(n);
        !(self.fetch_or(mask) & mask).is_zero()
    }

    /// Atomically clears bit `n`, returning its prior value.
    #[inline(always)]
    fn bit_test_reset(&self, n: u32) -> bool {
        let mask = Self::Int::bit(n);
        !(self.fetch_and(!mask) & mask).is_zero()
    }
}

macro_rules! atomic_int {
    ($(($atomic:ident, $int:ty)),* $(,)?) => {$(
        impl sealed::Sealed for $atomic {}

        impl AtomicInt for $atomic {
            type Int = $int;

            #[cfg(not(all(loom, test)))]
            const ZERO: Self = <$atomic>::new(0);

            #[inline(always)]
            fn new(value: $int) -> Self {
                <$atomic>::new(value)
            }

            #[inline(always)]
            fn load(&self) -> $int {
                $atomic::load(self, Acquire)
            }

            #[inline(always)]
            fn store(&self, value: $int) {
                $atomic::store(self, value, Release);
            }

            #[inline(always)]
            fn swap(&self, value: $int) -> $int {
                $atomic::swap(self, value, SeqCst)
            }

            #[inline(always)]
            fn compare_exchange(&self, current: $int, new: $int) -> $int {
                match $atomic::compare_exchange(self, current, new, SeqCst, SeqCst) {
                    Ok(prior) | Err(prior) => prior,
                }
            }

            #[inline(always)]
            fn fetch_add(&self, value: $int) -> $int {
                $atomic::fetch_add(self, value, SeqCst)
            }

            #[inline(always)]
            fn fetch_sub(&self, value: $int) -> $int {
                $atomic::fetch_sub(self, value, SeqCst)
            }

            #[inline(always)]
            fn fetch_or(&self, value: $int) -> $int {
                $atomic::fetch_or(self, value, SeqCst)
            }

            #[inline(always)]
            fn fetch_and(&self, value: $int) -> $int {
                $atomic::fetch_and(self, value, SeqCst)
            }

            #[inline(always)]
            fn fetch_xor(&self, value: $int) -> $int {
                $atomic::fetch_xor(self, value, SeqCst)
            }
        }
    )*};
}

atomic_int!(
    (AtomicU8, u8),
    (AtomicU16, u16),
    (AtomicU32, u32),
    (AtomicU64, u64),
);

/// Full memory fence.
#[inline(always)]
pub fn mb() {
    fence(SeqCst);
}

/// Load (acquire) fence.
#[inline(always)]
pub fn mb_load() {
    fence(Acquire);
}

/// Store (release) fence.
#[inline(always)]
pub fn mb_store() {
    fence(Release);
}

/// Compiler-only barrier: prevents the compiler from reordering memory
/// accesses across it, emits no machine fence.
#[inline(always)]
pub fn barrier() {
    compiler_fence(SeqCst);
}

/// A single cooperative spin hint. No memory effect.
#[inline(always)]
pub fn cpu_relax() {
    hint::spin_loop();
}

#[cfg(all(not(loom), test))]
mod test {
    use super::{AtomicInt, Int};
    use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicU8};

    fn exercise<A: AtomicInt>()
    where
        A::Int: From<u8>,
    {
        let five = A::Int::from(5);
        let three = A::Int::from(3);

        let a = A::new(five);
        assert_eq!(a.load(), five);

        assert_eq!(a.fetch_add(three), five);
        assert_eq!(a.load(), A::Int::from(8));

        assert_eq!(a.fetch_sub(three), A::Int::from(8));
        assert_eq!(a.swap(three), five);
        assert_eq!(a.load(), three);

        // The exchange only takes place when the expected value matches.
        assert_eq!(a.compare_exchange(five, A::Int::from(7)), three);
        assert_eq!(a.load(), three);
        assert_eq!(a.compare_exchange(three, A::Int::from(7)), three);
        assert_eq!(a.load(), A::Int::from(7));

        assert_eq!(a.fetch_and(A::Int::from(0b101)), A::Int::from(7));
        assert_eq!(a.fetch_or(A::Int::from(0b010)), A::Int::from(0b101));
        assert_eq!(a.fetch_xor(A::Int::from(0b111)), A::Int::from(0b111));
        assert!(a.load().is_zero());
    }

    #[test]
    fn fetch_ops_return_prior_value() {
        exercise::<AtomicU8>();
        exercise::<AtomicU16>();
        exercise::<AtomicU32>();
        exercise::<AtomicU64>();
    }

    #[test]
    fn inc_dec_report_nonzero_results() {
        let a = AtomicU32::new(0);
        assert!(a.inc());
        assert!(!a.dec());

        let b = AtomicU8::new(u8::MAX);
        // Wraps to zero.
        assert!(!b.inc());
        a.inc_noret();
        a.dec_noret();
        assert_eq!(AtomicInt::load(&a), 0);
    }

    #[test]
    fn bit_test_ops_report_prior_bit() {
        let a = AtomicU64::new(0);
        assert!(!a.bit_test_set(7));
        assert!(a.bit_test_set(7));
        assert_eq!(AtomicInt::load(&a), 1 << 7);
        assert!(a.bit_test_reset(7));
        assert!(!a.bit_test_reset(7));
        assert_eq!(AtomicInt::load(&a), 0);
    }

    #[test]
    fn discarding_ops() {
        let a = AtomicU32::new(0b1100);
        a.add(0b0001);
        a.sub(0b0001);
        a.or(0b0011);
        assert_eq!(AtomicInt::load(&a), 0b1111);
        a.and(0b0110);
        assert_eq!(AtomicInt::load(&a), 0b0110);
        a.xor(0b0110);
        assert_eq!(AtomicInt::load(&a), 0);
    }

    #[test]
    fn fences_are_callable() {
        super::mb();
        super::mb_load();
        super::mb_store();
        super::barrier();
        super::cpu_relax();
    }
}
