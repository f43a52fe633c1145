//! The progressive lock word layout.
//!
//! A lock word packs three counters and two free bits into one unsigned
//! integer, least significant bits first:
//!
//! | bits | field |
//! |---|---|
//! | 2 | reserved, never touched by the lock |
//! | 14 (32-bit) / 30 (64-bit) | readers |
//! | 2 | seekers |
//! | 14 (32-bit) / 30 (64-bit) | writers |
//!
//! Each field is a count, not a flag. Lock states are sums of one-unit
//! increments: a reader adds `RL_ONE`, a seeker adds `SL_ONE | RL_ONE`, an
//! exclusive writer adds `WL_ONE | SL_ONE | RL_ONE` and an atomic writer
//! adds `WL_ONE` alone. The `*_ANY` masks cover a whole field and the
//! `*_MANY` masks are nonzero iff the field holds two or more units.

use crate::atomic::{AtomicInt, Int};
use crate::cfg::atomic::{AtomicU32, AtomicU64};

/// A machine word wide enough to back a progressive lock.
///
/// Implemented for `u32` and `u64`. The constants describe the field layout
/// above; both widths share every algorithm in [`raw`](crate::raw).
pub trait Word: Int {
    /// One reader unit.
    const RL_ONE: Self;

    /// Nonzero iff two or more readers are present.
    const RL_MANY: Self;

    /// The whole reader field.
    const RL_ANY: Self;

    /// One seeker unit.
    const SL_ONE: Self;

    /// The whole seeker field.
    const SL_ANY: Self;

    /// One writer unit.
    const WL_ONE: Self;

    /// Nonzero iff two or more writers are present.
    const WL_MANY: Self;

    /// The whole writer field.
    const WL_ANY: Self;

    /// The atomic cell holding a word of this width.
    type Atomic: AtomicInt<Int = Self>;

    /// The reader count held in `self`.
    fn readers(self) -> u32;

    /// The seeker count held in `self`.
    fn seekers(self) -> u32;

    /// The writer count held in `self`.
    fn writers(self) -> u32;
}

macro_rules! word {
    ($int:ty, $atomic:ty, $rl_shift:expr, $sl_shift:expr, $wl_shift:expr) => {
        impl Word for $int {
            const RL_ONE: Self = 1 << $rl_shift;
            const RL_MANY: Self = Self::RL_ANY & !Self::RL_ONE;
            const RL_ANY: Self = ((1 << $sl_shift) - 1) & !0b11;

            const SL_ONE: Self = 1 << $sl_shift;
            const SL_ANY: Self = 0b11 << $sl_shift;

            const WL_ONE: Self = 1 << $wl_shift;
            const WL_MANY: Self = Self::WL_ANY & !Self::WL_ONE;
            const WL_ANY: Self = !((1 << $wl_shift) - 1);

            type Atomic = $atomic;

            #[inline(always)]
            fn readers(self) -> u32 {
                ((self & Self::RL_ANY) >> $rl_shift) as u32
            }

            #[inline(always)]
            fn seekers(self) -> u32 {
                ((self & Self::SL_ANY) >> $sl_shift) as u32
            }

            #[inline(always)]
            fn writers(self) -> u32 {
                (self >> $wl_shift) as u32
            }
        }
    };
}

word!(u32, AtomicU32, 2, 16, 18);
word!(u64, AtomicU64, 2, 32, 34);

#[cfg(all(not(loom), test))]
mod test {
    use super::Word;

    #[test]
    fn layout_32() {
        assert_eq!(u32::RL_ONE, 0x0000_0004);
        assert_eq!(u32::RL_MANY, 0x0000_FFF8);
        assert_eq!(u32::RL_ANY, 0x0000_FFFC);
        assert_eq!(u32::SL_ONE, 0x0001_0000);
        assert_eq!(u32::SL_ANY, 0x0003_0000);
        assert_eq!(u32::WL_ONE, 0x0004_0000);
        assert_eq!(u32::WL_MANY, 0xFFF8_0000);
        assert_eq!(u32::WL_ANY, 0xFFFC_0000);
    }

    #[test]
    fn layout_64() {
        assert_eq!(u64::RL_ONE, 0x0000_0000_0000_0004);
        assert_eq!(u64::RL_MANY, 0x0000_0000_FFFF_FFF8);
        assert_eq!(u64::RL_ANY, 0x0000_0000_FFFF_FFFC);
        assert_eq!(u64::SL_ONE, 0x0000_0001_0000_0000);
        assert_eq!(u64::SL_ANY, 0x0000_0003_0000_0000);
        assert_eq!(u64::WL_ONE, 0x0000_0004_0000_0000);
        assert_eq!(u64::WL_MANY, 0xFFFF_FFF8_0000_0000);
        assert_eq!(u64::WL_ANY, 0xFFFF_FFFC_0000_0000);
    }

    fn fields_partition<W: Word>() {
        // The reserved bits, the three fields and nothing else.
        let reserved = W::RL_ONE.wrapping_sub(W::ONE);
        let all = reserved | W::RL_ANY | W::SL_ANY | W::WL_ANY;
        assert_eq!(all, !W::ZERO);
        assert!((W::RL_ANY & W::SL_ANY).is_zero());
        assert!((W::SL_ANY & W::WL_ANY).is_zero());
        assert!((W::RL_ANY & W::WL_ANY).is_zero());
    }

    #[test]
    fn fields_are_disjoint_and_exhaustive() {
        fields_partition::<u32>();
        fields_partition::<u64>();
    }

    #[test]
    fn counts() {
        let w = u32::WL_ONE | u32::SL_ONE | u32::RL_ONE;
        assert_eq!(w.readers(), 1);
        assert_eq!(w.writers(), 1);

        let w = u64::WL_ONE.wrapping_add(u64::WL_ONE) | u64::RL_ONE;
        assert_eq!(w.readers(), 1);
        assert_eq!(w.writers(), 2);
    }
}
