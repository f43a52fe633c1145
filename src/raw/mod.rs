//! The word-level progressive lock.
//!
//! A progressive lock is a reader/writer lock for tree-like structures
//! where finding the place to modify costs far more than the modification
//! itself. Readers and a single *seeker* (a reader that intends to write)
//! descend the structure together; only the final mutation is serialized,
//! by upgrading the seeker to an exclusive writer. An *atomic* mode lets
//! several writers run in parallel on structures that tolerate it, and a
//! join/claim pipeline lets a group of readers agree to enter that mode
//! together.
//!
//! [`RawPlock`] is the bare state machine over a single machine word. It
//! protects nothing by itself: callers pair each acquire with the accesses
//! the held state permits, and with exactly one matching release. For a
//! lock that owns its data and enforces the pairing through RAII guards,
//! see [`Plock`].
//!
//! The five primary states and the word delta each adds:
//!
//! | state | delta | meaning |
//! |---|---|---|
//! | U | none | unlocked |
//! | R | `RL_ONE` | shared reader, any number may coexist |
//! | S | `SL_ONE + RL_ONE` | unique seeker, readers may remain |
//! | W | `WL_ONE + SL_ONE + RL_ONE` | exclusive writer |
//! | A | `WL_ONE` | atomic writer, other atomic writers may coexist |
//!
//! The join pipeline adds J (`WL_ONE + RL_ONE`, a reader that has declared
//! intent to write) and C (J with the seeker bit raised as the common
//! synchronization point).
//!
//! Both word widths implement the same operations; [`RawPlock32`] saves
//! half the space, [`RawPlock64`] pushes the writer-overflow bound from
//! 13107 concurrent writers to roughly 858 million.
//!
//! [`Plock`]: crate::Plock

mod plock;
pub use plock::RawPlock;

/// A progressive lock over a 32-bit word.
pub type RawPlock32 = RawPlock<u32>;

/// A progressive lock over a 64-bit word.
pub type RawPlock64 = RawPlock<u64>;
