//! Progressive locks: multi-state reader/writer spin locks stored in a
//! single machine word.
//!
//! Progressive locks target tree-like shared structures where *finding*
//! the place to modify costs far more than the modification itself. A
//! thread that expects to write starts out as a *seeker*: it shares the
//! structure with the readers during the whole descent and only serializes
//! the final mutation, by upgrading to an exclusive writer once it stands
//! in front of the node to change. An *atomic* mode additionally lets
//! several writers run in parallel on structures that tolerate it, and a
//! join/claim pipeline lets a group of readers enter that mode together.
//!
//! The five primary states:
//!
//! - **U** - unlocked.
//! - **R** - shared read access; any number of readers may coexist.
//! - **S** - seek access: shared reading plus the unique right to upgrade
//!   to a writer without competing with other seekers.
//! - **W** - exclusive write access.
//! - **A** - an atomic write claim; other atomic claims may be held
//!   concurrently, and mutations must go through the data's own atomics.
//!
//! Everything lives in one word: 2 reserved low bits left to the caller,
//! a reader count, a 2-bit seeker count and a writer count (see
//! [`word`]). Acquires, releases, upgrades and downgrades are single
//! read-modify-write operations plus a bounded-backoff wait; nothing ever
//! allocates or calls into the OS beyond an optional scheduler yield.
//!
//! Two surfaces are provided:
//!
//! - [`raw::RawPlock`] - the bare word. The caller pairs every acquire
//!   with the accesses that state permits and with exactly one release.
//! - [`Plock`] - owns the protected value and enforces the pairing with
//!   RAII guards, one type per state, whose type-state transitions also
//!   encode the drop-before-retry contract of failed upgrades.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use plock::Plock;
//!
//! let ledger: Arc<Plock<Vec<u64>>> = Arc::new(Plock::new(vec![1u64, 2, 3]));
//!
//! let reader = {
//!     let ledger = Arc::clone(&ledger);
//!     thread::spawn(move || ledger.read().iter().sum::<u64>())
//! };
//!
//! let writer = {
//!     let ledger = Arc::clone(&ledger);
//!     thread::spawn(move || {
//!         // Walk shared, mutate exclusive.
//!         let seek = ledger.seek();
//!         let position = seek.len();
//!         let mut write = seek.upgrade();
//!         write.insert(position, 4);
//!     })
//! };
//!
//! reader.join().unwrap();
//! writer.join().unwrap();
//! assert_eq!(*ledger.read(), [1, 2, 3, 4]);
//! ```
//!
//! ## Spinlock use cases
//!
//! It is noteworthy to mention that [spinlocks are usually not what you
//! want]. The majority of use cases are well covered by OS-based locks
//! like [`std::sync::RwLock`], which park waiting threads and free the
//! processor to work on something else. A progressive lock earns its keep
//! when critical sections are short, contention is read-dominated and the
//! seek state can absorb the cost of locating the write; it is unfair by
//! design, trading starvation-freedom of individual threads for
//! throughput.
//!
//! ## Features
//!
//! This crate does not provide any default features. Features that can be
//! enabled are:
//!
//! ### yield
//!
//! The `yield` feature requires linking to the standard library. When a
//! waiter's backoff grows past 16384 pauses, each further round yields one
//! timeslice to the OS scheduler via [`std::thread::yield_now`] instead of
//! pausing through all of it. Leave it off on `no_std` targets, where
//! waiters always busy-wait with [`core::hint::spin_loop`].
//!
//! [spinlocks are usually not what you want]: https://matklad.github.io/2020/01/02/spinlocks-considered-harmful.html
//! [`std::sync::RwLock`]: https://doc.rust-lang.org/std/sync/struct.RwLock.html
//! [`std::thread::yield_now`]: https://doc.rust-lang.org/std/thread/fn.yield_now.html

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::inline_always)]
#![allow(clippy::doc_markdown)]
#![warn(rust_2021_compatibility)]
#![warn(missing_docs)]

#[cfg(any(feature = "yield", loom, test))]
extern crate std;

pub mod atomic;
pub mod backoff;
pub mod raw;
pub mod word;

mod plock;
pub use plock::{AtomicGuard, ClaimGuard, JoinGuard, Plock, ReadGuard, SeekGuard, WriteGuard};

pub(crate) mod cfg;

#[cfg(test)]
pub(crate) mod test;

#[cfg(all(loom, test))]
#[cfg(not(tarpaulin))]
pub(crate) mod loom;
