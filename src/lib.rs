#![warn(clippy::undocumented_unsafe_blocks)]

//! An asymmetric barrier for read-mostly concurrent systems, and a
//! symmetric barrier built on top of it.
//!
//! # Asymmetric vs symmetric
//!
//! [`asym_barrier`] gives you one [`AsymUpdater`] and a cloneable
//! [`AsymWaiter`]: a single thread occasionally publishes a new epoch and
//! wants certainty that every waiter has observed the transition, while
//! every waiter's fast path — no epoch open — costs a single relaxed load.
//! This is the pattern behind RCU-like pointer swaps: a writer publishes a
//! new version and waits for every reader to stop touching the old one
//! before reclaiming it.
//!
//! [`symm_barrier`] gives you `N` cloneable [`SymmPeer`] handles, any of
//! which may take a turn as updater; turns are handed out by a ticket lock
//! layered over an inner [`AsymBarrier`](crate::asym), and a peer waiting
//! for its ticket keeps acknowledging whichever peer currently holds it.
//!
//! # Examples
//!
//! ```
//! use asym_barrier::asym_barrier;
//! use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let (updater, waiter) = asym_barrier(4);
//! let published = Arc::new(AtomicU64::new(0));
//! let exit = Arc::new(AtomicBool::new(false));
//!
//! // Waiters loop on `check` until told to exit, the way a well-formed
//! // caller always does: a one-shot `check` call is not guaranteed to
//! // land inside any particular epoch.
//! let readers: Vec<_> = (0..4)
//!     .map(|_| {
//!         let waiter = waiter.clone();
//!         let published = Arc::clone(&published);
//!         let exit = Arc::clone(&exit);
//!         thread::spawn(move || {
//!             let mut seen = 0;
//!             while !exit.load(Ordering::Relaxed) {
//!                 waiter.check();
//!                 seen = published.load(Ordering::Relaxed);
//!             }
//!             seen
//!         })
//!     })
//!     .collect();
//!
//! published.store(7, Ordering::Relaxed);
//! updater.update(true);
//! updater.commit();
//! exit.store(true, Ordering::Relaxed);
//!
//! for r in readers {
//!     // Every reader crossed the acknowledgement line while the epoch
//!     // was open, so every one of them observed the store above.
//!     assert_eq!(r.join().unwrap(), 7);
//! }
//! ```
//!
//! Multiple peers sharing the updater role:
//!
//! ```
//! use asym_barrier::symm_barrier;
//! use std::thread;
//!
//! let peers = symm_barrier(3);
//! let handles: Vec<_> = peers
//!     .into_iter()
//!     .map(|peer| {
//!         thread::spawn(move || {
//!             peer.update(true);
//!             // ... this peer is now the sole updater ...
//!             peer.commit();
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//! ```
//!
//! # Scheduling model
//!
//! Every wait in this crate is a busy spin punctuated by
//! [`core::hint::spin_loop`]; nothing parks or enters the kernel. That
//! makes the barrier appropriate for short epochs where every participant
//! is runnable, and inappropriate once the thread count exceeds the core
//! count or any participant may block elsewhere. There is no cancellation,
//! timeout, or way to abort a waiter — implement that above this layer,
//! e.g. by opening one final "shutdown" epoch.
//!
//! # Non-goals
//!
//! The waiter count is fixed at construction; there is no support for
//! dynamic participant counts, reentrancy, timed waits, signal safety, or
//! cross-process use. Calling [`AsymUpdater::update`] concurrently from
//! multiple threads against the same barrier is undefined — use
//! [`symm_barrier`] if more than one thread needs to take the updater role.

mod asym;
mod relax;
mod symm;
mod sync;

pub use asym::{asym_barrier, AsymUpdater, AsymWaiter};
pub use symm::{symm_barrier, SymmPeer};
