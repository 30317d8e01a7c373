//! The asymmetric barrier: one updater publishes epochs, a fixed number of
//! waiters acknowledge them.
//!
//! Ported from `asym_barrier.h`. The three counters (`refcnt`, `wcount`,
//! `synced`) and the three-phase announce/acknowledge/commit handshake are
//! unchanged from the C original; what changes is that "UPDATER-API" and
//! "WAITER-API", which the C header only documents in comments, become two
//! distinct handle types here so a thread cannot accidentally call the
//! other role's operations.

use cache_padded::CachePadded;

use crate::relax::relax;
use crate::sync::{Arc, AtomicU64, Ordering};

struct Raw {
    /// Fixed waiter count `W`. Set at construction, never touched again.
    refcnt: AtomicU64,
    /// Pending acknowledgements in the current epoch; 0 when idle.
    wcount: AtomicU64,
    /// Waiters that have reached the sync point in the current epoch.
    synced: AtomicU64,
}

/// `refcnt`/`wcount`/`synced` packed onto one cache line, mirroring the
/// `ASYM_BARRIER_CACHE_ALIGNED` whole-struct alignment of the C original
/// rather than padding each counter to its own line: the three fields are
/// always touched together within one epoch, so keeping them in one line
/// trades same-line contention during the handshake for a single cold miss
/// to start one.
struct Inner(CachePadded<Raw>);

impl Inner {
    fn new(waiters: u64) -> Self {
        Inner(CachePadded::new(Raw {
            refcnt: AtomicU64::new(waiters),
            wcount: AtomicU64::new(0),
            synced: AtomicU64::new(0),
        }))
    }
}

impl core::ops::Deref for Inner {
    type Target = Raw;

    fn deref(&self) -> &Raw {
        &self.0
    }
}

/// The updater half of an asymmetric barrier.
///
/// UPDATER-API: only the thread holding this handle may call
/// [`update`](AsymUpdater::update) / [`commit`](AsymUpdater::commit). The
/// handle is not [`Clone`] on its own; share it behind an [`std::sync::Arc`]
/// if more than one thread needs to reach it (as [`crate::symm`] does), but
/// the barrier's own role discipline still requires that at most one of
/// those threads calls `update`/`commit` concurrently.
pub struct AsymUpdater {
    inner: Arc<Inner>,
}

/// The waiter half of an asymmetric barrier.
///
/// WAITER-API: clone this handle once per waiter thread. Each clone calls
/// [`check`](AsymWaiter::check) to acknowledge epochs opened by the
/// [`AsymUpdater`] it was created alongside.
#[derive(Clone)]
pub struct AsymWaiter {
    inner: Arc<Inner>,
}

/// Creates an asymmetric barrier for `waiters` waiter threads.
///
/// Returns the updater handle and one waiter handle; clone the waiter
/// handle `waiters` times, one per waiter thread. `waiters == 0` is legal
/// but useless: every `update`/`commit` cycle completes immediately because
/// there is nobody left to acknowledge it.
pub fn asym_barrier(waiters: u64) -> (AsymUpdater, AsymWaiter) {
    let inner = Arc::new(Inner::new(waiters));
    (
        AsymUpdater {
            inner: Arc::clone(&inner),
        },
        AsymWaiter { inner },
    )
}

impl AsymUpdater {
    /// Opens a new epoch.
    ///
    /// Stores `refcnt` into `wcount` with a sequentially consistent write.
    /// This both atomically opens the epoch and publishes every write the
    /// caller made before this call to whichever waiter observes the open
    /// epoch on its next [`AsymWaiter::check`].
    ///
    /// If `synced` is `true`, spins until every waiter has acknowledged the
    /// epoch (`wcount` back at 0) before returning. If `false`, returns as
    /// soon as the epoch is announced, letting the caller do other work
    /// before calling [`AsymUpdater::commit`] — which still waits for the
    /// sync phase regardless of `synced`.
    pub fn update(&self, synced: bool) {
        let refcnt = self.inner.refcnt.load(Ordering::Relaxed);
        self.inner.wcount.store(refcnt, Ordering::SeqCst);

        while synced && self.inner.wcount.load(Ordering::Relaxed) != 0 {
            relax();
        }
    }

    /// Closes the epoch opened by the last [`AsymUpdater::update`] call.
    ///
    /// Spins until every waiter has reached the sync point, then clears
    /// `synced` with a sequentially consistent store, releasing every
    /// waiter parked in [`AsymWaiter::check`] and restoring the idle
    /// invariant (`wcount == synced == 0`).
    pub fn commit(&self) {
        let refcnt = self.inner.refcnt.load(Ordering::Relaxed);
        while self.inner.synced.load(Ordering::Relaxed) != refcnt {
            relax();
        }
        self.inner.synced.store(0, Ordering::SeqCst);
    }
}

impl AsymWaiter {
    /// Acknowledges the currently open epoch, if any.
    ///
    /// Fast path: a single relaxed load of `wcount`. If it reads 0 (no open
    /// epoch), returns immediately — this is the only cost a waiter pays
    /// when the updater is idle.
    ///
    /// Slow path (an epoch is open): decrements `wcount` with an acquire
    /// load, which synchronizes with the updater's sequentially consistent
    /// announce, then spins until every waiter has done the same. Once all
    /// waiters have crossed that line, increments `synced` and spins until
    /// the updater's [`AsymUpdater::commit`] clears it.
    pub fn check(&self) {
        if self.inner.wcount.load(Ordering::Relaxed) == 0 {
            return;
        }

        self.inner.wcount.fetch_sub(1, Ordering::Acquire);
        while self.inner.wcount.load(Ordering::Relaxed) != 0 {
            relax();
        }

        self.inner.synced.fetch_add(1, Ordering::AcqRel);
        while self.inner.synced.load(Ordering::Relaxed) != 0 {
            relax();
        }
    }
}

impl core::fmt::Debug for AsymUpdater {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt_inner(&self.inner, "AsymUpdater", f)
    }
}

impl core::fmt::Debug for AsymWaiter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt_inner(&self.inner, "AsymWaiter", f)
    }
}

fn fmt_inner(
    inner: &Inner,
    name: &str,
    f: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    f.debug_struct(name)
        .field("refcnt", &inner.refcnt.load(Ordering::Relaxed))
        .field("wcount", &inner.wcount.load(Ordering::Relaxed))
        .field("synced", &inner.synced.load(Ordering::Relaxed))
        .finish()
}

#[cfg(test)]
impl AsymUpdater {
    pub(crate) fn counters(&self) -> (u64, u64, u64) {
        (
            self.inner.refcnt.load(Ordering::Relaxed),
            self.inner.wcount.load(Ordering::Relaxed),
            self.inner.synced.load(Ordering::Relaxed),
        )
    }
}


#[cfg(all(test, loom))]
mod loom_tests {
    use super::*;

    #[test]
    fn idle_invariant_holds_under_all_interleavings() {
        loom::model(|| {
            let (updater, waiter) = asym_barrier(2);
            let w1 = waiter.clone();
            let h1 = loom::thread::spawn(move || w1.check());
            let h2 = loom::thread::spawn(move || waiter.check());

            updater.update(true);
            updater.commit();

            h1.join().unwrap();
            h2.join().unwrap();

            assert_eq!(updater.counters(), (2, 0, 0));
        });
    }
}
