//! The symmetric barrier: any of `N` peers may take a turn as updater,
//! arbitrated by a ticket lock layered over an inner [`AsymBarrier`].
//!
//! Ported from `symm_barrier.h`. A peer waiting for its ticket does not
//! spin passively: it calls the inner barrier's `check`, so it is actively
//! serving as a waiter for whichever peer currently holds the updater role.
//! That is what makes the wrapper symmetric rather than just "a barrier
//! plus a lock" — every waiting thread is useful to the peer ahead of it.
//!
//! [`AsymBarrier`]: crate::asym

use cache_padded::CachePadded;

use crate::asym::{asym_barrier, AsymUpdater, AsymWaiter};
use crate::sync::{Arc, AtomicU64, Ordering};

struct Ticket {
    /// Fixed peer count `N`. Immutable after construction.
    workers: AtomicU64,
    /// Next ticket to hand out.
    waiting: AtomicU64,
    /// Ticket currently holding the updater role.
    serving: AtomicU64,
}

struct Inner(CachePadded<Ticket>);

impl Inner {
    fn new(workers: u64) -> Self {
        Inner(CachePadded::new(Ticket {
            workers: AtomicU64::new(workers),
            waiting: AtomicU64::new(0),
            serving: AtomicU64::new(0),
        }))
    }
}

impl core::ops::Deref for Inner {
    type Target = Ticket;

    fn deref(&self) -> &Ticket {
        &self.0
    }
}

/// One peer's handle into a symmetric barrier of `N` peers.
///
/// Any peer may call [`update`](SymmPeer::update) to draw a ticket and take
/// the updater role once it comes up, [`commit`](SymmPeer::commit) to
/// release it, and [`check`](SymmPeer::check) to participate as a waiter
/// without competing for the role. A peer that calls `update` but never
/// reaches `commit` deadlocks every other peer — the primitive cannot
/// detect or recover from that caller bug.
#[derive(Clone)]
pub struct SymmPeer {
    inner: Arc<Inner>,
    /// `None` when `N <= 1`: a lone peer needs no inner barrier and every
    /// operation below becomes a no-op.
    asym: Option<(Arc<AsymUpdater>, AsymWaiter)>,
}

/// Creates a symmetric barrier for `workers` peers, returning one
/// [`SymmPeer`] handle per peer.
///
/// When `workers <= 1`, every operation on the returned handle(s) is a
/// no-op and no inner [`AsymBarrier`](crate::asym) is allocated: a single
/// thread does not need a barrier to itself.
pub fn symm_barrier(workers: u64) -> Vec<SymmPeer> {
    let inner = Arc::new(Inner::new(workers));

    let asym = if workers > 1 {
        let (updater, waiter) = asym_barrier(workers - 1);
        Some((Arc::new(updater), waiter))
    } else {
        None
    };

    (0..workers)
        .map(|_| SymmPeer {
            inner: Arc::clone(&inner),
            asym: asym.as_ref().map(|(u, w)| (Arc::clone(u), w.clone())),
        })
        .collect()
}

impl SymmPeer {
    /// Draws a ticket and blocks until it is this peer's turn to be
    /// updater, then opens a new epoch on the inner barrier.
    ///
    /// While waiting for its ticket, the calling thread keeps calling the
    /// inner barrier's `check` so it continues acknowledging whichever
    /// peer is currently updater. See [`AsymUpdater::update`] for the
    /// meaning of `synced`.
    pub fn update(&self, synced: bool) {
        let Some((updater, waiter)) = &self.asym else {
            return;
        };

        let ticket = self.inner.waiting.fetch_add(1, Ordering::Acquire);
        while ticket != self.inner.serving.load(Ordering::Relaxed) {
            waiter.check();
        }

        updater.update(synced);
    }

    /// Closes the epoch opened by this peer's [`SymmPeer::update`] call and
    /// passes the updater role to the next ticket.
    pub fn commit(&self) {
        let Some((updater, _waiter)) = &self.asym else {
            return;
        };

        updater.commit();
        self.inner.serving.fetch_add(1, Ordering::Release);
    }

    /// Participates as a waiter without competing for the updater role.
    ///
    /// A no-op fast path when no peer currently holds a ticket (no inner
    /// epoch is open), and a no-op entirely when `N <= 1`.
    pub fn check(&self) {
        if let Some((_updater, waiter)) = &self.asym {
            waiter.check();
        }
    }
}

impl core::fmt::Debug for SymmPeer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SymmPeer")
            .field("workers", &self.inner.workers.load(Ordering::Relaxed))
            .field("waiting", &self.inner.waiting.load(Ordering::Relaxed))
            .field("serving", &self.inner.serving.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64 as StdAtomicU64, Ordering as StdOrdering};
    use std::sync::Arc as StdArc;
    use std::thread;

    #[test]
    fn degenerate_single_peer_is_a_no_op() {
        let peers = symm_barrier(1);
        assert_eq!(peers.len(), 1);
        let peer = &peers[0];
        peer.check();
        peer.update(true);
        peer.commit();
        peer.update(false);
        peer.commit();
    }

    #[test]
    fn zero_peers_returns_empty() {
        let peers = symm_barrier(0);
        assert!(peers.is_empty());
    }

    /// Three peers each run `update; increment; commit` in a loop, every
    /// other peer waiting on `check` in the meantime. Every increment must
    /// land (no lost updates, matching scenario 4 of the specification).
    #[test]
    fn no_lost_updates_across_peers() {
        const PEERS: u64 = 3;
        const EPOCHS_PER_PEER: u64 = 3_000;

        let peers = symm_barrier(PEERS);
        let counter = StdArc::new(StdAtomicU64::new(0));
        let pending = StdArc::new(StdAtomicU64::new(PEERS));

        let handles: Vec<_> = peers
            .into_iter()
            .map(|peer| {
                let counter = StdArc::clone(&counter);
                let pending = StdArc::clone(&pending);
                thread::spawn(move || {
                    for _ in 0..EPOCHS_PER_PEER {
                        peer.update(true);
                        counter.fetch_add(1, StdOrdering::Relaxed);
                        peer.commit();
                    }

                    // Termination hazard from the specification: a peer
                    // that is done must keep serving as a waiter until
                    // every other peer is also done, or it may starve a
                    // peer still waiting on it.
                    pending.fetch_sub(1, StdOrdering::Relaxed);
                    while pending.load(StdOrdering::Relaxed) != 0 {
                        peer.check();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(
            counter.load(StdOrdering::Relaxed),
            PEERS * EPOCHS_PER_PEER
        );
    }
}

#[cfg(all(test, loom))]
mod loom_tests {
    use super::*;
    use loom::sync::atomic::{AtomicU64 as LoomAtomicU64, Ordering as LoomOrdering};

    #[test]
    fn exactly_one_peer_serves_at_a_time() {
        loom::model(|| {
            let peers = symm_barrier(2);
            let mut iter = peers.into_iter();
            let p0 = iter.next().unwrap();
            let p1 = iter.next().unwrap();

            let overlap = loom::sync::Arc::new(LoomAtomicU64::new(0));
            let ov0 = overlap.clone();
            let ov1 = overlap.clone();

            let h0 = loom::thread::spawn(move || {
                p0.update(true);
                assert_eq!(ov0.fetch_add(1, LoomOrdering::SeqCst), 0);
                ov0.fetch_sub(1, LoomOrdering::SeqCst);
                p0.commit();
            });
            let h1 = loom::thread::spawn(move || {
                p1.update(true);
                assert_eq!(ov1.fetch_add(1, LoomOrdering::SeqCst), 0);
                ov1.fetch_sub(1, LoomOrdering::SeqCst);
                p1.commit();
            });

            h0.join().unwrap();
            h1.join().unwrap();
        });
    }
}
