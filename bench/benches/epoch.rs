//! Compares one open-acknowledge-close epoch of [`AsymBarrier`] and
//! [`SymmBarrier`] against `std::sync::Barrier`'s single rendezvous point,
//! at a few waiter counts, the way `rendezvous`'s `thread_tree` bench
//! compares `Rendezvous` against `adaptive_barrier`/`crossbeam_utils`.
//!
//! [`AsymBarrier`]: asym_barrier::AsymUpdater
//! [`SymmBarrier`]: asym_barrier::SymmPeer

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use asym_barrier::{asym_barrier, symm_barrier};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_asym(waiters: u64) -> Duration {
    let (updater, waiter) = asym_barrier(waiters);
    let handles: Vec<_> = (0..waiters)
        .map(|_| {
            let waiter = waiter.clone();
            thread::spawn(move || waiter.check())
        })
        .collect();

    let start = Instant::now();
    updater.update(true);
    updater.commit();
    let elapsed = start.elapsed();

    for h in handles {
        h.join().unwrap();
    }
    elapsed
}

fn bench_symm(workers: u64) -> Duration {
    let peers = symm_barrier(workers);
    let start = Instant::now();
    let handles: Vec<_> = peers
        .into_iter()
        .map(|peer| {
            thread::spawn(move || {
                peer.update(true);
                peer.commit();
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    start.elapsed()
}

fn bench_std_barrier(waiters: u64) -> Duration {
    let barrier = Arc::new(Barrier::new(waiters as usize + 1));
    let handles: Vec<_> = (0..waiters)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
            })
        })
        .collect();

    let start = Instant::now();
    barrier.wait();
    let elapsed = start.elapsed();

    for h in handles {
        h.join().unwrap();
    }
    elapsed
}

fn bench_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("One epoch, N waiters");
    for waiters in [1u64, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("AsymBarrier", waiters), &waiters, |b, &w| {
            b.iter(|| bench_asym(w))
        });
        group.bench_with_input(BenchmarkId::new("SymmBarrier", waiters), &waiters, |b, &w| {
            b.iter(|| bench_symm(w + 1))
        });
        group.bench_with_input(
            BenchmarkId::new("std::sync::Barrier", waiters),
            &waiters,
            |b, &w| b.iter(|| bench_std_barrier(w)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_epoch);
criterion_main!(benches);
