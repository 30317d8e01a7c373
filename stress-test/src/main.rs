//! Stress-test binary reproducing the three scenarios of the original
//! `test_barrier.c`: an unsynchronized baseline that demonstrates the race
//! it is meant to catch, the same race guarded by [`asym_barrier`], and
//! again guarded by [`symm_barrier`].
//!
//! UNSAFE and SYNCED share one shared "update counter" incremented once per
//! epoch; each waiter reads it twice per iteration and counts the
//! iterations where the two reads differ by more than one, catching a
//! waiter observing a torn update mid-epoch. UNSAFE should show a nonzero
//! failure count; SYNCED must show zero.
//!
//! SYMMBR instead guards the updater's own critical section with an atomic
//! entry/exit counter and counts the iterations where a peer finds another
//! peer already inside it, directly testing the ticket lock's "exactly one
//! updater at a time" property rather than torn-read staleness. It too must
//! show zero.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use asym_barrier::{asym_barrier, symm_barrier};
use clap::Parser;
use colored::Colorize;

/// Races the asymmetric and symmetric barriers against an unsynchronized
/// baseline, the way `test_barrier.c` does.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of waiter (or peer, for SYMMBR) threads.
    #[arg(short = 'k', long, default_value_t = 3)]
    threads: u64,

    /// Number of epochs the updater runs in each scenario.
    #[arg(short = 't', long, default_value_t = 10_000_000)]
    epochs: u64,
}

struct ScenarioResult {
    name: &'static str,
    failed: u64,
    tested: u64,
    tstnum: u64,
}

fn run_unsafe(threads: u64, epochs: u64) -> ScenarioResult {
    let update_count = Arc::new(AtomicU64::new(0));
    let exit_flag = Arc::new(AtomicBool::new(false));

    let updater = {
        let update_count = Arc::clone(&update_count);
        let exit_flag = Arc::clone(&exit_flag);
        thread::spawn(move || {
            while update_count.load(Ordering::Relaxed) < epochs {
                update_count.fetch_add(1, Ordering::Relaxed);
            }
            exit_flag.store(true, Ordering::Relaxed);
        })
    };

    let waiters: Vec<_> = (0..threads)
        .map(|_| {
            let update_count = Arc::clone(&update_count);
            let exit_flag = Arc::clone(&exit_flag);
            thread::spawn(move || {
                let mut failed = 0;
                while !exit_flag.load(Ordering::Relaxed) {
                    let a = update_count.load(Ordering::Relaxed);
                    let b = update_count.load(Ordering::Relaxed);
                    if b.abs_diff(a) > 1 {
                        failed += 1;
                    }
                }
                failed
            })
        })
        .collect();

    updater.join().unwrap();
    let failed: u64 = waiters.into_iter().map(|h| h.join().unwrap()).sum();
    let tested = update_count.load(Ordering::Relaxed);

    ScenarioResult {
        name: "UNSAFE",
        failed,
        tested: tested * threads,
        tstnum: epochs * threads,
    }
}

fn run_synced(threads: u64, epochs: u64) -> ScenarioResult {
    let (updater, waiter) = asym_barrier(threads);
    let update_count = Arc::new(AtomicU64::new(0));
    let exit_flag = Arc::new(AtomicBool::new(false));

    let waiters: Vec<_> = (0..threads)
        .map(|_| {
            let waiter = waiter.clone();
            let update_count = Arc::clone(&update_count);
            let exit_flag = Arc::clone(&exit_flag);
            thread::spawn(move || {
                let mut failed = 0;
                while !exit_flag.load(Ordering::Relaxed) {
                    waiter.check();
                    let a = update_count.load(Ordering::Relaxed);
                    let b = update_count.load(Ordering::Relaxed);
                    if b.abs_diff(a) > 1 {
                        failed += 1;
                    }
                }
                failed
            })
        })
        .collect();

    for _ in 0..epochs {
        updater.update(true);
        update_count.fetch_add(1, Ordering::Relaxed);
        updater.commit();
    }
    exit_flag.store(true, Ordering::Relaxed);

    let failed: u64 = waiters.into_iter().map(|h| h.join().unwrap()).sum();
    let tested = update_count.load(Ordering::Relaxed);

    ScenarioResult {
        name: "SYNCED",
        failed,
        tested: tested * threads,
        tstnum: epochs * threads,
    }
}

fn run_symmbr(threads: u64, epochs: u64) -> ScenarioResult {
    let peers = symm_barrier(threads);
    let update_count = Arc::new(AtomicU64::new(0));
    let failed_count = Arc::new(AtomicU64::new(0));
    let pending = Arc::new(AtomicU64::new(threads));
    // Guards the updater's critical section: incremented on entry,
    // decremented on exit. If the ticket lock ever lets two peers hold
    // the updater role at once, `fetch_add` below observes a nonzero
    // previous value instead of the expected 0, the same overlap check
    // `symm_tests::loom_tests::exactly_one_peer_serves_at_a_time` makes
    // under loom's exhaustive scheduler.
    let in_critical = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = peers
        .into_iter()
        .map(|peer| {
            let update_count = Arc::clone(&update_count);
            let failed_count = Arc::clone(&failed_count);
            let pending = Arc::clone(&pending);
            let in_critical = Arc::clone(&in_critical);
            thread::spawn(move || {
                while update_count.load(Ordering::Relaxed) < epochs {
                    peer.update(true);

                    if in_critical.fetch_add(1, Ordering::SeqCst) != 0 {
                        failed_count.fetch_add(1, Ordering::Relaxed);
                    }
                    update_count.fetch_add(1, Ordering::Relaxed);
                    in_critical.fetch_sub(1, Ordering::SeqCst);

                    peer.commit();
                }

                // Termination hazard: keep serving as a waiter until every
                // peer has drained, since peers still iterating may be
                // waiting on this one as an inner-barrier waiter.
                pending.fetch_sub(1, Ordering::Relaxed);
                while pending.load(Ordering::Relaxed) != 0 {
                    peer.check();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let tested = update_count.load(Ordering::Relaxed);

    ScenarioResult {
        name: "SYMMBR",
        failed: failed_count.load(Ordering::Relaxed),
        tested: tested * threads,
        tstnum: epochs * threads,
    }
}

fn print_result(r: &ScenarioResult) {
    let failed = if r.failed == 0 {
        format!("{:>20}", r.failed).green()
    } else {
        format!("{:>20}", r.failed).red()
    };
    println!(
        "{:<6}: {}/{:>20}/{:>20}",
        r.name, failed, r.tested, r.tstnum
    );
}

fn main() {
    let args = Args::parse();

    println!(
        "{:<6}: {:>20}/{:>20}/{:>20}",
        "RESULT", "FAILED", "TESTED", "TSTNUM"
    );

    print_result(&run_unsafe(args.threads, args.epochs));
    print_result(&run_synced(args.threads, args.epochs));
    print_result(&run_symmbr(args.threads, args.epochs));
}
