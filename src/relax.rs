//! The architecture relaxation hint used inside every spin loop.
//!
//! The C original (`ASYM_BARRIER_ARCH_RELAX` in `asym_barrier.h`) hand-picks
//! `pause` on x86/MIPS, `yield` on ARM, `or 27,27,27` on POWER, and an empty
//! asm block elsewhere. `core::hint::spin_loop` is the portable equivalent
//! the standard library already ships, so the per-architecture table is not
//! reimplemented here. Never skip calling this between spin iterations: on
//! SMT cores a tight loop without it starves the sibling hardware thread,
//! which is often the peer the loop is waiting on.

#[cfg(not(loom))]
#[inline(always)]
pub(crate) fn relax() {
    core::hint::spin_loop();
}

// Under loom's model checker, threads are cooperatively scheduled and a
// real spin would just burn one exploration branch forever. `yield_now`
// is loom's documented way to let a spin loop hand control back to the
// scheduler so other interleavings get explored.
#[cfg(loom)]
#[inline(always)]
pub(crate) fn relax() {
    loom::thread::yield_now();
}
