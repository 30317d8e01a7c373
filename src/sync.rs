//! Indirection over the atomics and `Arc` the barrier is built on.
//!
//! Everything in this crate goes through these re-exports instead of
//! `std::sync` directly, so that the exact same code can also run under
//! [`loom`](https://docs.rs/loom)'s exhaustive interleaving checker when
//! built with `--cfg loom` (see the `loom` tests at the bottom of
//! [`crate::asym`]).

#[cfg(not(loom))]
pub(crate) use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

#[cfg(loom)]
pub(crate) use loom::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
