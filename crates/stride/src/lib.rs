//! Growable vectors of fixed-size records, backed by the heap or by an arena.
//!
//! See [`stride_alloc`] for the details; this crate re-exports its public surface.
pub use stride_alloc::*;
