//! Data structures for concurrent sets.
//!
//! # Organization
//!
//! - [`skip_set`] - Skip-list set, generic over synchronization mode, backoff and guard
//! - [`concurrent_set`] - The set interface workload drivers program against
//! - [`internal`] - Node layout and marked pointers (pub(crate))

pub mod concurrent_set;
pub(crate) mod internal;
pub mod skip_set;

pub use concurrent_set::ConcurrentSet;
pub use skip_set::{LockFreeSkipSet, LockedSkipSet, MAX_LEVEL, PROBABILITY, SkipSet};

pub(crate) use internal::MarkedPtr;
