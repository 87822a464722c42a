//! Guard trait for memory reclamation strategies.
//!
//! A node that a winning `remove` logically deletes can still be reached by
//! traversals that loaded a reference to it before it was spliced out, and a
//! concurrent `add` may even re-link it at an upper level after a splice. The
//! set therefore never frees such a node itself; it hands it to its guard.
//!
//! ```text
//! SkipSet<T, M, B, G: Guard>
//!     │
//!     └── SkipSet<T, LockFree, Spin, DeferredGuard>   (bulk reclamation on drop)
//! ```

mod deferred_guard;

pub use deferred_guard::DeferredGuard;

/// A memory reclamation guard owned by one set instance.
///
/// # Safety Contract
///
/// Implementations must ensure:
/// 1. Nodes passed to `defer_destroy` are not freed while any operation on
///    the owning set can still dereference them
/// 2. Every deferred node is eventually freed exactly once
///
pub trait Guard: Sized + Default + Send + Sync {
    /// Schedule a node for deferred destruction.
    ///
    /// # Safety
    ///
    /// - `node` must be a valid pointer previously allocated by the set
    /// - `node` must be logically removed, and handed over exactly once
    /// - `dealloc` must be the correct deallocation function for `node`
    ///
    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N));

    /// Number of nodes waiting for reclamation.
    fn pending(&self) -> usize;
}
