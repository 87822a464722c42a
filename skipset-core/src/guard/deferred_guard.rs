//! Deferred guard implementation.
//!
//! This module provides `DeferredGuard`, a guard that defers all node
//! destruction until the guard is dropped together with its set.

use parking_lot::Mutex;
#[cfg(debug_assertions)]
use std::collections::HashSet;

use super::Guard;

/// A guard that defers all node destruction until the guard is dropped.
///
/// Removed nodes accumulate until the owning set is dropped, which happens
/// after every worker thread has joined. Memory grows with the number of
/// successful removals, which suits bounded-duration workloads.
///
/// # Thread Safety
///
/// `DeferredGuard` uses a `Mutex` internally to collect nodes from
/// multiple threads. The nodes are freed when the guard is dropped.
///
pub struct DeferredGuard {
    deferred: Mutex<Vec<DeferredNode>>,
    #[cfg(debug_assertions)]
    seen: Mutex<HashSet<usize>>,
}

struct DeferredNode {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: DeferredNode is Send because we only store the pointer
// and deallocation function, and access is synchronized via Mutex
unsafe impl Send for DeferredNode {}

impl DeferredGuard {
    /// Create a new deferred guard.
    pub fn new() -> Self {
        DeferredGuard {
            deferred: Mutex::new(Vec::new()),
            #[cfg(debug_assertions)]
            seen: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        let nodes = self.deferred.get_mut();
        tracing::trace!(count = nodes.len(), "reclaiming deferred nodes");

        for node in nodes.drain(..) {
            unsafe {
                (node.dealloc)(node.ptr);
            }
        }
    }
}

impl Guard for DeferredGuard {
    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        #[cfg(debug_assertions)]
        {
            let addr = node as usize;
            if !self.seen.lock().insert(addr) {
                panic!("DUPLICATE defer_destroy at {:#x}", addr);
            }
        }

        let node = DeferredNode {
            ptr: node as *mut (),
            dealloc: unsafe {
                std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc)
            },
        };
        self.deferred.lock().push(node);
    }

    fn pending(&self) -> usize {
        self.deferred.lock().len()
    }
}
