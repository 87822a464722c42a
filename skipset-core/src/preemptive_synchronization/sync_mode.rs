//! Synchronization disciplines wrapped around the decisive step of each
//! set operation.
//!
//! The decisive step is the `find` plus the CAS that fixes the outcome of an
//! `add`/`remove`, or the whole traversal of a `contains`, together with the
//! recording of the outcome. `LockFree` runs it as is; `Locked` runs it inside
//! one mutual-exclusion region shared by every operation on the set, so the
//! recorded order is exactly the order in which outcomes were decided.

use parking_lot::Mutex;

pub trait SyncMode: Default + Send + Sync {
    /// Short name used in reports and benchmark ids.
    const NAME: &'static str;

    /// Run the decisive step of one operation.
    fn decisive<R>(&self, step: impl FnOnce() -> R) -> R;
}

/// No external lock; all synchronization goes through the per-slot CAS.
#[derive(Debug, Default, Clone, Copy)]
pub struct LockFree;

impl SyncMode for LockFree {
    const NAME: &'static str = "lock-free";

    #[inline]
    fn decisive<R>(&self, step: impl FnOnce() -> R) -> R {
        step()
    }
}

/// One global region per set instance serializing every decisive step.
#[derive(Debug, Default)]
pub struct Locked {
    region: Mutex<()>,
}

impl SyncMode for Locked {
    const NAME: &'static str = "locked";

    #[inline]
    fn decisive<R>(&self, step: impl FnOnce() -> R) -> R {
        let _region = self.region.lock();
        step()
    }
}
