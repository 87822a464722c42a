//! The interface workload drivers and the shared test suites program against.

use crate::linearizability::OperationRecorder;

// ============================================================================
// ConcurrentSet - Thread-safe ordered set of unique elements
// ============================================================================

/// A thread-safe set whose every operation can optionally be recorded for
/// linearizability checking.
///
/// `add` and `remove` return whether they changed the set; `contains` never
/// changes it. The `*_recorded` variants behave identically and additionally
/// append one record to the recorder.
///
/// Under `Locked` the record's sequence number is drawn inside the same
/// critical region as the decisive step, so recorded order is linearization
/// order and a history from a correct run always passes the checker. Under
/// `LockFree` the number is drawn just after the decisive CAS; another thread
/// may record in between, so a correct run can still yield a history the
/// checker rejects.
///
pub trait ConcurrentSet<T>: Send + Sync {
    /// Insert a value. Returns `false` if an equal element was present.
    fn add(&self, value: T) -> bool;

    /// Remove a value. Returns `true` only for the caller that removed it.
    fn remove(&self, value: &T) -> bool;

    fn contains(&self, value: &T) -> bool;

    fn add_recorded(&self, value: T, recorder: &OperationRecorder<T>) -> bool;

    fn remove_recorded(&self, value: &T, recorder: &OperationRecorder<T>) -> bool;

    fn contains_recorded(&self, value: &T, recorder: &OperationRecorder<T>) -> bool;

    /// Live elements in ascending order. Only exact while no operation runs.
    fn to_vec(&self) -> Vec<T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the synchronization mode, for reports.
    fn mode_name(&self) -> &'static str;
}
