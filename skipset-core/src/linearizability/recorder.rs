use parking_lot::Mutex;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::{OperationKind, OperationRecord};

struct RecorderState<T> {
    origin: Instant,
    records: Vec<OperationRecord<T>>,
}

/// Shared append-only collector of completed operations.
///
/// The recorder is explicit state: callers create one per run, pass it by
/// reference into every recording operation (typically through an `Arc`),
/// and `reset` it before reusing it for another run.
///
/// Sequence numbers come from a logical clock ticked at each decisive step,
/// so no two records of one run share a timestamp.
///
pub struct OperationRecorder<T> {
    clock: AtomicU64,
    state: Mutex<RecorderState<T>>,
}

impl<T> OperationRecorder<T> {
    pub fn new() -> Self {
        OperationRecorder {
            clock: AtomicU64::new(0),
            state: Mutex::new(RecorderState {
                origin: Instant::now(),
                records: Vec::new(),
            }),
        }
    }

    /// Stamp and append one completed operation.
    ///
    /// Must be called right at the operation's linearization point; in locked
    /// mode it runs inside the decisive region.
    pub fn record(&self, kind: OperationKind, operand: T, result: bool) {
        let sequence = self.clock.fetch_add(1, Ordering::AcqRel);
        let mut state = self.state.lock();
        let elapsed = state.origin.elapsed();
        state.records.push(OperationRecord {
            kind,
            operand,
            result,
            sequence,
            elapsed,
        });
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record and restart both clocks.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        tracing::debug!(discarded = state.records.len(), "resetting operation recorder");
        state.records.clear();
        state.origin = Instant::now();
        self.clock.store(0, Ordering::Release);
    }

    /// Move the records out, leaving the recorder empty but with running clocks.
    pub fn take_history(&self) -> Vec<OperationRecord<T>> {
        mem::take(&mut self.state.lock().records)
    }
}

impl<T: Clone> OperationRecorder<T> {
    /// Snapshot of the records collected so far, in append order.
    pub fn history(&self) -> Vec<OperationRecord<T>> {
        self.state.lock().records.clone()
    }
}

impl<T> Default for OperationRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
