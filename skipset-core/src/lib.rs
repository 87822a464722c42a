//! Concurrent skip-list set with pluggable synchronization and a
//! linearizability checker for recorded executions.
//!
//! ```rust
//! use skipset_core::{LockFreeSkipSet, LinearizabilityChecker, OperationRecorder};
//!
//! let set = LockFreeSkipSet::<i64>::new();
//! let recorder = OperationRecorder::new();
//!
//! assert!(set.add_recorded(5, &recorder));
//! assert!(!set.add_recorded(5, &recorder));
//! assert!(set.remove_recorded(&5, &recorder));
//!
//! let verdict = LinearizabilityChecker::new().check(&recorder.history());
//! assert!(verdict.is_linearizable());
//! ```

pub mod common_tests;
pub mod data_structures;
pub mod guard;
pub mod linearizability;
pub mod preemptive_synchronization;

pub use data_structures::{
    ConcurrentSet, LockFreeSkipSet, LockedSkipSet, MAX_LEVEL, PROBABILITY, SkipSet,
};
pub use guard::{DeferredGuard, Guard};
pub use linearizability::{
    LinearizabilityChecker, LinearizabilityViolation, OperationKind, OperationRecord,
    OperationRecorder, Verdict,
};
pub use preemptive_synchronization::{
    Backoff, CountdownEvent, ExponentialBackoff, LockFree, Locked, Spin, SyncMode,
};
