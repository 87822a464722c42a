//! Recording of completed set operations and post-hoc linearizability checking.
//!
//! ```text
//! worker threads ──add_recorded/remove_recorded/contains_recorded──┐
//!                                                                  ▼
//!                                              OperationRecorder (append-only)
//!                                                                  │ history()
//!                                                                  ▼
//!                                 LinearizabilityChecker::check ──► Verdict
//! ```

pub mod checker;
pub mod record;
pub mod recorder;

pub use checker::{LinearizabilityChecker, LinearizabilityViolation, Verdict};
pub use record::{OperationKind, OperationRecord};
pub use recorder::OperationRecorder;
