use std::collections::BTreeSet;
use std::fmt::{self, Debug, Write};

use super::{OperationKind, OperationRecord};

/// First record whose outcome the sequential set model disagrees with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "record #{position} (sequence {sequence}) {kind}({operand}) returned {observed}, \
     sequential set returns {expected}"
)]
pub struct LinearizabilityViolation {
    /// Index in timestamp order.
    pub position: usize,
    pub sequence: u64,
    pub kind: OperationKind,
    /// `Debug` rendering of the operand.
    pub operand: String,
    pub observed: bool,
    pub expected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every record agreed with the sequential model.
    Linearizable { operations: usize },
    Violation(LinearizabilityViolation),
}

impl Verdict {
    pub fn is_linearizable(&self) -> bool {
        matches!(self, Verdict::Linearizable { .. })
    }

    pub fn violation(&self) -> Option<&LinearizabilityViolation> {
        match self {
            Verdict::Linearizable { .. } => None,
            Verdict::Violation(violation) => Some(violation),
        }
    }

    /// Number of replayed operations on success.
    pub fn into_result(self) -> Result<usize, LinearizabilityViolation> {
        match self {
            Verdict::Linearizable { operations } => Ok(operations),
            Verdict::Violation(violation) => Err(violation),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Linearizable { operations } => {
                write!(f, "linearizable ({} operations)", operations)
            }
            Verdict::Violation(violation) => write!(f, "not linearizable: {}", violation),
        }
    }
}

/// Replays a recorded history against a sequential `BTreeSet`.
///
/// Records are ordered by their decision timestamp and each recorded result is
/// compared with what the sequential set returns for the same call. The
/// checker holds no state between runs.
///
/// Only the single timestamp per operation is consulted; per-thread program
/// order is not checked separately.
///
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearizabilityChecker;

impl LinearizabilityChecker {
    pub fn new() -> Self {
        LinearizabilityChecker
    }

    pub fn check<T>(&self, history: &[OperationRecord<T>]) -> Verdict
    where
        T: Ord + Clone + Debug,
    {
        let mut model = BTreeSet::new();

        for (position, record) in Self::ordered(history).into_iter().enumerate() {
            let expected = apply(&mut model, record);
            if expected != record.result {
                let violation = LinearizabilityViolation {
                    position,
                    sequence: record.sequence,
                    kind: record.kind,
                    operand: format!("{:?}", record.operand),
                    observed: record.result,
                    expected,
                };
                tracing::warn!(%violation, "history is not linearizable");
                return Verdict::Violation(violation);
            }
        }

        tracing::debug!(operations = history.len(), "history is linearizable");
        Verdict::Linearizable {
            operations: history.len(),
        }
    }

    /// Human-readable replay, one line per record in timestamp order.
    ///
    /// Inconsistent records are flagged with `ERROR`; successful mutations are
    /// followed by the reference contents after the step. The replay continues
    /// past errors using the sequential model's own outcomes.
    pub fn trace<T>(&self, history: &[OperationRecord<T>]) -> String
    where
        T: Ord + Clone + Debug,
    {
        let mut model = BTreeSet::new();
        let mut out = String::new();

        for record in Self::ordered(history) {
            let expected = apply(&mut model, record);
            let _ = write!(out, "\t{}", record);
            if expected != record.result {
                out.push_str("\tERROR");
            } else if expected && record.kind != OperationKind::Contains {
                let _ = write!(out, "\t{:?}", model);
            }
            out.push('\n');
        }

        out
    }

    fn ordered<T>(history: &[OperationRecord<T>]) -> Vec<&OperationRecord<T>> {
        let mut ordered: Vec<_> = history.iter().collect();
        ordered.sort_by_key(|record| (record.sequence, record.elapsed));
        ordered
    }
}

/// Run one record's call against the model and return the model's answer.
fn apply<T: Ord + Clone>(model: &mut BTreeSet<T>, record: &OperationRecord<T>) -> bool {
    match record.kind {
        OperationKind::Add => model.insert(record.operand.clone()),
        OperationKind::Remove => model.remove(&record.operand),
        OperationKind::Contains => model.contains(&record.operand),
    }
}
