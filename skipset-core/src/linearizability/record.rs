use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Remove,
    Contains,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Remove => "remove",
            OperationKind::Contains => "contains",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed operation, stamped at its linearization point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord<T> {
    pub kind: OperationKind,
    pub operand: T,
    pub result: bool,
    /// Logical clock value drawn at the decisive step; unique per recorder.
    pub sequence: u64,
    /// Wall-clock offset from the recorder origin at the same instant.
    pub elapsed: Duration,
}

impl<T> OperationRecord<T> {
    pub fn new(kind: OperationKind, operand: T, result: bool, sequence: u64) -> Self {
        OperationRecord {
            kind,
            operand,
            result,
            sequence,
            elapsed: Duration::ZERO,
        }
    }
}

impl<T: fmt::Debug> fmt::Display for OperationRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {} (+{:?})\t{}\t{}\t({:?})",
            self.sequence, self.elapsed, self.kind, self.result, self.operand
        )
    }
}
