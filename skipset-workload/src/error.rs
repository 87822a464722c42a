use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("workload needs at least one worker thread")]
    NoThreads,

    #[error("operation mix adds up to {total}%, the limit is 100%")]
    MixOverflow { total: u32 },

    #[error("value range must be positive, got {0}")]
    EmptyRange(i64),

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("failed to spawn worker {worker}: {reason}")]
    Spawn { worker: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, WorkloadError>;
