//! Workload generation and execution for `skipset-core` sets.
//!
//! - [`generator`] - Seeded uniform and normal operand generators
//! - [`config`] - Workload shape: threads, operation count, mix, range
//! - [`partition`] - Splitting the global operation counts across workers
//! - [`pool`] - Thread-per-worker execution and run reports
//! - [`population`] - Single-threaded population runs and their statistics

pub mod config;
pub mod error;
pub mod generator;
pub mod partition;
pub mod pool;
pub mod population;

pub use config::{GeneratorKind, OperationMix, WorkloadConfig};
pub use error::{Result, WorkloadError};
pub use generator::{DEFAULT_RANGE, NormalGenerator, UniformGenerator, ValueGenerator};
pub use partition::{OperationBudget, partition};
pub use pool::{KindTally, OperationTally, RunReport, WorkerPool};
pub use population::{PopulationStats, population_stats};
