//! Thread-per-worker execution of a partitioned workload.
//!
//! ```text
//!  coordinator            worker 0 .. worker n-1
//!      │ spawn ─────────────► wait(start)
//!      │ signal(start) ─────► draw kind, generate operand, call set
//!      │ wait(done)  ◄─────── signal(done)   (also on panic)
//!      │ join, merge tallies
//!      ▼
//!   RunReport
//! ```

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use skipset_core::{ConcurrentSet, CountdownEvent, OperationKind, OperationRecorder};

use crate::config::{GeneratorKind, WorkloadConfig};
use crate::error::{Result, WorkloadError};
use crate::generator::ValueGenerator;
use crate::partition::OperationBudget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTally {
    pub invoked: usize,
    /// Calls that returned `true`.
    pub succeeded: usize,
}

/// Per-kind call counts of one worker or one whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationTally {
    pub add: KindTally,
    pub remove: KindTally,
    pub contains: KindTally,
}

impl OperationTally {
    pub fn record(&mut self, kind: OperationKind, succeeded: bool) {
        let tally = match kind {
            OperationKind::Add => &mut self.add,
            OperationKind::Remove => &mut self.remove,
            OperationKind::Contains => &mut self.contains,
        };
        tally.invoked += 1;
        tally.succeeded += usize::from(succeeded);
    }

    pub fn merge(&mut self, other: &OperationTally) {
        for (mine, theirs) in [
            (&mut self.add, &other.add),
            (&mut self.remove, &other.remove),
            (&mut self.contains, &other.contains),
        ] {
            mine.invoked += theirs.invoked;
            mine.succeeded += theirs.succeeded;
        }
    }

    pub fn operations(&self) -> usize {
        self.add.invoked + self.remove.invoked + self.contains.invoked
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub threads: usize,
    /// From the start signal until the last worker finished.
    pub duration: Duration,
    pub tally: OperationTally,
}

impl RunReport {
    /// Operations per second.
    pub fn throughput(&self) -> f64 {
        let seconds = self.duration.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.tally.operations() as f64 / seconds
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} operations on {} threads in {:?} ({:.0} ops/s)",
            self.tally.operations(),
            self.threads,
            self.duration,
            self.throughput()
        )?;
        for (kind, tally) in [
            (OperationKind::Add, self.tally.add),
            (OperationKind::Remove, self.tally.remove),
            (OperationKind::Contains, self.tally.contains),
        ] {
            writeln!(
                f,
                "    {:<8} {:>10} calls {:>10} true",
                kind.as_str(),
                tally.invoked,
                tally.succeeded
            )?;
        }
        Ok(())
    }
}

/// Signals the completion latch when a worker exits, panicking or not.
struct DoneSignal(Arc<CountdownEvent>);

impl Drop for DoneSignal {
    fn drop(&mut self) {
        self.0.signal();
    }
}

/// Runs operation budgets against a set, one OS thread per budget.
///
/// Worker `i` draws operands from its own generator seeded with `seed + i`,
/// so two runs with equal budgets issue the same per-worker operand streams.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    generator: GeneratorKind,
    range: i64,
    seed: u64,
}

impl WorkerPool {
    pub fn new(generator: GeneratorKind, range: i64, seed: u64) -> Self {
        WorkerPool {
            generator,
            range,
            seed,
        }
    }

    pub fn from_config(config: &WorkloadConfig) -> Self {
        Self::new(config.generator, config.range, config.seed)
    }

    /// Run every budget to completion. With a recorder, each operation goes
    /// through the set's recording entry point.
    pub fn run<S>(
        &self,
        set: Arc<S>,
        budgets: &[OperationBudget],
        recorder: Option<Arc<OperationRecorder<i64>>>,
    ) -> Result<RunReport>
    where
        S: ConcurrentSet<i64> + 'static,
    {
        if budgets.is_empty() {
            return Err(WorkloadError::NoThreads);
        }

        let threads = budgets.len();
        let start = Arc::new(CountdownEvent::new(1));
        let done = Arc::new(CountdownEvent::new(threads));
        let mut handles = Vec::with_capacity(threads);

        tracing::info!(
            threads,
            operations = budgets.iter().map(OperationBudget::total).sum::<usize>(),
            mode = set.mode_name(),
            recorded = recorder.is_some(),
            "starting workload"
        );

        for (worker, budget) in budgets.iter().copied().enumerate() {
            let set = Arc::clone(&set);
            let recorder = recorder.clone();
            let worker_start = Arc::clone(&start);
            let done = DoneSignal(Arc::clone(&done));
            let worker_seed = self.seed.wrapping_add(worker as u64);
            let generator = self.generator.build(self.range, worker_seed);

            let spawned = thread::Builder::new()
                .name(format!("skipset-worker-{worker}"))
                .spawn(move || {
                    let _done = done;
                    worker_start.wait();
                    run_worker(
                        worker,
                        &*set,
                        budget,
                        generator,
                        worker_seed,
                        recorder.as_deref(),
                    )
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(error) => {
                    release_and_join(&start, handles);
                    return Err(WorkloadError::Spawn {
                        worker,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let started = Instant::now();
        start.signal();
        done.wait();
        let duration = started.elapsed();

        let mut tally = OperationTally::default();
        let mut panicked = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(worker_tally) => tally.merge(&worker_tally),
                Err(_) => {
                    panicked.get_or_insert(worker);
                }
            }
        }
        if let Some(worker) = panicked {
            return Err(WorkloadError::WorkerPanicked { worker });
        }

        let report = RunReport {
            threads,
            duration,
            tally,
        };
        tracing::info!(
            operations = report.tally.operations(),
            ?duration,
            throughput = report.throughput(),
            "workload finished"
        );
        Ok(report)
    }
}

/// Open the start gate for workers that are already spawned and wait for
/// them, so an aborted run leaves no thread blocked on the gate.
fn release_and_join(start: &CountdownEvent, handles: Vec<JoinHandle<OperationTally>>) {
    start.signal();
    for handle in handles {
        let _ = handle.join();
    }
}

fn run_worker<S>(
    worker: usize,
    set: &S,
    mut budget: OperationBudget,
    mut generator: Box<dyn ValueGenerator>,
    seed: u64,
    recorder: Option<&OperationRecorder<i64>>,
) -> OperationTally
where
    S: ConcurrentSet<i64> + ?Sized,
{
    let mut rng = fastrand::Rng::with_seed(seed.rotate_left(32) ^ 0x5EED);
    let mut tally = OperationTally::default();

    while let Some(kind) = budget.draw(&mut rng) {
        let value = generator.generate();
        let succeeded = match (kind, recorder) {
            (OperationKind::Add, None) => set.add(value),
            (OperationKind::Add, Some(recorder)) => set.add_recorded(value, recorder),
            (OperationKind::Remove, None) => set.remove(&value),
            (OperationKind::Remove, Some(recorder)) => set.remove_recorded(&value, recorder),
            (OperationKind::Contains, None) => set.contains(&value),
            (OperationKind::Contains, Some(recorder)) => set.contains_recorded(&value, recorder),
        };
        tally.record(kind, succeeded);
    }

    tracing::debug!(worker, operations = tally.operations(), "worker finished");
    tally
}
