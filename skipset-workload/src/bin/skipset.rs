//! skipset - driver for the concurrent skip-list set.
//!
//! # Usage
//!
//! ```bash
//! skipset population --generator normal --length 10000000
//! skipset demo
//! skipset linearizability --threads 30 --operations 10000 --range 200
//! skipset throughput --mode lock-free --threads 16 --add 10 --remove 10
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use skipset_core::{
    LinearizabilityChecker, LockFree, LockFreeSkipSet, Locked, OperationRecorder, SkipSet,
    SyncMode,
};
use skipset_workload::{
    DEFAULT_RANGE, GeneratorKind, OperationMix, WorkerPool, WorkloadConfig, partition,
    population_stats,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Concurrent skip-list set: population runs, demos, throughput and
/// linearizability checks.
#[derive(Parser, Debug)]
#[command(name = "skipset")]
#[command(about = "Drive the concurrent skip-list set")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a generated population from one thread and print its statistics.
    Population {
        #[arg(long, value_enum, default_value_t = GeneratorKind::Uniform)]
        generator: GeneratorKind,

        /// Number of values to generate.
        #[arg(long, default_value_t = 10_000_000)]
        length: usize,

        #[arg(long, default_value_t = DEFAULT_RANGE)]
        range: i64,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Walk through a few operations and print the level structure.
    Demo,

    /// Run a recorded workload and check the history against a sequential set.
    Linearizability {
        #[command(flatten)]
        workload: WorkloadArgs,

        /// Print the full replay when the check fails.
        #[arg(long, default_value_t = false)]
        trace: bool,
    },

    /// Prefill the set, run a workload and report throughput.
    Throughput {
        #[command(flatten)]
        workload: WorkloadArgs,

        /// Values inserted before the timed run.
        #[arg(long, default_value_t = 0)]
        prefill: usize,
    },
}

#[derive(Args, Debug)]
struct WorkloadArgs {
    #[arg(long, value_enum, default_value_t = Mode::Locked)]
    mode: Mode,

    #[arg(long)]
    threads: Option<usize>,

    /// Total operations across all threads.
    #[arg(long)]
    operations: Option<usize>,

    /// Percentage of add operations.
    #[arg(long)]
    add: Option<u32>,

    /// Percentage of remove operations; contains gets the rest.
    #[arg(long)]
    remove: Option<u32>,

    #[arg(long, value_enum)]
    generator: Option<GeneratorKind>,

    #[arg(long)]
    range: Option<i64>,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    LockFree,
    Locked,
}

impl WorkloadArgs {
    /// Overlay the given flags on a preset.
    fn into_config(self, preset: WorkloadConfig) -> anyhow::Result<WorkloadConfig> {
        let config = WorkloadConfig {
            threads: self.threads.unwrap_or(preset.threads),
            operations: self.operations.unwrap_or(preset.operations),
            mix: OperationMix::new(
                self.add.unwrap_or(preset.mix.add_percent),
                self.remove.unwrap_or(preset.mix.remove_percent),
            ),
            generator: self.generator.unwrap_or(preset.generator),
            seed: self.seed.unwrap_or(preset.seed),
            range: self.range.unwrap_or(preset.range),
        };
        config.validate().context("invalid workload")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Population {
            generator,
            length,
            range,
            seed,
        } => population(generator, length, range, seed),
        Command::Demo => {
            demo();
            Ok(())
        }
        Command::Linearizability { workload, trace } => {
            let mode = workload.mode;
            let config = workload.into_config(WorkloadConfig::stress())?;
            match mode {
                Mode::LockFree => linearizability::<LockFree>(&config, trace),
                Mode::Locked => linearizability::<Locked>(&config, trace),
            }
        }
        Command::Throughput { workload, prefill } => {
            let mode = workload.mode;
            let config = workload.into_config(WorkloadConfig::default())?;
            match mode {
                Mode::LockFree => throughput::<LockFree>(&config, prefill),
                Mode::Locked => throughput::<Locked>(&config, prefill),
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn population(
    generator: GeneratorKind,
    length: usize,
    range: i64,
    seed: u64,
) -> anyhow::Result<()> {
    if range <= 0 {
        bail!("range must be positive, got {range}");
    }

    tracing::info!(?generator, length, range, "population run");
    let set = LockFreeSkipSet::new();
    let stats = population_stats(&mut generator.build(range, seed), length, &set);

    println!("{stats}");
    Ok(())
}

fn demo() {
    let set = LockFreeSkipSet::new();
    println!("-- Initial set --\n{set}");

    set.add(5);
    set.add(-7);
    set.add(123);
    println!("-- Set with some values --\n{set}");

    for i in 0..20 {
        set.add(i);
    }
    println!("-- Set with 20 more values --\n{set}");
    println!("Set contains 13: {}", set.contains(&13));

    for i in 0..10 {
        set.remove(&i);
    }
    println!("-- Set with 10 less values --\n{set}");
}

fn linearizability<M: SyncMode + 'static>(
    config: &WorkloadConfig,
    trace: bool,
) -> anyhow::Result<()> {
    if M::NAME == LockFree::NAME {
        tracing::warn!(
            "lock-free records are stamped after the decisive CAS; \
             a violation here may be a recording race"
        );
    }

    let set = Arc::new(SkipSet::<i64, M>::new());
    let recorder = Arc::new(OperationRecorder::new());
    let budgets = partition(config)?;

    let report = WorkerPool::from_config(config).run(
        Arc::clone(&set),
        &budgets,
        Some(Arc::clone(&recorder)),
    )?;
    println!("{report}");

    let history = recorder.take_history();
    let checker = LinearizabilityChecker::new();
    let verdict = checker.check(&history);
    println!("{verdict}");

    if !verdict.is_linearizable() {
        if trace {
            println!("{}", checker.trace(&history));
        }
        bail!(
            "{} history of {} records is not linearizable",
            set.mode_name(),
            history.len()
        );
    }
    Ok(())
}

fn throughput<M: SyncMode + 'static>(
    config: &WorkloadConfig,
    prefill: usize,
) -> anyhow::Result<()> {
    let set = Arc::new(SkipSet::<i64, M>::new());

    if prefill > 0 {
        let mut generator = config.generator.build(config.range, config.seed ^ u64::MAX);
        let stats = population_stats(&mut generator, prefill, &*set);
        tracing::info!(inserted = stats.inserted, duration = ?stats.duration, "prefilled");
    }

    let budgets = partition(config)?;
    let report = WorkerPool::from_config(config).run(Arc::clone(&set), &budgets, None)?;

    println!("{report}");
    println!("final size: {}", set.len());
    Ok(())
}
