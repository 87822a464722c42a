use clap::ValueEnum;

use crate::error::{Result, WorkloadError};
use crate::generator::{DEFAULT_RANGE, NormalGenerator, UniformGenerator, ValueGenerator};

/// Share of `add` and `remove` operations in percent; `contains` gets the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationMix {
    pub add_percent: u32,
    pub remove_percent: u32,
}

impl OperationMix {
    pub const fn new(add_percent: u32, remove_percent: u32) -> Self {
        OperationMix {
            add_percent,
            remove_percent,
        }
    }

    /// Read-mostly: 10% add, 10% remove, 80% contains.
    pub const fn read_mostly() -> Self {
        Self::new(10, 10)
    }

    /// Even thirds.
    pub const fn balanced() -> Self {
        Self::new(33, 33)
    }

    pub fn contains_percent(&self) -> u32 {
        100u32.saturating_sub(self.add_percent + self.remove_percent)
    }

    /// Global per-kind counts for `total` operations: `(add, remove, contains)`.
    pub fn counts(&self, total: usize) -> (usize, usize, usize) {
        let add = total * self.add_percent as usize / 100;
        let remove = total * self.remove_percent as usize / 100;
        (add, remove, total.saturating_sub(add + remove))
    }
}

impl Default for OperationMix {
    fn default() -> Self {
        Self::read_mostly()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GeneratorKind {
    #[default]
    Uniform,
    Normal,
}

impl GeneratorKind {
    pub fn build(self, range: i64, seed: u64) -> Box<dyn ValueGenerator> {
        match self {
            GeneratorKind::Uniform => Box::new(UniformGenerator::new(range, seed)),
            GeneratorKind::Normal => Box::new(NormalGenerator::new(range, seed)),
        }
    }
}

/// Shape of one worker-pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    pub threads: usize,
    /// Total operations across all workers.
    pub operations: usize,
    pub mix: OperationMix,
    pub generator: GeneratorKind,
    /// Base seed; worker `i` draws from `seed + i`.
    pub seed: u64,
    /// Operands are drawn from `[0, range)`.
    pub range: i64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            threads: 8,
            operations: 1_000_000,
            mix: OperationMix::default(),
            generator: GeneratorKind::default(),
            seed: 0,
            range: DEFAULT_RANGE,
        }
    }
}

impl WorkloadConfig {
    /// Small run for smoke tests.
    pub fn quick() -> Self {
        WorkloadConfig {
            threads: 4,
            operations: 10_000,
            range: 1_000,
            ..Self::default()
        }
    }

    /// Many threads over a tiny key range, for contention and
    /// linearizability runs.
    pub fn stress() -> Self {
        WorkloadConfig {
            threads: 30,
            operations: 10_000,
            mix: OperationMix::balanced(),
            range: 200,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(WorkloadError::NoThreads);
        }
        let total = self.mix.add_percent + self.mix.remove_percent;
        if total > 100 {
            return Err(WorkloadError::MixOverflow { total });
        }
        if self.range <= 0 {
            return Err(WorkloadError::EmptyRange(self.range));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_give_remainder_to_contains() {
        let mix = OperationMix::new(33, 33);
        assert_eq!(mix.counts(10_000), (3_300, 3_300, 3_400));
        assert_eq!(mix.counts(7), (2, 2, 3));
        assert_eq!(mix.contains_percent(), 34);
    }

    #[test]
    fn test_counts_of_overfull_mix_do_not_underflow() {
        let mix = OperationMix::new(70, 40);
        assert_eq!(mix.counts(100), (70, 40, 0));
        assert_eq!(mix.contains_percent(), 0);
    }

    #[test]
    fn test_presets_validate() {
        assert!(WorkloadConfig::default().validate().is_ok());
        assert!(WorkloadConfig::quick().validate().is_ok());

        let stress = WorkloadConfig::stress();
        assert!(stress.validate().is_ok());
        assert_eq!((stress.threads, stress.operations, stress.range), (30, 10_000, 200));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let config = WorkloadConfig {
            threads: 0,
            ..WorkloadConfig::quick()
        };
        assert_eq!(config.validate(), Err(WorkloadError::NoThreads));

        let config = WorkloadConfig {
            mix: OperationMix::new(70, 40),
            ..WorkloadConfig::quick()
        };
        assert_eq!(config.validate(), Err(WorkloadError::MixOverflow { total: 110 }));

        let config = WorkloadConfig {
            range: 0,
            ..WorkloadConfig::quick()
        };
        assert_eq!(config.validate(), Err(WorkloadError::EmptyRange(0)));
    }
}
