use std::fmt;
use std::time::{Duration, Instant};

use skipset_core::ConcurrentSet;

use crate::generator::ValueGenerator;

const PROGRESS_STEP: usize = 100_000;

/// Summary of one population run.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStats {
    /// Values generated.
    pub length: usize,
    pub mean: f64,
    /// Population variance of the generated values, duplicates included.
    pub variance: f64,
    /// Adds that returned `true`.
    pub inserted: usize,
    /// Time spent generating and inserting.
    pub duration: Duration,
}

impl fmt::Display for PopulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "length={} inserted={} duration={:?}",
            self.length, self.inserted, self.duration
        )?;
        writeln!(f, "    mean={:.3}", self.mean)?;
        write!(f, "    variance={:.3}", self.variance)
    }
}

/// Insert `length` generated values into `set` from one thread and report
/// the moments of what was generated.
pub fn population_stats<G, S>(generator: &mut G, length: usize, set: &S) -> PopulationStats
where
    G: ValueGenerator + ?Sized,
    S: ConcurrentSet<i64> + ?Sized,
{
    let mut witness = Vec::with_capacity(length);
    let mut inserted = 0;
    let started = Instant::now();

    for i in 0..length {
        let value = generator.generate();
        witness.push(value);
        inserted += usize::from(set.add(value));

        if i > 0 && i % PROGRESS_STEP == 0 {
            tracing::debug!(progress = i * 100 / length, "populating");
        }
    }

    let duration = started.elapsed();

    if length == 0 {
        return PopulationStats {
            length,
            mean: 0.0,
            variance: 0.0,
            inserted,
            duration,
        };
    }

    let n = length as f64;
    let mean = witness.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = witness
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    PopulationStats {
        length,
        mean,
        variance,
        inserted,
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::UniformGenerator;
    use skipset_core::LockFreeSkipSet;

    struct Fixed(Vec<i64>);

    impl ValueGenerator for Fixed {
        fn generate(&mut self) -> i64 {
            self.0.pop().unwrap_or(0)
        }
    }

    #[test]
    fn test_moments_of_known_values() {
        let set = LockFreeSkipSet::new();
        let mut generator = Fixed(vec![2, 4, 4, 4, 5, 5, 7, 9]);

        let stats = population_stats(&mut generator, 8, &set);

        assert_eq!(stats.length, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.variance, 4.0);
        assert_eq!(stats.inserted, 5);
        assert_eq!(set.to_vec(), vec![2, 4, 5, 7, 9]);
    }

    #[test]
    fn test_empty_population() {
        let set = LockFreeSkipSet::new();
        let stats = population_stats(&mut UniformGenerator::new(10, 0), 0, &set);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.mean, 0.0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_inserted_matches_distinct_values() {
        let set = LockFreeSkipSet::new();
        let stats = population_stats(&mut UniformGenerator::new(100, 4), 5_000, &set);
        assert_eq!(stats.inserted, set.len());
        assert!(stats.inserted <= 100);
    }
}
