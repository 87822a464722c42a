//! Operand generators for workloads and population runs.
//!
//! Both generators are seeded so a script can be replayed exactly.

use std::f64::consts::PI;

/// Default value range, `[0, 10_000_000)`.
pub const DEFAULT_RANGE: i64 = 10_000_000;

pub trait ValueGenerator: Send {
    fn generate(&mut self) -> i64;
}

impl<G: ValueGenerator + ?Sized> ValueGenerator for Box<G> {
    fn generate(&mut self) -> i64 {
        (**self).generate()
    }
}

/// Uniform values in `[0, range)`.
pub struct UniformGenerator {
    range: i64,
    rng: fastrand::Rng,
}

impl UniformGenerator {
    pub fn new(range: i64, seed: u64) -> Self {
        debug_assert!(range > 0, "empty range");
        UniformGenerator {
            range,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn range(&self) -> i64 {
        self.range
    }
}

impl ValueGenerator for UniformGenerator {
    fn generate(&mut self) -> i64 {
        self.rng.i64(0..self.range)
    }
}

/// Normally distributed values around `mean` with standard deviation
/// `mean / 5`, clamped into `[0, range)`.
///
/// Uses the Box-Muller transform: every pair of uniforms yields two values,
/// the second one is cached for the next call.
pub struct NormalGenerator {
    range: i64,
    mean: i64,
    rng: fastrand::Rng,
    cached: Option<i64>,
}

impl NormalGenerator {
    /// Centered generator, `mean = range / 2`.
    pub fn new(range: i64, seed: u64) -> Self {
        Self::with_mean(range, range / 2, seed)
    }

    pub fn with_mean(range: i64, mean: i64, seed: u64) -> Self {
        debug_assert!(range > 0, "empty range");
        NormalGenerator {
            range,
            mean,
            rng: fastrand::Rng::with_seed(seed),
            cached: None,
        }
    }

    pub fn mean(&self) -> i64 {
        self.mean
    }

    fn clamp(&self, z: f64) -> i64 {
        // Saturating float-to-int cast, then clamp into range
        ((z * self.mean as f64) as i64).clamp(0, self.range - 1)
    }
}

impl ValueGenerator for NormalGenerator {
    fn generate(&mut self) -> i64 {
        if let Some(value) = self.cached.take() {
            return value;
        }

        // 1 - f64() lies in (0, 1], keeping ln finite
        let r1 = 1.0 - self.rng.f64();
        let r2 = self.rng.f64();
        let radius = (-2.0 * r1.ln()).sqrt();
        let angle = 2.0 * PI * r2;

        let z1 = radius * angle.cos() / 5.0 + 1.0;
        let z2 = radius * angle.sin() / 5.0 + 1.0;

        self.cached = Some(self.clamp(z1));
        self.clamp(z2)
    }
}
