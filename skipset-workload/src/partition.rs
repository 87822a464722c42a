use skipset_core::OperationKind;

use crate::config::WorkloadConfig;
use crate::error::Result;

/// Operations one worker still has to run, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationBudget {
    pub add: usize,
    pub remove: usize,
    pub contains: usize,
}

impl OperationBudget {
    pub fn new(add: usize, remove: usize, contains: usize) -> Self {
        OperationBudget {
            add,
            remove,
            contains,
        }
    }

    pub fn total(&self) -> usize {
        self.add + self.remove + self.contains
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count(&self, kind: OperationKind) -> usize {
        match kind {
            OperationKind::Add => self.add,
            OperationKind::Remove => self.remove,
            OperationKind::Contains => self.contains,
        }
    }

    fn slot(&mut self, kind: OperationKind) -> &mut usize {
        match kind {
            OperationKind::Add => &mut self.add,
            OperationKind::Remove => &mut self.remove,
            OperationKind::Contains => &mut self.contains,
        }
    }

    /// Take one operation of a random remaining kind, weighted by the
    /// remaining counts. `None` once the budget is spent.
    pub fn draw(&mut self, rng: &mut fastrand::Rng) -> Option<OperationKind> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let roll = rng.usize(0..total);
        let kind = if roll < self.add {
            OperationKind::Add
        } else if roll < self.add + self.remove {
            OperationKind::Remove
        } else {
            OperationKind::Contains
        };

        *self.slot(kind) -= 1;
        Some(kind)
    }
}

/// Split the global per-kind counts of `config` across its workers.
///
/// Worker `i` receives operations `[total * i / threads, total * (i + 1) / threads)`.
/// Each operation's kind is rolled from the mix; when the rolled kind has no
/// global budget left, a remaining kind is drawn instead, so the per-kind
/// totals over all workers always equal the mix counts.
///
/// Fails if `config` does not validate.
pub fn partition(config: &WorkloadConfig) -> Result<Vec<OperationBudget>> {
    config.validate()?;

    let (add, remove, contains) = config.mix.counts(config.operations);
    let mut left = OperationBudget::new(add, remove, contains);
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let add_limit = config.mix.add_percent;
    let remove_limit = add_limit + config.mix.remove_percent;
    let mut assigned = 0;

    let budgets = (0..config.threads)
        .map(|worker| {
            let quota_end = config.operations * (worker + 1) / config.threads;
            let mut budget = OperationBudget::default();

            while assigned < quota_end {
                let roll = rng.u32(0..100);
                let rolled = if roll < add_limit {
                    OperationKind::Add
                } else if roll < remove_limit {
                    OperationKind::Remove
                } else {
                    OperationKind::Contains
                };

                let kind = if left.count(rolled) > 0 {
                    *left.slot(rolled) -= 1;
                    rolled
                } else {
                    match left.draw(&mut rng) {
                        Some(kind) => kind,
                        None => break,
                    }
                };

                *budget.slot(kind) += 1;
                assigned += 1;
            }

            tracing::trace!(worker, ?budget, "partitioned worker budget");
            budget
        })
        .collect();
    Ok(budgets)
}
