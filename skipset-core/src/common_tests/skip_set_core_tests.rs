use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use crate::data_structures::{ConcurrentSet, MAX_LEVEL, SkipSet};
use crate::linearizability::{LinearizabilityChecker, OperationKind, OperationRecorder};
use crate::preemptive_synchronization::SyncMode;

/// One step of a deterministic single-threaded script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    pub kind: OperationKind,
    pub operand: i32,
}

/// Build a reproducible script over `[-range, range)` with roughly equal
/// shares of each operation kind.
pub fn random_script(seed: u64, steps: usize, range: i32) -> Vec<ScriptStep> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..steps)
        .map(|_| {
            let kind = match rng.u8(0..3) {
                0 => OperationKind::Add,
                1 => OperationKind::Remove,
                _ => OperationKind::Contains,
            };
            ScriptStep {
                kind,
                operand: rng.i32(-range..range),
            }
        })
        .collect()
}

/// Run a script and collect every boolean result.
pub fn run_script<C>(set: &C, script: &[ScriptStep]) -> Vec<bool>
where
    C: ConcurrentSet<i32>,
{
    script
        .iter()
        .map(|step| match step.kind {
            OperationKind::Add => set.add(step.operand),
            OperationKind::Remove => set.remove(&step.operand),
            OperationKind::Contains => set.contains(&step.operand),
        })
        .collect()
}

/// add/contains/remove on a handful of values
pub fn test_basic_operations<C>(set: &C)
where
    C: ConcurrentSet<i32>,
{
    assert!(set.is_empty());

    assert!(set.add(5));
    assert!(set.add(10));
    assert!(set.add(3));
    assert!(set.add(-7));
    assert!(set.add(1));

    // Duplicates are rejected
    assert!(!set.add(5));
    assert!(!set.add(-7));

    assert!(set.contains(&-7));
    assert!(set.contains(&1));
    assert!(set.contains(&3));
    assert!(set.contains(&10));
    assert!(!set.contains(&2));
    assert!(!set.contains(&i32::MAX));
    assert!(!set.contains(&i32::MIN));

    assert!(set.remove(&3));
    assert!(!set.contains(&3));
    assert!(!set.remove(&3)); // Already removed

    assert_eq!(set.to_vec(), vec![-7, 1, 5, 10]);
    assert_eq!(set.len(), 4);
    assert!(!set.is_empty());
}

/// The canonical single-value walk-through
pub fn test_worked_scenario<C>(set: &C)
where
    C: ConcurrentSet<i32>,
{
    assert!(set.add(5));
    assert!(!set.add(5));
    assert!(set.contains(&5));
    assert!(set.remove(&5));
    assert!(!set.contains(&5));
    assert!(!set.remove(&5));
    assert!(set.is_empty());
}

/// Outputs equal a `BTreeSet` fed the same script, including duplicates,
/// negative values and repeats
pub fn test_sequential_equivalence<C>(set: &C, seed: u64)
where
    C: ConcurrentSet<i32>,
{
    let script = random_script(seed, 5_000, 64);
    let mut reference = BTreeSet::new();

    for (step_index, step) in script.iter().enumerate() {
        let (observed, expected) = match step.kind {
            OperationKind::Add => (set.add(step.operand), reference.insert(step.operand)),
            OperationKind::Remove => (set.remove(&step.operand), reference.remove(&step.operand)),
            OperationKind::Contains => {
                (set.contains(&step.operand), reference.contains(&step.operand))
            }
        };
        assert_eq!(
            observed, expected,
            "step {} {:?} diverged from the reference set",
            step_index, step
        );
    }

    assert_eq!(set.to_vec(), reference.into_iter().collect::<Vec<_>>());
}

/// A successful add is immediately visible
pub fn test_post_insertion_visibility<C>(set: &C)
where
    C: ConcurrentSet<i32>,
{
    for value in (0..1000).map(|i| (i * 7919) % 1000 - 500) {
        if set.add(value) {
            assert!(set.contains(&value), "{} invisible after add", value);
        }
    }
    assert_eq!(set.len(), 1000);
}

/// remove(x) twice returns true then false
pub fn test_idempotent_removal<C>(set: &C)
where
    C: ConcurrentSet<i32>,
{
    for value in 0..100 {
        set.add(value);
    }
    for value in 0..100 {
        assert!(set.remove(&value));
        assert!(!set.remove(&value));
        assert!(!set.contains(&value));
    }
    assert!(set.is_empty());
}

/// Recording does not change outcomes and produces a checkable history
pub fn test_recorded_operations<C>(set: &C)
where
    C: ConcurrentSet<i32>,
{
    let recorder = OperationRecorder::new();

    assert!(set.add_recorded(5, &recorder));
    assert!(!set.add_recorded(5, &recorder));
    assert!(set.contains_recorded(&5, &recorder));
    assert!(set.remove_recorded(&5, &recorder));
    assert!(!set.contains_recorded(&5, &recorder));
    assert!(!set.remove_recorded(&5, &recorder));

    let history = recorder.history();
    let outcomes: Vec<_> = history.iter().map(|r| (r.kind, r.result)).collect();
    assert_eq!(
        outcomes,
        vec![
            (OperationKind::Add, true),
            (OperationKind::Add, false),
            (OperationKind::Contains, true),
            (OperationKind::Remove, true),
            (OperationKind::Contains, false),
            (OperationKind::Remove, false),
        ]
    );
    assert!(history.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(LinearizabilityChecker::new().check(&history).is_linearizable());
}

/// Identical single-threaded scripts give identical results in both modes
pub fn test_mode_equivalence<A, B>(seed: u64)
where
    A: ConcurrentSet<i32> + Default,
    B: ConcurrentSet<i32> + Default,
{
    let script = random_script(seed, 10_000, 256);
    let first = A::default();
    let second = B::default();

    assert_ne!(first.mode_name(), second.mode_name());
    assert_eq!(run_script(&first, &script), run_script(&second, &script));
    assert_eq!(first.to_vec(), second.to_vec());
}

/// Disjoint concurrent inserts are all visible afterwards
pub fn test_concurrent_operations<C>()
where
    C: ConcurrentSet<i32> + Default + 'static,
{
    let set = Arc::new(C::default());
    let num_threads = 4;
    let items_per_thread = 100;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for i in 0..items_per_thread {
                    assert!(set.add(thread_id * items_per_thread + i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..(num_threads * items_per_thread) {
        assert!(set.contains(&i), "Missing key: {}", i);
    }
    assert_eq!(set.len(), (num_threads * items_per_thread) as usize);
}

/// A live node at level L is present at every level below L
pub fn test_level_containment<M>()
where
    M: SyncMode,
{
    let set = SkipSet::<i32, M>::new();
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..3_000 {
        let value = rng.i32(0..2_000);
        if rng.bool() {
            set.add(value);
        } else {
            set.remove(&value);
        }
    }

    let mut lower = set.level_snapshot(0);
    assert!(lower.windows(2).all(|w| w[0] < w[1]));

    for level in 1..=MAX_LEVEL {
        let upper = set.level_snapshot(level);
        assert!(upper.windows(2).all(|w| w[0] < w[1]), "level {} out of order", level);
        for value in &upper {
            assert!(
                lower.binary_search(value).is_ok(),
                "{} at level {} but not at level {}",
                value,
                level,
                level - 1
            );
        }
        lower = upper;
    }
}

/// Removal is visible at once and the node is unlinked by the time the
/// removing call returns
pub fn test_eventual_cleanup<M>()
where
    M: SyncMode,
{
    let set = SkipSet::<i32, M>::new();
    for value in 0..500 {
        set.add(value);
    }

    for value in (0..500).step_by(2) {
        assert!(set.remove(&value));
        assert!(!set.contains(&value));
    }

    for level in 0..=MAX_LEVEL {
        assert_eq!(
            set.physical_len(level),
            set.level_snapshot(level).len(),
            "marked node left linked at level {}",
            level
        );
    }
    assert_eq!(set.len(), 250);
    assert_eq!(set.retired(), 250);
}
