use rstest::rstest;
use serial_test::serial;
use skipset_core::common_tests::skip_set_stress_tests::*;
use skipset_core::{
    ConcurrentSet, ExponentialBackoff, LockFree, LockFreeSkipSet, Locked, LockedSkipSet, SkipSet,
    SyncMode,
};

// Trait for type-level parametrization
trait TestSyncMode {
    type Mode: SyncMode + 'static;
    type SetType: ConcurrentSet<i32> + Default + 'static;
}

struct UseLockFree;
struct UseLocked;
struct UseLockFreeBackoff;

impl TestSyncMode for UseLockFree {
    type Mode = LockFree;
    type SetType = LockFreeSkipSet<i32>;
}

impl TestSyncMode for UseLocked {
    type Mode = Locked;
    type SetType = LockedSkipSet<i32>;
}

impl TestSyncMode for UseLockFreeBackoff {
    type Mode = LockFree;
    type SetType = SkipSet<i32, LockFree, ExponentialBackoff>;
}

#[rstest]
#[serial(stress_tests)]
fn stress_linearizability_locked() {
    test_concurrent_linearizability::<LockedSkipSet<i32>>(30, 10_000, 200);
}

#[rstest]
#[serial(stress_tests)]
#[case::lock_free(UseLockFree)]
#[case::locked(UseLocked)]
#[case::lock_free_backoff(UseLockFreeBackoff)]
fn stress_concurrent_remove_same_value<T: TestSyncMode>(#[case] _type: T) {
    test_concurrent_remove_same_value::<T::SetType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::lock_free(UseLockFree)]
#[case::locked(UseLocked)]
#[case::lock_free_backoff(UseLockFreeBackoff)]
fn stress_concurrent_add_same_value<T: TestSyncMode>(#[case] _type: T) {
    test_concurrent_add_same_value::<T::SetType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::lock_free(UseLockFree)]
#[case::locked(UseLocked)]
fn stress_contains_during_modifications<T: TestSyncMode>(#[case] _type: T) {
    test_contains_during_modifications::<T::SetType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::lock_free(UseLockFree)]
#[case::locked(UseLocked)]
#[case::lock_free_backoff(UseLockFreeBackoff)]
fn stress_extreme_contention_single_key<T: TestSyncMode>(#[case] _type: T) {
    test_extreme_contention_single_key::<T::SetType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::lock_free(UseLockFree)]
#[case::locked(UseLocked)]
fn stress_cleanup_after_contention<T: TestSyncMode>(#[case] _type: T) {
    test_cleanup_after_contention::<T::Mode>();
}
