//! Test suites shared by every set configuration.
//!
//! Each suite is a generic `pub fn test_*` so that integration tests can run
//! it once per synchronization mode through `rstest` cases.

pub mod skip_set_core_tests;
