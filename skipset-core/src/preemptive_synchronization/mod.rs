//! Blocking and pacing primitives shared by the set and its drivers.

pub mod backoff;
pub mod countdown_event;
pub mod sync_mode;

pub use backoff::{Backoff, ExponentialBackoff, Spin};
pub use countdown_event::CountdownEvent;
pub use sync_mode::{LockFree, Locked, SyncMode};
