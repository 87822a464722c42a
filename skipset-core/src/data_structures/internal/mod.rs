//! Internal implementation details.
//!
//! These are pub(crate) and not intended for external use.

pub mod marked_ptr;
pub mod skip_node;

pub(crate) use marked_ptr::MarkedPtr;
pub(crate) use skip_node::{NodeKey, SkipNode};
