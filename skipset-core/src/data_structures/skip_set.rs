use std::fmt::{self, Debug, Write};
use std::marker::PhantomData;
use std::ptr;

use crate::data_structures::internal::{NodeKey, SkipNode};
use crate::data_structures::{ConcurrentSet, MarkedPtr};
use crate::guard::{DeferredGuard, Guard};
use crate::linearizability::{OperationKind, OperationRecorder};
use crate::preemptive_synchronization::{Backoff, LockFree, Locked, Spin, SyncMode};

/// Highest level index; sentinels carry slots `0..=MAX_LEVEL`.
pub const MAX_LEVEL: usize = 10;
/// Probability that level sampling stops at each step.
pub const PROBABILITY: f64 = 0.75;

type NodePtr<T> = *mut SkipNode<T>;
type Tower<T> = [NodePtr<T>; MAX_LEVEL + 1];

// =============================================================================
// SKIP SET INVARIANTS
// =============================================================================
//
// Level 3:  HEAD ─────────────────────────────────────► 30 ─────────────────► TAIL
//             │                                          │
// Level 2:  HEAD ──────────► 10 ─────────────────────► 30 ─────────────────► TAIL
//             │               │                          │
// Level 1:  HEAD ──────────► 10 ──────────► 20 ──────► 30 ─────────────────► TAIL
//             │               │              │           │
// Level 0:  HEAD ──────────► 10 ──────────► 20 ──────► 30 ──────────► 40 ──► TAIL
//
// Marked pointer: the mark bit on node.next[level] says the NODE is logically
//                 deleted at that level. Marking runs top-down, level 0 last.
//
// INVARIANTS:
// 1. Live (unmarked) nodes are in strictly increasing key order at every level
// 2. HEAD and TAIL span every level, are never marked, never removed
// 3. A live node linked at level L is linked at every level below L
// 4. The level-0 mark is the linearization point of remove; exactly one
//    remover sets it and that remover alone hands the node to the guard
// 5. The level-0 publish CAS is the linearization point of a successful add
//
// =============================================================================
// REMOVE (Two-Phase Delete)
// =============================================================================
//
// Phase 1: LOGICAL DELETE (mark node.next at top_level..=1, then level 0)
// Phase 2: PHYSICAL UNLINK (any find that meets the marked node splices it)
//
// Before:  pred ──────► node ──────► next
//
// Mark:    pred ──────► node ──╳───► next
//
// Splice (CAS pred.next from (node, unmarked) to (next, unmarked)):
//          pred ─────────────────────► next
//                       node ──╳───► next  (unlinked, still readable)
//
// A failed splice means pred changed under us (pred got marked, or a node was
// inserted after pred); find restarts from HEAD.
//
// =============================================================================

/// Result of one complete top-down search.
struct Position<T> {
    /// Level-0 stop node carries the target key.
    found: bool,
    /// Last node with key < target at each level.
    preds: Tower<T>,
    /// First unmarked node with key >= target at each level.
    succs: Tower<T>,
}

/// Outcome of the decisive step of an `add`.
enum Publish<T> {
    /// The value was already present.
    Present,
    /// The node is visible at level 0; upper levels still need linking.
    Linked { node: NodePtr<T>, position: Position<T> },
    /// The level-0 CAS lost; the unpublished node has been freed.
    Contended(T),
}

/// A concurrent ordered set built on a multi-level linked skip list.
///
/// - `M`: synchronization discipline around each decisive step ([`LockFree`], [`Locked`])
/// - `B`: pacing of contended retries ([`Spin`], [`crate::ExponentialBackoff`])
/// - `G`: reclamation of removed nodes ([`DeferredGuard`])
///
/// Elements are ordered by `T: Ord`; elements comparing equal are the same
/// set element.
///
pub struct SkipSet<T, M = LockFree, B = Spin, G = DeferredGuard> {
    head: NodePtr<T>,
    tail: NodePtr<T>,
    mode: M,
    backoff: B,
    guard: G,
    _owns: PhantomData<T>,
}

pub type LockFreeSkipSet<T> = SkipSet<T, LockFree>;
pub type LockedSkipSet<T> = SkipSet<T, Locked>;

impl<T, M, B, G> SkipSet<T, M, B, G>
where
    T: Ord + Clone,
    M: SyncMode,
    B: Backoff,
    G: Guard,
{
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::with_backoff(B::default())
    }

    pub fn with_backoff(backoff: B) -> Self {
        let head = SkipNode::alloc(NodeKey::Head, MAX_LEVEL);
        let tail = SkipNode::alloc(NodeKey::Tail, MAX_LEVEL);

        unsafe {
            for level in 0..=MAX_LEVEL {
                (*head).store_next(level, MarkedPtr::compose(tail, false));
            }
        }

        SkipSet {
            head,
            tail,
            mode: M::default(),
            backoff,
            guard: G::default(),
            _owns: PhantomData,
        }
    }

    /// Sample a top level: climb while a coin with probability `1 - PROBABILITY`
    /// succeeds, capped at `MAX_LEVEL`.
    #[inline]
    fn random_level() -> usize {
        let mut level = 0;
        while level < MAX_LEVEL && fastrand::f64() >= PROBABILITY {
            level += 1;
        }
        level
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Insert `value`. Returns `false` if an equal element is already present.
    pub fn add(&self, value: T) -> bool {
        self.add_internal(value, None)
    }

    /// Remove `value`. Returns `false` if it was absent or another remover won.
    pub fn remove(&self, value: &T) -> bool {
        self.remove_internal(value, None)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.contains_internal(value, None)
    }

    /// [`SkipSet::add`], recording the outcome at its linearization point.
    pub fn add_recorded(&self, value: T, recorder: &OperationRecorder<T>) -> bool {
        self.add_internal(value, Some(recorder))
    }

    pub fn remove_recorded(&self, value: &T, recorder: &OperationRecorder<T>) -> bool {
        self.remove_internal(value, Some(recorder))
    }

    pub fn contains_recorded(&self, value: &T, recorder: &OperationRecorder<T>) -> bool {
        self.contains_internal(value, Some(recorder))
    }

    /// Live elements in ascending order.
    pub fn to_vec(&self) -> Vec<T> {
        self.level_snapshot(0)
    }

    pub fn len(&self) -> usize {
        self.chain_len(0, false)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode_name(&self) -> &'static str {
        M::NAME
    }

    /// Nodes still awaiting reclamation by the guard.
    pub fn retired(&self) -> usize {
        self.guard.pending()
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Locate predecessors and successors of `target` at every level,
    /// splicing out marked nodes met on the way.
    ///
    /// A failed splice restarts the whole traversal from HEAD.
    fn find(&self, target: &T) -> Position<T> {
        let mut attempt = 0u32;

        'retry: loop {
            let mut preds: Tower<T> = [ptr::null_mut(); MAX_LEVEL + 1];
            let mut succs: Tower<T> = [ptr::null_mut(); MAX_LEVEL + 1];
            let mut pred = self.head;

            for level in (0..=MAX_LEVEL).rev() {
                unsafe {
                    let mut curr = (*pred).load_next(level).as_ptr();

                    loop {
                        let mut succ = (*curr).load_next(level);

                        while succ.is_marked() {
                            let unlinked = (*pred).cas_next(
                                level,
                                MarkedPtr::compose(curr, false),
                                MarkedPtr::compose(succ.as_ptr(), false),
                            );
                            if unlinked.is_err() {
                                attempt += 1;
                                tracing::trace!(level, attempt, "splice lost, restarting find");
                                self.backoff.wait(attempt);
                                continue 'retry;
                            }
                            curr = succ.as_ptr();
                            succ = (*curr).load_next(level);
                        }

                        if (*curr).key().is_less_than(target) {
                            pred = curr;
                            curr = succ.as_ptr();
                        } else {
                            break;
                        }
                    }

                    preds[level] = pred;
                    succs[level] = curr;
                }
            }

            let found = unsafe { (*succs[0]).key().matches(target) };
            return Position {
                found,
                preds,
                succs,
            };
        }
    }

    /// Side-effect-free membership test: marked nodes are stepped over,
    /// never spliced.
    fn search(&self, target: &T) -> bool {
        let mut pred = self.head;
        let mut curr = self.head;

        for level in (0..=MAX_LEVEL).rev() {
            unsafe {
                curr = (*pred).load_next(level).as_ptr();

                loop {
                    let mut succ = (*curr).load_next(level);
                    while succ.is_marked() {
                        curr = succ.as_ptr();
                        succ = (*curr).load_next(level);
                    }

                    if (*curr).key().is_less_than(target) {
                        pred = curr;
                        curr = succ.as_ptr();
                    } else {
                        break;
                    }
                }
            }
        }

        unsafe { (*curr).key().matches(target) }
    }

    // =========================================================================
    // Add
    // =========================================================================

    fn add_internal(&self, value: T, recorder: Option<&OperationRecorder<T>>) -> bool {
        let mut value = value;
        let mut attempt = 0u32;

        loop {
            // Every attempt is a fresh one: new level, new find
            let top_level = Self::random_level();

            match self
                .mode
                .decisive(|| self.try_publish(value, top_level, recorder))
            {
                Publish::Present => return false,
                Publish::Linked { node, position } => {
                    self.link_upper_levels(node, position);
                    return true;
                }
                Publish::Contended(returned) => {
                    value = returned;
                    attempt += 1;
                    tracing::trace!(attempt, "level-0 publish lost, retrying add");
                    self.backoff.wait(attempt);
                }
            }
        }
    }

    /// Decisive step of `add`: find, then CAS the new node in at level 0.
    fn try_publish(
        &self,
        value: T,
        top_level: usize,
        recorder: Option<&OperationRecorder<T>>,
    ) -> Publish<T> {
        let position = self.find(&value);

        if position.found {
            if let Some(recorder) = recorder {
                recorder.record(OperationKind::Add, value, false);
            }
            return Publish::Present;
        }

        let operand = recorder.map(|_| value.clone());
        let node = SkipNode::alloc(NodeKey::Element(value), top_level);

        unsafe {
            for level in 0..=top_level {
                (*node).store_next(level, MarkedPtr::compose(position.succs[level], false));
            }

            let published = (*position.preds[0]).cas_next(
                0,
                MarkedPtr::compose(position.succs[0], false),
                MarkedPtr::compose(node, false),
            );

            if published.is_err() {
                // Never reachable by other threads, we still own it
                return Publish::Contended(SkipNode::reclaim_element(node));
            }
        }

        if let (Some(recorder), Some(operand)) = (recorder, operand) {
            recorder.record(OperationKind::Add, operand, true);
        }

        Publish::Linked { node, position }
    }

    /// Link a published node at levels `1..=top_level`.
    ///
    /// A failed CAS refreshes the position with a new find and retries only
    /// that level. Linking stops as soon as the node is being removed; upper
    /// links only speed up searches.
    fn link_upper_levels(&self, node: NodePtr<T>, mut position: Position<T>) {
        let (top_level, key) = unsafe {
            match (*node).element() {
                Some(key) => ((*node).top_level(), key),
                None => return,
            }
        };
        let mut attempt = 0u32;

        for level in 1..=top_level {
            loop {
                unsafe {
                    let own_next = (*node).load_next(level);
                    if own_next.is_marked() || (*node).is_removed() {
                        return;
                    }

                    let succ = position.succs[level];
                    let refreshed = own_next.as_ptr() == succ
                        || (*node)
                            .cas_next(level, own_next, MarkedPtr::compose(succ, false))
                            .is_ok();

                    if refreshed
                        && (*position.preds[level])
                            .cas_next(
                                level,
                                MarkedPtr::compose(succ, false),
                                MarkedPtr::compose(node, false),
                            )
                            .is_ok()
                    {
                        break;
                    }
                }

                attempt += 1;
                self.backoff.wait(attempt);
                position = self.find(key);
                if position.succs[0] != node {
                    // Removed and spliced out at level 0 meanwhile
                    return;
                }
            }
        }
    }

    // =========================================================================
    // Remove
    // =========================================================================

    fn remove_internal(&self, value: &T, recorder: Option<&OperationRecorder<T>>) -> bool {
        match self.mode.decisive(|| self.try_mark(value, recorder)) {
            Some(node) => {
                // Best-effort physical cleanup
                let _ = self.find(value);
                unsafe {
                    self.guard.defer_destroy(node, SkipNode::dealloc);
                }
                true
            }
            None => false,
        }
    }

    /// Decisive step of `remove`: find, mark the tower top-down, and race for
    /// the level-0 mark. Returns the node only to the winner.
    fn try_mark(&self, value: &T, recorder: Option<&OperationRecorder<T>>) -> Option<NodePtr<T>> {
        let position = self.find(value);

        if !position.found {
            if let Some(recorder) = recorder {
                recorder.record(OperationKind::Remove, value.clone(), false);
            }
            return None;
        }

        let node = position.succs[0];

        unsafe {
            for level in (1..=(*node).top_level()).rev() {
                let mut succ = (*node).load_next(level);
                while !succ.is_marked() {
                    match (*node).cas_next(level, succ, succ.with_mark(true)) {
                        Ok(()) => break,
                        Err(observed) => succ = observed,
                    }
                }
            }

            let mut succ = (*node).load_next(0);
            loop {
                if succ.is_marked() {
                    // Another remover owns the node
                    if let Some(recorder) = recorder {
                        recorder.record(OperationKind::Remove, value.clone(), false);
                    }
                    return None;
                }

                match (*node).cas_next(0, succ, succ.with_mark(true)) {
                    Ok(()) => {
                        if let Some(recorder) = recorder {
                            recorder.record(OperationKind::Remove, value.clone(), true);
                        }
                        return Some(node);
                    }
                    Err(observed) => succ = observed,
                }
            }
        }
    }

    // =========================================================================
    // Contains
    // =========================================================================

    fn contains_internal(&self, value: &T, recorder: Option<&OperationRecorder<T>>) -> bool {
        self.mode.decisive(|| {
            let found = self.search(value);
            if let Some(recorder) = recorder {
                recorder.record(OperationKind::Contains, value.clone(), found);
            }
            found
        })
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Live elements linked at `level`, in chain order.
    pub fn level_snapshot(&self, level: usize) -> Vec<T> {
        let mut values = Vec::new();
        self.walk(level, |node| {
            if !node.is_removed() {
                if let Some(value) = node.element() {
                    values.push(value.clone());
                }
            }
        });
        values
    }

    /// Nodes physically linked at `level`, including marked ones not yet
    /// spliced out.
    pub fn physical_len(&self, level: usize) -> usize {
        self.chain_len(level, true)
    }

    fn chain_len(&self, level: usize, include_removed: bool) -> usize {
        let mut count = 0;
        self.walk(level, |node| {
            if include_removed || !node.is_removed() {
                count += 1;
            }
        });
        count
    }

    fn walk(&self, level: usize, mut visit: impl FnMut(&SkipNode<T>)) {
        assert!(level <= MAX_LEVEL, "level {} above MAX_LEVEL", level);
        unsafe {
            let mut curr = (*self.head).load_next(level).as_ptr();
            while !(*curr).is_tail() {
                visit(&*curr);
                curr = (*curr).load_next(level).as_ptr();
            }
        }
    }
}

impl<T, M, B, G> SkipSet<T, M, B, G>
where
    T: Ord + Clone + Debug,
    M: SyncMode,
    B: Backoff,
    G: Guard,
{
    /// Per-level listing of live values, top level first. Debugging only.
    pub fn dump(&self) -> String {
        let mut out = format!("SkipSet<{}> {{", M::NAME);
        for level in (0..=MAX_LEVEL).rev() {
            let _ = write!(out, "\n    {}: ", level);
            for value in self.level_snapshot(level) {
                let _ = write!(out, "{:?} ", value);
            }
        }
        out.push_str("\n}");
        out
    }
}

impl<T, M, B, G> fmt::Display for SkipSet<T, M, B, G>
where
    T: Ord + Clone + Debug,
    M: SyncMode,
    B: Backoff,
    G: Guard,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl<T, M, B, G> Default for SkipSet<T, M, B, G>
where
    T: Ord + Clone,
    M: SyncMode,
    B: Backoff,
    G: Guard,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M, B, G> Drop for SkipSet<T, M, B, G> {
    fn drop(&mut self) {
        unsafe {
            let mut curr = (*self.head).load_next(0).as_ptr();

            while curr != self.tail {
                let next = (*curr).load_next(0);
                // Marked nodes were handed to the guard by their remover
                if !next.is_marked() {
                    SkipNode::dealloc(curr);
                }
                curr = next.as_ptr();
            }

            SkipNode::dealloc(self.head);
            SkipNode::dealloc(self.tail);
        }
    }
}

// Safety: all shared node state is accessed through atomics; elements are
// moved in by `add` and read concurrently by traversals
unsafe impl<T: Send + Sync, M: Send, B: Send, G: Send> Send for SkipSet<T, M, B, G> {}
unsafe impl<T: Send + Sync, M: Sync, B: Sync, G: Sync> Sync for SkipSet<T, M, B, G> {}

// ============================================================================
// ConcurrentSet trait implementation
// ============================================================================

impl<T, M, B, G> ConcurrentSet<T> for SkipSet<T, M, B, G>
where
    T: Ord + Clone + Send + Sync,
    M: SyncMode,
    B: Backoff,
    G: Guard,
{
    fn add(&self, value: T) -> bool {
        self.add_internal(value, None)
    }

    fn remove(&self, value: &T) -> bool {
        self.remove_internal(value, None)
    }

    fn contains(&self, value: &T) -> bool {
        self.contains_internal(value, None)
    }

    fn add_recorded(&self, value: T, recorder: &OperationRecorder<T>) -> bool {
        self.add_internal(value, Some(recorder))
    }

    fn remove_recorded(&self, value: &T, recorder: &OperationRecorder<T>) -> bool {
        self.remove_internal(value, Some(recorder))
    }

    fn contains_recorded(&self, value: &T, recorder: &OperationRecorder<T>) -> bool {
        self.contains_internal(value, Some(recorder))
    }

    fn to_vec(&self) -> Vec<T> {
        self.level_snapshot(0)
    }

    fn len(&self) -> usize {
        self.chain_len(0, false)
    }

    fn mode_name(&self) -> &'static str {
        M::NAME
    }
}
