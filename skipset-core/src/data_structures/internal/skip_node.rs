use std::alloc::{Layout, alloc, dealloc};
use std::cmp::Ordering as KeyOrdering;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use super::MarkedPtr;

/// Position of a node in the total order: the two sentinels bracket every element.
pub(crate) enum NodeKey<T> {
    /// −∞, carried by the head sentinel.
    Head,
    Element(T),
    /// +∞, carried by the tail sentinel.
    Tail,
}

impl<T: Ord> NodeKey<T> {
    /// Compare this key with an element that is about to be searched for.
    #[inline]
    pub(crate) fn cmp_element(&self, target: &T) -> KeyOrdering {
        match self {
            NodeKey::Head => KeyOrdering::Less,
            NodeKey::Element(value) => value.cmp(target),
            NodeKey::Tail => KeyOrdering::Greater,
        }
    }

    #[inline]
    pub(crate) fn is_less_than(&self, target: &T) -> bool {
        self.cmp_element(target) == KeyOrdering::Less
    }

    #[inline]
    pub(crate) fn matches(&self, target: &T) -> bool {
        self.cmp_element(target) == KeyOrdering::Equal
    }
}

/// A skip list node with a tower of forward slots.
///
/// Uses the flexible array member pattern:
/// - Single allocation per node (no separate heap allocation for the tower)
/// - Slots live inline after the struct fields
/// - Layout: [next[0], next[1], ..., next[top_level]]
///
/// The key and the top level never change after allocation; only the mark
/// bits and references stored in `next` do.
///
#[repr(C)]
pub(crate) struct SkipNode<T> {
    key: NodeKey<T>,
    top_level: usize,
    // Flexible array: top_level + 1 slots allocated inline after this struct
    next: [AtomicPtr<SkipNode<T>>; 0],
}

impl<T> SkipNode<T> {
    /// Calculate layout for a node whose tower reaches `top_level` (inclusive).
    fn layout(top_level: usize) -> Layout {
        let tower = Layout::array::<AtomicPtr<Self>>(top_level + 1)
            .expect("skip node tower fits in isize");
        Layout::new::<Self>()
            .extend(tower)
            .expect("skip node layout fits in isize")
            .0
            .pad_to_align()
    }

    /// Allocate a node; every slot starts as an unmarked null reference.
    pub(crate) fn alloc(key: NodeKey<T>, top_level: usize) -> *mut Self {
        unsafe {
            let layout = Self::layout(top_level);
            let node = alloc(layout) as *mut Self;
            if node.is_null() {
                std::alloc::handle_alloc_error(layout);
            }

            ptr::addr_of_mut!((*node).key).write(key);
            ptr::addr_of_mut!((*node).top_level).write(top_level);

            let slots = ptr::addr_of_mut!((*node).next) as *mut AtomicPtr<Self>;
            for level in 0..=top_level {
                ptr::write(slots.add(level), AtomicPtr::new(ptr::null_mut()));
            }

            node
        }
    }

    /// Free a node and drop its key.
    ///
    /// # Safety
    /// The pointer must come from [`SkipNode::alloc`], must be freed only once,
    /// and no other thread may still dereference it.
    pub(crate) unsafe fn dealloc(node: *mut Self) {
        unsafe {
            let layout = Self::layout((*node).top_level);
            ptr::drop_in_place(&mut (*node).key);
            dealloc(node as *mut u8, layout);
        }
    }

    /// Free a node that was never published and hand its element back.
    ///
    /// # Safety
    /// Same as [`SkipNode::dealloc`]; additionally the node must hold an element.
    pub(crate) unsafe fn reclaim_element(node: *mut Self) -> T {
        unsafe {
            let layout = Self::layout((*node).top_level);
            let key = ptr::read(&(*node).key);
            dealloc(node as *mut u8, layout);
            match key {
                NodeKey::Element(value) => value,
                NodeKey::Head | NodeKey::Tail => unreachable!("sentinels are never reclaimed"),
            }
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &NodeKey<T> {
        &self.key
    }

    /// The stored element, `None` for sentinels.
    #[inline]
    pub(crate) fn element(&self) -> Option<&T> {
        match &self.key {
            NodeKey::Element(value) => Some(value),
            NodeKey::Head | NodeKey::Tail => None,
        }
    }

    #[inline]
    pub(crate) fn is_tail(&self) -> bool {
        matches!(self.key, NodeKey::Tail)
    }

    #[inline]
    pub(crate) fn top_level(&self) -> usize {
        self.top_level
    }

    // =========================================================================
    // Slot access (indices 0..=top_level)
    // =========================================================================

    #[inline]
    fn slot(&self, level: usize) -> &AtomicPtr<SkipNode<T>> {
        debug_assert!(level <= self.top_level, "level {} above tower", level);
        unsafe { &*self.next.as_ptr().add(level) }
    }

    /// Load the (successor, mark) pair at `level` (Acquire ordering).
    #[inline]
    pub(crate) fn load_next(&self, level: usize) -> MarkedPtr<SkipNode<T>> {
        MarkedPtr::new(self.slot(level).load(Ordering::Acquire))
    }

    /// Store a pair at `level`. Only valid before the node is published or
    /// for slots no other thread can CAS concurrently.
    #[inline]
    pub(crate) fn store_next(&self, level: usize, next: MarkedPtr<SkipNode<T>>) {
        self.slot(level).store(next.as_raw(), Ordering::Release)
    }

    /// CAS the pair at `level` from `expected` to `new`.
    ///
    /// Returns the observed pair on failure.
    #[inline]
    pub(crate) fn cas_next(
        &self,
        level: usize,
        expected: MarkedPtr<SkipNode<T>>,
        new: MarkedPtr<SkipNode<T>>,
    ) -> Result<(), MarkedPtr<SkipNode<T>>> {
        self.slot(level)
            .compare_exchange(
                expected.as_raw(),
                new.as_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(MarkedPtr::new)
    }

    /// A node is logically removed once its level-0 slot carries the mark.
    #[inline]
    pub(crate) fn is_removed(&self) -> bool {
        self.load_next(0).is_marked()
    }
}
