// Marked pointer operations using the least significant bit as the deletion mark.
//
// Bit layout:
//   Bit 0: DELETE_MARK - the node owning this slot is logically removed at this level
//
// Nodes are at least pointer-aligned, so bit 0 of a node address is always zero.
//
const DELETE_MARK: usize = 0b1;

/// A (reference, mark) pair packed into one pointer-sized word.
pub(crate) struct MarkedPtr<T> {
    ptr: *mut T,
}

// Manual impls to avoid requiring T: Clone/Copy/PartialEq
impl<T> Copy for MarkedPtr<T> {}

impl<T> Clone for MarkedPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for MarkedPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for MarkedPtr<T> {}

impl<T> MarkedPtr<T> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Wrap a (possibly marked) raw word loaded from a slot.
    #[inline]
    pub(crate) fn new(ptr: *mut T) -> Self {
        MarkedPtr { ptr }
    }

    /// Pack a clean pointer and a mark flag.
    #[inline]
    pub(crate) fn compose(ptr: *mut T, marked: bool) -> Self {
        debug_assert_eq!(ptr as usize & DELETE_MARK, 0, "unaligned node pointer");
        let bits = if marked {
            ptr as usize | DELETE_MARK
        } else {
            ptr as usize
        };
        MarkedPtr {
            ptr: bits as *mut T,
        }
    }

    /// Strip the mark bit from a raw pointer without creating a MarkedPtr instance.
    #[inline]
    pub(crate) fn unmask(ptr: *mut T) -> *mut T {
        (ptr as usize & !DELETE_MARK) as *mut T
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    /// Get the clean pointer without the mark bit (the one you dereference).
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        Self::unmask(self.ptr)
    }

    /// Get the raw word with the mark bit intact (for CAS operations).
    #[inline]
    pub(crate) fn as_raw(&self) -> *mut T {
        self.ptr
    }

    #[inline]
    pub(crate) fn is_marked(&self) -> bool {
        (self.ptr as usize & DELETE_MARK) != 0
    }

    /// Same reference with the mark set or cleared.
    #[inline]
    pub(crate) fn with_mark(&self, mark: bool) -> Self {
        Self::compose(self.as_ptr(), mark)
    }
}

#[cfg(test)]
mod tests {
    use super::MarkedPtr;

    #[test]
    fn test_mark_round_trip_keeps_reference() {
        let mut value = 7u64;
        let raw = &mut value as *mut u64;

        let clean = MarkedPtr::compose(raw, false);
        assert!(!clean.is_marked());
        assert_eq!(clean.as_raw(), raw);

        let marked = clean.with_mark(true);
        assert!(marked.is_marked());
        assert_eq!(marked.as_ptr(), raw);
        assert_ne!(marked.as_raw(), raw);
        assert_eq!(MarkedPtr::unmask(marked.as_raw()), raw);

        assert!(marked.with_mark(false) == clean);
    }

    #[test]
    fn test_null_can_carry_mark() {
        let marked = MarkedPtr::<u64>::compose(std::ptr::null_mut(), true);
        assert!(marked.is_marked());
        assert!(marked.as_ptr().is_null());
    }
}
