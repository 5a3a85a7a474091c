//! Atomic marked pointers: a single-word (successor, mark) cell.
//!
//! Every forward link in the list is an [`AtomicMarkedPtr`]. The mark lives
//! in the low pointer bit so that the pair can be compared-and-swapped as one
//! unit; keeping them in one word is a correctness requirement of the
//! deletion protocol, not an optimization. All bit manipulation goes through
//! `map_addr`/`addr` to stay provenance-safe.

use std::sync::atomic::AtomicPtr;

use crate::ordering::{CAS_FAILURE, CAS_SUCCESS, READ_ORD, WRITE_ORD};

const MARK_BIT: usize = 1;

/// Set mark bit (provenance-safe).
#[inline(always)]
fn mark_ptr<T>(p: *mut T) -> *mut T {
    p.map_addr(|a| a | MARK_BIT)
}

/// Clear mark bit (provenance-safe).
#[inline(always)]
fn unmark_ptr<T>(p: *mut T) -> *mut T {
    p.map_addr(|a| a & !MARK_BIT)
}

/// Check if marked.
#[inline(always)]
fn is_marked<T>(p: *mut T) -> bool {
    p.addr() & MARK_BIT != 0
}

/// Compose a (pointer, mark) pair into a single tagged word.
#[inline(always)]
fn compose<T>(p: *mut T, mark: bool) -> *mut T {
    if mark { mark_ptr(p) } else { unmark_ptr(p) }
}

/// A forward link: one atomic word holding a successor pointer and a mark.
///
/// A set mark means the owning node is logically deleted at this level.
/// The mark is monotone (once set it is never cleared) and every update
/// swaps pointer and mark together.
pub(crate) struct AtomicMarkedPtr<T> {
    link: AtomicPtr<T>,
}

impl<T> AtomicMarkedPtr<T> {
    /// Create an unmarked null link.
    #[inline]
    pub(crate) const fn null() -> Self {
        Self {
            link: AtomicPtr::new(std::ptr::null_mut()),
        }
    }

    /// Load the successor pointer, discarding the mark.
    #[inline]
    pub(crate) fn load_ptr(&self) -> *mut T {
        unmark_ptr(self.link.load(READ_ORD))
    }

    /// Load the (successor, mark) pair.
    #[inline]
    pub(crate) fn load(&self) -> (*mut T, bool) {
        let raw = self.link.load(READ_ORD);
        (unmark_ptr(raw), is_marked(raw))
    }

    /// Store an unmarked successor.
    ///
    /// Only used to initialize the links of a node that is not yet published;
    /// once a node is reachable its links change exclusively through CAS.
    #[inline]
    pub(crate) fn store(&self, ptr: *mut T) {
        self.link.store(unmark_ptr(ptr), WRITE_ORD);
    }

    /// Strong CAS of the full (pointer, mark) pair.
    #[inline]
    pub(crate) fn compare_exchange(
        &self,
        expected_ptr: *mut T,
        expected_mark: bool,
        new_ptr: *mut T,
        new_mark: bool,
    ) -> bool {
        self.link
            .compare_exchange(
                compose(expected_ptr, expected_mark),
                compose(new_ptr, new_mark),
                CAS_SUCCESS,
                CAS_FAILURE,
            )
            .is_ok()
    }

    /// CAS from (expected, unmarked) to (expected, marked).
    ///
    /// The level-0 claim: succeeds for exactly one caller per link.
    #[inline]
    pub(crate) fn test_and_set_mark(&self, expected_ptr: *mut T) -> bool {
        self.compare_exchange(expected_ptr, false, expected_ptr, true)
    }

    /// Unconditionally set the mark, preserving the current successor.
    ///
    /// Loops only while other threads change the successor; once the mark is
    /// observed set, the link can no longer change and the loop exits.
    #[inline]
    pub(crate) fn set_mark(&self) {
        loop {
            let raw = self.link.load(READ_ORD);
            if is_marked(raw) {
                return;
            }
            if self
                .link
                .compare_exchange(raw, mark_ptr(raw), CAS_SUCCESS, CAS_FAILURE)
                .is_ok()
            {
                return;
            }
        }
    }
}

impl<T> std::fmt::Debug for AtomicMarkedPtr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (ptr, mark) = self.load();
        f.debug_struct("AtomicMarkedPtr")
            .field("ptr", &ptr)
            .field("marked", &mark)
            .finish()
    }
}

// ============================================================================
//  Tests
// ============================================================================
