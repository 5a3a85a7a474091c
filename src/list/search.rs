//! Search core: top-down traversal with cooperative cleanup.
//!
//! Both entry points excise every logically deleted node they cross, so
//! physical unlinking rides along with ordinary searches instead of being a
//! separate phase. A lost excision CAS means another thread restructured the
//! list first; the walk restarts from the head, which keeps the whole
//! protocol lock-free (every retry is caused by someone else's progress).

use seize::{Guard as _, LocalGuard};

use crate::node::Node;
use crate::tracing_helpers::trace_log;

use super::SkipList;
use super::reclaim::reclaim_node_boxed;

/// Per-level predecessors and successors for an insertion.
///
/// `preds[lvl]` is the last node ordered strictly before the key at `lvl`;
/// `succs[lvl]` is its successor (null at the tail). Buffers are reused
/// across the retries of a single insert.
pub(super) struct Position<K, V> {
    pub(super) preds: Vec<*mut Node<K, V>>,
    pub(super) succs: Vec<*mut Node<K, V>>,
}

impl<K, V> Position<K, V> {
    pub(super) fn new(height: usize) -> Self {
        Self {
            preds: vec![std::ptr::null_mut(); height],
            succs: vec![std::ptr::null_mut(); height],
        }
    }
}

impl<K: Ord, V, const L: usize> SkipList<K, V, L> {
    /// Locate, at every level, the insertion point for `priority`.
    ///
    /// The predecessor is the last node strictly less than the key, so new
    /// entries land at the tail of any equal-key run. Marked nodes crossed
    /// on the way are unlinked in passing.
    pub(super) fn find_insert_position(
        &self,
        priority: &K,
        pos: &mut Position<K, V>,
        guard: &LocalGuard<'_>,
    ) {
        'restart: loop {
            let mut pred = self.head;
            for level in (0..Self::HEIGHT).rev() {
                // SAFETY: `pred` is the head or a node reached through a
                // live link while `guard` is held.
                let mut curr = unsafe { (*pred).next(level) };
                loop {
                    if curr.is_null() {
                        break;
                    }
                    // SAFETY: loaded from a live link under `guard`.
                    let (mut succ, mut marked) = unsafe { (*curr).next_and_mark(level) };
                    while marked {
                        if !self.unlink(pred, curr, succ, level, guard) {
                            trace_log!(level, "excision lost, restarting search");
                            continue 'restart;
                        }
                        curr = succ;
                        if curr.is_null() {
                            marked = false;
                        } else {
                            // SAFETY: as above.
                            (succ, marked) = unsafe { (*curr).next_and_mark(level) };
                        }
                    }
                    if curr.is_null() {
                        break;
                    }
                    // SAFETY: `curr` is unmarked here and protected by `guard`.
                    if unsafe { (*curr).priority() } < priority {
                        pred = curr;
                        curr = succ;
                    } else {
                        break;
                    }
                }
                pos.preds[level] = pred;
                pos.succs[level] = curr;
            }
            return;
        }
    }
}

impl<K, V, const L: usize> SkipList<K, V, L> {
    /// Return the first live node at level 0, or null if the list is empty.
    ///
    /// Descends from the top, unlinking any run of marked nodes sitting at
    /// the front of each level; the head is the predecessor throughout.
    pub(super) fn find_first(&self, guard: &LocalGuard<'_>) -> *mut Node<K, V> {
        'restart: loop {
            let pred = self.head;
            for level in (0..Self::HEIGHT).rev() {
                // SAFETY: the head outlives the list.
                let mut curr = unsafe { (*pred).next(level) };
                if curr.is_null() {
                    if level == 0 {
                        return std::ptr::null_mut();
                    }
                    continue;
                }
                // SAFETY: loaded from a live link under `guard`.
                let (mut succ, mut marked) = unsafe { (*curr).next_and_mark(level) };
                while marked {
                    if !self.unlink(pred, curr, succ, level, guard) {
                        trace_log!(level, "excision lost, restarting search");
                        continue 'restart;
                    }
                    curr = succ;
                    if curr.is_null() {
                        marked = false;
                    } else {
                        // SAFETY: as above.
                        (succ, marked) = unsafe { (*curr).next_and_mark(level) };
                    }
                }
                if level == 0 {
                    return curr;
                }
            }
        }
    }

    /// Swing `pred`'s link at `level` past the logically deleted `curr`.
    ///
    /// On success, drops `curr`'s remaining-link count; whichever unlink
    /// clears the last level hands the node to the collector. Returns false
    /// when the CAS loses, in which case the caller restarts from the head.
    fn unlink(
        &self,
        pred: *mut Node<K, V>,
        curr: *mut Node<K, V>,
        succ: *mut Node<K, V>,
        level: usize,
        guard: &LocalGuard<'_>,
    ) -> bool {
        // SAFETY: both nodes were reached through live links under `guard`.
        // The CAS expects `pred`'s link unmarked, so a node that is itself
        // deleted can never act as the unlinking predecessor; per (node,
        // level) at most one of these CASes ever succeeds.
        if !unsafe { (*pred).cas_next(level, curr, succ) } {
            return false;
        }
        // SAFETY: `curr` is still protected by `guard`.
        if unsafe { (*curr).release_link() } == 0 {
            // No level links this node anymore, so no traversal starting
            // after this point can reach it; readers that already hold it
            // entered before the retirement and are covered by their guards.
            // SAFETY: `curr` came from Box::into_raw in insert and is now
            // unreachable from the head at every level.
            unsafe { guard.defer_retire(curr, reclaim_node_boxed::<K, V>) };
        }
        true
    }
}
