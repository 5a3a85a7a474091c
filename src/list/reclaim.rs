//! Reclaim helpers for seize-based memory reclamation.

use std::collections::HashSet;

use seize::Collector;

use crate::node::Node;

/// Reclaim a boxed node (seize callback).
///
/// # Safety
///
/// - `ptr` must point to a valid `Node<K, V>` allocated via `Box::into_raw`.
/// - Must only be called after seize determines it's safe (no readers).
pub(super) unsafe fn reclaim_node_boxed<K, V>(ptr: *mut Node<K, V>, _collector: &Collector) {
    // SAFETY: Caller guarantees ptr is valid and from Box::into_raw.
    // Seize ensures no readers remain.
    unsafe { drop(Box::from_raw(ptr)) };
}

/// Free every node still reachable from `head`, then the head itself.
///
/// A node unlinked at level 0 can still be linked above it, so every level
/// is walked and the pointers de-duplicated before anything is dropped.
/// Fully unlinked nodes were already retired and are unreachable here; the
/// collector frees them when it drops.
///
/// # Safety
///
/// - `head` must be the list's sentinel, allocated via `Box::into_raw`.
/// - The caller must have exclusive access: no operation in flight, none
///   able to start.
pub(super) unsafe fn teardown_list<K, V>(head: *mut Node<K, V>) {
    let mut reachable: HashSet<*mut Node<K, V>> = HashSet::new();

    // SAFETY: the head stays valid until freed at the end of this function,
    // and nothing is dropped while the chains are being walked.
    let head_ref = unsafe { &*head };
    for level in 0..head_ref.level() {
        let mut curr = head_ref.next(level);
        while !curr.is_null() {
            reachable.insert(curr);
            // SAFETY: every pointer in the chains is live or
            // unlinked-but-unretired; retired nodes are unreachable.
            curr = unsafe { (*curr).next(level) };
        }
    }

    for ptr in reachable {
        // SAFETY: collected exactly once above; allocated by insert via
        // Box::into_raw and never retired (it was still reachable).
        unsafe { drop(Box::from_raw(ptr)) };
    }

    // SAFETY: the sentinel came from Box::into_raw in the constructor.
    unsafe { drop(Box::from_raw(head)) };
}
