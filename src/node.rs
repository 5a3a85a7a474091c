//! Skip-list nodes.
//!
//! A node participates in `level` levels of the list and owns one forward
//! link per level. All post-publication mutation goes through the atomic
//! links, the `inserting` flag, and the remaining-link count; priority and
//! payload are immutable after construction.

use std::sync::atomic::{AtomicBool, AtomicUsize};

use crate::link::AtomicMarkedPtr;
use crate::ordering::{LINK_DROP_ORD, READ_ORD, WRITE_ORD};

/// One skip-list entry.
///
/// The sentinel head is a `Node` like any other, except that it carries no
/// payload, spans the full list height, and is never marked or reclaimed.
///
/// # Lifecycle
///
/// Created by `push` with `inserting = true`, published by the bottom-level
/// CAS, fully linked once `inserting` clears, logically deleted when a
/// consumer marks its links, physically unlinked level by level by later
/// searches, and retired to the collector when the last level is unlinked.
pub(crate) struct Node<K, V> {
    /// Priority key. Immutable after construction.
    priority: K,

    /// Payload. `None` exactly for the sentinel head.
    value: Option<V>,

    /// True from construction until the inserter has published every level.
    /// Consumers refuse to claim a node while this is set.
    inserting: AtomicBool,

    /// Levels not yet physically unlinked.
    ///
    /// Starts at the tower height. Each successful unlink CAS drops it by
    /// one; whoever drops it to zero hands the node to the collector.
    live_links: AtomicUsize,

    /// Forward links, one per level in `0..level`.
    tower: Box<[AtomicMarkedPtr<Node<K, V>>]>,
}

impl<K, V> Node<K, V> {
    /// Create an entry node with the given tower height, ready for linking.
    pub(crate) fn new(priority: K, value: V, level: usize) -> Self {
        debug_assert!(level >= 1, "a node participates in at least level 0");
        Self {
            priority,
            value: Some(value),
            inserting: AtomicBool::new(true),
            live_links: AtomicUsize::new(level),
            tower: (0..level).map(|_| AtomicMarkedPtr::null()).collect(),
        }
    }

    /// Create the sentinel head: full height, no payload, not inserting.
    pub(crate) fn sentinel(height: usize) -> Self
    where
        K: Default,
    {
        Self {
            priority: K::default(),
            value: None,
            inserting: AtomicBool::new(false),
            live_links: AtomicUsize::new(height),
            tower: (0..height).map(|_| AtomicMarkedPtr::null()).collect(),
        }
    }

    /// Priority key.
    #[inline]
    pub(crate) fn priority(&self) -> &K {
        &self.priority
    }

    /// Payload, if any. The sentinel carries none.
    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Number of levels this node participates in.
    #[inline]
    pub(crate) fn level(&self) -> usize {
        self.tower.len()
    }

    /// Current successor at `level`, mark discarded.
    #[inline]
    pub(crate) fn next(&self, level: usize) -> *mut Node<K, V> {
        self.tower[level].load_ptr()
    }

    /// Atomic load of the (successor, mark) pair at `level`.
    #[inline]
    pub(crate) fn next_and_mark(&self, level: usize) -> (*mut Node<K, V>, bool) {
        self.tower[level].load()
    }

    /// Initialize the successor at `level`.
    ///
    /// Used before the node is reachable at `level`; nothing else may be
    /// racing on this link.
    #[inline]
    pub(crate) fn set_next(&self, level: usize, succ: *mut Node<K, V>) {
        self.tower[level].store(succ);
    }

    /// CAS the link at `level` from (expected, unmarked) to (new, unmarked).
    ///
    /// Both link publication and physical unlink go through this: a marked
    /// link means this node is itself deleted at `level`, and neither may
    /// proceed past it.
    #[inline]
    pub(crate) fn cas_next(
        &self,
        level: usize,
        expected: *mut Node<K, V>,
        new: *mut Node<K, V>,
    ) -> bool {
        self.tower[level].compare_exchange(expected, false, new, false)
    }

    /// Unconditionally mark the link at `level`, preserving the successor.
    #[inline]
    pub(crate) fn mark_next(&self, level: usize) {
        self.tower[level].set_mark();
    }

    /// The level-0 claim: CAS the bottom link from (expected, unmarked) to
    /// (expected, marked). At most one consumer ever wins this.
    #[inline]
    pub(crate) fn try_claim(&self, expected: *mut Node<K, V>) -> bool {
        self.tower[0].test_and_set_mark(expected)
    }

    /// Whether the inserter is still publishing upper levels.
    #[inline]
    pub(crate) fn is_inserting(&self) -> bool {
        self.inserting.load(READ_ORD)
    }

    /// Mark the insertion complete. The node becomes a valid pop candidate.
    #[inline]
    pub(crate) fn finish_insert(&self) {
        self.inserting.store(false, WRITE_ORD);
    }

    /// Account for one physical unlink; returns the remaining level count.
    ///
    /// The caller that receives zero owns retirement.
    #[inline]
    pub(crate) fn release_link(&self) -> usize {
        let prev = self.live_links.fetch_sub(1, LINK_DROP_ORD);
        debug_assert!(prev >= 1, "more unlinks than linked levels");
        prev - 1
    }

    /// Remaining linked levels. Diagnostic only.
    #[cfg(test)]
    pub(crate) fn live_links(&self) -> usize {
        self.live_links.load(crate::ordering::COUNTER_ORD)
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn new_node_starts_inserting() {
        let node: Node<u32, ()> = Node::new(7, (), 3);
        assert!(node.is_inserting());
        assert_eq!(node.level(), 3);
        assert_eq!(*node.priority(), 7);
        assert_eq!(node.value(), Some(&()));
        assert_eq!(node.live_links(), 3);
    }

    #[test]
    fn sentinel_is_not_inserting_and_has_no_value() {
        let head: Node<u32, String> = Node::sentinel(5);
        assert!(!head.is_inserting());
        assert_eq!(head.level(), 5);
        assert!(head.value().is_none());
        assert_eq!(*head.priority(), 0);
    }

    #[test]
    fn finish_insert_clears_flag() {
        let node: Node<u32, ()> = Node::new(1, (), 1);
        node.finish_insert();
        assert!(!node.is_inserting());
    }

    #[test]
    fn claim_succeeds_once() {
        let node: Node<u32, ()> = Node::new(1, (), 2);
        assert!(node.try_claim(ptr::null_mut()));
        assert!(!node.try_claim(ptr::null_mut()));
        assert!(node.next_and_mark(0).1);
    }

    #[test]
    fn claim_fails_on_stale_successor() {
        let node: Node<u32, ()> = Node::new(1, (), 1);
        let mut other: Node<u32, ()> = Node::new(2, (), 1);
        assert!(!node.try_claim(&raw mut other));
        assert!(!node.next_and_mark(0).1);
    }

    #[test]
    fn mark_next_is_idempotent() {
        let node: Node<u32, ()> = Node::new(1, (), 2);
        node.mark_next(1);
        node.mark_next(1);
        assert!(node.next_and_mark(1).1);
        assert!(!node.next_and_mark(0).1);
    }

    #[test]
    fn release_link_counts_down() {
        let node: Node<u32, ()> = Node::new(1, (), 3);
        assert_eq!(node.release_link(), 2);
        assert_eq!(node.release_link(), 1);
        assert_eq!(node.release_link(), 0);
    }

    #[test]
    fn cas_next_links_and_unlinks() {
        let node: Node<u32, ()> = Node::new(1, (), 1);
        let mut a: Node<u32, ()> = Node::new(2, (), 1);
        let mut b: Node<u32, ()> = Node::new(3, (), 1);

        assert!(node.cas_next(0, ptr::null_mut(), &raw mut a));
        assert_eq!(node.next(0), &raw mut a);

        // Stale expected fails.
        assert!(!node.cas_next(0, ptr::null_mut(), &raw mut b));

        assert!(node.cas_next(0, &raw mut a, &raw mut b));
        assert_eq!(node.next(0), &raw mut b);
    }
}
