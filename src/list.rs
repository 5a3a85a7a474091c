//! Core lock-free skip list.
//!
//! [`SkipList`] owns the sentinel head and implements the whole mutation
//! protocol: publishing inserts at the bottom level, opportunistic linking of
//! the express lanes, logical deletion via mark bits, and cooperative
//! physical unlinking from the search paths.
//!
//! # Protocol
//!
//! ```text
//! insert:  search -> CAS-publish at level 0 -> CAS-link levels 1..k
//!          -> clear `inserting`
//! pop:     find_first -> bail if inserting -> mark levels k-1..1
//!          -> CAS-mark level 0 (claim) -> winner owns the entry
//! search:  top level down; excises any marked node it crosses; a lost
//!          excision CAS restarts the walk from the head
//! ```
//!
//! Progress is lock-free: a retry is only ever triggered by another thread's
//! successful CAS. Memory reclamation is seize-based; a node is handed to
//! the collector when its last linked level is physically unlinked.

mod dump;
mod reclaim;
mod search;


use std::sync::atomic::AtomicU32;

use seize::{Collector, LocalGuard};

use crate::node::Node;
use crate::ordering::COUNTER_ORD;
use crate::tracing_helpers::{debug_log, trace_log, warn_log};

use search::Position;

/// Gate spins between stall reports. Roughly a millisecond of busy-waiting
/// on current hardware; long enough that hitting it means no consumer is
/// draining the queue.
const GATE_STALL_SPINS: u64 = 1 << 20;

/// The shared core behind both public queue variants.
///
/// `L` is the maximum express-lane level; nodes span `1..=L + 1` levels.
pub(crate) struct SkipList<K, V, const L: usize = 4> {
    /// Sentinel head: full height, never marked, never reclaimed.
    head: *mut Node<K, V>,

    /// Approximate entry count. Incremented after an insert fully links,
    /// decremented by the claim winner; never negative.
    size: AtomicU32,

    /// Capacity bound for the push gate. 0 means unbounded.
    max_size: u32,

    /// Deferred-reclamation domain for unlinked nodes.
    collector: Collector,
}

// SAFETY: nodes are shared between threads exclusively through the atomic
// links and flags; priorities and payloads are immutable after publication
// and may be cloned or dropped on any thread.
unsafe impl<K: Send, V: Send, const L: usize> Send for SkipList<K, V, L> {}
unsafe impl<K: Send + Sync, V: Send + Sync, const L: usize> Sync for SkipList<K, V, L> {}

impl<K: Default, V, const L: usize> SkipList<K, V, L> {
    /// Create an empty list with the given capacity bound (0 = unbounded).
    pub(crate) fn new(max_size: u32) -> Self {
        Self {
            head: Box::into_raw(Box::new(Node::sentinel(Self::HEIGHT))),
            size: AtomicU32::new(0),
            max_size,
            collector: Collector::new(),
        }
    }
}

impl<K, V, const L: usize> SkipList<K, V, L> {
    /// Total number of levels, including level 0.
    pub(crate) const HEIGHT: usize = L + 1;

    /// Enter a protected region and return a guard.
    ///
    /// The guard keeps every node loaded during its lifetime from being
    /// reclaimed underneath the caller.
    #[inline]
    fn guard(&self) -> LocalGuard<'_> {
        self.collector.enter()
    }

    /// Approximate number of entries.
    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.size.load(COUNTER_ORD)
    }

    /// Capacity bound (0 = unbounded).
    #[inline]
    pub(crate) fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Uniform tower height in `1..=L + 1`.
    #[inline]
    fn random_level() -> usize {
        fastrand::usize(1..=Self::HEIGHT)
    }

    /// Spin until the list is under its bound.
    ///
    /// The count is approximate, so the bound is too: a burst of concurrent
    /// pushes can momentarily overshoot by the number of racing producers.
    fn wait_for_capacity(&self) {
        if self.max_size == 0 {
            return;
        }
        let mut spins: u64 = 0;
        while self.size.load(COUNTER_ORD) >= self.max_size {
            std::hint::spin_loop();
            spins += 1;
            if spins % GATE_STALL_SPINS == 0 {
                warn_log!(spins, "push gate stalled waiting for a pop");
            }
        }
    }
}

impl<K: Ord, V, const L: usize> SkipList<K, V, L> {
    /// Insert an entry, blocking while the list is at capacity.
    ///
    /// Linearizes at the bottom-level publishing CAS. Upper levels are
    /// linked opportunistically afterwards; the entry only becomes a pop
    /// candidate once `inserting` clears, so consumers never observe a
    /// half-built tower.
    pub(crate) fn insert(&self, priority: K, value: V) {
        self.wait_for_capacity();

        let level = Self::random_level();
        let node_ptr = Box::into_raw(Box::new(Node::new(priority, value, level)));
        // SAFETY: just allocated and not yet shared; every later access goes
        // through `&self` accessors on the node.
        let node = unsafe { &*node_ptr };

        let guard = self.guard();
        let mut pos = Position::new(Self::HEIGHT);

        loop {
            self.find_insert_position(node.priority(), &mut pos, &guard);
            for lvl in 0..level {
                node.set_next(lvl, pos.succs[lvl]);
            }
            // The publishing CAS: the entry exists once this lands.
            // SAFETY: predecessors returned by the search are protected by
            // `guard` and therefore not reclaimed.
            if unsafe { (*pos.preds[0]).cas_next(0, pos.succs[0], node_ptr) } {
                break;
            }
            trace_log!("bottom-level publish lost, retrying");
        }

        // Link the express lanes. A failure never undoes the insert; the
        // level is retried against a fresh search.
        for lvl in 1..level {
            loop {
                // SAFETY: as above.
                if unsafe { (*pos.preds[lvl]).cas_next(lvl, pos.succs[lvl], node_ptr) } {
                    break;
                }
                trace_log!(lvl, "express-lane link lost, re-searching");
                self.find_insert_position(node.priority(), &mut pos, &guard);
                // The successor may have moved; re-point this level before
                // retrying so the lane never links through a stale node.
                node.set_next(lvl, pos.succs[lvl]);
            }
        }

        node.finish_insert();
        self.size.fetch_add(1, COUNTER_ORD);
        drop(guard);
    }
}

impl<K: Clone, V: Clone, const L: usize> SkipList<K, V, L> {
    /// Claim and return a least-priority entry.
    ///
    /// `None` means the list looked empty, the head entry was still being
    /// inserted, or the claim CAS lost to another consumer. The caller
    /// cannot tell the three apart; each one means "try again later".
    pub(crate) fn pop_first(&self) -> Option<(K, V)> {
        let guard = self.guard();

        let first_ptr = self.find_first(&guard);
        if first_ptr.is_null() {
            return None;
        }
        // SAFETY: returned by the search under `guard`.
        let first = unsafe { &*first_ptr };
        if first.is_inserting() {
            trace_log!("head entry still inserting, backing off");
            return None;
        }

        // Mark the express lanes before contending for ownership. Racing
        // consumers may mark the same levels again; marks are idempotent,
        // and only the level-0 claim decides who owns the entry.
        for level in (1..first.level()).rev() {
            first.mark_next(level);
        }

        let (successor, _) = first.next_and_mark(0);
        let priority = first.priority().clone();
        let value = match first.value() {
            Some(value) => value.clone(),
            None => unreachable!("the sentinel is never returned from a search"),
        };

        if first.try_claim(successor) {
            self.size.fetch_sub(1, COUNTER_ORD);
            debug_log!("claimed head entry");
            drop(guard);
            Some((priority, value))
        } else {
            trace_log!("level-0 claim lost");
            None
        }
    }
}

impl<K, V, const L: usize> Drop for SkipList<K, V, L> {
    fn drop(&mut self) {
        // Exclusive access: no operation is in flight and none can start.
        // Nodes already retired are freed when the collector drops.
        // SAFETY: `head` is the sentinel from the constructor; every node
        // reachable from it was allocated by `insert` via Box::into_raw.
        unsafe { reclaim::teardown_list(self.head) };
    }
}

// ============================================================================
//  Tests
// ============================================================================
