//! Diagnostic snapshot of the chains.
//!
//! A lock-free scan, not linearizable: concurrent mutation can be observed
//! mid-flight. Debug aid only.

use std::fmt::Write as _;

use super::SkipList;

impl<K, V, const L: usize> SkipList<K, V, L> {
    /// Render the bottom chain (or every level) into a string.
    ///
    /// `entry` writes one line per node and receives the node's priority,
    /// payload, and whether its link at the scanned level is marked.
    pub(crate) fn dump_with<F>(&self, all_levels: bool, mut entry: F) -> String
    where
        F: FnMut(&mut String, &K, Option<&V>, bool),
    {
        let guard = self.guard();
        let mut out = String::new();
        let top = if all_levels { L } else { 0 };

        for level in 0..=top {
            if all_levels {
                let _ = writeln!(out, "Queue at level {level}:");
            } else {
                let _ = writeln!(out, "Queue:");
            }

            // SAFETY: the head outlives the list.
            let head = unsafe { &*self.head };
            let mut curr = head.next(level);
            while !curr.is_null() {
                // SAFETY: reached through a live link while `guard` is held.
                let node = unsafe { &*curr };
                let (next, marked) = node.next_and_mark(level);
                entry(&mut out, node.priority(), node.value(), marked);
                curr = next;
            }
        }

        drop(guard);
        out
    }
}
