//! Public queue surfaces.
//!
//! Two variants share the core list: [`PriorityQueue`] carries priorities
//! only, [`KvPriorityQueue`] pairs each priority with an opaque payload.
//! Queues are `Send + Sync` for shareable key/value types and are never
//! cloneable; moving one transfers ownership outright.

use std::fmt::{self, Display, Write as _};

use crate::list::SkipList;

// ============================================================================
//  PriorityQueue
// ============================================================================

/// A lock-free priority queue over priorities alone.
///
/// `L` is the compile-time maximum express-lane level (default 4, list
/// height `L + 1`). Smaller priorities pop first; the order among equal
/// priorities is unspecified beyond "new entries join the tail of the run".
///
/// # Example
///
/// ```rust
/// use spire::PriorityQueue;
///
/// let queue: PriorityQueue<u32> = PriorityQueue::new();
/// queue.push(5);
/// queue.push(1);
/// queue.push(3);
///
/// assert_eq!(queue.try_pop(), Some(1));
/// assert_eq!(queue.try_pop(), Some(3));
/// assert_eq!(queue.try_pop(), Some(5));
/// assert_eq!(queue.try_pop(), None);
/// ```
pub struct PriorityQueue<K, const L: usize = 4> {
    list: SkipList<K, (), L>,
}

impl<K: Ord + Default, const L: usize> PriorityQueue<K, L> {
    /// Create an unbounded queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_size(0)
    }

    /// Create a queue that gates `push` at `max_size` entries.
    ///
    /// 0 means unbounded. The bound tracks the approximate size counter, so
    /// a burst of concurrent pushes can momentarily overshoot it by the
    /// number of racing producers.
    #[must_use]
    pub fn with_max_size(max_size: u32) -> Self {
        Self {
            list: SkipList::new(max_size),
        }
    }

    /// Insert a priority.
    ///
    /// Returns once the entry is published and fully linked. On a bounded
    /// queue this spins while the queue is full.
    pub fn push(&self, priority: K) {
        self.list.insert(priority, ());
    }

    /// Claim some currently-least priority.
    ///
    /// `None` means the queue looked empty, the head entry was still being
    /// inserted, or another consumer won the claim. The caller cannot tell
    /// the three apart; each one means "retry later".
    pub fn try_pop(&self) -> Option<K>
    where
        K: Clone,
    {
        self.list.pop_first().map(|(priority, ())| priority)
    }
}

impl<K, const L: usize> PriorityQueue<K, L> {
    /// Approximate number of entries.
    ///
    /// Reflects completed pushes and pops; it can transiently disagree with
    /// a concurrent traversal but never goes negative.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.list.len()
    }

    /// Whether the queue is (approximately) empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the bottom chain (or every level) for debugging.
    ///
    /// Logically deleted entries are annotated with `(Marked)`. The scan is
    /// lock-free and not linearizable.
    #[must_use]
    pub fn dump(&self, all_levels: bool) -> String
    where
        K: Display,
    {
        self.list.dump_with(all_levels, |out, priority, _value, marked| {
            let _ = if marked {
                writeln!(out, "\tKey: {priority} (Marked)")
            } else {
                writeln!(out, "\tKey: {priority}")
            };
        })
    }
}

impl<K: Ord + Default, const L: usize> Default for PriorityQueue<K, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, const L: usize> fmt::Debug for PriorityQueue<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("len", &self.len())
            .field("max_size", &self.list.max_size())
            .field("height", &(L + 1))
            .finish_non_exhaustive()
    }
}

// ============================================================================
//  KvPriorityQueue
// ============================================================================

/// A lock-free priority queue pairing each priority with a payload.
///
/// The payload is opaque to the algorithm: it travels with its priority and
/// comes back out of [`try_pop`](KvPriorityQueue::try_pop) unchanged.
///
/// # Example
///
/// ```rust
/// use spire::KvPriorityQueue;
///
/// let queue: KvPriorityQueue<u32, &str> = KvPriorityQueue::new();
/// queue.push(2, "second");
/// queue.push(1, "first");
///
/// assert_eq!(queue.try_pop(), Some((1, "first")));
/// assert_eq!(queue.try_pop(), Some((2, "second")));
/// ```
pub struct KvPriorityQueue<K, V, const L: usize = 4> {
    list: SkipList<K, V, L>,
}

impl<K: Ord + Default, V, const L: usize> KvPriorityQueue<K, V, L> {
    /// Create an unbounded queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_size(0)
    }

    /// Create a queue that gates `push` at `max_size` entries (0 = unbounded).
    #[must_use]
    pub fn with_max_size(max_size: u32) -> Self {
        Self {
            list: SkipList::new(max_size),
        }
    }

    /// Insert a priority with its payload.
    ///
    /// Returns once the entry is published and fully linked. On a bounded
    /// queue this spins while the queue is full.
    pub fn push(&self, priority: K, value: V) {
        self.list.insert(priority, value);
    }

    /// Insert a priority with a default-constructed payload.
    pub fn push_default(&self, priority: K)
    where
        V: Default,
    {
        self.list.insert(priority, V::default());
    }

    /// Claim some currently-least priority and its payload.
    ///
    /// `None` has the same three indistinguishable meanings as on
    /// [`PriorityQueue::try_pop`].
    pub fn try_pop(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.list.pop_first()
    }
}

impl<K, V, const L: usize> KvPriorityQueue<K, V, L> {
    /// Approximate number of entries.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.list.len()
    }

    /// Whether the queue is (approximately) empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the bottom chain (or every level) for debugging.
    #[must_use]
    pub fn dump(&self, all_levels: bool) -> String
    where
        K: Display,
        V: Display,
    {
        self.list.dump_with(all_levels, |out, priority, value, marked| {
            let _ = match value {
                Some(value) if marked => {
                    writeln!(out, "\tKey: {priority}, Value: {value} (Marked)")
                }
                Some(value) => writeln!(out, "\tKey: {priority}, Value: {value}"),
                // The sentinel never shows up in a scan; entries always
                // carry a payload.
                None => Ok(()),
            };
        })
    }
}

impl<K: Ord + Default, V, const L: usize> Default for KvPriorityQueue<K, V, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, const L: usize> fmt::Debug for KvPriorityQueue<K, V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvPriorityQueue")
            .field("len", &self.len())
            .field("max_size", &self.list.max_size())
            .field("height", &(L + 1))
            .finish_non_exhaustive()
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_and_empty() {
        let queue: PriorityQueue<u64> = PriorityQueue::default();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn debug_shows_shape() {
        let queue: PriorityQueue<u64, 4> = PriorityQueue::with_max_size(8);
        queue.push(1);
        let rendered = format!("{queue:?}");
        assert!(rendered.contains("len: 1"));
        assert!(rendered.contains("max_size: 8"));
        assert!(rendered.contains("height: 5"));
    }

    #[test]
    fn dump_lists_live_entries_in_order() {
        let queue: PriorityQueue<u32> = PriorityQueue::new();
        queue.push(2);
        queue.push(1);
        let dump = queue.dump(false);
        assert!(dump.starts_with("Queue:\n"));
        let first = dump.find("Key: 1\n").expect("key 1 missing");
        let second = dump.find("Key: 2\n").expect("key 2 missing");
        assert!(first < second);
    }

    #[test]
    fn dump_all_levels_has_a_section_per_level() {
        let queue: PriorityQueue<u32, 2> = PriorityQueue::new();
        queue.push(1);
        let dump = queue.dump(true);
        assert!(dump.contains("Queue at level 0:"));
        assert!(dump.contains("Queue at level 1:"));
        assert!(dump.contains("Queue at level 2:"));
        assert!(!dump.contains("Queue at level 3:"));
    }

    #[test]
    fn kv_dump_shows_values() {
        let queue: KvPriorityQueue<u32, &str> = KvPriorityQueue::new();
        queue.push(3, "x");
        assert!(queue.dump(false).contains("Key: 3, Value: x"));
    }

    #[test]
    fn push_default_constructs_the_payload() {
        let queue: KvPriorityQueue<u32, String> = KvPriorityQueue::new();
        queue.push_default(9);
        assert_eq!(queue.try_pop(), Some((9, String::new())));
    }

    #[test]
    fn moving_a_queue_keeps_its_contents() {
        let queue: PriorityQueue<u32> = PriorityQueue::new();
        queue.push(4);
        queue.push(2);

        let moved = queue;
        assert_eq!(moved.len(), 2);
        assert_eq!(moved.try_pop(), Some(2));
        assert_eq!(moved.try_pop(), Some(4));
    }
}
