//! Property-based tests for the queue.
//!
//! These tests verify invariants and properties that should hold for all
//! inputs. Uses differential testing against `BinaryHeap` as an oracle.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use proptest::prelude::*;
use spire::{KvPriorityQueue, PriorityQueue};

// ============================================================================
//  Strategies
// ============================================================================

/// Strategy for key batches with plenty of duplicates.
fn keys(max_count: usize) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..64, 0..=max_count)
}

/// Strategy for key/value batches.
fn pairs(max_count: usize) -> impl Strategy<Value = Vec<(u16, u32)>> {
    prop::collection::vec((0u16..64, any::<u32>()), 0..=max_count)
}

/// Operations for random single-threaded testing.
#[derive(Debug, Clone)]
enum Op {
    Push(u16),
    Pop,
}

/// Strategy for generating random operation sequences.
fn ops(max_count: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            2 => (0u16..64).prop_map(Op::Push),
            1 => Just(Op::Pop),
        ],
        0..=max_count,
    )
}

// ============================================================================
//  Properties
// ============================================================================

proptest! {
    /// Push-then-drain yields the sorted permutation of the input.
    #[test]
    fn drain_yields_sorted_permutation(keys in keys(200)) {
        let queue: PriorityQueue<u16> = PriorityQueue::new();
        for &key in &keys {
            queue.push(key);
        }

        let mut drained = Vec::with_capacity(keys.len());
        while let Some(key) = queue.try_pop() {
            drained.push(key);
        }

        let mut expected = keys;
        expected.sort_unstable();
        prop_assert_eq!(drained, expected);
        prop_assert_eq!(queue.len(), 0);
    }

    /// Single-threaded, the popped key always matches a min-heap oracle.
    /// (Equal keys make the popped *key* deterministic even though the
    /// entry identity is not.)
    #[test]
    fn pop_matches_binary_heap_oracle(ops in ops(300)) {
        let queue: PriorityQueue<u16> = PriorityQueue::new();
        let mut oracle: BinaryHeap<Reverse<u16>> = BinaryHeap::new();

        for op in ops {
            match op {
                Op::Push(key) => {
                    queue.push(key);
                    oracle.push(Reverse(key));
                }
                Op::Pop => {
                    let got = queue.try_pop();
                    let want = oracle.pop().map(|Reverse(key)| key);
                    prop_assert_eq!(got, want);
                }
            }
        }

        prop_assert_eq!(queue.len() as usize, oracle.len());
    }

    /// The key/value drain preserves the multiset of pairs and comes out
    /// key-sorted; payload order within an equal-key run is unspecified.
    #[test]
    fn kv_drain_preserves_pairs(pairs in pairs(150)) {
        let queue: KvPriorityQueue<u16, u32> = KvPriorityQueue::new();
        for &(key, value) in &pairs {
            queue.push(key, value);
        }

        let mut drained = Vec::with_capacity(pairs.len());
        while let Some(entry) = queue.try_pop() {
            drained.push(entry);
        }

        let drained_keys: Vec<u16> = drained.iter().map(|&(key, _)| key).collect();
        prop_assert!(drained_keys.is_sorted());

        let mut got = drained;
        got.sort_unstable();
        let mut want = pairs;
        want.sort_unstable();
        prop_assert_eq!(got, want);
    }

    /// The size counter is exact at quiescence.
    #[test]
    fn size_tracks_completed_operations(keys in keys(100), pops in 0usize..150) {
        let queue: PriorityQueue<u16> = PriorityQueue::new();
        for &key in &keys {
            queue.push(key);
        }

        let mut succeeded = 0usize;
        for _ in 0..pops {
            if queue.try_pop().is_some() {
                succeeded += 1;
            }
        }

        prop_assert!(succeeded <= keys.len());
        prop_assert_eq!(queue.len() as usize, keys.len() - succeeded);
    }

    /// Diagnostics never lose a live entry.
    #[test]
    fn dump_mentions_every_live_key(keys in keys(50)) {
        let queue: PriorityQueue<u16> = PriorityQueue::new();
        for &key in &keys {
            queue.push(key);
        }

        let dump = queue.dump(false);
        for &key in &keys {
            // Anchor on the line terminator: a bare "Key: 1" would also
            // match inside "Key: 12".
            let needle = format!("Key: {}\n", key);
            let found = dump.contains(&needle);
            prop_assert!(found);
        }
    }
}
