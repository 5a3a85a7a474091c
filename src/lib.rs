//! # Spire
//!
//! A lock-free concurrent priority queue built on a multi-level skip list.
//!
//! Many producers and consumers operate in parallel without mutual
//! exclusion: every mutating step is a single compare-and-swap on an atomic
//! (successor, mark) word, so some thread always makes progress no matter
//! how the others are scheduled.
//!
//! ## Design
//!
//! - Entries live in a skip list ordered by priority; each node draws a
//!   random tower height and participates in that many levels, with the
//!   upper levels acting as express lanes for searches.
//! - Deletion is logical first: a consumer claims a node by marking its
//!   bottom link, and later searches cooperatively excise marked nodes from
//!   whatever levels they cross.
//! - An insert linearizes at the bottom-level publishing CAS; express lanes
//!   are linked opportunistically afterwards, and the `inserting` flag keeps
//!   consumers away until the tower is complete.
//! - Reclamation is deferred through [`seize`]: a node is retired once its
//!   last linked level is physically unlinked, so concurrent readers never
//!   observe freed memory.
//!
//! ## Surfaces
//!
//! [`PriorityQueue`] carries priorities alone; [`KvPriorityQueue`] pairs
//! each priority with an opaque payload. Both share the same core and the
//! same contract: `try_pop` returns some currently-least entry or `None`
//! meaning "try again later" (empty, head mid-insert, and a lost claim race
//! all look the same to the caller).
//!
//! ```rust
//! use spire::KvPriorityQueue;
//!
//! let queue: KvPriorityQueue<u32, &str> = KvPriorityQueue::new();
//! queue.push(3, "c");
//! queue.push(1, "a");
//! queue.push(2, "b");
//!
//! assert_eq!(queue.try_pop(), Some((1, "a")));
//! assert_eq!(queue.try_pop(), Some((2, "b")));
//! assert_eq!(queue.try_pop(), Some((3, "c")));
//! ```
//!
//! ## Tracing
//!
//! With the `tracing` feature enabled the hot paths emit trace events on
//! retries, claims, and restarts; without it those sites compile to nothing.

mod link;
mod list;
mod node;
mod ordering;
mod queue;
mod tracing_helpers;

pub use queue::{KvPriorityQueue, PriorityQueue};
