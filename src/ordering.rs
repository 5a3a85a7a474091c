//! Standard memory orderings for concurrent list access.
//!
//! These constants ensure consistent ordering usage across the codebase
//! and make the intent clear at each access point.

use std::sync::atomic::Ordering;

/// Ordering for reading forward links and flags during traversal.
/// Pairs with writers' Release stores.
pub const READ_ORD: Ordering = Ordering::Acquire;

/// Ordering for publishing stores (link initialization, `inserting` hand-off).
/// Pairs with readers' Acquire loads.
pub const WRITE_ORD: Ordering = Ordering::Release;

/// Ordering for CAS success (link publish, unlink, mark, claim).
pub const CAS_SUCCESS: Ordering = Ordering::AcqRel;

/// Ordering for CAS failure.
/// Only need to see the current value.
pub const CAS_FAILURE: Ordering = Ordering::Acquire;

/// Ordering for the approximate size counter.
/// The counter is advisory; coherence alone is enough for the capacity gate.
pub const COUNTER_ORD: Ordering = Ordering::Relaxed;

/// Ordering for dropping a remaining-link count.
/// The decrement must order after the unlink CAS it accounts for, and the
/// final decrement must order before the retirement hand-off.
pub const LINK_DROP_ORD: Ordering = Ordering::AcqRel;
