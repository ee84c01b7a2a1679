// SPDX-License-Identifier: MPL-2.0

//! Proptest helpers for exercising [`Ranges`] in this crate and downstream.

use std::ops::Bound::{Excluded, Included, Unbounded};

use proptest::prelude::*;

use crate::Ranges;

/// A strategy producing arbitrary well-formed version sets.
///
/// Segments are generated from a random vector of deltas between bounds, so
/// they come out sorted and disjoint by construction. Each bound is randomly
/// inclusive or exclusive.
pub fn proptest_strategy() -> impl Strategy<Value = Ranges<u32>> {
    (
        any::<bool>(),
        prop::collection::vec(any::<(u32, bool)>(), 1..10),
    )
        .prop_map(|(start_unbounded, deltas)| to_ranges(start_unbounded, deltas))
}

fn to_ranges(start_unbounded: bool, deltas: Vec<(u32, bool)>) -> Ranges<u32> {
    let mut start = if start_unbounded {
        Some(Unbounded)
    } else {
        None
    };
    let mut largest: u32 = 0;
    let mut last_bound_was_inclusive = false;
    let mut segments = Vec::new();
    for (delta, inclusive) in deltas {
        largest = match largest.checked_add(delta) {
            Some(s) => s,
            // Skip this offset, it would overflow the bound.
            None => continue,
        };

        let current_bound = if inclusive {
            Included(largest)
        } else {
            Excluded(largest)
        };

        if let Some(start_bound) = start.take() {
            // A zero-width segment is only valid as Included(x)..Included(x).
            if delta == 0 && !(matches!(start_bound, Included(_)) && inclusive) {
                start = Some(start_bound);
                continue;
            }
            last_bound_was_inclusive = inclusive;
            segments.push((start_bound, current_bound));
        } else {
            // A zero gap with an inclusive bound on either side would make the
            // new segment touch the previous one.
            if delta == 0 && (last_bound_was_inclusive || inclusive) {
                continue;
            }
            start = Some(current_bound);
        }
    }

    // Not enough deltas to close the last segment: leave it unbounded above.
    if let Some(start_bound) = start {
        segments.push((start_bound, Unbounded));
    }

    let ranges = Ranges { segments };
    ranges.check_invariants();
    ranges
}

impl<V: Ord> Ranges<V> {
    /// Assert the canonical-representation invariants. Test-only.
    pub fn check_invariants(&self) {
        for (start, end) in &self.segments {
            assert!(
                crate::valid_segment(start, end),
                "empty segment in canonical representation"
            );
        }
        for window in self.segments.windows(2) {
            let (_, end) = &window[0];
            let (start, _) = &window[1];
            match (end, start) {
                // An inclusive bound on either side at the same version would
                // make the segments touch or overlap.
                (Included(e), Included(s))
                | (Included(e), Excluded(s))
                | (Excluded(e), Included(s)) => assert!(e < s, "touching segments"),
                (Excluded(e), Excluded(s)) => assert!(e <= s, "overlapping segments"),
                (_, Unbounded) | (Unbounded, _) => panic!("inner unbounded bound"),
            }
        }
    }
}
