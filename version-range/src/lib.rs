// SPDX-License-Identifier: MPL-2.0

//! An interval/union set of versions.
//!
//! [`Ranges`] represents a subset of a totally ordered version space as a
//! sorted list of non-overlapping, non-touching intervals. All set operations
//! keep that representation canonical, so structural equality is set equality.
//!
//! The version type only needs [`Ord`] and [`Clone`]; nothing here knows what
//! a version looks like.

use std::fmt::{Debug, Display, Formatter};
use std::ops::Bound::{self, Excluded, Included, Unbounded};
use std::ops::RangeBounds;

#[cfg(any(feature = "testing", test))]
pub mod testing;

/// A set of versions, stored as an ordered list of disjoint intervals.
///
/// The empty set and the full set are representable, as are unions of
/// arbitrary half-open, closed, and unbounded intervals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Ranges<V> {
    /// Sorted, disjoint, non-empty, non-touching segments.
    segments: Vec<Segment<V>>,
}

type Segment<V> = (Bound<V>, Bound<V>);

impl<V> Ranges<V> {
    /// The set containing no version.
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// The set containing every version.
    pub fn full() -> Self {
        Self {
            segments: vec![(Unbounded, Unbounded)],
        }
    }

    /// Whether the set contains no version at all.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl<V: Clone> Ranges<V> {
    /// The set containing exactly one version.
    pub fn singleton(v: impl Into<V>) -> Self {
        let v = v.into();
        Self {
            segments: vec![(Included(v.clone()), Included(v))],
        }
    }

    /// The set of versions greater than or equal to `v`.
    pub fn higher_than(v: impl Into<V>) -> Self {
        Self {
            segments: vec![(Included(v.into()), Unbounded)],
        }
    }

    /// The set of versions strictly greater than `v`.
    pub fn strictly_higher_than(v: impl Into<V>) -> Self {
        Self {
            segments: vec![(Excluded(v.into()), Unbounded)],
        }
    }

    /// The set of versions lower than or equal to `v`.
    pub fn lower_than(v: impl Into<V>) -> Self {
        Self {
            segments: vec![(Unbounded, Included(v.into()))],
        }
    }

    /// The set of versions strictly lower than `v`.
    pub fn strictly_lower_than(v: impl Into<V>) -> Self {
        Self {
            segments: vec![(Unbounded, Excluded(v.into()))],
        }
    }
}

impl<V: Ord> Ranges<V> {
    /// The half-open interval `[v1, v2)`.
    pub fn between(v1: impl Into<V>, v2: impl Into<V>) -> Self {
        let (v1, v2) = (v1.into(), v2.into());
        if v1 < v2 {
            Self {
                segments: vec![(Included(v1), Excluded(v2))],
            }
        } else {
            Self::empty()
        }
    }

    /// Whether the set contains the given version.
    pub fn contains(&self, version: &V) -> bool {
        self.segments.iter().any(|(start, end)| {
            let after_start = match start {
                Included(b) => version >= b,
                Excluded(b) => version > b,
                Unbounded => true,
            };
            let before_end = match end {
                Included(b) => version <= b,
                Excluded(b) => version < b,
                Unbounded => true,
            };
            after_start && before_end
        })
    }
}

impl<V: Ord + Clone> Ranges<V> {
    /// Build a set from any range syntax, converting the bound type on the way.
    ///
    /// ```
    /// # use concord_range::Ranges;
    /// let caret: Ranges<u32> = Ranges::from_range_bounds(1u32..2u32);
    /// assert!(caret.contains(&1));
    /// assert!(!caret.contains(&2));
    /// ```
    pub fn from_range_bounds<R, IV>(bounds: R) -> Self
    where
        R: RangeBounds<IV>,
        IV: Clone + Into<V>,
    {
        let start = match bounds.start_bound() {
            Included(v) => Included(v.clone().into()),
            Excluded(v) => Excluded(v.clone().into()),
            Unbounded => Unbounded,
        };
        let end = match bounds.end_bound() {
            Included(v) => Included(v.clone().into()),
            Excluded(v) => Excluded(v.clone().into()),
            Unbounded => Unbounded,
        };
        if valid_segment(&start, &end) {
            Self {
                segments: vec![(start, end)],
            }
        } else {
            Self::empty()
        }
    }

    /// The set of all versions not in this set.
    pub fn complement(&self) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        // Lower bound of the gap currently being built.
        let mut gap_start = Some(Unbounded);
        for (start, end) in &self.segments {
            if let Some(gap) = gap_start.take() {
                match start {
                    Included(v) => segments.push((gap, Excluded(v.clone()))),
                    Excluded(v) => segments.push((gap, Included(v.clone()))),
                    // Only the first segment can reach back to -inf: no gap before it.
                    Unbounded => {}
                }
            }
            gap_start = match end {
                Included(v) => Some(Excluded(v.clone())),
                Excluded(v) => Some(Included(v.clone())),
                Unbounded => None,
            };
        }
        if let Some(gap) = gap_start {
            segments.push((gap, Unbounded));
        }
        Self { segments }
    }

    /// The set of versions in both sets.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut segments = Vec::new();
        let mut i = 0;
        let mut j = 0;
        while i < self.segments.len() && j < other.segments.len() {
            let (ls, le) = &self.segments[i];
            let (rs, re) = &other.segments[j];
            let start = if cmp_start(ls, rs).is_ge() { ls } else { rs };
            let end = if cmp_end(le, re).is_le() { le } else { re };
            if valid_segment(start, end) {
                segments.push((start.clone(), end.clone()));
            }
            // Drop whichever segment ends first; it cannot overlap anything later.
            match cmp_end(le, re) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { segments }
    }

    /// The set of versions in either set.
    pub fn union(&self, other: &Self) -> Self {
        self.complement()
            .intersection(&other.complement())
            .complement()
    }

    /// Whether the two sets share no version.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).is_empty()
    }

    /// Whether every version of `self` is also in `other`.
    pub fn subset_of(&self, other: &Self) -> bool {
        self == &self.intersection(other)
    }
}

/// Whether `[start, end]` denotes at least one version.
fn valid_segment<V: Ord>(start: &Bound<V>, end: &Bound<V>) -> bool {
    match (start, end) {
        (Unbounded, _) | (_, Unbounded) => true,
        (Included(s), Included(e)) => s <= e,
        (Included(s), Excluded(e)) | (Excluded(s), Included(e)) | (Excluded(s), Excluded(e)) => {
            s < e
        }
    }
}

/// Compare two start bounds: `Unbounded` is the smallest, and at equal
/// versions an inclusive bound starts before an exclusive one.
fn cmp_start<V: Ord>(a: &Bound<V>, b: &Bound<V>) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    match (a, b) {
        (Unbounded, Unbounded) => Equal,
        (Unbounded, _) => Less,
        (_, Unbounded) => Greater,
        (Included(x), Included(y)) | (Excluded(x), Excluded(y)) => x.cmp(y),
        (Included(x), Excluded(y)) => x.cmp(y).then(Less),
        (Excluded(x), Included(y)) => x.cmp(y).then(Greater),
    }
}

/// Compare two end bounds: `Unbounded` is the largest, and at equal versions
/// an inclusive bound ends after an exclusive one.
fn cmp_end<V: Ord>(a: &Bound<V>, b: &Bound<V>) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    match (a, b) {
        (Unbounded, Unbounded) => Equal,
        (Unbounded, _) => Greater,
        (_, Unbounded) => Less,
        (Included(x), Included(y)) | (Excluded(x), Excluded(y)) => x.cmp(y),
        (Included(x), Excluded(y)) => x.cmp(y).then(Greater),
        (Excluded(x), Included(y)) => x.cmp(y).then(Less),
    }
}

impl<V: Display + Eq> Display for Ranges<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "∅");
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            match segment {
                (Unbounded, Unbounded) => write!(f, "*")?,
                (Unbounded, Included(v)) => write!(f, "<={v}")?,
                (Unbounded, Excluded(v)) => write!(f, "<{v}")?,
                (Included(v), Unbounded) => write!(f, ">={v}")?,
                (Excluded(v), Unbounded) => write!(f, ">{v}")?,
                (Included(a), Included(b)) if a == b => write!(f, "{a}")?,
                (Included(a), Included(b)) => write!(f, ">={a}, <={b}")?,
                (Included(a), Excluded(b)) => write!(f, ">={a}, <{b}")?,
                (Excluded(a), Included(b)) => write!(f, ">{a}, <={b}")?,
                (Excluded(a), Excluded(b)) => write!(f, ">{a}, <{b}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::proptest_strategy;

    #[test]
    fn empty_and_full_are_complements() {
        assert_eq!(Ranges::<u32>::empty().complement(), Ranges::full());
        assert_eq!(Ranges::<u32>::full().complement(), Ranges::empty());
    }

    #[test]
    fn singleton_contains_only_itself() {
        let one = Ranges::<u32>::singleton(1u32);
        assert!(one.contains(&1));
        assert!(!one.contains(&0));
        assert!(!one.contains(&2));
        assert_eq!(one.to_string(), "1");
    }

    #[test]
    fn between_is_half_open() {
        let r = Ranges::<u32>::between(1u32, 3u32);
        assert!(r.contains(&1));
        assert!(r.contains(&2));
        assert!(!r.contains(&3));
        assert_eq!(r.to_string(), ">=1, <3");
    }

    #[test]
    fn degenerate_between_is_empty() {
        assert_eq!(Ranges::<u32>::between(3u32, 3u32), Ranges::empty());
        assert_eq!(Ranges::<u32>::between(4u32, 3u32), Ranges::empty());
    }

    #[test]
    fn union_of_touching_segments_merges() {
        let low = Ranges::<u32>::between(1u32, 3u32);
        let high = Ranges::<u32>::between(3u32, 5u32);
        assert_eq!(low.union(&high), Ranges::between(1u32, 5u32));
    }

    proptest! {
        #[test]
        fn complement_is_involutive(range in proptest_strategy()) {
            prop_assert_eq!(range.complement().complement(), range);
        }

        #[test]
        fn intersection_with_complement_is_empty(range in proptest_strategy()) {
            prop_assert!(range.intersection(&range.complement()).is_empty());
        }

        #[test]
        fn union_with_complement_is_full(range in proptest_strategy()) {
            prop_assert_eq!(range.union(&range.complement()), Ranges::full());
        }

        #[test]
        fn intersection_commutes(r1 in proptest_strategy(), r2 in proptest_strategy()) {
            prop_assert_eq!(r1.intersection(&r2), r2.intersection(&r1));
        }

        #[test]
        fn intersection_agrees_with_contains(
            r1 in proptest_strategy(),
            r2 in proptest_strategy(),
            v in any::<u32>(),
        ) {
            prop_assert_eq!(
                r1.intersection(&r2).contains(&v),
                r1.contains(&v) && r2.contains(&v)
            );
        }

        #[test]
        fn union_agrees_with_contains(
            r1 in proptest_strategy(),
            r2 in proptest_strategy(),
            v in any::<u32>(),
        ) {
            prop_assert_eq!(
                r1.union(&r2).contains(&v),
                r1.contains(&v) || r2.contains(&v)
            );
        }

        #[test]
        fn subset_of_is_reflexive(range in proptest_strategy()) {
            prop_assert!(range.subset_of(&range));
        }

        #[test]
        fn complement_is_disjoint(range in proptest_strategy()) {
            prop_assert!(range.is_disjoint(&range.complement()));
        }
    }
}
