// SPDX-License-Identifier: MPL-2.0

use std::fmt::{Debug, Display};

use crate::Ranges;

/// A set of versions: the boolean algebra the solver reasons in.
///
/// See [`Ranges`] for the bundled interval/union implementation.
///
/// The methods with default implementations can be overwritten for better
/// performance, but their output must be equal to the default implementation.
///
/// # Equality
///
/// `Eq` must be set equality: two values holding the same versions must
/// compare equal. `#[derive(Eq, PartialEq)]` is only correct when sets are
/// kept in a canonical representation, which `complement()`, `union()` and
/// `intersection()` must then preserve.
///
/// The solver never asks which versions actually exist for a package; the
/// contract is purely about the mathematical set operations, over the space
/// of all possible versions. `Display` is used verbatim in failure
/// explanations, so it should be stable and readable.
pub trait VersionSet: Debug + Display + Clone + Eq {
    /// Version type associated with the sets manipulated.
    type V: Debug + Display + Clone + Ord;

    // Constructors

    /// An empty set containing no version.
    fn empty() -> Self;

    /// A set containing only the given version.
    fn singleton(v: Self::V) -> Self;

    // Operations

    /// The set of all versions that are not in this set.
    fn complement(&self) -> Self;

    /// The set of all versions that are in both sets.
    fn intersection(&self, other: &Self) -> Self;

    /// Whether the version is part of this set.
    fn contains(&self, v: &Self::V) -> bool;

    // Automatically implemented functions

    /// The set containing all versions.
    fn full() -> Self {
        Self::empty().complement()
    }

    /// The set of all versions that are in either (or both) of the sets.
    ///
    /// The default implementation is the complement of the intersection of
    /// the complements (De Morgan's law).
    fn union(&self, other: &Self) -> Self {
        self.complement()
            .intersection(&other.complement())
            .complement()
    }

    /// Whether this set contains no version.
    fn is_empty(&self) -> bool {
        self == &Self::empty()
    }

    /// Whether the two sets share no version.
    fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).is_empty()
    }

    /// Whether every version of `self` is also in `other`.
    fn subset_of(&self, other: &Self) -> bool {
        self == &self.intersection(other)
    }
}

/// [`Ranges`] contains optimized implementations of most operations.
impl<T: Debug + Display + Clone + Eq + Ord> VersionSet for Ranges<T> {
    type V = T;

    fn empty() -> Self {
        Ranges::empty()
    }

    fn singleton(v: Self::V) -> Self {
        Ranges::singleton(v)
    }

    fn complement(&self) -> Self {
        Ranges::complement(self)
    }

    fn intersection(&self, other: &Self) -> Self {
        Ranges::intersection(self, other)
    }

    fn contains(&self, v: &Self::V) -> bool {
        Ranges::contains(self, v)
    }

    fn full() -> Self {
        Ranges::full()
    }

    fn union(&self, other: &Self) -> Self {
        Ranges::union(self, other)
    }

    fn is_empty(&self) -> bool {
        Ranges::is_empty(self)
    }

    fn is_disjoint(&self, other: &Self) -> bool {
        Ranges::is_disjoint(self, other)
    }

    fn subset_of(&self, other: &Self) -> bool {
        Ranges::subset_of(self, other)
    }
}
