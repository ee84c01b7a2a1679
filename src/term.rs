// SPDX-License-Identifier: MPL-2.0

//! A term is the fundamental unit of operation of the solver: a constraint
//! on one package, either required (positive) or forbidden (negative).

use std::fmt::{self, Display};

use crate::VersionSet;

/// A positive or negative constraint on the versions of a single package.
///
/// The package itself is carried by whatever holds the term (an
/// incompatibility or an assignment), so binary operations between terms are
/// only ever applied to terms about the same package.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Term<VS: VersionSet> {
    /// For example, `1.0.0 <= version < 2.0.0` is a positive expression that
    /// is evaluated true if a version is selected and comprised between
    /// version 1.0.0 and version 2.0.0.
    Positive(VS),
    /// The term `not (version < 3.0.0)` is evaluated true if a version is
    /// selected >= 3.0.0, or if no version is selected at all.
    Negative(VS),
}

impl<VS: VersionSet> Term<VS> {
    /// The tautology term, satisfied by anything.
    pub fn any() -> Self {
        Self::Negative(VS::empty())
    }

    /// The contradiction term, satisfied by nothing.
    pub fn empty() -> Self {
        Self::Positive(VS::empty())
    }

    /// A positive term containing exactly that version.
    pub fn exact(version: VS::V) -> Self {
        Self::Positive(VS::singleton(version))
    }

    /// Whether the term is positive.
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive(_))
    }

    /// Negate the term: verified <=> the original is not.
    pub fn negate(&self) -> Self {
        match self {
            Self::Positive(set) => Self::Negative(set.clone()),
            Self::Negative(set) => Self::Positive(set.clone()),
        }
    }

    /// Whether the term would be satisfied by selecting the given version.
    pub fn contains(&self, version: &VS::V) -> bool {
        match self {
            Self::Positive(set) => set.contains(version),
            Self::Negative(set) => !set.contains(version),
        }
    }

    /// Unwrap the set of a positive term. Panics on negative terms, which is
    /// a bug in the solver.
    pub fn unwrap_positive(&self) -> &VS {
        match self {
            Self::Positive(set) => set,
            Self::Negative(_) => panic!("expected a positive term"),
        }
    }

    /// Compute the intersection of two terms: the conjunction of both
    /// constraints.
    pub fn intersection(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Positive(a), Self::Positive(b)) => Self::Positive(a.intersection(b)),
            (Self::Positive(a), Self::Negative(b)) => {
                Self::Positive(a.intersection(&b.complement()))
            }
            (Self::Negative(a), Self::Positive(b)) => {
                Self::Positive(a.complement().intersection(b))
            }
            (Self::Negative(a), Self::Negative(b)) => Self::Negative(a.union(b)),
        }
    }

    /// Compute the union of two terms: the disjunction of both constraints.
    pub fn union(&self, other: &Self) -> Self {
        self.negate().intersection(&other.negate()).negate()
    }

    /// The intersection of this term with the negation of the other,
    /// `self ∧ ¬other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.intersection(&other.negate())
    }

    /// Whether every assignment verifying `self` also verifies `other`.
    ///
    /// A negative term is also verified when its package has no selection at
    /// all, which a positive term never accepts, so a negative term is never
    /// a subset of a positive one.
    pub(crate) fn subset_of(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Positive(a), Self::Positive(b)) => a.subset_of(b),
            (Self::Positive(a), Self::Negative(b)) => a.is_disjoint(b),
            (Self::Negative(_), Self::Positive(_)) => false,
            (Self::Negative(a), Self::Negative(b)) => b.subset_of(a),
        }
    }

    /// Whether no assignment can verify both terms at once.
    ///
    /// Two negative terms are always both verified by "no selection", so
    /// they are never disjoint.
    pub(crate) fn is_disjoint(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Positive(a), Self::Positive(b)) => a.is_disjoint(b),
            (Self::Positive(a), Self::Negative(b)) => a.subset_of(b),
            (Self::Negative(a), Self::Positive(b)) => b.subset_of(a),
            (Self::Negative(_), Self::Negative(_)) => false,
        }
    }

    /// Classify how an accumulated term from the partial solution relates to
    /// this term of an incompatibility.
    pub(crate) fn relation_with(&self, accumulated: &Self) -> Relation {
        if accumulated.subset_of(self) {
            Relation::Satisfied
        } else if accumulated.is_disjoint(self) {
            Relation::Contradicted
        } else {
            Relation::Inconclusive
        }
    }
}

/// How a term of an incompatibility relates to the accumulated assignments
/// for its package.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum Relation {
    /// The assignments imply the term.
    Satisfied,
    /// The assignments rule the term out.
    Contradicted,
    /// Neither.
    Inconclusive,
}

impl<VS: VersionSet + Display> Display for Term<VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(set) => write!(f, "{set}"),
            Self::Negative(set) => write!(f, "Not ( {set} )"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Ranges;

    pub(crate) fn strategy() -> impl Strategy<Value = Term<Ranges<u32>>> {
        (any::<bool>(), concord_range::testing::proptest_strategy()).prop_map(
            |(positive, set)| {
                if positive {
                    Term::Positive(set)
                } else {
                    Term::Negative(set)
                }
            },
        )
    }

    proptest! {
        /// A term and its negation can never both hold.
        #[test]
        fn intersection_with_negation_is_empty(term in strategy(), version in any::<u32>()) {
            prop_assert!(!term.intersection(&term.negate()).contains(&version));
        }

        /// The tautology is neutral for intersection.
        #[test]
        fn intersection_with_any_is_identity(term in strategy()) {
            prop_assert_eq!(term.intersection(&Term::any()), term);
        }

        /// `subset_of` agrees with membership.
        #[test]
        fn subset_of_agrees_with_contains(
            t1 in strategy(),
            t2 in strategy(),
            version in any::<u32>(),
        ) {
            if t1.subset_of(&t2) && t1.contains(&version) {
                prop_assert!(t2.contains(&version));
            }
        }

        /// `is_disjoint` agrees with membership.
        #[test]
        fn disjoint_terms_share_no_version(
            t1 in strategy(),
            t2 in strategy(),
            version in any::<u32>(),
        ) {
            if t1.is_disjoint(&t2) {
                prop_assert!(!(t1.contains(&version) && t2.contains(&version)));
            }
        }

        /// Intersection agrees with membership.
        #[test]
        fn intersection_agrees_with_contains(
            t1 in strategy(),
            t2 in strategy(),
            version in any::<u32>(),
        ) {
            prop_assert_eq!(
                t1.intersection(&t2).contains(&version),
                t1.contains(&version) && t2.contains(&version)
            );
        }
    }
}
