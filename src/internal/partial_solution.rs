// SPDX-License-Identifier: MPL-2.0

//! The partial solution is the ordered log of all assignments made so far,
//! with per-package accumulated terms kept on the side for fast lookups.

use std::fmt::{self, Display};

use crate::internal::incompatibility::IncompId;
use crate::term::Term;
use crate::type_aliases::FxIndexMap;
use crate::{Package, VersionSet};

/// How many decisions deep the solver currently is. Level 1 is the root
/// decision; every later decision opens a new level, and backtracking
/// truncates back to one.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) struct DecisionLevel(pub(crate) u32);

impl DecisionLevel {
    pub(crate) fn increment(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A single entry of the assignment log.
#[derive(Clone, Debug)]
pub(crate) enum Assignment<P: Package, VS: VersionSet> {
    /// A guessed package version, opening a new decision level.
    Decision { package: P, version: VS::V },
    /// A term forced by unit propagation, traceable to its cause.
    Derivation {
        package: P,
        term: Term<VS>,
        cause: IncompId<P, VS>,
    },
}

impl<P: Package, VS: VersionSet> Assignment<P, VS> {
    fn package(&self) -> &P {
        match self {
            Self::Decision { package, .. } => package,
            Self::Derivation { package, .. } => package,
        }
    }

    /// The term this assignment contributes to its package.
    fn term(&self) -> Term<VS> {
        match self {
            Self::Decision { version, .. } => Term::exact(version.clone()),
            Self::Derivation { term, .. } => term.clone(),
        }
    }

    fn cause(&self) -> Option<IncompId<P, VS>> {
        match self {
            Self::Decision { .. } => None,
            Self::Derivation { cause, .. } => Some(*cause),
        }
    }
}

/// An assignment plus the decision level it was made at. Levels are
/// non-decreasing along the log, so backtracking is a suffix cut.
#[derive(Clone, Debug)]
struct DatedAssignment<P: Package, VS: VersionSet> {
    level: DecisionLevel,
    assignment: Assignment<P, VS>,
}

/// The assignment that first made some term satisfied, as found by
/// [`PartialSolution::satisfier`].
#[derive(Clone, Debug)]
pub(crate) struct Satisfier<P: Package, VS: VersionSet> {
    /// Position in the assignment log.
    pub(crate) index: usize,
    pub(crate) level: DecisionLevel,
    /// The cause incompatibility if the satisfier is a derivation, `None`
    /// for a decision.
    pub(crate) cause: Option<IncompId<P, VS>>,
    /// The satisfier's own term (not the accumulated one).
    pub(crate) term: Term<VS>,
}

/// The partial solution contains all package assignments,
/// historically ordered and grouped by decision level.
pub(crate) struct PartialSolution<P: Package, VS: VersionSet> {
    current_decision_level: DecisionLevel,
    history: Vec<DatedAssignment<P, VS>>,
    /// Decided versions, in decision order.
    decisions: FxIndexMap<P, VS::V>,
    /// Intersection of all terms seen for a package once at least one of
    /// them was positive. Keyed in first-seen order, which makes the
    /// decision heuristic's tie-break deterministic.
    positive: FxIndexMap<P, Term<VS>>,
    /// Intersection of the negative terms for packages that have no
    /// positive term yet. Folded into `positive` as soon as one arrives.
    negative: FxIndexMap<P, Term<VS>>,
}

impl<P: Package, VS: VersionSet> PartialSolution<P, VS> {
    pub(crate) fn empty() -> Self {
        Self {
            current_decision_level: DecisionLevel(0),
            history: Vec::new(),
            decisions: FxIndexMap::default(),
            positive: FxIndexMap::default(),
            negative: FxIndexMap::default(),
        }
    }

    /// Add a decision, opening a new decision level.
    pub(crate) fn decide(&mut self, package: P, version: VS::V) {
        debug_assert!(
            !self.decisions.contains_key(&package),
            "package already decided"
        );
        debug_assert!(
            self.positive
                .get(&package)
                .map_or(true, |term| term.contains(&version)),
            "decision contradicts accumulated term"
        );
        self.current_decision_level = self.current_decision_level.increment();
        self.history.push(DatedAssignment {
            level: self.current_decision_level,
            assignment: Assignment::Decision {
                package: package.clone(),
                version: version.clone(),
            },
        });
        self.decisions.insert(package.clone(), version.clone());
        self.assimilate(package, Term::exact(version));
    }

    /// Add a derivation at the current decision level.
    pub(crate) fn derive(&mut self, package: P, term: Term<VS>, cause: IncompId<P, VS>) {
        self.history.push(DatedAssignment {
            level: self.current_decision_level,
            assignment: Assignment::Derivation {
                package: package.clone(),
                term: term.clone(),
                cause,
            },
        });
        self.assimilate(package, term);
    }

    /// Merge a term into the per-package accumulators following the polarity
    /// rules of term intersection.
    fn assimilate(&mut self, package: P, term: Term<VS>) {
        if let Some(positive) = self.positive.get(&package) {
            let folded = positive.intersection(&term);
            debug_assert!(
                !matches!(&folded, Term::Positive(set) if set.is_empty()),
                "assignment emptied the accumulated term for {package:?}"
            );
            self.positive.insert(package, folded);
        } else if term.is_positive() {
            // The first positive term collapses the negative accumulator.
            let folded = match self.negative.swap_remove(&package) {
                Some(negative) => negative.intersection(&term),
                None => term,
            };
            self.positive.insert(package, folded);
        } else {
            let folded = match self.negative.get(&package) {
                Some(negative) => negative.intersection(&term),
                None => term,
            };
            self.negative.insert(package, folded);
        }
    }

    /// Retrieve the intersection of all terms related to a package, or `None`
    /// if the package has no assignment yet (equivalent to the tautology).
    pub(crate) fn term_intersection_for_package(&self, package: &P) -> Option<&Term<VS>> {
        self.positive.get(package).or_else(|| self.negative.get(package))
    }

    /// Decided versions, in the order the decisions were made.
    pub(crate) fn decisions(&self) -> impl Iterator<Item = (&P, &VS::V)> {
        self.decisions.iter()
    }

    /// Packages constrained by a positive term but not decided yet: the
    /// candidates for the next decision, in first-seen order.
    pub(crate) fn undecided_positive(&self) -> impl Iterator<Item = (&P, &VS)> {
        self.positive
            .iter()
            .filter(|(package, _)| !self.decisions.contains_key(*package))
            .map(|(package, term)| (package, term.unwrap_positive()))
    }

    /// The earliest assignment in the log such that the accumulated term for
    /// `package`, folded up to and including it, satisfies `term`.
    pub(crate) fn satisfier(&self, package: &P, term: &Term<VS>) -> Option<Satisfier<P, VS>> {
        let mut accumulated: Option<Term<VS>> = None;
        for (index, dated) in self.history.iter().enumerate() {
            if dated.assignment.package() != package {
                continue;
            }
            let own = dated.assignment.term();
            let folded = match &accumulated {
                Some(acc) => acc.intersection(&own),
                None => own.clone(),
            };
            if folded.subset_of(term) {
                return Some(Satisfier {
                    index,
                    level: dated.level,
                    cause: dated.assignment.cause(),
                    term: own,
                });
            }
            accumulated = Some(folded);
        }
        None
    }

    /// Remove every assignment above the given level and rebuild the
    /// accumulators as the fold over what remains.
    pub(crate) fn backtrack(&mut self, decision_level: DecisionLevel) {
        self.current_decision_level = decision_level;
        // Levels are non-decreasing along the log.
        let keep = self
            .history
            .partition_point(|dated| dated.level <= decision_level);
        let mut history = std::mem::take(&mut self.history);
        history.truncate(keep);

        self.decisions.clear();
        self.positive.clear();
        self.negative.clear();
        for dated in &history {
            match &dated.assignment {
                Assignment::Decision { package, version } => {
                    self.decisions.insert(package.clone(), version.clone());
                    self.assimilate(package.clone(), Term::exact(version.clone()));
                }
                Assignment::Derivation { package, term, .. } => {
                    self.assimilate(package.clone(), term.clone());
                }
            }
        }
        self.history = history;
    }
}

impl<P: Package, VS: VersionSet> Display for PartialSolution<P, VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "level {}:", self.current_decision_level.0)?;
        for dated in &self.history {
            match &dated.assignment {
                Assignment::Decision { package, version } => {
                    writeln!(f, "  [{}] {package} = {version}", dated.level.0)?;
                }
                Assignment::Derivation { package, term, .. } => {
                    writeln!(f, "  [{}] {package} : {term}", dated.level.0)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::{Arena, Incompatibility};
    use crate::Ranges;

    type R = Ranges<u32>;

    /// A store with a handful of incompatibilities to use as derivation
    /// causes; their content is irrelevant to these tests.
    fn causes(n: usize) -> (Arena<Incompatibility<&'static str, R>>, Vec<IncompId<&'static str, R>>) {
        let mut store = Arena::new();
        let ids = (0..n)
            .map(|_| store.alloc(Incompatibility::root("root", 1u32)))
            .collect();
        (store, ids)
    }

    #[test]
    fn satisfier_is_the_earliest_entailing_prefix() {
        let (_store, ids) = causes(3);
        let mut solution: PartialSolution<&str, R> = PartialSolution::empty();
        solution.derive("a", Term::Positive(R::between(1u32, 10u32)), ids[0]);
        solution.derive("a", Term::Positive(R::between(1u32, 5u32)), ids[1]);
        solution.derive("a", Term::Positive(R::between(1u32, 3u32)), ids[2]);

        // `a < 7` is first entailed by the second assignment.
        let satisfier = solution
            .satisfier(&"a", &Term::Positive(R::strictly_lower_than(7u32)))
            .unwrap();
        assert_eq!(satisfier.index, 1);
        assert_eq!(satisfier.cause, Some(ids[1]));

        // `a < 100` is already entailed by the first one.
        let satisfier = solution
            .satisfier(&"a", &Term::Positive(R::strictly_lower_than(100u32)))
            .unwrap();
        assert_eq!(satisfier.index, 0);

        // Nothing entails `a < 2`.
        assert!(solution
            .satisfier(&"a", &Term::Positive(R::strictly_lower_than(2u32)))
            .is_none());
    }

    #[test]
    fn decision_satisfier_has_no_cause() {
        let (_store, ids) = causes(1);
        let mut solution: PartialSolution<&str, R> = PartialSolution::empty();
        solution.derive("a", Term::Positive(R::between(1u32, 10u32)), ids[0]);
        solution.decide("a", 3u32);

        let satisfier = solution
            .satisfier(&"a", &Term::Positive(R::singleton(3u32)))
            .unwrap();
        assert_eq!(satisfier.index, 1);
        assert_eq!(satisfier.cause, None);
        assert_eq!(satisfier.level, DecisionLevel(1));
    }

    #[test]
    fn negative_terms_collapse_into_the_first_positive() {
        let (_store, ids) = causes(2);
        let mut solution: PartialSolution<&str, R> = PartialSolution::empty();
        solution.derive("a", Term::Negative(R::singleton(2u32)), ids[0]);
        assert!(matches!(
            solution.term_intersection_for_package(&"a"),
            Some(Term::Negative(_))
        ));

        solution.derive("a", Term::Positive(R::between(1u32, 5u32)), ids[1]);
        let accumulated = solution.term_intersection_for_package(&"a").unwrap();
        assert!(accumulated.is_positive());
        assert!(accumulated.contains(&1));
        assert!(!accumulated.contains(&2));
        assert!(accumulated.contains(&3));
    }

    #[test]
    fn backtrack_rebuilds_the_fold_over_the_surviving_log() {
        let (_store, ids) = causes(3);
        let mut solution: PartialSolution<&str, R> = PartialSolution::empty();
        solution.derive("a", Term::Positive(R::between(1u32, 10u32)), ids[0]);
        solution.decide("a", 5u32);
        solution.derive("b", Term::Positive(R::full()), ids[1]);
        solution.decide("b", 1u32);
        solution.derive("c", Term::Positive(R::full()), ids[2]);

        solution.backtrack(DecisionLevel(1));

        assert_eq!(solution.current_decision_level, DecisionLevel(1));
        assert_eq!(
            solution.decisions().collect::<Vec<_>>(),
            vec![(&"a", &5u32)]
        );
        assert!(solution.term_intersection_for_package(&"b").is_none());
        assert!(solution.term_intersection_for_package(&"c").is_none());
        let accumulated = solution.term_intersection_for_package(&"a").unwrap();
        assert!(accumulated.contains(&5));
        assert!(!accumulated.contains(&4));
    }

    #[test]
    fn undecided_positive_keeps_first_seen_order() {
        let (_store, ids) = causes(3);
        let mut solution: PartialSolution<&str, R> = PartialSolution::empty();
        solution.derive("b", Term::Positive(R::full()), ids[0]);
        solution.derive("a", Term::Positive(R::full()), ids[1]);
        solution.derive("c", Term::Positive(R::full()), ids[2]);
        let order: Vec<&str> = solution.undecided_positive().map(|(p, _)| *p).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
