// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different packages
//! that should never be satisfied all together.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::internal::{Arena, Id};
use crate::term::{self, Term};
use crate::type_aliases::FxIndexMap;
use crate::{DerivationTree, Derived, External, Map, Package, Set, VersionSet};

/// An incompatibility is a set of terms for different packages
/// that should never be satisfied all together.
/// An incompatibility usually originates from a package dependency.
/// For example, if package A at version 1 depends on package B
/// at version 2, you can never have both terms `A = 1`
/// and `not B = 2` satisfied at the same time in a partial solution:
/// that would mean having A at version 1 without B at version 2,
/// which its dependency forbids.
/// Therefore the set `{ A = 1, not B = 2 }` is an incompatibility,
/// defined from the dependencies of A at version 1.
///
/// Incompatibilities can also be derived from two other incompatibilities
/// during conflict resolution, in which case they remember both parents and
/// form a derivation DAG used for failure explanations.
#[derive(Debug, Clone)]
pub struct Incompatibility<P: Package, VS: VersionSet> {
    package_terms: FxIndexMap<P, Term<VS>>,
    /// The reason for the incompatibility.
    pub kind: Kind<P, VS>,
}

/// Type alias of unique identifiers for incompatibilities.
pub type IncompId<P, VS> = Id<Incompatibility<P, VS>>;

/// The reason for the incompatibility.
#[derive(Debug, Clone)]
pub enum Kind<P: Package, VS: VersionSet> {
    /// Initial incompatibility driving the whole resolution: the root package
    /// must be picked at the declared root version.
    Root(P, VS::V),
    /// There is no version of this package in the given set.
    ///
    /// Registered when the source has been asked for versions in a set and
    /// returned none, so the set as a whole has to be avoided.
    NoVersions(P, VS),
    /// Incompatibility coming from the dependencies of a given package.
    ///
    /// If a@1 depends on b>=1,<2, we create an incompatibility with terms
    /// `{a 1, not b >=1,<2}` with kind `FromDependencyOf(a, 1, b, >=1,<2)`.
    FromDependencyOf(P, VS, P, VS),
    /// The source does not know this package at all, and the dependency on it
    /// may not be skipped.
    PackageNotFound(P),
    /// Derived from two causes during conflict resolution. Stores both
    /// parent ids.
    DerivedFrom(IncompId<P, VS>, IncompId<P, VS>),
}

/// A Relation describes how a set of terms can be compared to an
/// incompatibility. Typically, the set of terms comes from the partial
/// solution.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum Relation<P: Package> {
    /// We say that a set of terms S satisfies an incompatibility I
    /// if S satisfies every term in I.
    Satisfied,
    /// We say that S contradicts I
    /// if S contradicts at least one term in I.
    Contradicted(P),
    /// If S satisfies all but one of I's terms and is inconclusive for the
    /// remaining term, we say S "almost satisfies" I and we call the
    /// remaining term the "unsatisfied term".
    AlmostSatisfied(P),
    /// Otherwise, we say that their relation is inconclusive.
    Inconclusive,
}

impl<P: Package, VS: VersionSet> Incompatibility<P, VS> {
    /// Create the initial incompatibility requiring the root package at the
    /// root version: `{not root@v}`.
    pub fn root(package: P, version: VS::V) -> Self {
        let mut package_terms = FxIndexMap::default();
        package_terms.insert(
            package.clone(),
            Term::Negative(VS::singleton(version.clone())),
        );
        Self {
            package_terms,
            kind: Kind::Root(package, version),
        }
    }

    /// Create an incompatibility to remember that a given set does not
    /// contain any version.
    pub fn no_versions(package: P, term: Term<VS>) -> Self {
        let set = match &term {
            Term::Positive(set) => set.clone(),
            Term::Negative(_) => panic!("no_versions requires a positive term"),
        };
        let mut package_terms = FxIndexMap::default();
        package_terms.insert(package.clone(), term);
        Self {
            package_terms,
            kind: Kind::NoVersions(package, set),
        }
    }

    /// Create an incompatibility to remember that the source knows nothing
    /// about a package: no version of it may ever be selected.
    pub fn package_not_found(package: P) -> Self {
        let mut package_terms = FxIndexMap::default();
        package_terms.insert(package.clone(), Term::Positive(VS::full()));
        Self {
            package_terms,
            kind: Kind::PackageNotFound(package),
        }
    }

    /// Build an incompatibility from the dependency `package @ versions ->
    /// dep_package @ dep_set`.
    ///
    /// Terms on the same package are merged by intersection, so a version
    /// depending on its own package collapses to a single term. An empty
    /// dependency set leaves only the positive term, forbidding `versions`
    /// outright. The tautology term `not ∅` is dropped.
    pub fn from_dependency(package: P, versions: VS, dep: (P, VS)) -> Self {
        let (dep_package, dep_set) = dep;
        let kind = Kind::FromDependencyOf(
            package.clone(),
            versions.clone(),
            dep_package.clone(),
            dep_set.clone(),
        );
        let mut package_terms = FxIndexMap::default();
        if dep_package == package {
            package_terms.insert(
                package,
                Term::Positive(versions).intersection(&Term::Negative(dep_set)),
            );
        } else {
            package_terms.insert(package, Term::Positive(versions));
            if !dep_set.is_empty() {
                package_terms.insert(dep_package, Term::Negative(dep_set));
            }
        }
        Self {
            package_terms,
            kind,
        }
    }

    /// Whether one of the terms is satisfiable by nothing, making the whole
    /// incompatibility impossible to violate. Such incompatibilities are
    /// skipped at registration.
    pub fn is_vacuous(&self) -> bool {
        self.package_terms
            .values()
            .any(|term| matches!(term, Term::Positive(set) if set.is_empty()))
    }

    /// Prior cause of two incompatibilities using the rule of resolution.
    ///
    /// Terms of both parents are merged by intersection, except on the
    /// resolved package where the two terms are united. When the satisfier
    /// only partially satisfied the conflicting term that union is what
    /// remains; when it fully satisfied it the union is the tautology and
    /// the package disappears from the result.
    pub(crate) fn prior_cause(
        incompat: Id<Self>,
        satisfier_cause: Id<Self>,
        package: &P,
        store: &Arena<Self>,
    ) -> Self {
        let kind = Kind::DerivedFrom(incompat, satisfier_cause);
        let mut package_terms = FxIndexMap::default();
        for (p, term) in store[incompat].package_terms.iter() {
            if p != package {
                package_terms.insert(p.clone(), term.clone());
            }
        }
        for (p, term) in store[satisfier_cause].package_terms.iter() {
            if p == package {
                continue;
            }
            let merged = match package_terms.get(p) {
                Some(prior) => prior.intersection(term),
                None => term.clone(),
            };
            package_terms.insert(p.clone(), merged);
        }
        let t1 = store[incompat].get(package).unwrap();
        let t2 = store[satisfier_cause].get(package).unwrap();
        let united = t1.union(t2);
        if united != Term::any() {
            package_terms.insert(package.clone(), united);
        }
        Self {
            package_terms,
            kind,
        }
    }

    /// Check if an incompatibility should mark the end of the algorithm
    /// because it satisfies the root package.
    pub(crate) fn is_terminal(&self, root_package: &P, root_version: &VS::V) -> bool {
        if self.package_terms.is_empty() {
            true
        } else if self.package_terms.len() > 1 {
            false
        } else {
            let (package, term) = self.package_terms.iter().next().unwrap();
            package == root_package && term.is_positive() && term.contains(root_version)
        }
    }

    /// Get the term related to a given package (if it exists).
    pub(crate) fn get(&self, package: &P) -> Option<&Term<VS>> {
        self.package_terms.get(package)
    }

    /// Iterate over packages.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&P, &Term<VS>)> {
        self.package_terms.iter()
    }

    /// CF definition of Relation enum.
    pub(crate) fn relation<'a>(&self, terms: impl Fn(&P) -> Option<&'a Term<VS>>) -> Relation<P>
    where
        VS: 'a,
    {
        let mut relation = Relation::Satisfied;
        for (package, incompat_term) in self.package_terms.iter() {
            match terms(package).map(|term| incompat_term.relation_with(term)) {
                Some(term::Relation::Satisfied) => {}
                Some(term::Relation::Contradicted) => {
                    return Relation::Contradicted(package.clone());
                }
                None | Some(term::Relation::Inconclusive) => {
                    // A package without assignments has the accumulated term
                    // `not ∅`, which is inconclusive against anything an
                    // incompatibility may contain.
                    if relation == Relation::Satisfied {
                        relation = Relation::AlmostSatisfied(package.clone());
                    } else {
                        return Relation::Inconclusive;
                    }
                }
            }
        }
        relation
    }

    // Reporting ###############################################################

    /// Retrieve parent causes if of type DerivedFrom.
    pub(crate) fn causes(&self) -> Option<(Id<Self>, Id<Self>)> {
        match self.kind {
            Kind::DerivedFrom(id1, id2) => Some((id1, id2)),
            _ => None,
        }
    }

    /// Build a derivation tree for error reporting.
    pub(crate) fn build_derivation_tree(
        self_id: Id<Self>,
        shared_ids: &Set<Id<Self>>,
        store: &Arena<Self>,
        precomputed: &Map<Id<Self>, Arc<DerivationTree<P, VS>>>,
    ) -> DerivationTree<P, VS> {
        match store[self_id].kind.clone() {
            Kind::DerivedFrom(id1, id2) => {
                let derived = Derived {
                    terms: store[self_id]
                        .package_terms
                        .iter()
                        .map(|(package, term)| (package.clone(), term.clone()))
                        .collect(),
                    shared_id: shared_ids.get(&self_id).map(|id| id.into_raw()),
                    cause1: precomputed
                        .get(&id1)
                        .expect("non-topological calls building tree")
                        .clone(),
                    cause2: precomputed
                        .get(&id2)
                        .expect("non-topological calls building tree")
                        .clone(),
                };
                DerivationTree::Derived(derived)
            }
            Kind::Root(package, version) => {
                DerivationTree::External(External::Root(package, version))
            }
            Kind::NoVersions(package, set) => {
                DerivationTree::External(External::NoVersions(package, set))
            }
            Kind::FromDependencyOf(package, set, dep_package, dep_set) => {
                DerivationTree::External(External::FromDependencyOf(
                    package,
                    set,
                    dep_package,
                    dep_set,
                ))
            }
            Kind::PackageNotFound(package) => {
                DerivationTree::External(External::PackageNotFound(package))
            }
        }
    }
}

impl<P: Package, VS: VersionSet> Display for Incompatibility<P, VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iter().collect::<Vec<_>>().as_slice() {
            [] => write!(f, "version solving failed"),
            [(package, Term::Positive(set))] => write!(f, "{package} {set} is forbidden"),
            [(package, Term::Negative(set))] => write!(f, "{package} {set} is mandatory"),
            [(p_pos, Term::Positive(set_pos)), (p_neg, Term::Negative(set_neg))]
            | [(p_neg, Term::Negative(set_neg)), (p_pos, Term::Positive(set_pos))] => {
                External::FromDependencyOf(
                    *p_pos,
                    set_pos.clone(),
                    *p_neg,
                    set_neg.clone(),
                )
                .fmt(f)
            }
            slice => {
                let str_terms: Vec<_> = slice
                    .iter()
                    .map(|(p, t)| format!("{p} {t}"))
                    .collect();
                write!(f, "{} are incompatible", str_terms.join(", "))
            }
        }
    }
}

// TESTS #######################################################################
