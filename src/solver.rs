// SPDX-License-Identifier: MPL-2.0

//! Conflict-driven version solving.
//!
//! Given a set of version-constrained dependencies, the solver finds one
//! concrete version per selected package satisfying all of them, or explains
//! in clear English why no such assignment exists. An explanation looks like:
//!
//! ```txt
//! Because no versions of intl match >=5.0.0 and menu >=1.1.0 depends on
//!   intl >=5.0.0, menu >=1.1.0 is forbidden.
//! Because menu >=1.1.0 is forbidden and installation of root 1.0.0 is
//!   required, version solving failed.
//! ```
//!
//! The algorithm is generic: packages only need to be hashable and
//! printable (see [Package]), versions totally ordered, and version
//! requirements expressible in a boolean set algebra (see
//! [VersionSet](crate::VersionSet)). All knowledge about actually existing
//! packages and versions is supplied through a [PackageSource].
//!
//! ## API
//!
//! ```
//! # use concord::{resolve, OfflinePackageSource, SolveError, Ranges};
//! #
//! # fn try_main() -> Result<(), SolveError<OfflinePackageSource<&'static str, Ranges<u32>>>> {
//! #     let source = OfflinePackageSource::<&str, Ranges<u32>>::new(1u32);
//! let resolution = resolve(&source)?;
//! #     let _ = resolution.decisions;
//! #     Ok(())
//! # }
//! # fn main() {
//! #     assert!(try_main().is_ok());
//! # }
//! ```
//!
//! The call to [resolve] computes the set of packages and versions needed to
//! satisfy the root dependencies declared by the source. If there is no
//! solution, the returned [SolveError::NoSolution] renders the reason as
//! clearly as possible.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{self, Debug, Display};

use log::{debug, info};

use crate::internal::{CoreError, Incompatibility, State};
use crate::{
    DerivationTree, Map, Package, SelectedDependencies, SolveError, VersionSet,
};

/// Trait that allows the algorithm to retrieve the available packages,
/// their versions and their dependencies. An implementor needs to be
/// supplied to the [resolve] function.
///
/// Calls may be slow (they may fetch remote metadata) but must be
/// referentially transparent for the duration of one solve: repeated
/// queries with the same arguments must return the same result.
pub trait PackageSource {
    /// How the source names its packages.
    type P: Package;

    /// How the source stores the versions of the packages.
    ///
    /// A common choice is [`SemanticVersion`](crate::SemanticVersion).
    type V: Debug + Display + Clone + Ord;

    /// How the source expresses version requirements. The requirements must
    /// process the same kind of versions as the source.
    ///
    /// A common choice is [`Ranges`](crate::Ranges).
    type VS: VersionSet<V = Self::V>;

    /// The kind of error returned from the query methods.
    ///
    /// Returning one aborts the resolution; the solver makes no guarantee
    /// about its own state afterwards, so retry with a fresh call to
    /// [resolve].
    type Err: Error + 'static;

    /// The version of the synthetic root package, standing for the whole
    /// user request.
    fn root_version(&self) -> Self::V;

    /// The user's requested dependencies, which become the dependencies of
    /// the synthetic root package.
    fn root_dependencies(&self) -> Result<Vec<(Self::P, Self::VS)>, Self::Err>;

    /// The known versions of a package within the given set, ordered with
    /// the **most preferred version last**.
    ///
    /// Return `None` when the source does not know the package at all, and
    /// `Some(vec![])` when the package is known but no version matches the
    /// set. The two cases behave differently: an unknown package may be
    /// dropped entirely by [allow_missing](Self::allow_missing), while an
    /// empty version list becomes a "no versions match" fact the solver can
    /// learn from.
    fn versions_for(
        &self,
        package: &Self::P,
        set: &Self::VS,
    ) -> Result<Option<Vec<Self::V>>, Self::Err>;

    /// The dependencies of a given package version, as pairs of a package
    /// and the set of versions of it that would satisfy the dependency.
    fn dependencies_for(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Vec<(Self::P, Self::VS)>, Self::Err>;

    /// Whether a dependency on a package unknown to the source may be
    /// silently dropped, instead of making every dependent version
    /// uninstallable.
    fn allow_missing(&self, _package: &Self::P) -> bool {
        false
    }
}

/// The package type the solver actually reasons about: the source's
/// packages plus the synthetic root standing for the user request. This is
/// the package type appearing in [DerivationTree]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolverPackage<P: Package> {
    /// The synthetic package whose only version is the root version and
    /// whose dependencies are the user's requested dependencies. One per
    /// solver run; it never appears in the returned decisions.
    Root,
    /// A package of the source.
    Package(P),
}

impl<P: Package> Display for SolverPackage<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Package(package) => write!(f, "{package}"),
        }
    }
}

/// The outcome of a successful resolution.
pub struct Resolution<S: PackageSource> {
    /// The selected version for every package reached from the root
    /// dependencies. The synthetic root itself is not included.
    pub decisions: SelectedDependencies<S>,
    /// How many candidate solutions were attempted before this one was
    /// found: 1 plus the number of decisions skipped because the chosen
    /// version conflicted immediately.
    pub attempted_solutions: u32,
}

impl<S: PackageSource> Debug for Resolution<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("decisions", &self.decisions)
            .field("attempted_solutions", &self.attempted_solutions)
            .finish()
    }
}

impl<S: PackageSource> Clone for Resolution<S> {
    fn clone(&self) -> Self {
        Self {
            decisions: self.decisions.clone(),
            attempted_solutions: self.attempted_solutions,
        }
    }
}

/// Main function of the library: finds a version for every package reached
/// from the root dependencies of the source, such that all dependency
/// constraints hold simultaneously.
#[cold]
pub fn resolve<S: PackageSource>(source: &S) -> Result<Resolution<S>, SolveError<S>> {
    let root_version = source.root_version();
    let mut state: State<SolverPackage<S::P>, S::VS> =
        State::init(SolverPackage::Root, root_version.clone());
    let mut added_dependencies: Map<SolverPackage<S::P>, BTreeSet<S::V>> = Map::default();
    let mut attempted_solutions: u32 = 1;
    let mut next = SolverPackage::Root;
    loop {
        info!("unit propagation: {next}");
        state.unit_propagation(next).map_err(|core_error| match core_error {
            CoreError::NoSolution(id) => {
                let mut tree = state.build_derivation_tree(id);
                if let DerivationTree::Derived(derived) = &mut tree {
                    // The terminal incompatibility forbids the root itself;
                    // an empty term list reads as total failure.
                    derived.terms.clear();
                }
                SolveError::NoSolution(Box::new(tree))
            }
            CoreError::Failure(message) => SolveError::Failure(message.into()),
        })?;

        debug!("partial solution:\n{}", state.partial_solution);

        // Decision making: among the packages required by a positive term
        // and not decided yet, pick the one with the fewest candidate
        // versions. Ties keep the first-seen package.
        let mut candidate: Option<(SolverPackage<S::P>, Vec<S::V>)> = None;
        for (package, set) in state.partial_solution.undecided_positive() {
            let versions = versions_of(source, &root_version, package, set)?.unwrap_or_default();
            let better = candidate
                .as_ref()
                .map_or(true, |(_, best)| versions.len() < best.len());
            if better {
                candidate = Some((package.clone(), versions));
            }
        }

        let Some((package, versions)) = candidate else {
            // Propagation quiesced with every required package decided.
            let decisions = state
                .partial_solution
                .decisions()
                .filter_map(|(package, version)| match package {
                    SolverPackage::Package(p) => Some((p.clone(), version.clone())),
                    SolverPackage::Root => None,
                })
                .collect();
            info!("solution found after {attempted_solutions} attempted solution(s)");
            return Ok(Resolution {
                decisions,
                attempted_solutions,
            });
        };

        // Most preferred last.
        let Some(version) = versions.last().cloned() else {
            let term = state
                .partial_solution
                .term_intersection_for_package(&package)
                .cloned()
                .ok_or_else(|| {
                    SolveError::Failure("a package was chosen but has no term".into())
                })?;
            info!("no versions of {package} match {term}");
            state.add_incompatibility(Incompatibility::no_versions(package.clone(), term));
            next = package;
            continue;
        };

        let is_new = added_dependencies
            .entry(package.clone())
            .or_default()
            .insert(version.clone());
        if is_new {
            let dependencies = dependencies_of(source, &package, &version)?;
            let mut new_ids = Vec::with_capacity(dependencies.len());
            for (dep_package, dep_set) in dependencies {
                let known = source
                    .versions_for(&dep_package, &dep_set)
                    .map_err(|source_error| SolveError::ErrorRetrievingVersions {
                        package: dep_package.clone(),
                        source: source_error,
                    })?
                    .is_some();
                if !known {
                    if source.allow_missing(&dep_package) {
                        debug!("dropping unknown dependency {dep_package} of {package} {version}");
                        continue;
                    }
                    info!("dependency {dep_package} of {package} {version} doesn't exist");
                    new_ids.push(state.add_incompatibility(
                        Incompatibility::package_not_found(SolverPackage::Package(
                            dep_package.clone(),
                        )),
                    ));
                }
                let incompat = Incompatibility::from_dependency(
                    package.clone(),
                    S::VS::singleton(version.clone()),
                    (SolverPackage::Package(dep_package), dep_set),
                );
                // A version satisfying its own dependency constrains nothing.
                if incompat.is_vacuous() {
                    continue;
                }
                new_ids.push(state.add_incompatibility(incompat));
            }
            if state.decision_conflicts(&package, &version, &new_ids) {
                // The chosen version is rejected outright; propagation will
                // rule it out and the next round tries the next preference.
                attempted_solutions += 1;
                info!("skipping {package} {version}: its dependencies conflict");
                next = package;
                continue;
            }
        }
        info!("decision: {package} @ {version}");
        state.partial_solution.decide(package.clone(), version);
        next = package;
    }
}

/// The versions of a package matching a set, root included.
fn versions_of<S: PackageSource>(
    source: &S,
    root_version: &S::V,
    package: &SolverPackage<S::P>,
    set: &S::VS,
) -> Result<Option<Vec<S::V>>, SolveError<S>> {
    match package {
        SolverPackage::Root => Ok(Some(if set.contains(root_version) {
            vec![root_version.clone()]
        } else {
            vec![]
        })),
        SolverPackage::Package(p) => {
            source
                .versions_for(p, set)
                .map_err(|source_error| SolveError::ErrorRetrievingVersions {
                    package: p.clone(),
                    source: source_error,
                })
        }
    }
}

/// The dependencies of a package version, root included.
fn dependencies_of<S: PackageSource>(
    source: &S,
    package: &SolverPackage<S::P>,
    version: &S::V,
) -> Result<Vec<(S::P, S::VS)>, SolveError<S>> {
    match package {
        SolverPackage::Root => source
            .root_dependencies()
            .map_err(SolveError::ErrorRetrievingRootDependencies),
        SolverPackage::Package(p) => source.dependencies_for(p, version).map_err(|source_error| {
            SolveError::ErrorRetrievingDependencies {
                package: p.clone(),
                version: version.clone(),
                source: source_error,
            }
        }),
    }
}
