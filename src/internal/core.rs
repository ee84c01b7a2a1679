// SPDX-License-Identifier: MPL-2.0

//! Core state of the solver: the growing store of incompatibilities, the
//! partial solution, unit propagation and conflict resolution.

use std::sync::Arc;

use log::{debug, info};

use crate::internal::arena::Arena;
use crate::internal::incompatibility::{IncompId, Incompatibility, Relation};
use crate::internal::partial_solution::{DecisionLevel, PartialSolution, Satisfier};
use crate::term::Term;
use crate::{DerivationTree, Map, Package, Set, VersionSet};

/// Failures surfacing from propagation and conflict resolution. The driver
/// turns them into the public error type.
pub(crate) enum CoreError<P: Package, VS: VersionSet> {
    /// Conflict resolution bubbled up to the root: no solution exists. The
    /// id points at the terminal incompatibility.
    NoSolution(IncompId<P, VS>),
    /// An internal contract was broken, either by the engine or by an
    /// inconsistent version set algebra.
    Failure(&'static str),
}

/// Current state of the solver, shared by propagation, conflict resolution
/// and decision making.
pub(crate) struct State<P: Package, VS: VersionSet> {
    root_package: P,
    root_version: VS::V,

    /// All incompatibilities ever created, never dropped. Derived ones
    /// reference their parents in here, forming the derivation DAG.
    pub(crate) incompatibility_store: Arena<Incompatibility<P, VS>>,

    /// Index from a package to all registered incompatibilities mentioning
    /// it. Only registered incompatibilities take part in propagation;
    /// intermediate resolvents stay in the store for reporting only.
    incompatibilities: Map<P, Vec<IncompId<P, VS>>>,

    pub(crate) partial_solution: PartialSolution<P, VS>,
}

impl<P: Package, VS: VersionSet> State<P, VS> {
    /// Initialization of the root state: a single incompatibility requiring
    /// the root package at the root version.
    pub(crate) fn init(root_package: P, root_version: VS::V) -> Self {
        let mut incompatibility_store = Arena::new();
        let root_id = incompatibility_store.alloc(Incompatibility::root(
            root_package.clone(),
            root_version.clone(),
        ));
        let mut incompatibilities = Map::default();
        incompatibilities.insert(root_package.clone(), vec![root_id]);
        Self {
            root_package,
            root_version,
            incompatibility_store,
            incompatibilities,
            partial_solution: PartialSolution::empty(),
        }
    }

    /// Allocate an incompatibility and register it for propagation under
    /// each package it mentions.
    pub(crate) fn add_incompatibility(&mut self, incompat: Incompatibility<P, VS>) -> IncompId<P, VS> {
        let id = self.incompatibility_store.alloc(incompat);
        self.register(id);
        id
    }

    fn register(&mut self, id: IncompId<P, VS>) {
        for (package, _term) in self.incompatibility_store[id].iter() {
            self.incompatibilities
                .entry(package.clone())
                .or_default()
                .push(id);
        }
    }

    /// Check whether deciding `package @ version` would immediately satisfy
    /// one of the given incompatibilities, given everything else already in
    /// the partial solution.
    pub(crate) fn decision_conflicts(
        &self,
        package: &P,
        version: &VS::V,
        new_ids: &[IncompId<P, VS>],
    ) -> bool {
        let decision_term = Term::exact(version.clone());
        new_ids.iter().any(|&id| {
            self.incompatibility_store[id].relation(|p| {
                if p == package {
                    Some(&decision_term)
                } else {
                    self.partial_solution.term_intersection_for_package(p)
                }
            }) == Relation::Satisfied
        })
    }

    /// Unit propagation is the core mechanism of the solving algorithm.
    ///
    /// For each registered incompatibility mentioning a changed package:
    /// if it is fully satisfied by the partial solution it is a conflict and
    /// goes to conflict resolution; if all terms but one are satisfied, the
    /// inverse of the remaining term is a forced derivation.
    pub(crate) fn unit_propagation(&mut self, package: P) -> Result<(), CoreError<P, VS>> {
        let mut changed = vec![package];
        while let Some(current_package) = changed.pop() {
            let incompat_ids = self
                .incompatibilities
                .get(&current_package)
                .cloned()
                .unwrap_or_default();
            let mut conflict = None;
            for incompat_id in incompat_ids {
                let current = &self.incompatibility_store[incompat_id];
                match current.relation(|p| self.partial_solution.term_intersection_for_package(p))
                {
                    Relation::Satisfied => {
                        debug!(
                            "conflict while propagating {current_package}: {}",
                            self.incompatibility_store[incompat_id]
                        );
                        conflict = Some(incompat_id);
                        break;
                    }
                    Relation::AlmostSatisfied(unsatisfied_package) => {
                        let term = current
                            .get(&unsatisfied_package)
                            .expect("almost-satisfied package is in the incompatibility")
                            .negate();
                        self.partial_solution
                            .derive(unsatisfied_package.clone(), term, incompat_id);
                        changed.push(unsatisfied_package);
                    }
                    Relation::Contradicted(_) | Relation::Inconclusive => {}
                }
            }
            if let Some(incompat_id) = conflict {
                let (learned_package, learned_id) = self.conflict_resolution(incompat_id)?;
                // After backtracking the learned incompatibility is almost
                // satisfied: its term on the satisfier package now forces a
                // derivation.
                let term = self.incompatibility_store[learned_id]
                    .get(&learned_package)
                    .expect("the learned incompatibility mentions the satisfier package")
                    .negate();
                self.partial_solution
                    .derive(learned_package.clone(), term, learned_id);
                changed.clear();
                changed.push(learned_package);
            }
        }
        Ok(())
    }

    /// Replace the conflict incompatibility by its prior cause, over and
    /// over, until it is ready to induce a backtrack: its most recent
    /// satisfier is a decision, or it is the only satisfier at its level.
    ///
    /// Returns the package whose term the learned incompatibility will
    /// force, and the id of that incompatibility.
    fn conflict_resolution(
        &mut self,
        incompatibility: IncompId<P, VS>,
    ) -> Result<(P, IncompId<P, VS>), CoreError<P, VS>> {
        let mut current_id = incompatibility;
        let mut current_changed = false;
        loop {
            if self.incompatibility_store[current_id]
                .is_terminal(&self.root_package, &self.root_version)
            {
                return Err(CoreError::NoSolution(current_id));
            }

            // Most recent satisfier of the whole incompatibility, and the
            // highest level among the satisfiers of its other terms.
            let mut most_recent: Option<(P, Satisfier<P, VS>)> = None;
            let mut previous_level = DecisionLevel(1);
            for (package, term) in self.incompatibility_store[current_id].iter() {
                let satisfier = self
                    .partial_solution
                    .satisfier(package, term)
                    .ok_or(CoreError::Failure(
                        "the conflict incompatibility is not satisfied by the partial solution",
                    ))?;
                match &most_recent {
                    None => most_recent = Some((package.clone(), satisfier)),
                    Some((_, best)) if satisfier.index > best.index => {
                        previous_level = previous_level.max(best.level);
                        most_recent = Some((package.clone(), satisfier));
                    }
                    Some(_) => previous_level = previous_level.max(satisfier.level),
                }
            }
            let (satisfier_package, satisfier) = most_recent.ok_or(CoreError::Failure(
                "a conflict incompatibility cannot be empty here",
            ))?;

            // If the satisfier only partially satisfies the term, the earlier
            // assignments completing it also bound the backtrack level.
            let incompat_term = self.incompatibility_store[current_id]
                .get(&satisfier_package)
                .expect("the satisfier package is in the incompatibility")
                .clone();
            let difference = satisfier.term.difference(&incompat_term);
            let difference_is_empty =
                matches!(&difference, Term::Positive(set) if set.is_empty());
            if !difference_is_empty {
                let completing = self
                    .partial_solution
                    .satisfier(&satisfier_package, &difference.negate())
                    .ok_or(CoreError::Failure(
                        "the rest of a partially satisfied term has no satisfier",
                    ))?;
                previous_level = previous_level.max(completing.level);
            }

            match satisfier.cause {
                // The satisfier is a derivation sharing its level with the
                // previous satisfier: resolve it away and loop.
                Some(satisfier_cause) if previous_level >= satisfier.level => {
                    let prior = Incompatibility::prior_cause(
                        current_id,
                        satisfier_cause,
                        &satisfier_package,
                        &self.incompatibility_store,
                    );
                    debug!("prior cause: {prior}");
                    current_id = self.incompatibility_store.alloc(prior);
                    current_changed = true;
                }
                // The satisfier is a decision, or lives above every other
                // satisfier: backtrack and let propagation act on the
                // learned incompatibility.
                _ => {
                    info!(
                        "backtracking to level {} with: {}",
                        previous_level.0, self.incompatibility_store[current_id]
                    );
                    self.partial_solution.backtrack(previous_level);
                    if current_changed {
                        self.register(current_id);
                    }
                    return Ok((satisfier_package, current_id));
                }
            }
        }
    }

    /// Build the derivation tree rooted at an incompatibility, for error
    /// reporting. Nodes referenced more than once are marked shared.
    pub(crate) fn build_derivation_tree(
        &self,
        incompat: IncompId<P, VS>,
    ) -> DerivationTree<P, VS> {
        // Collect the DAG below the failure, remembering shared nodes.
        let mut all_ids: Set<IncompId<P, VS>> = Set::default();
        let mut shared_ids = Set::default();
        let mut stack = vec![incompat];
        while let Some(id) = stack.pop() {
            if all_ids.contains(&id) {
                shared_ids.insert(id);
                continue;
            }
            all_ids.insert(id);
            if let Some((id1, id2)) = self.incompatibility_store[id].causes() {
                stack.push(id1);
                stack.push(id2);
            }
        }
        // Parents are strictly older than their children, so building in
        // allocation order is topological.
        let mut sorted_ids: Vec<_> = all_ids.into_iter().collect();
        sorted_ids.sort_by_key(|id| id.into_raw());
        let mut precomputed: Map<IncompId<P, VS>, Arc<DerivationTree<P, VS>>> = Map::default();
        for id in sorted_ids {
            let tree = Incompatibility::build_derivation_tree(
                id,
                &shared_ids,
                &self.incompatibility_store,
                &precomputed,
            );
            precomputed.insert(id, Arc::new(tree));
        }
        precomputed
            .remove(&incompat)
            .map(|tree| Arc::try_unwrap(tree).unwrap_or_else(|arc| (*arc).clone()))
            .expect("the failure incompatibility was just built")
    }
}
