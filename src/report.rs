// SPDX-License-Identifier: MPL-2.0

//! Build a report as clear as possible as to why dependency solving failed.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::term::Term;
use crate::type_aliases::Map;
use crate::{Package, VersionSet};

/// Reporter trait.
pub trait Reporter<P: Package, VS: VersionSet> {
    /// Output type of the report.
    type Output;

    /// Generate a report from the derivation tree describing the resolution
    /// failure.
    fn report(derivation_tree: &DerivationTree<P, VS>) -> Self::Output;
}

/// Derivation tree resulting in the impossibility to solve the dependencies
/// of our root package.
#[derive(Debug, Clone)]
pub enum DerivationTree<P: Package, VS: VersionSet> {
    /// External incompatibility.
    External(External<P, VS>),
    /// Incompatibility derived from two others.
    Derived(Derived<P, VS>),
}

/// Incompatibilities that are not derived from others,
/// they have their own reason.
#[derive(Debug, Clone)]
pub enum External<P: Package, VS: VersionSet> {
    /// Initial incompatibility: the root package must be selected at the
    /// root version.
    Root(P, VS::V),
    /// There are no versions in the given set for this package.
    NoVersions(P, VS),
    /// Incompatibility coming from the dependencies of a given package.
    FromDependencyOf(P, VS, P, VS),
    /// The source does not know the package at all.
    PackageNotFound(P),
}

/// Incompatibility derived from two others.
#[derive(Debug, Clone)]
pub struct Derived<P: Package, VS: VersionSet> {
    /// Terms of the incompatibility, in a stable order.
    pub terms: Vec<(P, Term<VS>)>,
    /// Indicate if the incompatibility is present multiple times in the
    /// derivation tree. If that is the case, the number is a unique id. It
    /// will be used in the report to refer to the explanation of this
    /// incompatibility, instead of writing it again.
    pub shared_id: Option<usize>,
    /// First cause.
    pub cause1: Arc<DerivationTree<P, VS>>,
    /// Second cause.
    pub cause2: Arc<DerivationTree<P, VS>>,
}

impl<P: Package, VS: VersionSet> DerivationTree<P, VS> {
    /// Merge the [NoVersions](External::NoVersions) leaves into the
    /// dependency edges they are paired with in derived nodes. A dependency
    /// on versions none of which exist is unsatisfiable on its own, so the
    /// reports read better without the separate "no versions" statement.
    ///
    /// This is lossy: the merged tree no longer spells out that the
    /// requested versions do not exist.
    pub fn collapse_no_versions(&mut self) {
        let DerivationTree::Derived(derived) = self else {
            return;
        };
        Arc::make_mut(&mut derived.cause1).collapse_no_versions();
        Arc::make_mut(&mut derived.cause2).collapse_no_versions();
        let replacement = match (derived.cause1.as_ref(), derived.cause2.as_ref()) {
            (
                DerivationTree::External(External::NoVersions(package, set)),
                DerivationTree::External(External::FromDependencyOf(p1, s1, p2, s2)),
            )
            | (
                DerivationTree::External(External::FromDependencyOf(p1, s1, p2, s2)),
                DerivationTree::External(External::NoVersions(package, set)),
            ) => {
                // Versions in `set` do not exist, so widening either end of
                // the edge with them keeps the statement true.
                if p1 == package {
                    Some(External::FromDependencyOf(
                        p1.clone(),
                        s1.union(set),
                        p2.clone(),
                        s2.clone(),
                    ))
                } else if p2 == package {
                    Some(External::FromDependencyOf(
                        p1.clone(),
                        s1.clone(),
                        p2.clone(),
                        s2.union(set),
                    ))
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(replacement) = replacement {
            *self = DerivationTree::External(replacement);
        }
    }
}

impl<P: Package, VS: VersionSet> Display for External<P, VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(package, version) => {
                write!(f, "installation of {package} {version} is required")
            }
            Self::NoVersions(package, set) => {
                if set == &VS::full() {
                    write!(f, "there is no available version for {package}")
                } else {
                    write!(f, "no versions of {package} match {set}")
                }
            }
            Self::PackageNotFound(package) => write!(f, "{package} doesn't exist"),
            Self::FromDependencyOf(package, package_set, dep, dep_set) => {
                if package_set == &VS::full() && dep_set == &VS::full() {
                    write!(f, "{package} depends on {dep}")
                } else if package_set == &VS::full() {
                    write!(f, "{package} depends on {dep} {dep_set}")
                } else if dep_set == &VS::full() {
                    write!(f, "{package} {package_set} depends on {dep}")
                } else {
                    write!(f, "{package} {package_set} depends on {dep} {dep_set}")
                }
            }
        }
    }
}

/// Default reporter able to generate an explanation as a [String]: numbered
/// lines of the form "Because <cause> and <cause>, <conclusion>", where
/// causes explained on an earlier numbered line are referenced as "(N)".
pub struct DefaultStringReporter {
    /// The finished lines, in order.
    lines: Vec<String>,
    /// The number of explanations that have been given a line number so far.
    ref_count: usize,
    /// Line number assigned to a shared derived incompatibility, keyed by
    /// its shared id. Numbers are assigned in order of first appearance.
    shared_with_ref: Map<usize, usize>,
}

impl DefaultStringReporter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            ref_count: 0,
            shared_with_ref: Map::default(),
        }
    }

    /// Emit the line explaining one derived incompatibility, after emitting
    /// everything its causes need.
    fn build<P: Package, VS: VersionSet>(&mut self, derived: &Derived<P, VS>) {
        let cause1 = self.cause_phrase(&derived.cause1);
        let cause2 = self.cause_phrase(&derived.cause2);
        self.lines.push(format!(
            "Because {} and {}, {}.",
            cause1,
            cause2,
            Self::string_terms(&derived.terms)
        ));
    }

    /// The phrase referring to a cause inside its parent's line. Externals
    /// are spelled out in place; derived causes are explained on their own
    /// lines first, then referred to by their conclusion (and line number if
    /// shared).
    fn cause_phrase<P: Package, VS: VersionSet>(
        &mut self,
        cause: &DerivationTree<P, VS>,
    ) -> String {
        match cause {
            DerivationTree::External(external) => external.to_string(),
            DerivationTree::Derived(derived) => {
                if let Some(line) = derived
                    .shared_id
                    .and_then(|id| self.shared_with_ref.get(&id).copied())
                {
                    // Already explained on a numbered line.
                    return format!("{} ({})", Self::string_terms(&derived.terms), line);
                }
                self.build(derived);
                match derived.shared_id {
                    Some(id) => {
                        // First appearance of a shared node: number the line
                        // just written so later mentions can reference it.
                        self.ref_count += 1;
                        self.shared_with_ref.insert(id, self.ref_count);
                        if let Some(line) = self.lines.last_mut() {
                            line.push_str(&format!(" ({})", self.ref_count));
                        }
                        format!("{} ({})", Self::string_terms(&derived.terms), self.ref_count)
                    }
                    None => Self::string_terms(&derived.terms),
                }
            }
        }
    }

    /// Try to print terms of an incompatibility in a human-readable way.
    fn string_terms<P: Package, VS: VersionSet>(terms: &[(P, Term<VS>)]) -> String {
        match terms {
            [] => "version solving failed".into(),
            [(package, Term::Positive(set))] => format!("{package} {set} is forbidden"),
            [(package, Term::Negative(set))] => format!("{package} {set} is mandatory"),
            [(p_pos, Term::Positive(set_pos)), (p_neg, Term::Negative(set_neg))]
            | [(p_neg, Term::Negative(set_neg)), (p_pos, Term::Positive(set_pos))] => {
                External::FromDependencyOf(
                    p_pos,
                    set_pos.clone(),
                    p_neg,
                    set_neg.clone(),
                )
                .to_string()
            }
            slice => {
                let str_terms: Vec<_> = slice.iter().map(|(p, t)| format!("{p} {t}")).collect();
                str_terms.join(", ") + " are incompatible"
            }
        }
    }
}

impl<P: Package, VS: VersionSet> Reporter<P, VS> for DefaultStringReporter {
    type Output = String;

    fn report(derivation_tree: &DerivationTree<P, VS>) -> Self::Output {
        match derivation_tree {
            DerivationTree::External(external) => external.to_string(),
            DerivationTree::Derived(derived) => {
                let mut reporter = Self::new();
                reporter.build(derived);
                reporter.lines.join("\n")
            }
        }
    }
}
