// SPDX-License-Identifier: MPL-2.0

//! Handling pubgrub errors.

use thiserror::Error;

use crate::report::{DefaultStringReporter, Reporter};
use crate::solver::SolverPackage;
use crate::{DerivationTree, PackageSource};

/// Errors raised by the solver.
#[derive(Error)]
pub enum SolveError<S: PackageSource> {
    /// There is no solution for this set of dependencies. The derivation
    /// tree is the failure incompatibility with its whole DAG of causes;
    /// displaying the error renders it as a numbered explanation.
    #[error("version solving failed:\n{}", DefaultStringReporter::report(.0.as_ref()))]
    NoSolution(Box<DerivationTree<SolverPackage<S::P>, S::VS>>),

    /// Error raised by the source while being asked for the root
    /// dependencies.
    #[error("retrieving the root dependencies failed")]
    ErrorRetrievingRootDependencies(#[source] S::Err),

    /// Error raised by the source while being asked for the versions of a
    /// package.
    #[error("retrieving the available versions of {package} failed")]
    ErrorRetrievingVersions {
        /// The package that was being queried.
        package: S::P,
        /// The error raised by the source.
        #[source]
        source: S::Err,
    },

    /// Error raised by the source while being asked for the dependencies of
    /// a package version.
    #[error("retrieving the dependencies of {package} {version} failed")]
    ErrorRetrievingDependencies {
        /// The package whose dependencies were being queried.
        package: S::P,
        /// The version whose dependencies were being queried.
        version: S::V,
        /// The error raised by the source.
        #[source]
        source: S::Err,
    },

    /// Something unexpected happened inside the solver: a broken internal
    /// contract, most likely caused by an inconsistent version set algebra.
    #[error("{0}")]
    Failure(String),
}

impl<S: PackageSource> std::fmt::Debug for SolveError<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSolution(tree) => f.debug_tuple("NoSolution").field(tree).finish(),
            Self::ErrorRetrievingRootDependencies(source) => f
                .debug_tuple("ErrorRetrievingRootDependencies")
                .field(source)
                .finish(),
            Self::ErrorRetrievingVersions { package, source } => f
                .debug_struct("ErrorRetrievingVersions")
                .field("package", package)
                .field("source", source)
                .finish(),
            Self::ErrorRetrievingDependencies {
                package,
                version,
                source,
            } => f
                .debug_struct("ErrorRetrievingDependencies")
                .field("package", package)
                .field("version", version)
                .field("source", source)
                .finish(),
            Self::Failure(message) => f.debug_tuple("Failure").field(message).finish(),
        }
    }
}
