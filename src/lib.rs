// SPDX-License-Identifier: MPL-2.0

//! Concord solves version constraints.
//!
//! Given the dependencies declared by a package source, [resolve] selects
//! one concrete version for every package involved, such that every
//! dependency constraint holds, or produces a human-readable explanation of
//! why no selection can exist. It implements the PubGrub algorithm:
//! unit propagation over learned *incompatibilities*, with conflict-driven
//! clause learning and non-chronological backtracking.
//!
//! The engine has no opinion about what a package or a version is:
//! * packages are anything hashable and printable ([Package]);
//! * versions are anything totally ordered ([PackageSource::V]);
//! * version requirements are any boolean set algebra over versions
//!   ([VersionSet]), such as the bundled interval/union [Ranges].
//!
//! All knowledge about the dependency universe is supplied by a
//! [PackageSource]. The in-memory [OfflinePackageSource] is provided for
//! tests and fully-known universes:
//!
//! ```
//! use concord::{resolve, OfflinePackageSource, Ranges, SemanticVersion};
//!
//! let mut source =
//!     OfflinePackageSource::<&str, Ranges<SemanticVersion>>::new((1u32, 0u32, 0u32));
//! source.add_root_dependencies([(
//!     "menu",
//!     Ranges::between((1u32, 0u32, 0u32), (2u32, 0u32, 0u32)),
//! )]);
//! source.add_dependencies("menu", (1u32, 2u32, 3u32), []);
//!
//! let resolution = resolve(&source).unwrap();
//! assert_eq!(
//!     resolution.decisions.get("menu"),
//!     Some(&SemanticVersion::new(1, 2, 3)),
//! );
//! ```
//!
//! When no solution exists, [SolveError::NoSolution] carries the
//! [DerivationTree] of the failure; [DefaultStringReporter] renders it as
//! numbered, cross-referenced English prose. See the [solver] module
//! documentation for the whole picture.

#![warn(missing_docs)]

mod error;
mod internal;
mod package;
mod provider;
mod report;
pub mod solver;
mod term;
mod type_aliases;
mod version;
mod version_set;

pub use concord_range::Ranges;

pub use crate::error::SolveError;
pub use crate::package::Package;
pub use crate::provider::OfflinePackageSource;
pub use crate::report::{DefaultStringReporter, DerivationTree, Derived, External, Reporter};
pub use crate::solver::{resolve, PackageSource, Resolution, SolverPackage};
pub use crate::term::Term;
pub use crate::type_aliases::{Map, SelectedDependencies, Set};
pub use crate::version::{SemanticVersion, VersionParseError};
pub use crate::version_set::VersionSet;
