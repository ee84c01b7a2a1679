// SPDX-License-Identifier: MPL-2.0

//! Trait for identifying packages.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait for identifying packages.
///
/// The solver does not look inside a package identifier. It only needs to
/// compare them, hash them, and print them in explanations, so the trait is
/// automatically implemented for any type providing those.
pub trait Package: Clone + Eq + Hash + Debug + Display {}

impl<T: Clone + Eq + Hash + Debug + Display> Package for T {}
