// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

use crate::PackageSource;

/// Map implementation used by the library.
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

/// Set implementation used by the library.
pub type Set<V> = rustc_hash::FxHashSet<V>;

/// Insertion-ordered map used wherever iteration order must be deterministic.
pub(crate) type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Concrete package versions picked by [resolve](crate::resolve),
/// one per selected package. The synthetic root is not included.
pub type SelectedDependencies<S> =
    Map<<S as PackageSource>::P, <S as PackageSource>::V>;
