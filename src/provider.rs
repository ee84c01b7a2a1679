use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::{Map, Package, PackageSource, Set, VersionSet};

/// A basic implementation of [PackageSource] holding all dependency
/// information in memory: suitable for tests, examples, and embedders whose
/// whole universe is known up front.
///
/// Versions are enumerated in ascending order, so the highest matching
/// version is the preferred one.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "P: serde::Serialize, VS: serde::Serialize, VS::V: serde::Serialize",
        deserialize = "P: serde::Deserialize<'de>, VS: serde::Deserialize<'de>, VS::V: serde::Deserialize<'de>"
    ))
)]
pub struct OfflinePackageSource<P: Package, VS: VersionSet> {
    root_version: VS::V,
    root_dependencies: Vec<(P, VS)>,
    dependencies: Map<P, BTreeMap<VS::V, Vec<(P, VS)>>>,
    missing_allowed: Set<P>,
}

impl<P: Package, VS: VersionSet> OfflinePackageSource<P, VS> {
    /// Creates a source with the given root version and no packages.
    pub fn new(root_version: impl Into<VS::V>) -> Self {
        Self {
            root_version: root_version.into(),
            root_dependencies: Vec::new(),
            dependencies: Map::default(),
            missing_allowed: Set::default(),
        }
    }

    /// Append dependencies to the user request.
    pub fn add_root_dependencies<I: IntoIterator<Item = (P, VS)>>(&mut self, dependencies: I) {
        self.root_dependencies.extend(dependencies);
    }

    /// Registers the dependencies of a package and version pair.
    /// Dependencies must be added with a single call; subsequent calls for
    /// the same package and version replace the previous dependencies.
    ///
    /// The API does not allow adding dependencies one at a time, to uphold
    /// the assumption that [versions_for](PackageSource::versions_for) and
    /// [dependencies_for](PackageSource::dependencies_for) describe a
    /// package version completely.
    pub fn add_dependencies<I: IntoIterator<Item = (P, VS)>>(
        &mut self,
        package: P,
        version: impl Into<VS::V>,
        dependencies: I,
    ) {
        let package_deps = dependencies.into_iter().collect();
        let version = version.into();
        *self
            .dependencies
            .entry(package)
            .or_default()
            .entry(version)
            .or_default() = package_deps;
    }

    /// Mark a package as allowed to be missing: dependencies on it are
    /// silently dropped if the source does not know it.
    pub fn permit_missing(&mut self, package: P) {
        self.missing_allowed.insert(package);
    }

    /// Lists packages that have been saved.
    pub fn packages(&self) -> impl Iterator<Item = &P> {
        self.dependencies.keys()
    }

    /// Lists versions of a saved package in ascending order.
    /// Returns [None] if no information is available regarding that package.
    pub fn versions(&self, package: &P) -> Option<impl Iterator<Item = &VS::V>> {
        self.dependencies.get(package).map(|versions| versions.keys())
    }
}

impl<P: Package, VS: VersionSet> PackageSource for OfflinePackageSource<P, VS> {
    type P = P;
    type V = VS::V;
    type VS = VS;
    type Err = Infallible;

    fn root_version(&self) -> VS::V {
        self.root_version.clone()
    }

    fn root_dependencies(&self) -> Result<Vec<(P, VS)>, Infallible> {
        Ok(self.root_dependencies.clone())
    }

    #[inline]
    fn versions_for(&self, package: &P, set: &VS) -> Result<Option<Vec<VS::V>>, Infallible> {
        Ok(self.dependencies.get(package).map(|versions| {
            versions
                .keys()
                .filter(|version| set.contains(version))
                .cloned()
                .collect()
        }))
    }

    #[inline]
    fn dependencies_for(&self, package: &P, version: &VS::V) -> Result<Vec<(P, VS)>, Infallible> {
        Ok(self
            .dependencies
            .get(package)
            .and_then(|versions| versions.get(version))
            .cloned()
            .unwrap_or_default())
    }

    fn allow_missing(&self, package: &P) -> bool {
        self.missing_allowed.contains(package)
    }
}
