// SPDX-License-Identifier: MPL-2.0

//! This bench monitors the performance of backtracking and term intersection.
//!
//! Dependencies are constructed in a way that all versions need to be tested
//! before finding a solution.

use concord::{resolve, OfflinePackageSource, Ranges};
use criterion::*;

/// A chain of packages whose versions require the exact same version of the
/// next package, with the end of the chain missing: every version above the
/// oldest is a dead end, and the solver has to walk all of them back.
fn backtracking_singletons(c: &mut Criterion, package_count: u32, version_count: u32) {
    let mut source = OfflinePackageSource::<u32, Ranges<u32>>::new(0u32);

    source.add_root_dependencies([(1u32, Ranges::full())]);
    source.add_dependencies(1u32, 0u32, []);

    for n in 1..package_count {
        for v in 1..version_count {
            source.add_dependencies(n, v, [(n + 1, Ranges::singleton(v))]);
        }
    }

    c.bench_function("backtracking_singletons", |b| {
        b.iter(|| {
            let _ = resolve(&source);
        })
    });
}

/// Same shape, but with version requirements spanning disjoint ranges so
/// term intersections stay non-trivial.
fn backtracking_ranges(c: &mut Criterion, package_count: u32, version_count: u32) {
    let mut source = OfflinePackageSource::<u32, Ranges<u32>>::new(0u32);

    source.add_root_dependencies([(1u32, Ranges::full())]);
    source.add_dependencies(1u32, 0u32, []);

    for n in 1..package_count {
        for v in 1..version_count {
            let dep = Ranges::between(v, v + 2).union(&Ranges::singleton(v + 10));
            source.add_dependencies(n, v, [(n + 1, dep)]);
        }
    }

    c.bench_function("backtracking_ranges", |b| {
        b.iter(|| {
            let _ = resolve(&source);
        })
    });
}

fn bench_group(c: &mut Criterion) {
    backtracking_singletons(c, 20, 20);
    backtracking_ranges(c, 10, 10);
}

criterion_group!(benches, bench_group);
criterion_main!(benches);
