// SPDX-License-Identifier: MPL-2.0

//! End-to-end resolutions over small, fully-known dependency universes.

use concord::{
    resolve, DefaultStringReporter, OfflinePackageSource, Ranges, Reporter, SemanticVersion,
    SolveError,
};

type SemVS = Ranges<SemanticVersion>;

fn caret(v: (u32, u32, u32)) -> SemVS {
    let v = SemanticVersion::from(v);
    Ranges::between(v, v.bump_major())
}

fn exact(v: (u32, u32, u32)) -> SemVS {
    Ranges::singleton(SemanticVersion::from(v))
}

fn version(v: (u32, u32, u32)) -> SemanticVersion {
    SemanticVersion::from(v)
}

#[test]
fn prefers_the_highest_matching_version() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", caret((1, 0, 0)))]);
    source.add_dependencies("a", (1u32, 0u32, 0u32), []);
    source.add_dependencies("a", (1u32, 1u32, 0u32), []);

    let resolution = resolve(&source).unwrap();
    assert_eq!(resolution.decisions.len(), 1);
    assert_eq!(resolution.decisions.get("a"), Some(&version((1, 1, 0))));
    assert_eq!(resolution.attempted_solutions, 1);
}

#[test]
fn shared_dependency_lands_in_the_intersection() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", exact((1, 0, 0))), ("b", exact((1, 0, 0)))]);
    source.add_dependencies(
        "a",
        (1u32, 0u32, 0u32),
        [(
            "shared",
            Ranges::between(version((2, 0, 0)), version((4, 0, 0))),
        )],
    );
    source.add_dependencies(
        "b",
        (1u32, 0u32, 0u32),
        [(
            "shared",
            Ranges::between(version((3, 0, 0)), version((5, 0, 0))),
        )],
    );
    for v in [(2, 0, 0), (3, 0, 0), (3, 6, 9), (4, 0, 0), (5, 0, 0)] {
        source.add_dependencies("shared", version(v), []);
    }

    let resolution = resolve(&source).unwrap();
    assert_eq!(resolution.decisions.get("a"), Some(&version((1, 0, 0))));
    assert_eq!(resolution.decisions.get("b"), Some(&version((1, 0, 0))));
    assert_eq!(
        resolution.decisions.get("shared"),
        Some(&version((3, 6, 9)))
    );
}

#[test]
fn backtracks_away_from_a_conflicting_preference() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("foo", caret((1, 0, 0))), ("target", caret((2, 0, 0)))]);
    // The preferred foo 1.1.0 wants the old target; only foo 1.0.0 works.
    source.add_dependencies("foo", (1u32, 1u32, 0u32), [("target", caret((1, 0, 0)))]);
    source.add_dependencies("foo", (1u32, 0u32, 0u32), []);
    source.add_dependencies("target", (2u32, 0u32, 0u32), []);
    source.add_dependencies("target", (1u32, 0u32, 0u32), []);

    let resolution = resolve(&source).unwrap();
    assert_eq!(resolution.decisions.get("foo"), Some(&version((1, 0, 0))));
    assert_eq!(
        resolution.decisions.get("target"),
        Some(&version((2, 0, 0)))
    );
    assert!(resolution.attempted_solutions >= 2);
}

#[test]
fn reports_when_no_version_matches() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", caret((2, 0, 0)))]);
    source.add_dependencies("a", (1u32, 0u32, 0u32), []);

    let Err(SolveError::NoSolution(tree)) = resolve(&source) else {
        panic!("expected a failed resolution");
    };
    assert_eq!(
        DefaultStringReporter::report(&tree),
        "Because no versions of a match >=2.0.0, <3.0.0 \
         and root 1.0.0 depends on a >=2.0.0, <3.0.0, version solving failed."
    );
}

#[test]
fn reports_disjoint_shared_constraints() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", exact((1, 0, 0))), ("b", exact((1, 0, 0)))]);
    source.add_dependencies(
        "a",
        (1u32, 0u32, 0u32),
        [("shared", Ranges::strictly_lower_than(version((2, 0, 0))))],
    );
    source.add_dependencies(
        "b",
        (1u32, 0u32, 0u32),
        [("shared", Ranges::higher_than(version((2, 0, 0))))],
    );
    for v in [(1, 0, 0), (2, 0, 0), (3, 0, 0)] {
        source.add_dependencies("shared", version(v), []);
    }

    let Err(SolveError::NoSolution(tree)) = resolve(&source) else {
        panic!("expected a failed resolution");
    };
    let report = DefaultStringReporter::report(&tree);
    assert!(report.contains("a 1.0.0 depends on shared <2.0.0"), "{report}");
    assert!(
        report.contains("b 1.0.0 depends on shared >=2.0.0"),
        "{report}"
    );
    assert!(report.ends_with("version solving failed."), "{report}");
}

#[test]
fn unknown_dependency_is_dropped_when_permitted() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", exact((1, 0, 0)))]);
    source.add_dependencies("a", (1u32, 0u32, 0u32), [("missing", Ranges::full())]);
    source.permit_missing("missing");

    let resolution = resolve(&source).unwrap();
    assert_eq!(resolution.decisions.len(), 1);
    assert_eq!(resolution.decisions.get("a"), Some(&version((1, 0, 0))));
}

#[test]
fn unknown_dependency_fails_by_default() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", exact((1, 0, 0)))]);
    source.add_dependencies("a", (1u32, 0u32, 0u32), [("missing", Ranges::full())]);

    let Err(SolveError::NoSolution(tree)) = resolve(&source) else {
        panic!("expected a failed resolution");
    };
    let report = DefaultStringReporter::report(&tree);
    assert!(report.contains("missing doesn't exist"), "{report}");
}

#[test]
fn empty_root_dependencies_solve_to_nothing() {
    let source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    let resolution = resolve(&source).unwrap();
    assert!(resolution.decisions.is_empty());
    assert_eq!(resolution.attempted_solutions, 1);
}

#[test]
fn single_satisfying_version_is_selected() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("only", caret((1, 0, 0)))]);
    source.add_dependencies("only", (1u32, 0u32, 4u32), []);

    let resolution = resolve(&source).unwrap();
    assert_eq!(
        resolution.decisions.get("only"),
        Some(&version((1, 0, 4)))
    );
}

/// Every selected version is allowed by every dependency constraint under
/// which its package was requested.
#[test]
fn solution_respects_all_dependency_edges() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));
    source.add_root_dependencies([("a", caret((1, 0, 0))), ("b", caret((1, 0, 0)))]);
    source.add_dependencies("a", (1u32, 2u32, 0u32), [("c", caret((2, 0, 0)))]);
    source.add_dependencies("b", (1u32, 0u32, 0u32), [("c", caret((2, 1, 0)))]);
    source.add_dependencies("c", (2u32, 0u32, 0u32), []);
    source.add_dependencies("c", (2u32, 1u32, 5u32), []);
    source.add_dependencies("c", (3u32, 0u32, 0u32), []);

    let resolution = resolve(&source).unwrap();
    let c = resolution.decisions.get("c").unwrap();
    assert!(caret((2, 0, 0)).contains(c));
    assert!(caret((2, 1, 0)).contains(c));
    assert_eq!(c, &version((2, 1, 5)));
}
