// SPDX-License-Identifier: MPL-2.0

use concord::{resolve, OfflinePackageSource, Ranges, SolveError};

type NumVS = Ranges<u32>;

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn same_result_on_repeated_runs() {
    log_init();
    let mut source = OfflinePackageSource::<_, NumVS>::new(0u32);
    source.add_root_dependencies([("a", Ranges::singleton(0u32))]);

    source.add_dependencies("c", 0u32, []);
    source.add_dependencies("c", 2u32, []);
    source.add_dependencies("b", 0u32, []);
    source.add_dependencies("b", 1u32, [("c", Ranges::between(0u32, 1u32))]);
    source.add_dependencies("a", 0u32, [("b", Ranges::full()), ("c", Ranges::full())]);

    let one = resolve(&source);
    for _ in 0..10 {
        match (&one, &resolve(&source)) {
            (Ok(l), Ok(r)) => {
                assert_eq!(l.decisions, r.decisions);
                assert_eq!(l.attempted_solutions, r.attempted_solutions);
            }
            _ => panic!("not the same result"),
        }
    }
}

#[test]
fn should_always_find_a_satisfier() {
    log_init();
    let mut source = OfflinePackageSource::<_, NumVS>::new(0u32);
    source.add_root_dependencies([("a", Ranges::full())]);
    source.add_dependencies("a", 0u32, [("b", Ranges::empty())]);
    assert!(matches!(
        resolve(&source),
        Err(SolveError::NoSolution { .. })
    ));

    let mut source = OfflinePackageSource::<_, NumVS>::new(0u32);
    source.add_root_dependencies([("c", Ranges::full())]);
    source.add_dependencies("a", 0u32, [("b", Ranges::empty())]);
    source.add_dependencies("c", 0u32, [("a", Ranges::full())]);
    assert!(matches!(
        resolve(&source),
        Err(SolveError::NoSolution { .. })
    ));
}

#[test]
fn depend_on_self() {
    log_init();
    let mut source = OfflinePackageSource::<_, NumVS>::new(0u32);
    source.add_root_dependencies([("a", Ranges::full())]);
    source.add_dependencies("a", 0u32, [("a", Ranges::full())]);
    assert!(resolve(&source).is_ok());

    let mut source = OfflinePackageSource::<_, NumVS>::new(0u32);
    source.add_root_dependencies([("a", Ranges::singleton(66u32))]);
    source.add_dependencies("a", 66u32, [("a", Ranges::singleton(111u32))]);
    assert!(resolve(&source).is_err());
}

/// A chain of singleton requirements where every version of the middle
/// packages leads to a dead end except the oldest ones.
#[test]
fn exhaustive_backtracking_terminates() {
    log_init();
    let mut source = OfflinePackageSource::<u32, NumVS>::new(0u32);
    source.add_root_dependencies([(1u32, Ranges::full())]);
    source.add_dependencies(1u32, 0u32, []);
    for n in 1u32..6 {
        for v in 1u32..6 {
            source.add_dependencies(n, v, [(n + 1, Ranges::singleton(v))]);
        }
    }
    // Package 6 does not exist, so every v >= 1 of the chain is doomed and
    // only 1 @ 0 works.
    let resolution = resolve(&source).unwrap();
    assert_eq!(resolution.decisions.get(&1u32), Some(&0u32));
}
