// SPDX-License-Identifier: MPL-2.0

use concord::{
    resolve, DefaultStringReporter, OfflinePackageSource, Ranges, Reporter, SemanticVersion,
    SolveError,
};

type SemVS = Ranges<SemanticVersion>;

fn caret(v: (u32, u32, u32)) -> SemVS {
    let v = SemanticVersion::from(v);
    Ranges::between(v, v.bump_major())
}

// https://github.com/dart-lang/pub/blob/master/doc/solver.md#linear-error-reporting
fn main() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));

    // root 1.0.0 depends on foo ^1.0.0 and baz ^1.0.0
    source.add_root_dependencies([("foo", caret((1, 0, 0))), ("baz", caret((1, 0, 0)))]);
    // foo 1.0.0 depends on bar ^2.0.0
    source.add_dependencies("foo", (1u32, 0u32, 0u32), [("bar", caret((2, 0, 0)))]);
    // bar 2.0.0 depends on baz ^3.0.0
    source.add_dependencies("bar", (2u32, 0u32, 0u32), [("baz", caret((3, 0, 0)))]);
    // baz 1.0.0 and 3.0.0 have no dependencies
    source.add_dependencies("baz", (1u32, 0u32, 0u32), []);
    source.add_dependencies("baz", (3u32, 0u32, 0u32), []);

    match resolve(&source) {
        Ok(resolution) => println!("{:?}", resolution.decisions),
        Err(SolveError::NoSolution(mut derivation_tree)) => {
            eprintln!("No solution.\n");

            eprintln!("### Default report:");
            eprintln!("```");
            eprintln!("{}", DefaultStringReporter::report(&derivation_tree));
            eprintln!("```\n");

            derivation_tree.collapse_no_versions();
            eprintln!("### Report with `collapse_no_versions`:");
            eprintln!("```");
            eprintln!("{}", DefaultStringReporter::report(&derivation_tree));
            eprintln!("```");
            std::process::exit(1);
        }
        Err(err) => panic!("{:?}", err),
    };
}
