// SPDX-License-Identifier: MPL-2.0

use concord::{resolve, OfflinePackageSource, Ranges, SemanticVersion};

type SemVS = Ranges<SemanticVersion>;

fn main() {
    let mut source = OfflinePackageSource::<&str, SemVS>::new((1u32, 0u32, 0u32));

    // The user asks for a and b; both constrain a shared library.
    source.add_root_dependencies([
        ("a", Ranges::singleton(SemanticVersion::new(1, 0, 0))),
        ("b", Ranges::singleton(SemanticVersion::new(1, 0, 0))),
    ]);
    source.add_dependencies(
        "a",
        (1u32, 0u32, 0u32),
        [(
            "shared",
            Ranges::between(SemanticVersion::new(2, 0, 0), SemanticVersion::new(4, 0, 0)),
        )],
    );
    source.add_dependencies(
        "b",
        (1u32, 0u32, 0u32),
        [(
            "shared",
            Ranges::between(SemanticVersion::new(3, 0, 0), SemanticVersion::new(5, 0, 0)),
        )],
    );
    for v in [(2, 0, 0), (3, 0, 0), (3, 6, 9), (4, 0, 0), (5, 0, 0)] {
        source.add_dependencies("shared", SemanticVersion::from(v), []);
    }

    let resolution = resolve(&source).expect("this universe has a solution");
    let mut decisions: Vec<_> = resolution.decisions.into_iter().collect();
    decisions.sort();
    for (package, version) in decisions {
        println!("{package} {version}");
    }
}
