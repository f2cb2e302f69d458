//! Property-based tests for version ordering.
//!
//! Selection of the latest tag relies on [`VersionTag`] being a total order;
//! these tests check the order laws on generated tags.

#[cfg(test)]
mod proptest_tests {
    use crate::version::{parse_tags, select_latest, VersionTag};
    use proptest::prelude::*;

    fn core() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(0u32..1000, 1..5)
    }

    fn tag() -> impl Strategy<Value = String> {
        (
            prop::option::of(Just("v")),
            core(),
            prop::option::of("(rc|beta|alpha)\\.[0-9]{1,2}"),
        )
            .prop_map(|(prefix, core, suffix)| {
                let mut tag = prefix.unwrap_or_default().to_string();
                tag.push_str(
                    &core
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join("."),
                );
                if let Some(suffix) = suffix {
                    tag.push('-');
                    tag.push_str(&suffix);
                }
                tag
            })
    }

    fn v(raw: &str) -> VersionTag {
        VersionTag::parse(raw).unwrap()
    }

    // ============================================================================
    // Order laws
    // ============================================================================

    proptest! {
        /// Property: every version equals itself
        #[test]
        fn ordering_is_reflexive(a in tag()) {
            prop_assert_eq!(v(&a), v(&a));
        }

        /// Property: a < b exactly when b > a
        #[test]
        fn ordering_is_antisymmetric(a in tag(), b in tag()) {
            prop_assert_eq!(v(&a).cmp(&v(&b)), v(&b).cmp(&v(&a)).reverse());
        }

        /// Property: a <= b and b <= c imply a <= c
        #[test]
        fn ordering_is_transitive(a in tag(), b in tag(), c in tag()) {
            let mut sorted = [v(&a), v(&b), v(&c)];
            sorted.sort();
            prop_assert!(sorted[0] <= sorted[2]);
            prop_assert!(sorted[0] <= sorted[1] && sorted[1] <= sorted[2]);
        }

        /// Property: trailing zero segments do not change the version
        #[test]
        fn zero_padding_is_neutral(core in core(), zeros in 1usize..3) {
            let base = core.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
            let padded = format!("{}{}", base, ".0".repeat(zeros));
            prop_assert_eq!(v(&base), v(&padded));
        }

        /// Property: segments compare numerically, not as strings
        #[test]
        fn segments_compare_numerically(major in 0u32..100, a in 0u32..10_000, b in 0u32..10_000) {
            let left = v(&format!("{}.{}.0", major, a));
            let right = v(&format!("{}.{}.0", major, b));
            prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        }

        /// Property: a release is greater than any pre-release of the same core
        #[test]
        fn release_beats_prerelease(core in core(), n in 0u32..20) {
            let base = core.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
            let prerelease = format!("{}-rc.{}", base, n);
            prop_assert!(v(&base) > v(&prerelease));
        }

        /// Property: the prefix `v` does not change the version
        #[test]
        fn v_prefix_is_ignored(core in core()) {
            let base = core.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
            prop_assert_eq!(v(&base), v(&format!("v{}", base)));
        }
    }

    // ============================================================================
    // Selection
    // ============================================================================

    proptest! {
        /// Property: parse_tags output is sorted and selection picks its maximum
        #[test]
        fn selected_version_is_maximum(tags in prop::collection::vec(tag(), 1..20)) {
            let versions = parse_tags(&tags);
            prop_assert!(versions.windows(2).all(|w| w[0] <= w[1]));

            if let Ok(Some(latest)) = select_latest(&versions) {
                for version in &versions {
                    prop_assert!(version <= latest);
                }
            }
        }

        /// Property: parsing never panics on arbitrary input
        #[test]
        fn parse_never_panics(input in ".*") {
            let _ = VersionTag::parse(&input);
        }
    }
}
