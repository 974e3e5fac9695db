//! Ordered version values parsed from object names
//!
//! A version is a dot-separated list of numeric release components with an
//! optional pre-release label and optional build metadata:
//!
//! - `3.53` -> release [3, 53]
//! - `1.5.6-build.100` -> release [1, 5, 6], pre-release `build.100`
//! - `2.0+linux` -> release [2, 0], build `linux` (ignored for ordering)
//!
//! Release components are compared numerically, padding the shorter side with
//! zeros, so `1.2` and `1.2.0` are equal and `2.33.333` is newer than `2.4.3`.
//! Pre-release labels follow semver precedence.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease};

use crate::version::error::VersionError;

#[derive(Debug, Clone)]
pub struct VersionValue {
    release: Vec<u64>,
    pre: Prerelease,
    build: BuildMetadata,
}

impl VersionValue {
    /// Parse a raw version string.
    ///
    /// Fails when any release component is not a number or the pre-release
    /// label is not a valid semver pre-release.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        if text.is_empty() {
            return Err(VersionError::invalid(text, "empty version"));
        }

        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => {
                if build.is_empty() {
                    return Err(VersionError::invalid(text, "empty build metadata"));
                }
                let build = BuildMetadata::new(build)
                    .map_err(|e| VersionError::invalid(text, e.to_string()))?;
                (rest, build)
            }
            None => (text, BuildMetadata::EMPTY),
        };

        let (release, pre) = match rest.split_once('-') {
            Some((release, pre)) => {
                if pre.is_empty() {
                    return Err(VersionError::invalid(text, "empty pre-release"));
                }
                let pre =
                    Prerelease::new(pre).map_err(|e| VersionError::invalid(text, e.to_string()))?;
                (release, pre)
            }
            None => (rest, Prerelease::EMPTY),
        };

        let release = release
            .split('.')
            .map(|component| parse_component(text, component))
            .collect::<Result<Vec<u64>, VersionError>>()?;

        Ok(Self {
            release,
            pre,
            build,
        })
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre_release(&self) -> Option<&str> {
        (!self.pre.is_empty()).then(|| self.pre.as_str())
    }
}

fn parse_component(text: &str, component: &str) -> Result<u64, VersionError> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::invalid(
            text,
            format!("release component '{}' is not numeric", component),
        ));
    }

    component
        .parse::<u64>()
        .map_err(|e| VersionError::invalid(text, e.to_string()))
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

// A release without a pre-release label ranks above any pre-release.
fn compare_pre(a: &Prerelease, b: &Prerelease) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

impl Ord for VersionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_release(&self.release, &other.release)
            .then_with(|| compare_pre(&self.pre, &other.pre))
    }
}

impl PartialOrd for VersionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionValue {}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for VersionValue {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(text: &str) -> VersionValue {
        VersionValue::parse(text).unwrap()
    }

    #[rstest]
    #[case("1", &[1])]
    #[case("3.53", &[3, 53])]
    #[case("2.33.333", &[2, 33, 333])]
    #[case("1.2.3.4", &[1, 2, 3, 4])]
    #[case("01.002", &[1, 2])]
    fn parse_reads_release_components(#[case] text: &str, #[case] expected: &[u64]) {
        assert_eq!(v(text).release(), expected);
    }

    #[test]
    fn parse_reads_pre_release_label() {
        let version = v("1.5.6-build.100");
        assert_eq!(version.release(), &[1, 5, 6]);
        assert_eq!(version.pre_release(), Some("build.100"));
        assert_eq!(v("1.5.6").pre_release(), None);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("1..2")]
    #[case("1.2.")]
    #[case("v1.2.3")]
    #[case("1.2-")]
    #[case("1.2+")]
    #[case("1.2-build!")]
    #[case("1.x")]
    fn parse_rejects_malformed_versions(#[case] text: &str) {
        assert!(matches!(
            VersionValue::parse(text),
            Err(VersionError::InvalidVersion { .. })
        ));
    }

    #[rstest]
    #[case("9", "10")]
    #[case("1.1.99", "1.2.0")]
    #[case("2.4.3", "2.33.333")]
    #[case("0.0.1", "3.53")]
    #[case("1.5.6-build.9", "1.5.6-build.10")]
    #[case("1.5.6-build.10", "1.5.6-build.100")]
    #[case("1.0.0-rc.1", "1.0.0")]
    #[case("1.0.0-1", "1.0.0-alpha")]
    #[case("1.0.0-alpha", "1.0.0-alpha.1")]
    #[case("1.0.0-alpha.beta", "1.0.0-beta")]
    fn older_version_compares_less(#[case] older: &str, #[case] newer: &str) {
        assert!(v(older) < v(newer));
        assert!(v(newer) > v(older));
        assert_eq!(v(older).cmp(&v(newer)), Ordering::Less);
    }

    #[rstest]
    #[case("1.2", "1.2.0")]
    #[case("1", "1.0.0.0")]
    #[case("1.0.0+linux", "1.0.0+darwin")]
    #[case("01.2", "1.2")]
    fn differently_written_versions_compare_equal(#[case] a: &str, #[case] b: &str) {
        assert_eq!(v(a), v(b));
        assert_eq!(v(a).cmp(&v(b)), Ordering::Equal);
    }

    #[test]
    fn ordering_is_transitive_across_sorted_list() {
        let mut versions = vec![
            v("1.5.6-build.100"),
            v("1.5.6"),
            v("0.9"),
            v("1.5.6-build.9"),
            v("1.10"),
            v("1.5.6-build.10"),
        ];
        versions.sort();

        let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "0.9",
                "1.5.6-build.9",
                "1.5.6-build.10",
                "1.5.6-build.100",
                "1.5.6",
                "1.10"
            ]
        );

        for window in versions.windows(3) {
            assert!(window[0] <= window[1] && window[1] <= window[2]);
            assert!(window[0] <= window[2]);
        }
    }

    #[rstest]
    #[case("3.53")]
    #[case("1.5.6-build.100")]
    #[case("2.0+linux.amd64")]
    #[case("007.1")]
    fn display_reparses_to_equal_value(#[case] text: &str) {
        let parsed = v(text);
        let reparsed: VersionValue = parsed.to_string().parse().unwrap();
        assert_eq!(parsed, reparsed);
    }
}
