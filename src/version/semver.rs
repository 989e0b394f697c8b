//! Lenient version parsing and outdated classification
//!
//! Version strings are read as literal point versions, not as semver ranges.
//! A single leading non-digit character (`^`, `~`, `v`, ...) is dropped;
//! multi-character operators such as `>=` or range unions are not understood.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of the difference between a declared version and the latest one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outdated {
    Major,
    Minor,
    Patch,
    #[default]
    Ok,
}

impl Outdated {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outdated::Major => "major",
            Outdated::Minor => "minor",
            Outdated::Patch => "patch",
            Outdated::Ok => "ok",
        }
    }

    pub fn is_outdated(&self) -> bool {
        *self != Outdated::Ok
    }
}

impl fmt::Display for Outdated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Outdated {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Outdated::Major),
            "minor" => Ok(Outdated::Minor),
            "patch" => Ok(Outdated::Patch),
            "ok" => Ok(Outdated::Ok),
            _ => Err(()),
        }
    }
}

/// Parse a version string into its dot-separated numeric components.
///
/// Each component is the run of leading ASCII digits in its segment, so
/// `"0-beta"` reads as `0`. A segment without a leading digit becomes `None`
/// and never compares greater than anything.
///
/// Examples:
/// - "1.2.3" -> [1, 2, 3]
/// - "^1.2.3" -> [1, 2, 3]
/// - ">=1.2.3" -> [None, 2, 3]
pub fn parse_version(version: &str) -> Vec<Option<u64>> {
    let mut chars = version.chars();
    let stripped = match chars.next() {
        Some(first) if !first.is_ascii_digit() => chars.as_str(),
        _ => version,
    };

    stripped.split('.').map(parse_leading_number).collect()
}

fn parse_leading_number(segment: &str) -> Option<u64> {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment[..end].parse().ok()
}

/// Classify how far `declared` is behind `latest`.
///
/// Tiers are checked one after another with strict greater-than, each
/// independently of the tiers above it: a lower major with a higher minor
/// still reports `Minor`. There is no downgrade classification.
pub fn classify_delta(declared: &str, latest: &str) -> Outdated {
    let declared = parse_version(declared);
    let latest = parse_version(latest);

    let greater = |tier: usize| match (latest.get(tier), declared.get(tier)) {
        (Some(Some(l)), Some(Some(d))) => l > d,
        _ => false,
    };

    if greater(0) {
        Outdated::Major
    } else if greater(1) {
        Outdated::Minor
    } else if greater(2) {
        Outdated::Patch
    } else {
        Outdated::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", vec![Some(1), Some(2), Some(3)])]
    #[case("^1.2.3", vec![Some(1), Some(2), Some(3)])]
    #[case("~0.4.0", vec![Some(0), Some(4), Some(0)])]
    #[case("2.0.0", vec![Some(2), Some(0), Some(0)])]
    #[case("v10.1", vec![Some(10), Some(1)])]
    #[case("1.0.0-beta.2", vec![Some(1), Some(0), Some(0), Some(2)])]
    #[case(">=1.2.3", vec![None, Some(2), Some(3)])] // only one anchor character is stripped
    #[case("latest", vec![None])]
    #[case("*", vec![None])]
    #[case("", vec![None])]
    fn parse_version_returns_expected(#[case] version: &str, #[case] expected: Vec<Option<u64>>) {
        assert_eq!(parse_version(version), expected);
    }

    #[rstest]
    #[case("1.0.0", "1.0.0", Outdated::Ok)]
    #[case("1.0.0", "2.0.0", Outdated::Major)]
    #[case("1.0.0", "1.1.0", Outdated::Minor)]
    #[case("1.0.0", "1.0.1", Outdated::Patch)]
    #[case("^1.2.3", "1.2.4", Outdated::Patch)]
    #[case("~1.2.3", "3.0.0", Outdated::Major)]
    #[case("1.2.3", "1.1.9", Outdated::Patch)]
    #[case("2.0.0", "1.9.9", Outdated::Minor)] // tiers are not cascaded on equality
    #[case("1.5.0", "1.4.9", Outdated::Patch)]
    #[case("2.0.0", "1.0.0", Outdated::Ok)]
    #[case("1.0", "1.0.5", Outdated::Ok)] // missing patch never compares
    #[case("latest", "4.17.21", Outdated::Ok)]
    #[case(">=1.0.0", "1.2.0", Outdated::Minor)]
    fn classify_delta_returns_expected(
        #[case] declared: &str,
        #[case] latest: &str,
        #[case] expected: Outdated,
    ) {
        assert_eq!(classify_delta(declared, latest), expected);
    }

    #[test]
    fn outdated_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Outdated::Major).unwrap(),
            "\"major\""
        );
        assert_eq!("patch".parse::<Outdated>(), Ok(Outdated::Patch));
        assert!("downgrade".parse::<Outdated>().is_err());
    }
}
