//! Version ordering for module versions
//!
//! Module versions are semantic versions with a `v` prefix. Anything that
//! does not parse sorts below every valid version.

use std::cmp::Ordering;

use semver::Version;

/// Placeholder returned when no version is known
pub const LATEST: &str = "latest";

/// Parse a `vMAJOR[.MINOR[.PATCH]][-pre][+build]` string
fn parse_version(version: &str) -> Option<Version> {
    let stripped = version.strip_prefix('v')?;
    let core_end = stripped.find(['-', '+']).unwrap_or(stripped.len());
    let (core, rest) = stripped.split_at(core_end);
    let padded = match core.matches('.').count() {
        0 if rest.is_empty() => format!("{}.0.0", core),
        1 if rest.is_empty() => format!("{}.0", core),
        2 => format!("{}{}", core, rest),
        // shorthand versions may not carry a prerelease or build suffix
        _ => return None,
    };
    Version::parse(&padded).ok()
}

/// Compare two module versions by semantic precedence (build metadata ignored)
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Sort versions newest first
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| compare(b, a));
}

/// Pick the newest version, or `"latest"` when there is none
pub fn latest_version(versions: &[String]) -> String {
    versions
        .iter()
        .filter(|v| !v.trim().is_empty())
        .max_by(|a, b| compare(a, b))
        .cloned()
        .unwrap_or_else(|| LATEST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_latest_uses_semantic_precedence() {
        let versions = strings(&["v1.2.0", "v1.10.0", "v1.2.0"]);
        assert_eq!(latest_version(&versions), "v1.10.0");
    }

    #[test]
    fn test_latest_of_nothing() {
        assert_eq!(latest_version(&[]), "latest");
        assert_eq!(latest_version(&strings(&[""])), "latest");
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert_eq!(compare("v1.0.0-rc.1", "v1.0.0"), Ordering::Less);
        assert_eq!(compare("v1.0.0+build", "v1.0.0"), Ordering::Equal);
        assert_eq!(compare("v2", "v1.9.9"), Ordering::Greater);
        assert_eq!(compare("v1.2", "v1.2.0"), Ordering::Equal);
    }

    #[test]
    fn test_invalid_versions_sort_last() {
        let mut versions = strings(&["garbage", "v0.1.0", "v1.0.0", "1.5.0"]);
        sort_versions(&mut versions);
        assert_eq!(&versions[..2], &strings(&["v1.0.0", "v0.1.0"])[..]);
        assert_eq!(latest_version(&strings(&["garbage", "v0.0.1"])), "v0.0.1");
    }
}
