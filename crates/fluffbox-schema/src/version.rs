//! Numeric version comparison.
//!
//! Upstream identifiers come in several shapes (`v20.11.1`, `3.12.2`,
//! `21.0.2+13`, `8u402-b06`). They are compared component-wise on their
//! numeric runs, with missing trailing components treated as zero. Plain
//! string comparison would order `9` after `10`.

use std::cmp::Ordering;

/// Numeric components of a version identifier, in order of appearance.
///
/// A leading `v` or `jdk-` and every non-digit separator are ignored.
///
/// ```
/// use fluffbox_schema::version::numeric_components;
///
/// assert_eq!(numeric_components("v20.11.1"), vec![20, 11, 1]);
/// assert_eq!(numeric_components("21.0.2+13"), vec![21, 0, 2, 13]);
/// assert_eq!(numeric_components("8u402-b06"), vec![8, 402, 6]);
/// ```
pub fn numeric_components(version: &str) -> Vec<u64> {
    version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}

/// Compare two version identifiers numerically.
///
/// ```
/// use std::cmp::Ordering;
/// use fluffbox_schema::version::compare_versions;
///
/// assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
/// assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = numeric_components(a);
    let right = numeric_components(b);

    for i in 0..std::cmp::max(left.len(), right.len()) {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Sort version strings newest first.
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_not_lexical() {
        let mut versions = vec![
            "1.9.0".to_string(),
            "1.10.0".to_string(),
            "1.2.0".to_string(),
        ];
        sort_descending(&mut versions);
        assert_eq!(versions, vec!["1.10.0", "1.9.0", "1.2.0"]);
    }

    #[test]
    fn test_missing_trailing_components_are_zero() {
        assert_eq!(compare_versions("20", "20.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("20.0.1", "20"), Ordering::Greater);
    }

    #[test]
    fn test_prefixes_are_ignored() {
        assert_eq!(compare_versions("v9.0.0", "v10.0.0"), Ordering::Less);
        assert_eq!(compare_versions("jdk-17.0.1+12", "jdk-11.0.22+7"), Ordering::Greater);
    }

    #[test]
    fn test_build_metadata_breaks_ties() {
        assert_eq!(compare_versions("21.0.2+13", "21.0.2+9"), Ordering::Greater);
        assert_eq!(compare_versions("8u402-b06", "8u392-b08"), Ordering::Greater);
    }
}
