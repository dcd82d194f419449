//! Dotted-numeric version comparison for version-gated advisories and
//! version-caveated sanitizers.

use anyhow::{bail, Result};

/// Parses "2.3.11" into its numeric components. Non-numeric segments are
/// rejected so advisory checks can surface malformed declarations.
pub fn parse(version: &str) -> Result<Vec<u64>> {
    let mut parts = Vec::new();
    for seg in version.split('.') {
        match seg.parse::<u64>() {
            Ok(n) => parts.push(n),
            Err(_) => bail!("malformed version string: {version}"),
        }
    }
    if parts.is_empty() {
        bail!("empty version string");
    }
    Ok(parts)
}

fn compare(a: &str, b: &str) -> Option<std::cmp::Ordering> {
    let (a, b) = (parse(a).ok()?, parse(b).ok()?);
    // Missing trailing segments compare as zero: 2.3 == 2.3.0.
    let len = a.len().max(b.len());
    for i in 0..len {
        let (x, y) = (a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0));
        if x != y {
            return Some(x.cmp(&y));
        }
    }
    Some(std::cmp::Ordering::Equal)
}

pub fn at_least(version: &str, min: &str) -> bool {
    matches!(
        compare(version, min),
        Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
    )
}

pub fn below(version: &str, max: &str) -> bool {
    matches!(compare(version, max), Some(std::cmp::Ordering::Less))
}
