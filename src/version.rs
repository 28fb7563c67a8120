//! Version string parsing and comparison
//!
//! Vendor version strings are free-form ("8.7.6", "8.7.6 (64-bit)", "v8.7.6-rc1"), so
//! comparison works on the digit runs only and ignores every separator.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Number of numeric components used for comparison
pub const VERSION_ARITY: usize = 4;

/// Extract every maximal run of ASCII digits, in order.
///
/// `"8.7.6-rc1"` yields `[8, 7, 6, 1]`; a string without digits yields an empty vector.
/// Runs too large for `u64` saturate to `u64::MAX`.
pub fn parse_version(s: &str) -> Vec<u64> {
    s.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse().unwrap_or(u64::MAX))
        .collect()
}

/// Pad with trailing zeros (or truncate) to exactly `length` components
pub fn normalize(parts: &[u64], length: usize) -> Vec<u64> {
    let mut out: Vec<u64> = parts.iter().take(length).copied().collect();
    out.resize(length, 0);
    out
}

/// Compare two version strings component-wise over their normalized tuples.
///
/// `Ordering as i32` gives the classic -1 / 0 / +1 form.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let ta = normalize(&parse_version(a), VERSION_ARITY);
    let tb = normalize(&parse_version(b), VERSION_ARITY);
    ta.cmp(&tb)
}

fn numeric_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+){0,3}").expect("static regex is valid"))
}

/// Keep only the first dotted-numeric run of a version string.
///
/// `"8.7.6 (64-bit)"` becomes `"8.7.6"`. Without any digits the input is returned as-is.
pub fn extract_numeric_version(raw: &str) -> String {
    numeric_run()
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}
