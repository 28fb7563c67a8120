//! VIN data file checks
//!
//! The data file is plain ASCII text whose first line is a 17-character vehicle
//! identification number. The checks copy it verbatim next to itself and write a hex
//! rendition where every character becomes two lowercase hex digits, separated by
//! single spaces. Content is handled byte-for-byte, so line endings survive the
//! round trip unchanged.

use crate::config::VinPaths;
use crate::error::{CheckError, CheckResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Characters in a vehicle identification number
pub const VIN_LENGTH: usize = 17;

/// First line of a file, without its line terminator
pub fn first_line(path: &Path) -> CheckResult<String> {
    let content = fs::read_to_string(path)?;
    let line = content.split('\n').next().unwrap_or_default();
    Ok(line.strip_suffix('\r').unwrap_or(line).to_string())
}

/// Fail unless the first line is exactly `expected` characters long
pub fn check_first_line_length(path: &Path, expected: usize) -> CheckResult<String> {
    let line = first_line(path)?;
    let len = line.chars().count();
    if len != expected {
        return Err(CheckError::Vin(format!(
            "first line of {} has {} characters, expected {}",
            path.display(),
            len,
            expected
        )));
    }
    Ok(line)
}

/// Fail on the first byte outside the ASCII range
pub fn check_ascii(path: &Path) -> CheckResult<()> {
    let bytes = fs::read(path)?;
    match bytes.iter().position(|b| !b.is_ascii()) {
        Some(offset) => Err(CheckError::Vin(format!(
            "{} has non-ASCII byte {:#04x} at offset {}",
            path.display(),
            bytes[offset],
            offset
        ))),
        None => Ok(()),
    }
}

/// Verbatim copy; returns bytes copied
pub fn copy_original(src: &Path, dest: &Path) -> CheckResult<u64> {
    let copied = fs::copy(src, dest)?;
    debug!(src = %src.display(), dest = %dest.display(), bytes = copied, "copied VIN file");
    Ok(copied)
}

/// `"AB\n"` → `"41 42 0a"`; only ASCII input is accepted
pub fn to_hex(content: &str) -> CheckResult<String> {
    if let Some((offset, c)) = content.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(CheckError::Vin(format!(
            "cannot hex-encode non-ASCII character {c:?} at offset {offset}"
        )));
    }
    Ok(content
        .bytes()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" "))
}

/// Inverse of [`to_hex`]
pub fn from_hex(hex: &str) -> CheckResult<String> {
    hex.split_whitespace()
        .map(|token| {
            let valid = token.len() == 2 && token.bytes().all(|b| b.is_ascii_hexdigit());
            let byte = if valid {
                u8::from_str_radix(token, 16).ok()
            } else {
                None
            };
            match byte {
                Some(b) if b.is_ascii() => Ok(char::from(b)),
                _ => Err(CheckError::Vin(format!("invalid hex token {token:?}"))),
            }
        })
        .collect()
}

/// Hex-encode `src` into `dest`
pub fn convert_file_to_hex(src: &Path, dest: &Path) -> CheckResult<()> {
    let content = fs::read_to_string(src)?;
    fs::write(dest, to_hex(&content)?)?;
    Ok(())
}

/// Result of a full check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VinReport {
    pub vin: String,
    pub bytes_copied: u64,
    pub original: PathBuf,
    pub hex: PathBuf,
}

/// Existence, length, ASCII, copy, then hex, stopping at the first failure
pub fn run_checks(paths: &VinPaths) -> CheckResult<VinReport> {
    if !paths.input.exists() {
        return Err(CheckError::Vin(format!(
            "{} does not exist",
            paths.input.display()
        )));
    }
    let vin = check_first_line_length(&paths.input, VIN_LENGTH)?;
    check_ascii(&paths.input)?;

    let bytes_copied = copy_original(&paths.input, &paths.original)?;
    convert_file_to_hex(&paths.original, &paths.hex)?;

    info!(%vin, hex = %paths.hex.display(), "VIN checks passed");
    Ok(VinReport {
        vin,
        bytes_copied,
        original: paths.original.clone(),
        hex: paths.hex.clone(),
    })
}
