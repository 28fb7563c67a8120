//! Installed-version probe
//!
//! Finds the installed executable at the configured well-known locations and reads
//! its embedded `ProductVersion` (falling back to `FileVersion`) from the Windows
//! version resource. The PE file is parsed with `pelite` rather than through the Win32
//! version API, so the probe behaves the same on every host platform.
//!
//! Every failure while reading the version degrades to "unknown"; the outcome is
//! reported as a [`VersionProbe`] so callers can still tell "not installed" apart from
//! "installed but unreadable".

#[cfg(test)]
pub(crate) mod tests;

use crate::version::extract_numeric_version;
use pelite::pe32::Pe as _;
use pelite::pe64::Pe as _;
use pelite::resources::version_info::{Language, VersionInfo};
use pelite::resources::{FindError, Resources};
use pelite::{pe32, pe64};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Path fragment that marks a 32-bit install on 64-bit Windows
pub const X86_PROGRAM_FILES_MARKER: &str = "Program Files (x86)";

/// Build flavour requested from the update feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the architecture from where the executable lives.
///
/// This is a path heuristic only: a path containing `Program Files (x86)` is taken to be
/// a 32-bit install, anything else (including no install at all) is assumed to be x64.
/// The PE machine type is deliberately not consulted.
pub fn detect_arch_from_install_path(path: Option<&Path>) -> Architecture {
    match path {
        Some(p) if p.to_string_lossy().contains(X86_PROGRAM_FILES_MARKER) => Architecture::X86,
        _ => Architecture::X64,
    }
}

/// Stage at which reading the embedded version gave up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("cannot read executable: {0}")]
    Unreadable(String),

    #[error("not a PE image: {0}")]
    NotPeImage(String),

    #[error("no version resource")]
    NoVersionResource,

    #[error("malformed version resource: {0}")]
    Malformed(String),

    #[error("no translation table")]
    NoTranslation,

    #[error("no ProductVersion or FileVersion string")]
    NoVersionString,
}

/// What the probe found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionProbe {
    NotInstalled,
    Unreadable {
        exe_path: PathBuf,
        reason: ProbeFailure,
    },
    Installed {
        exe_path: PathBuf,
        version: String,
    },
}

impl VersionProbe {
    pub fn exe_path(&self) -> Option<&Path> {
        match self {
            VersionProbe::NotInstalled => None,
            VersionProbe::Unreadable { exe_path, .. } | VersionProbe::Installed { exe_path, .. } => {
                Some(exe_path)
            }
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            VersionProbe::Installed { version, .. } => Some(version),
            _ => None,
        }
    }
}

/// First candidate that exists on disk; no registry or PATH search
pub fn find_installed_executable(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

/// Read the embedded version string of an executable
pub fn read_embedded_version(path: &Path) -> Result<String, ProbeFailure> {
    let bytes = std::fs::read(path).map_err(|e| ProbeFailure::Unreadable(e.to_string()))?;
    version_from_image(&bytes)
}

fn resources(image: &[u8]) -> Result<Resources<'_>, ProbeFailure> {
    let found = match pe64::PeFile::from_bytes(image) {
        Ok(pe) => pe.resources(),
        Err(pelite::Error::PeMagic) => pe32::PeFile::from_bytes(image)
            .map_err(|e| ProbeFailure::NotPeImage(e.to_string()))?
            .resources(),
        Err(e) => return Err(ProbeFailure::NotPeImage(e.to_string())),
    };
    // A missing or unmappable resource directory means there is nothing to query
    found.map_err(|e| {
        debug!(reason = %e, "no usable resource directory");
        ProbeFailure::NoVersionResource
    })
}

/// Parsed `VS_VERSIONINFO` of a PE32 or PE32+ image
pub fn version_info(image: &[u8]) -> Result<VersionInfo<'_>, ProbeFailure> {
    match resources(image)?.version_info() {
        Ok(info) => Ok(info),
        Err(FindError::NotFound) => Err(ProbeFailure::NoVersionResource),
        Err(e) => Err(ProbeFailure::Malformed(e.to_string())),
    }
}

/// `\StringFileInfo\<lang><codepage>\<name>`; empty strings count as absent
fn string_value(info: &VersionInfo<'_>, lang: Language, name: &str) -> Option<String> {
    info.value(lang, name)
        .map(|v| v.trim_end_matches('\0').trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Version string from in-memory PE bytes
pub fn version_from_image(image: &[u8]) -> Result<String, ProbeFailure> {
    let info = version_info(image)?;

    // Multi-locale binaries may carry several pairs; only the first is consulted
    let lang = info
        .translation()
        .first()
        .copied()
        .ok_or(ProbeFailure::NoTranslation)?;
    let raw = string_value(&info, lang, "ProductVersion")
        .or_else(|| string_value(&info, lang, "FileVersion"))
        .ok_or(ProbeFailure::NoVersionString)?;

    Ok(extract_numeric_version(&raw))
}

/// Locate the executable and read its version, best effort
pub fn probe_installed(candidates: &[PathBuf]) -> VersionProbe {
    let Some(exe_path) = find_installed_executable(candidates) else {
        debug!("no executable at any of {} probe paths", candidates.len());
        return VersionProbe::NotInstalled;
    };

    match read_embedded_version(&exe_path) {
        Ok(version) => {
            debug!(path = %exe_path.display(), %version, "read embedded version");
            VersionProbe::Installed { exe_path, version }
        }
        Err(reason) => {
            debug!(path = %exe_path.display(), %reason, "embedded version unavailable");
            VersionProbe::Unreadable { exe_path, reason }
        }
    }
}
