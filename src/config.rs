//! Runtime configuration
//!
//! Every endpoint and filesystem location the checker touches lives here so tests can
//! point the probe at a temp dir and the feed client at a local mock server.

use crate::error::{CheckError, CheckResult};
use crate::probe::Architecture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Official Notepad++ update feed; `{arch}` is replaced with `x86` or `x64`
pub const DEFAULT_FEED_URL_TEMPLATE: &str =
    "https://notepad-plus-plus.org/update/getDownloadUrl.php?version=8&param={arch}";

/// Default install locations, probed in order
pub const DEFAULT_PROBE_PATHS: [&str; 2] = [
    r"C:\Program Files\Notepad++\notepad++.exe",
    r"C:\Program Files (x86)\Notepad++\notepad++.exe",
];

/// Substitute the `{arch}` placeholder of a feed URL template
pub fn render_feed_url(template: &str, arch: Architecture) -> String {
    template.replace("{arch}", arch.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub feed_url_template: String,
    pub probe_paths: Vec<PathBuf>,
    /// Whole-request deadline for the feed
    pub request_timeout_secs: u64,
    /// Connect deadline for the installer download; the transfer itself is unbounded
    pub download_connect_timeout_secs: u64,
    pub download_chunk_size: usize,
    pub download_path: PathBuf,
    pub silent_flag: String,
    pub vin: VinPaths,
}

/// VIN data file and the two files derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VinPaths {
    pub input: PathBuf,
    pub original: PathBuf,
    pub hex: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url_template: DEFAULT_FEED_URL_TEMPLATE.to_string(),
            probe_paths: DEFAULT_PROBE_PATHS.iter().map(PathBuf::from).collect(),
            request_timeout_secs: 20,
            download_connect_timeout_secs: 60,
            download_chunk_size: 256 * 1024,
            download_path: PathBuf::from("npp_download.exe"),
            silent_flag: "/S".to_string(),
            vin: VinPaths::default(),
        }
    }
}

impl Default for VinPaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from("vin.txt"),
            original: PathBuf::from("vin_original.txt"),
            hex: PathBuf::from("vin_hex.txt"),
        }
    }
}

impl VinPaths {
    /// Same file names, resolved against `dir`
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = Self::default();
        Self {
            input: dir.join(defaults.input),
            original: dir.join(defaults.original),
            hex: dir.join(defaults.hex),
        }
    }
}

impl Config {
    /// Load a YAML config file; missing keys keep their defaults
    pub fn load(path: &Path) -> CheckResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CheckResult<()> {
        if !self.feed_url_template.contains("{arch}") {
            return Err(CheckError::Config(format!(
                "feed_url_template must contain '{{arch}}': {}",
                self.feed_url_template
            )));
        }
        if self.download_chunk_size == 0 {
            return Err(CheckError::Config(
                "download_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.silent_flag.trim().is_empty() {
            return Err(CheckError::Config("silent_flag must not be empty".to_string()));
        }
        Ok(())
    }

    /// Feed URL for one architecture
    pub fn feed_url(&self, arch: Architecture) -> String {
        render_feed_url(&self.feed_url_template, arch)
    }
}
