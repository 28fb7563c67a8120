//! Update orchestration
//!
//! Probe → infer architecture → fetch feed → compare. Produces one immutable
//! [`InstallationInfo`] per call; nothing is cached between runs.

use crate::config::Config;
use crate::error::CheckResult;
use crate::feed::UpdateFeed;
use crate::probe::{detect_arch_from_install_path, probe_installed, Architecture, VersionProbe};
use crate::version::compare_versions;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;
use tracing::info;

/// Status record for one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationInfo {
    pub arch: Architecture,
    pub installed_version: Option<String>,
    pub latest_version: String,
    pub latest_url: String,
    pub needs_update: bool,
    pub exe_path: Option<PathBuf>,
}

/// Any difference from the feed counts, including a locally newer build
pub fn needs_update(installed: Option<&str>, latest: &str) -> bool {
    match installed {
        None => true,
        Some(installed) => compare_versions(installed, latest) != Ordering::Equal,
    }
}

pub struct Orchestrator<'a> {
    config: &'a Config,
    feed: &'a dyn UpdateFeed,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, feed: &'a dyn UpdateFeed) -> Self {
        Self { config, feed }
    }

    /// Full probe + feed round trip
    pub fn evaluate(&self) -> CheckResult<InstallationInfo> {
        let probe = probe_installed(&self.config.probe_paths);
        self.evaluate_probe(probe)
    }

    /// Evaluation for an already-computed probe result
    pub fn evaluate_probe(&self, probe: VersionProbe) -> CheckResult<InstallationInfo> {
        let arch = detect_arch_from_install_path(probe.exe_path());
        let latest = self.feed.fetch_latest(arch)?;
        let needs_update = needs_update(probe.version(), &latest.version);

        info!(
            %arch,
            installed = probe.version().unwrap_or("none"),
            latest = %latest.version,
            needs_update,
            "evaluated installation"
        );

        let installed_version = probe.version().map(str::to_string);
        let exe_path = probe.exe_path().map(|p| p.to_path_buf());
        Ok(InstallationInfo {
            arch,
            installed_version,
            latest_version: latest.version,
            latest_url: latest.download_url,
            needs_update,
            exe_path,
        })
    }
}
