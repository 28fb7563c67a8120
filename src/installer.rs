//! Installer download and silent install
//!
//! No resume, no checksum, no rollback. A failed download may leave a partial file
//! at the destination; cleaning it up is the caller's job.

use crate::config::Config;
use crate::error::{CheckError, CheckResult};
use crate::feed::build_download_client;
use crate::orchestrator::InstallationInfo;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

/// Stream `url` into `dest` in `chunk_size` pieces; returns bytes written
pub fn download(client: &Client, url: &str, dest: &Path, chunk_size: usize) -> CheckResult<u64> {
    let mut response = client.get(url).send()?.error_for_status()?;
    let mut file = File::create(dest)?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| CheckError::Transport(format!("download interrupted: {e}")))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        total += n as u64;
    }
    file.flush()?;

    debug!(%url, dest = %dest.display(), bytes = total, "download complete");
    Ok(total)
}

/// Run the installer with its silent flag and wait; non-zero exit is an error.
///
/// Relative paths are resolved against the working directory first: a bare file name
/// handed to `Command::new` would be searched on `PATH` instead.
pub fn install(exe: &Path, silent_flag: &str) -> CheckResult<()> {
    let exe = std::path::absolute(exe)?;
    info!(exe = %exe.display(), flag = silent_flag, "running installer");
    let status = Command::new(&exe).arg(silent_flag).status()?;
    if !status.success() {
        return Err(CheckError::Install(format!(
            "{} {} exited with {}",
            exe.display(),
            silent_flag,
            status
        )));
    }
    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> CheckResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> CheckResult<()> {
    Ok(())
}

/// What [`apply_update`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    /// Update needed but `dry_run` was set
    Pending,
    Installed { installer: PathBuf, bytes: u64 },
}

/// Download and silently install the latest build when `info` says so
pub fn apply_update(
    config: &Config,
    info: &InstallationInfo,
    dest: &Path,
    dry_run: bool,
) -> CheckResult<UpdateOutcome> {
    if !info.needs_update {
        return Ok(UpdateOutcome::UpToDate);
    }
    if dry_run {
        return Ok(UpdateOutcome::Pending);
    }

    let client = build_download_client(Duration::from_secs(config.download_connect_timeout_secs))?;
    let bytes = download(&client, &info.latest_url, dest, config.download_chunk_size)?;
    if !dest.exists() {
        return Err(CheckError::Install(format!(
            "installer missing after download: {}",
            dest.display()
        )));
    }

    mark_executable(dest)?;
    install(dest, &config.silent_flag)?;
    Ok(UpdateOutcome::Installed {
        installer: dest.to_path_buf(),
        bytes,
    })
}
