use crate::config::{Config, VinPaths};
use crate::error::{CheckError, CheckResult};
use crate::feed::FeedClient;
use crate::installer::{apply_update, UpdateOutcome};
use crate::orchestrator::{InstallationInfo, Orchestrator};
use crate::vin;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Fields of the status record as label/value rows
fn info_rows(info: &InstallationInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Architecture", info.arch.to_string()),
        (
            "Executable",
            info.exe_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found".to_string()),
        ),
        (
            "Installed",
            info.installed_version
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        ),
        ("Latest", info.latest_version.clone()),
        ("Download", info.latest_url.clone()),
    ]
}

fn print_info(info: &InstallationInfo) {
    for (label, value) in info_rows(info) {
        println!("   {:<13} {}", format!("{label}:"), value.bright_blue());
    }
    println!();
    if info.needs_update {
        println!("{}", "⚠️  Update needed".bold().yellow());
    } else {
        println!("{}", "✅ Up to date".bold().green());
    }
}

fn evaluate(config: &Config) -> CheckResult<InstallationInfo> {
    let feed = FeedClient::new(config)?;
    Orchestrator::new(config, &feed).evaluate()
}

/// Execute the check command
pub fn check(config: &Config, json: bool, require_current: bool) -> CheckResult<()> {
    let info = evaluate(config)?;

    if json {
        let out = serde_json::to_string_pretty(&info)
            .map_err(|e| CheckError::Config(format!("cannot serialize status: {e}")))?;
        println!("{out}");
    } else {
        println!("{}", "🔎 Notepad++ - Version Check".bold().green());
        println!();
        print_info(&info);
    }

    if require_current && info.needs_update {
        return Err(CheckError::Outdated {
            installed: info
                .installed_version
                .unwrap_or_else(|| "none".to_string()),
            latest: info.latest_version,
        });
    }
    Ok(())
}

/// Execute the install command
pub fn install(config: &Config, dry_run: bool, output: Option<PathBuf>) -> CheckResult<()> {
    println!("{}", "📦 Notepad++ - Update".bold().green());
    if dry_run {
        println!(
            "{}",
            "📋 DRY RUN MODE - Nothing will be downloaded\n".yellow()
        );
    }

    let info = evaluate(config)?;
    print_info(&info);

    let dest = output.unwrap_or_else(|| config.download_path.clone());
    match apply_update(config, &info, &dest, dry_run)? {
        UpdateOutcome::UpToDate => {}
        UpdateOutcome::Pending => {
            println!(
                "   Would download {} to {}",
                info.latest_url.cyan(),
                dest.display()
            );
        }
        UpdateOutcome::Installed { installer, bytes } => {
            println!("   Downloaded {} bytes to {}", bytes, installer.display());
            println!(
                "{}",
                format!("✅ Installed Notepad++ {}", info.latest_version)
                    .bold()
                    .green()
            );
        }
    }
    Ok(())
}

/// Execute the vin command
pub fn vin_check(config: &Config, dir: Option<PathBuf>) -> CheckResult<()> {
    let paths = match dir {
        Some(dir) => VinPaths::in_dir(&dir),
        None => config.vin.clone(),
    };

    println!("{}", "🚗 VIN File Checks".bold().green());
    println!("   File: {}\n", paths.input.display());

    let report = vin::run_checks(&paths)?;
    println!("   ✅ {} characters: {}", vin::VIN_LENGTH, report.vin.bright_blue());
    println!("   ✅ ASCII only");
    println!(
        "   ✅ Copied {} bytes to {}",
        report.bytes_copied,
        report.original.display()
    );
    println!("   ✅ Hex written to {}", report.hex.display());
    Ok(())
}

/// Execute the hex-decode command
pub fn hex_decode(file: PathBuf) -> CheckResult<()> {
    let hex = fs::read_to_string(&file)?;
    print!("{}", vin::from_hex(&hex)?);
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
