use anyhow::Context;
use clap::{Parser, Subcommand};
use nppcheck::cli;
use nppcheck::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nppcheck")]
#[command(about = "Check Notepad++ against the official update feed and validate VIN files.")]
#[command(long_about = "nppcheck - Notepad++ maintenance checks

Reads the version embedded in the installed notepad++.exe, compares it with
the official update feed, and downloads + silently installs the latest build
when they differ.

COMMANDS:
  check       - Show installed vs latest version
  install     - Download and silently install the latest build if needed
  vin         - Validate vin.txt and write vin_original.txt / vin_hex.txt
  hex-decode  - Decode a hex file produced by 'vin' back to text

EXAMPLES:
  nppcheck check                       # Human-readable status
  nppcheck check --json                # Status record as JSON
  nppcheck install --dry-run           # Report without downloading
  nppcheck vin --dir ./data            # Check ./data/vin.txt

CONFIG:
  --config FILE (or NPPCHECK_CONFIG) loads a YAML file overriding the
  feed URL template, probe paths, timeouts and silent-install flag.")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true, env = "NPPCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Feed URL template; '{arch}' is replaced with x86 or x64
    #[arg(long, global = true, env = "NPPCHECK_FEED_URL")]
    feed_url: Option<String>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show installed vs latest version
    Check {
        /// Print the status record as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error unless the installed version matches the feed
        #[arg(long)]
        require_current: bool,
    },

    /// Download and silently install the latest build if needed
    Install {
        /// Report what would happen without downloading
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Where to save the installer (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the VIN data file and write its copy and hex rendition
    Vin {
        /// Directory holding vin.txt (default: paths from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Decode a space-separated hex file back to text
    HexDecode {
        /// Hex file to decode
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "nppcheck=debug" } else { "nppcheck=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>, feed_url: Option<String>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(url) = feed_url {
        config.feed_url_template = url;
        config.validate().context("invalid --feed-url")?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config, cli.feed_url)?;

    match cli.command {
        Commands::Check {
            json,
            require_current,
        } => cli::check(&config, json, require_current)?,

        Commands::Install { dry_run, output } => cli::install(&config, dry_run, output)?,

        Commands::Vin { dir } => cli::vin_check(&config, dir)?,

        Commands::HexDecode { file } => cli::hex_decode(file)?,
    }
    Ok(())
}
