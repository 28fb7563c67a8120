//! nppcheck - Notepad++ update checker
//!
//! Finds the installed Notepad++, reads the version embedded in its executable,
//! compares it with the vendor update feed, and optionally downloads and silently
//! installs the newer build. Also carries the VIN data-file checks used by the same
//! maintenance run.
//!
//! # Example
//!
//! ```no_run
//! use nppcheck::config::Config;
//! use nppcheck::feed::FeedClient;
//! use nppcheck::orchestrator::Orchestrator;
//!
//! let config = Config::default();
//! let feed = FeedClient::new(&config)?;
//! let info = Orchestrator::new(&config, &feed).evaluate()?;
//!
//! println!("installed: {:?}", info.installed_version);
//! println!("latest:    {}", info.latest_version);
//! println!("update:    {}", info.needs_update);
//! # Ok::<(), nppcheck::error::CheckError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod installer;
pub mod orchestrator;
pub mod probe;
pub mod version;
pub mod vin;

// Re-export commonly used types
pub use config::Config;
pub use error::{CheckError, CheckResult};
pub use feed::{FeedClient, FeedResponse, UpdateFeed};
pub use orchestrator::{InstallationInfo, Orchestrator};
pub use probe::{Architecture, VersionProbe};
