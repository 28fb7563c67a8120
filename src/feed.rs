//! Update feed client
//!
//! The vendor feed answers a GET with a small XML document:
//!
//! ```xml
//! <GUP>
//!   <NeedToBeUpdated>yes</NeedToBeUpdated>
//!   <Version>8.7.6</Version>
//!   <Location>https://.../npp.8.7.6.Installer.x64.exe</Location>
//! </GUP>
//! ```
//!
//! Only `Version` and `Location` are used. One attempt per call; retrying is up to the
//! caller.

use crate::config::{render_feed_url, Config};
use crate::error::{CheckError, CheckResult};
use crate::probe::Architecture;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("nppcheck/", env!("CARGO_PKG_VERSION"));

/// Latest published build for one architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub version: String,
    pub download_url: String,
}

/// Source of the latest version; implemented by [`FeedClient`] and by test doubles
pub trait UpdateFeed {
    fn fetch_latest(&self, arch: Architecture) -> CheckResult<FeedResponse>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FeedDocument {
    version: Option<String>,
    location: Option<String>,
}

/// Parse the feed XML; both `Version` and `Location` are mandatory
pub fn parse_feed(xml: &str) -> CheckResult<FeedResponse> {
    let doc: FeedDocument = quick_xml::de::from_str(xml)
        .map_err(|e| CheckError::FeedParse(format!("invalid XML: {e}")))?;

    let field = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    match (field(doc.version), field(doc.location)) {
        (Some(version), Some(download_url)) => Ok(FeedResponse {
            version,
            download_url,
        }),
        (version, location) => {
            let missing: Vec<&str> = [("Version", version.is_none()), ("Location", location.is_none())]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
            Err(CheckError::FeedParse(format!(
                "missing {}",
                missing.join("/")
            )))
        }
    }
}

/// Blocking HTTP client with the crate's user agent and a fixed deadline
pub fn build_http_client(timeout: Duration) -> CheckResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CheckError::Transport(format!("failed to create HTTP client: {e}")))
}

/// Blocking HTTP client for large transfers: bounded connect, no overall deadline
pub fn build_download_client(connect_timeout: Duration) -> CheckResult<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(None)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CheckError::Transport(format!("failed to create HTTP client: {e}")))
}

/// HTTP client for the vendor feed
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url_template: String,
}

impl FeedClient {
    pub fn new(config: &Config) -> CheckResult<Self> {
        Ok(Self {
            client: build_http_client(Duration::from_secs(config.request_timeout_secs))?,
            url_template: config.feed_url_template.clone(),
        })
    }

    pub fn url_for(&self, arch: Architecture) -> String {
        render_feed_url(&self.url_template, arch)
    }
}

impl UpdateFeed for FeedClient {
    fn fetch_latest(&self, arch: Architecture) -> CheckResult<FeedResponse> {
        let url = self.url_for(arch);
        debug!(%url, "fetching update feed");

        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        let latest = parse_feed(&body)?;

        info!(%arch, version = %latest.version, "latest published version");
        Ok(latest)
    }
}
