use thiserror::Error;

pub type CheckResult<T> = Result<T, CheckError>;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Update feed parse error: {0}")]
    FeedParse(String),

    #[error("Installed version {installed} does not match latest {latest}")]
    Outdated { installed: String, latest: String },

    #[error("Install failed: {0}")]
    Install(String),

    #[error("VIN check failed: {0}")]
    Vin(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CheckError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CheckError::Transport(format!("request timed out: {e}"))
        } else {
            CheckError::Transport(e.to_string())
        }
    }
}
