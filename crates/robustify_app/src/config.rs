//! Optional `robustify.ron` configuration; command-line flags take precedence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use robustify_core::{Blacklist, RowFilter};
use robustify_engine::{ClientSettings, EngineError};
use robustify_logging::{parse_level, LogDestination, DEFAULT_LOG_FILE};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "robustify.ron";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid server url: {0}")]
    Server(#[from] EngineError),
    #[error("unknown log destination {0:?} (expected file, terminal or both)")]
    LogDestination(String),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("failed to read blacklist {path:?}: {source}")]
    BlacklistRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid blacklist pattern: {0}")]
    Blacklist(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub ld_server_url: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Upper bound for one robustify stream; unset waits for the server.
    pub stream_timeout_secs: Option<u64>,
    pub redirect_limit: usize,
    pub max_line_bytes: usize,
    pub log_destination: String,
    pub log_level: String,
    pub log_file: PathBuf,
    /// Regular expressions; a URL matching any of them is rejected.
    pub blacklist: Vec<String>,
    /// More blacklist patterns, one per line.
    pub blacklist_file: Option<PathBuf>,
    pub drop_overlapping_urls: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            ld_server_url: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            stream_timeout_secs: None,
            redirect_limit: 5,
            max_line_bytes: 1024 * 1024,
            log_destination: "terminal".to_string(),
            log_level: "warn".to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            blacklist: Vec::new(),
            blacklist_file: None,
            drop_overlapping_urls: false,
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `./robustify.ron` when it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        let mut settings = ClientSettings::for_server(&self.server_url)?;
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings.stream_timeout = self.stream_timeout_secs.map(Duration::from_secs);
        settings.redirect_limit = self.redirect_limit;
        settings.max_line_bytes = self.max_line_bytes;
        Ok(settings)
    }

    pub fn row_filter(&self) -> Result<RowFilter, ConfigError> {
        let mut patterns = self.blacklist.clone();
        if let Some(path) = &self.blacklist_file {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::BlacklistRead {
                path: path.clone(),
                source,
            })?;
            patterns.extend(content.lines().map(str::to_owned));
        }
        Ok(RowFilter {
            blacklist: Blacklist::new(patterns.as_slice())?,
            drop_overlapping: self.drop_overlapping_urls,
        })
    }

    pub fn log_destination(&self) -> Result<LogDestination, ConfigError> {
        LogDestination::from_name(&self.log_destination)
            .ok_or_else(|| ConfigError::LogDestination(self.log_destination.clone()))
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        parse_level(&self.log_level).ok_or_else(|| ConfigError::LogLevel(self.log_level.clone()))
    }
}
