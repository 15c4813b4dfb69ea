use std::path::PathBuf;

/// Database file used when `--db` is not given, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "resort.sqlite3";
/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "RESORTDESK_LOG";
pub const DEFAULT_LOG_FILTER: &str = "resortdesk=info,sqlx=warn";
/// File name prefix for the daily rolling log.
pub const LOG_FILE_PREFIX: &str = "resortdesk.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub json: bool,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
            dir: None,
        }
    }
}

impl LogConfig {
    /// Reads the filter from [`LOG_ENV`], falling back to [`DEFAULT_LOG_FILTER`].
    pub fn from_env(json: bool, dir: Option<PathBuf>) -> Self {
        Self::with_filter(std::env::var(LOG_ENV).ok(), json, dir)
    }

    fn with_filter(filter: Option<String>, json: bool, dir: Option<PathBuf>) -> Self {
        let filter = filter
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self { filter, json, dir }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    pub db_path: PathBuf,
    pub log: LogConfig,
}

impl DeskConfig {
    pub fn new(db_path: Option<PathBuf>, log: LogConfig) -> Self {
        Self {
            db_path: db_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            log,
        }
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self::new(None, LogConfig::default())
    }
}
