use crate::error::{ConsoleError, Result};
use crate::history::{
    parse_timestamp, DEFAULT_DATE_FORMAT, DEFAULT_HISTORY_DIR, DEFAULT_HISTORY_FILE,
    DEFAULT_RETENTION_DAYS,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.yaml";
pub const ENV_HISTORY_DAYS: &str = "QUERYSH_HISTORY_DAYS";
pub const ENV_HISTORY_FILE: &str = "QUERYSH_HISTORY_FILE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub prompt: String,
    pub history: HistoryConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "querysh> ".to_string(),
            history: HistoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Directory holding the history file. Defaults to `~/.querysh`.
    pub dir: Option<PathBuf>,
    pub file_name: String,
    /// chrono format string used for the timestamp column.
    pub date_format: String,
    pub retention_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            file_name: DEFAULT_HISTORY_FILE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl HistoryConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()?.join(DEFAULT_HISTORY_DIR),
        };
        Some(dir.join(&self.file_name))
    }

    fn apply_history_file(&mut self, path: &Path) {
        self.dir = path.parent().map(Path::to_path_buf);
        if let Some(name) = path.file_name() {
            self.file_name = name.to_string_lossy().into_owned();
        }
    }
}

impl ConsoleConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ConsoleConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: ConsoleConfig = serde_yaml::from_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `~/.querysh/config.yaml` when it exists, otherwise starts from defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = Self::default_path().filter(|p| p.exists()) {
            debug!(path = %path.display(), "Loading console configuration");
            return Self::load(path);
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_HISTORY_DIR).join(CONFIG_FILE))
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_HISTORY_DAYS).ok(),
            std::env::var(ENV_HISTORY_FILE).ok(),
        )
    }

    fn apply_overrides(&mut self, days: Option<String>, file: Option<String>) -> Result<()> {
        if let Some(days) = days {
            self.history.retention_days = days.trim().parse().map_err(|_| {
                ConsoleError::Config(format!("{} must be an integer, got '{}'", ENV_HISTORY_DAYS, days))
            })?;
        }
        if let Some(file) = file.filter(|f| !f.is_empty()) {
            self.history.apply_history_file(Path::new(&file));
        }
        Ok(())
    }

    /// Replaces the retention window, rejecting values `validate` would reject.
    pub fn override_retention_days(&mut self, days: i64) -> Result<()> {
        if days <= 0 {
            return Err(ConsoleError::Config(format!(
                "history retention must be a positive number of days, got {}",
                days
            )));
        }
        self.history.retention_days = days;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let history = &self.history;
        if history.retention_days <= 0 {
            return Err(ConsoleError::Config(format!(
                "history.retention_days must be positive, got {}",
                history.retention_days
            )));
        }
        if history.file_name.is_empty() {
            return Err(ConsoleError::Config(
                "history.file_name must not be empty".to_string(),
            ));
        }

        // History entries are only readable when the format parses its own output.
        let probe = NaiveDate::from_ymd_opt(2024, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 58))
            .ok_or_else(|| ConsoleError::Config("invalid probe timestamp".to_string()))?;
        let mut formatted = String::new();
        write!(formatted, "{}", probe.format(&history.date_format)).map_err(|_| {
            ConsoleError::Config(format!(
                "history.date_format '{}' is not a valid format",
                history.date_format
            ))
        })?;
        if formatted.contains('|') {
            return Err(ConsoleError::Config(
                "history.date_format must not produce '|'".to_string(),
            ));
        }
        if parse_timestamp(&formatted, &history.date_format).is_none() {
            return Err(ConsoleError::Config(format!(
                "history.date_format '{}' cannot be parsed back",
                history.date_format
            )));
        }
        Ok(())
    }
}
