//! Logging configuration consumed by the application's logging setup

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Mirror logs to stderr
    pub console_output: bool,
    /// Write logs to a file under `log_dir`
    pub file_output: bool,
    /// Directory for log files
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO on invalid input
    pub fn parse_level(&self) -> tracing::Level {
        self.level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO)
    }

    /// Path of the current log file
    pub fn current_log_path(&self) -> PathBuf {
        self.log_dir.join("lumivox.log")
    }

    /// Create the log directory if missing
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output && !Path::new(&self.log_dir).exists() {
            std::fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back_to_info() {
        let config = LogConfig {
            level: "verbose".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(config.parse_level(), tracing::Level::INFO);
    }

    #[test]
    fn level_parsing_is_case_insensitive() {
        let config = LogConfig {
            level: "DEBUG".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(config.parse_level(), tracing::Level::DEBUG);
    }
}
