use crate::ConfigError;

/// Levels accepted by `ABEX_LOG_LEVEL`. `http` enables request logging on top of `info`.
pub const VALID_LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "http", "warn", "error"];

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log Level
    ///
    /// Env: ABEX_LOG_LEVEL
    /// Valid values: trace, debug, info, http, warn, error
    /// Default: info
    pub level: String,

    /// Output logs in JSON format
    ///
    /// Env: ABEX_LOG_JSON
    /// Default: false
    pub json: bool,

    /// Strip ANSI color codes from logs
    ///
    /// Env: ABEX_LOG_STRIP_ANSI
    /// Default: false
    pub strip_ansi: bool,

    /// Also write logs to a size-rotated file
    ///
    /// Env: ABEX_LOG_WRITE
    /// Default: false
    pub write: bool,

    /// Directory for log files
    ///
    /// Env: ABEX_LOG_WRITE_PATH
    /// Default: ./logs
    pub write_path: String,

    /// Rotate the log file once it reaches this many bytes
    ///
    /// Env: ABEX_LOG_WRITE_MAX_FILE_SIZE
    /// Default: 5242880 (5 MiB)
    pub write_max_file_size: u64,

    /// Number of log files kept, including the current one
    ///
    /// Env: ABEX_LOG_WRITE_MAX_FILES
    /// Default: 5
    pub write_max_files: usize,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_write_path() -> String {
    "./logs".to_string()
}

fn default_write_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_write_max_files() -> usize {
    5
}

impl LogConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(ConfigError::ValidateError(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if self.write && self.write_path.is_empty() {
            return Err(ConfigError::ValidateError(
                "Log write path cannot be empty when file logging is enabled".to_string(),
            ));
        }

        if self.write_max_files == 0 {
            return Err(ConfigError::ValidateError(
                "Log write max files must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            strip_ansi: false,
            write: false,
            write_path: default_write_path(),
            write_max_file_size: default_write_max_file_size(),
            write_max_files: default_write_max_files(),
        }
    }
}
