use config::LogConfig;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_NAME: &str = "logs.log";
const LOKI_SERVICE_LABEL: &str = "abex-indexer";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{level}': {source}")]
    InvalidLogLevel {
        level: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to create log directory or file appender: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse Loki URL '{url}': {source}")]
    InvalidLokiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to configure Loki integration: {0}")]
    LokiError(#[from] tracing_loki::Error),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Configuration for logging initialization
pub struct LoggingConfig<'a> {
    pub level: &'a str,
    pub json_format: bool,
    pub strip_ansi: bool,
    pub write_to_file: bool,
    pub write_path: &'a str,
    pub write_max_file_size: u64,
    pub write_max_files: usize,
    pub loki_url: Option<&'a str>,
}

impl<'a> LoggingConfig<'a> {
    pub fn new(log: &'a LogConfig, loki_url: Option<&'a str>) -> Self {
        Self {
            level: &log.level,
            json_format: log.json,
            strip_ansi: log.strip_ansi,
            write_to_file: log.write,
            write_path: &log.write_path,
            write_max_file_size: log.write_max_file_size,
            write_max_files: log.write_max_files,
            loki_url,
        }
    }
}

/// Keeps the non-blocking file writer flushing; drop it on shutdown.
#[must_use]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// `http` is not a tracing level; it means info plus request logs.
pub(crate) fn filter_directive(level: &str) -> &str {
    if level == "http" { "info,http=debug" } else { level }
}

/// Install the global subscriber.
///
/// Console output is always on. A size-rotated file (`logs.log`, `logs.log.1`, ..,
/// keeping `write_max_files` in total) and Loki shipping are added when configured.
/// Loki entries carry `service=abex-indexer` and the process id.
pub fn init_with_config(config: LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_new(filter_directive(config.level)).map_err(|source| {
        LoggingError::InvalidLogLevel {
            level: config.level.to_string(),
            source,
        }
    })?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.json_format, config.strip_ansi)];
    let mut file_guard = None;

    if config.write_to_file {
        std::fs::create_dir_all(config.write_path)?;

        let appender = BasicRollingFileAppender::new(
            PathBuf::from(config.write_path).join(LOG_FILE_NAME),
            RollingConditionBasic::new().max_size(config.write_max_file_size),
            // the count covers rotated files only
            config.write_max_files.saturating_sub(1),
        )?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);

        let file_layer = if config.json_format {
            fmt::layer().json().with_writer(writer).boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(writer)
                .boxed()
        };
        layers.push(file_layer);
    }

    if let Some(url) = config.loki_url {
        let parsed = url::Url::parse(url).map_err(|source| LoggingError::InvalidLokiUrl {
            url: url.to_string(),
            source,
        })?;

        let (loki_layer, task) = tracing_loki::builder()
            .label("service", LOKI_SERVICE_LABEL)?
            .extra_field("pid", std::process::id().to_string())?
            .build_url(parsed)?;

        tokio::spawn(task);
        layers.push(loki_layer.boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(LoggingGuard { _file: file_guard })
}

fn console_layer(json_format: bool, strip_ansi: bool) -> BoxedLayer {
    if json_format {
        fmt::layer().json().boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(!strip_ansi)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_level_maps_to_target_filter() {
        assert_eq!(filter_directive("http"), "info,http=debug");
        assert_eq!(filter_directive("warn"), "warn");
    }

    #[test]
    fn test_every_configured_level_is_a_valid_filter() {
        for level in config::VALID_LOG_LEVELS {
            assert!(EnvFilter::try_new(filter_directive(level)).is_ok(), "{level}");
        }
    }

    #[test]
    fn test_config_from_log_section() {
        let log = LogConfig {
            write: true,
            ..Default::default()
        };
        let config = LoggingConfig::new(&log, Some("http://127.0.0.1:3100"));
        assert_eq!(config.level, "info");
        assert!(config.write_to_file);
        assert_eq!(config.write_path, "./logs");
        assert_eq!(config.loki_url, Some("http://127.0.0.1:3100"));
    }
}
