//! # Logger
//!
//! Installs the global `tracing` subscriber for the OCCI server.
//!
//! Console output is compact and colored. File output goes through a
//! non-blocking rolling appender and can be switched to JSON lines.
//! `RUST_LOG` is honored on top of the configured level; extra
//! directives such as `"occi_http=debug,hyper=info"` can be added with
//! [`LoggerBuilder::directive`].
//!
//! ## Example
//!
//! ```rust
//! # use occi_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder("occi-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Configures and installs the global subscriber.
#[derive(Debug)]
#[must_use = "The builder does nothing until `init` is called."]
pub struct LoggerBuilder {
    name: String,
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    directives: Vec<String>,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

impl LoggerBuilder {
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Minimum level emitted when `RUST_LOG` does not say otherwise.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Raises the level by the number of `-v` flags given on the command line.
    pub const fn verbosity(mut self, occurrences: u8) -> Self {
        self.level = match occurrences {
            0 => self.level,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        self
    }

    /// Adds a filter directive. Invalid directives make [`LoggerBuilder::init`] fail.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Writes rolling log files into `directory`, named after the logger.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub const fn max_files(mut self, max: usize) -> Self {
        self.max_files = max;
        self
    }

    /// Emits JSON lines into the log files. Console output stays human readable.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// Installs the subscriber.
    ///
    /// # Errors
    /// [`LoggerError::Subscriber`] when a global subscriber already exists,
    /// [`LoggerError::InvalidConfiguration`] for unusable settings, and
    /// [`LoggerError::Io`]/[`LoggerError::Appender`] when the log directory cannot be used.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let filter = self.env_filter()?;

        let mut layers = Vec::new();
        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &self.directory {
            Some(directory) => {
                std::fs::create_dir_all(directory)
                    .context(format!("creating {}", directory.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(self.rotation.clone())
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(self.max_files)
                    .build(directory)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if self.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled; turn on the console or set a log directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = %self.name, level = %self.level, "Logging initialized");

        Ok(Logger { name: self.name, guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.directory.is_some() && self.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let mut filter =
            EnvFilter::builder().with_default_directive(self.level.into()).from_env_lossy();
        for directive in &self.directives {
            let parsed: Directive = directive.parse().map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("invalid directive '{directive}': {e}").into(),
                context: None,
            })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }
}

/// Handle to the installed subscriber.
///
/// Holds the worker guard of the file appender; keep it alive until shutdown.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    name: String,
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring a logger. `name` prefixes rolling log files
    /// (e.g. `occi-server.2026-10-19.log`).
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            directives: Vec::new(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file writer guard, present only when file logging is on.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!(logger = %self.name, "Logging shutting down, flushing buffers");
        }
    }
}

/// Parses a level name such as `"info"` or `"off"`.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    level.trim().parse().map_err(|_| LoggerError::InvalidConfiguration {
        message: format!("unknown log level '{level}'").into(),
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder("occi-test");
        assert!(builder.console);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert_eq!(builder.max_files, DEFAULT_MAX_FILES);
        assert!(builder.directory.is_none());
        assert!(!builder.json);
    }

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(Logger::builder("a").verbosity(0).level, LevelFilter::INFO);
        assert_eq!(Logger::builder("a").verbosity(1).level, LevelFilter::DEBUG);
        assert_eq!(Logger::builder("a").verbosity(4).level, LevelFilter::TRACE);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Logger::builder("  ").validate().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_max_files_is_rejected_for_file_output() {
        let builder = Logger::builder("a").directory("logs").max_files(0);
        assert!(builder.validate().is_err());
        assert!(Logger::builder("a").max_files(0).validate().is_ok());
    }

    #[test]
    fn bad_directive_is_reported() {
        let err = Logger::builder("a").directive("occi=notalevel").env_filter().unwrap_err();
        assert!(err.to_string().contains("occi=notalevel"));
    }

    #[test]
    fn parse_level_names() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert!(parse_level("loud").is_err());
    }
}
