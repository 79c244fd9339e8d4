//! Logging utilities and configuration for relsum.
//!
//! The greedy engine can emit a trace event for every heap recomputation, which
//! is far too much output for large relations. [`LogConfig`] gates that detail
//! so the summarizer only pays for formatting when it is asked to.

use tracing::Level;

/// Logging configuration for the summarizer.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for relsum components
    pub base_level: Level,
    /// Whether to log every lazy recomputation on the cell heaps
    pub log_heap_details: bool,
    /// Whether to log each cell added to a growing formula
    pub log_formula_growth: bool,
    /// Whether to log per-formula cover figures
    pub log_metrics: bool,
    /// Maximum length for logged cell values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_heap_details: false,
            log_formula_growth: true,
            log_metrics: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_heap_details: true,
            log_formula_growth: true,
            log_metrics: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_heap_details: false,
            log_formula_growth: false,
            log_metrics: false,
            max_field_length: 128,
        }
    }

    /// Creates a balanced configuration suitable for most use cases.
    pub fn balanced() -> Self {
        Self::default()
    }
}

/// Macro for performance-sensitive debug logging. Emits only when
/// `base_level` is DEBUG or more verbose.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional heap recomputation logging.
#[macro_export]
macro_rules! log_heap {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_heap_details {
            tracing::trace!($($arg)*);
        }
    };
}

/// Macro for conditional formula growth logging.
#[macro_export]
macro_rules! log_formula {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_formula_growth {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Installing a global subscriber for binaries, benches and tests.
pub mod setup {
    use tracing::Level;

    use super::LogConfig;
    use crate::error::{Result, SummaryError};

    /// Target of the heap recomputation events.
    const HEAP_TARGET: &str = "relsum::core::heap";

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for everything outside relsum
        pub level: Level,
        /// Level for the summarizer, parser and formatters
        pub relsum_level: Level,
        /// Whether heap recomputation events pass the filter
        pub heap_trace: bool,
        /// Whether closing spans report their duration
        pub span_timings: bool,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Filter directives replacing the ones built from the levels
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                relsum_level: Level::DEBUG,
                heap_trace: false,
                span_timings: false,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON lines, relsum at INFO and nothing from the heaps.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                relsum_level: Level::INFO,
                json_format: true,
                ..Self::default()
            }
        }

        /// Everything relsum emits, with `summarize` span durations.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                relsum_level: Level::TRACE,
                heap_trace: true,
                span_timings: true,
                ..Self::default()
            }
        }

        /// Lets through exactly what a summarizer running with `log` emits.
        pub fn for_summarizer(log: &LogConfig) -> Self {
            Self {
                relsum_level: if log.log_formula_growth {
                    log.base_level.max(Level::DEBUG)
                } else {
                    log.base_level
                },
                heap_trace: log.log_heap_details,
                ..Self::default()
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_relsum_level(mut self, level: Level) -> Self {
            self.relsum_level = level;
            self
        }

        pub fn with_heap_trace(mut self, enabled: bool) -> Self {
            self.heap_trace = enabled;
            self
        }

        pub fn with_span_timings(mut self, enabled: bool) -> Self {
            self.span_timings = enabled;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the filter directives.
        ///
        /// The heap target is pinned to TRACE or switched off so that
        /// `heap_trace` wins over `relsum_level` in both directions.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                return filter.clone();
            }
            let heap = if self.heap_trace { "trace" } else { "off" };
            format!(
                "{},relsum={},{HEAP_TARGET}={heap}",
                self.level.as_str().to_lowercase(),
                self.relsum_level.as_str().to_lowercase()
            )
        }
    }

    /// Initializes the global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Fails with a
    /// configuration error when the filter does not parse or a global
    /// subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use relsum::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::fmt::format::FmtSpan;
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(config.env_filter()).map_err(|e| {
                SummaryError::configuration(format!("invalid log filter: {e}"))
            })?,
        };

        let span_events = if config.span_timings {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(span_events)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_span_events(span_events)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| SummaryError::configuration(format!("logging already initialized: {e}")))
    }
}
