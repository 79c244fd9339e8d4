//! Error types for relsum.
//!
//! All fallible operations in the crate return [`SummaryError`] through the
//! [`Result`] alias. Broken internal invariants of the greedy engine are not
//! represented here: they indicate a defect and panic instead.

use thiserror::Error;

/// The main error type for relsum.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// Invalid construction parameters or assessor configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed textual relation input.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending input line
        line: usize,
        /// Detailed error message
        message: String,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, SummaryError>`.
///
/// # Examples
///
/// ```rust
/// use relsum::error::Result;
///
/// fn build() -> Result<()> {
///     Ok(())
/// }
/// # build().unwrap();
/// ```
pub type Result<T> = std::result::Result<T, SummaryError>;

impl SummaryError {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a new parse error for the given 1-based line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns true for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true for parse errors.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<serde_json::Error> for SummaryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<SummaryError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            SummaryError::Configuration(inner) => {
                SummaryError::Configuration(format!("{}: {}", f(), inner))
            }
            SummaryError::Parse { line, message } => SummaryError::Parse {
                line,
                message: format!("{}: {}", f(), message),
            },
            SummaryError::Serialization(inner) => {
                SummaryError::Serialization(format!("{}: {}", f(), inner))
            }
            SummaryError::Io(err) => SummaryError::Io(std::io::Error::new(
                err.kind(),
                format!("{}: {}", f(), err),
            )),
        })
    }
}
