use thiserror::Error;
use crate::config::ConfigError;

/// Error types for the market-making simulator
#[derive(Error, Debug)]
pub enum SimError {
    /// Parameter set missing a value or outside its documented domain
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Driver asked to step past the configured duration
    #[error("Simulation exhausted after {duration} steps")]
    Exhausted { duration: usize },

    /// Sampling distribution rejected its parameters
    #[error("Distribution error: {message}")]
    Distribution { message: String },

    /// Writing an exported log failed
    #[error("Export error: {message}")]
    Export { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Filesystem errors
    #[error("IO error: {message}")]
    Io { message: String },
}

/// Result type alias for simulator operations
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Create an export error with message
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create a serialization error with message
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration(_) => ErrorSeverity::Critical,
            Self::Exhausted { .. } => ErrorSeverity::Warning,
            Self::Distribution { .. } => ErrorSeverity::Critical,
            Self::Export { .. } => ErrorSeverity::Error,
            Self::Serialization { .. } => ErrorSeverity::Error,
            Self::Io { .. } => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
            Self::Critical => tracing::Level::ERROR,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<statrs::StatsError> for SimError {
    fn from(err: statrs::StatsError) -> Self {
        Self::Distribution {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for SimError {
    fn from(err: csv::Error) -> Self {
        Self::Export {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
