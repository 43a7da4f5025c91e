//! Error types for telemetry setup.

use thiserror::Error;

/// Errors produced while loading tracing configuration or installing a
/// subscriber.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    /// The configuration file could not be read.
    #[error("failed to read tracing configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid YAML for [`TracingConfig`](crate::TracingConfig).
    #[error("failed to parse tracing configuration: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// The log level is not a valid filter directive.
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// Another [`TracingHandle`](crate::TracingHandle) is alive.
    #[error("a tracing subscriber is already active in this process")]
    AlreadyActive,
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
