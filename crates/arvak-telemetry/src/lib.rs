//! Tracing setup for the Arvak control-data tooling.
//!
//! The library crates only emit `tracing` events. Applications that want to
//! see them build a [`TracingConfig`] (defaults, YAML, environment) and hold
//! a [`TracingHandle`] for as long as output should be collected:
//!
//! ```rust
//! use arvak_telemetry::{TracingConfig, TracingFormat, TracingHandle};
//!
//! let config = TracingConfig::from_yaml_str("log_level: debug\nformat: json\n").unwrap();
//! assert_eq!(config.format, TracingFormat::Json);
//!
//! let handle = TracingHandle::install(&config).unwrap();
//! tracing::debug!("visible while the handle lives");
//! drop(handle);
//! ```

pub mod config;
pub mod error;
pub mod subscriber;

pub use config::{TracingConfig, TracingFormat};
pub use error::{TelemetryError, TelemetryResult};
pub use subscriber::TracingHandle;
