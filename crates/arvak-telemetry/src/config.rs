//! Tracing configuration.
//!
//! Values are resolved with the following precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file (YAML)
//! 3. Default values
//!
//! Environment variables:
//! - `RUST_LOG`: filter directives (default: "info")
//! - `ARVAK_LOG_FORMAT`: "console" or "json" (default: "console")
//! - `ARVAK_SERVICE_NAME`: service name (default: "arvak")

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TelemetryResult;

const LOG_LEVEL_VAR: &str = "RUST_LOG";
const LOG_FORMAT_VAR: &str = "ARVAK_LOG_FORMAT";
const SERVICE_NAME_VAR: &str = "ARVAK_SERVICE_NAME";

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable console output (for development).
    #[default]
    Console,
    /// JSON structured logging (for production).
    Json,
}

impl TracingFormat {
    /// Format for a `ARVAK_LOG_FORMAT` value. Anything but "json" is console.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            TracingFormat::Json
        } else {
            TracingFormat::Console
        }
    }
}

/// Tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Filter directives (e.g., "info", "arvak_patch=trace").
    pub log_level: String,
    /// Output format (console or JSON).
    pub format: TracingFormat,
    /// Service name, recorded on the root `service` span of a
    /// [`TracingHandle`](crate::TracingHandle).
    pub service_name: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: TracingFormat::Console,
            service_name: "arvak".to_string(),
        }
    }
}

impl TracingConfig {
    /// Create a new tracing config with custom settings.
    pub fn new(log_level: String, format: TracingFormat, service_name: String) -> Self {
        Self {
            log_level,
            format,
            service_name,
        }
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> TelemetryResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> TelemetryResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Load from `config_file` if given, else defaults, then apply the
    /// environment.
    pub fn load<P: AsRef<Path>>(config_file: Option<P>) -> TelemetryResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Override fields whose variables are set in the environment. Absent
    /// variables leave the current values unchanged.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            self.log_level = level;
        }
        if let Some(format) = lookup(LOG_FORMAT_VAR) {
            self.format = TracingFormat::from_name(&format);
        }
        if let Some(name) = lookup(SERVICE_NAME_VAR) {
            self.service_name = name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, TracingFormat::Console);
        assert_eq!(config.service_name, "arvak");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(TracingFormat::from_name("json"), TracingFormat::Json);
        assert_eq!(TracingFormat::from_name("JSON"), TracingFormat::Json);
        assert_eq!(TracingFormat::from_name("console"), TracingFormat::Console);
        assert_eq!(TracingFormat::from_name("pretty"), TracingFormat::Console);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = TracingConfig::from_yaml_str("log_level: warn\nservice_name: lab\n").unwrap();
        let config = file.with_overrides(lookup(&[
            ("RUST_LOG", "arvak_patch=trace"),
            ("ARVAK_LOG_FORMAT", "json"),
        ]));
        assert_eq!(config.log_level, "arvak_patch=trace");
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.service_name, "lab");
    }

    #[test]
    fn test_absent_env_keeps_values() {
        let config = TracingConfig::new("debug".into(), TracingFormat::Json, "svc".into());
        assert_eq!(config.clone().with_overrides(lookup(&[])), config);
    }
}
