//! Integration tests for tracing configuration and the subscriber handle.
//!
//! The handle is process-wide, so its whole lifecycle is exercised from a
//! single test.

use arvak_telemetry::{TelemetryError, TracingConfig, TracingFormat, TracingHandle};
use std::io::Write;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

#[test]
fn test_yaml_partial_document_keeps_defaults() {
    let config = TracingConfig::from_yaml_str("format: json\n").unwrap();
    assert_eq!(config.format, TracingFormat::Json);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.service_name, "arvak");
}

#[test]
fn test_yaml_rejects_unknown_format() {
    let err = TracingConfig::from_yaml_str("format: xml\n").unwrap_err();
    assert!(matches!(err, TelemetryError::Parse(_)));
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("arvak-telemetry-{}.yaml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "log_level: \"arvak_randomized=debug\"").unwrap();
    writeln!(file, "service_name: readout").unwrap();
    drop(file);

    let config = TracingConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.log_level, "arvak_randomized=debug");
    assert_eq!(config.service_name, "readout");
    assert_eq!(config.format, TracingFormat::Console);
}

#[test]
fn test_missing_file() {
    let err = TracingConfig::from_file("/nonexistent/arvak/tracing.yaml").unwrap_err();
    assert!(matches!(err, TelemetryError::Io(_)));
}

#[test]
fn test_config_serde_roundtrip() {
    let config = TracingConfig::new("warn".into(), TracingFormat::Json, "svc".into());
    let yaml = serde_yaml_ng::to_string(&config).unwrap();
    assert!(yaml.contains("format: json"));
    assert_eq!(TracingConfig::from_yaml_str(&yaml).unwrap(), config);
}

// ----------------------------------------------------------------------------
// Subscriber handle
// ----------------------------------------------------------------------------

#[test]
fn test_handle_lifecycle() {
    let invalid = TracingConfig::new("arvak=loud".into(), TracingFormat::Console, "svc".into());
    assert!(matches!(
        TracingHandle::install(&invalid),
        Err(TelemetryError::InvalidFilter { .. })
    ));
    assert!(!TracingHandle::is_active());

    let config = TracingConfig::new("debug".into(), TracingFormat::Json, "lab".into());
    let handle = TracingHandle::install(&config).unwrap();
    assert!(TracingHandle::is_active());
    assert_eq!(handle.service_name(), "lab");
    let root = tracing::Span::current();
    assert_eq!(root.metadata().map(|m| m.name()), Some("service"));
    assert!(root.metadata().unwrap().fields().field("service").is_some());
    tracing::debug!(qubits = 2, "event under the scoped subscriber");

    assert!(matches!(
        TracingHandle::install(&TracingConfig::default()),
        Err(TelemetryError::AlreadyActive)
    ));
    let other_thread = std::thread::spawn(|| {
        matches!(
            TracingHandle::install(&TracingConfig::default()),
            Err(TelemetryError::AlreadyActive)
        )
    });
    assert!(other_thread.join().unwrap());

    drop(handle);
    assert!(!TracingHandle::is_active());
    assert!(tracing::Span::current().is_none());

    let handle = TracingHandle::install(&TracingConfig::default()).unwrap();
    assert!(TracingHandle::is_active());
    drop(handle);
}
