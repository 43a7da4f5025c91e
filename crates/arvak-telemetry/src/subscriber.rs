//! Scoped installation of the tracing subscriber.

use std::fmt as std_fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::span::EnteredSpan;
use tracing::subscriber::DefaultGuard;
use tracing::{debug, error_span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{TracingConfig, TracingFormat};
use crate::error::{TelemetryError, TelemetryResult};

/// Set while a [`TracingHandle`] is alive.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Owner of the installed subscriber.
///
/// At most one handle exists per process. The subscriber is the default for
/// the thread that created the handle and is removed when the handle is
/// dropped, after which a new handle may be installed.
///
/// While the handle lives, a root `service` span carrying the configured
/// service name is entered on that thread, so events recorded under it show
/// the service. The span is at `ERROR` level and is only recorded when the
/// filter enables this crate's spans.
#[must_use = "the subscriber is removed when the handle is dropped"]
pub struct TracingHandle {
    root_span: Option<EnteredSpan>,
    guard: Option<DefaultGuard>,
    service_name: String,
}

impl TracingHandle {
    /// Install a subscriber built from `config`.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::InvalidFilter`] if `log_level` does not parse, and
    /// [`TelemetryError::AlreadyActive`] if another handle is alive.
    pub fn install(config: &TracingConfig) -> TelemetryResult<Self> {
        let env_filter =
            EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
                filter: config.log_level.clone(),
                message: e.to_string(),
            })?;

        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TelemetryError::AlreadyActive);
        }

        let fmt_layer = match config.format {
            TracingFormat::Console => fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .boxed(),
            TracingFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .boxed(),
        };

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer);
        let guard = tracing::subscriber::set_default(subscriber);
        let root_span = error_span!("service", service = %config.service_name).entered();

        debug!(format = ?config.format, "tracing subscriber installed");
        Ok(Self {
            root_span: Some(root_span),
            guard: Some(guard),
            service_name: config.service_name.clone(),
        })
    }

    /// Install a subscriber configured from the environment.
    pub fn from_env() -> TelemetryResult<Self> {
        Self::install(&TracingConfig::from_env())
    }

    /// Whether any handle is currently alive.
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl std_fmt::Debug for TracingHandle {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.debug_struct("TracingHandle")
            .field("service_name", &self.service_name)
            .field("installed", &self.guard.is_some())
            .finish()
    }
}

impl Drop for TracingHandle {
    fn drop(&mut self) {
        // Exit the root span under its own subscriber, then restore the
        // previous default before releasing the slot.
        drop(self.root_span.take());
        drop(self.guard.take());
        ACTIVE.store(false, Ordering::Release);
    }
}
