//! Logging for the sizing pipeline
//!
//! Provides:
//! - Subscriber setup with `EnvFilter` and JSON or human-readable output
//! - Structured events for probe and allocation results

use crate::models::{Platform, SystemInfo};
use crate::probe::ProbeReport;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, util::TryInitError, EnvFilter};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global subscriber, writing to stderr
///
/// `default_directive` applies when `RUST_LOG` is unset.
pub fn init_logging(format: LogFormat, default_directive: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    }
}

/// Structured logger for sizing events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    platform: Platform,
}

impl StructuredLogger {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Log the outcome of a probe, warning when any method failed
    pub fn log_probe(&self, report: &ProbeReport) {
        let SystemInfo {
            cpu_count,
            ram_bytes,
            ram_gb,
        } = report.info;

        match &report.error {
            None => info!(
                event = "probe_completed",
                platform = %self.platform,
                cpu_count,
                ram_bytes,
                ram_gb,
                "Detected resources available for containers"
            ),
            Some(err) => warn!(
                event = "probe_degraded",
                platform = %self.platform,
                cpu_count,
                ram_bytes,
                ram_gb,
                error = %err,
                "Resource detection incomplete"
            ),
        }
    }

    /// Log an allocation plan about to be handed to the renderer
    pub fn log_plan(&self, total_memory_mib: i64, total_cpu: f64, services: usize) {
        info!(
            event = "plan_computed",
            platform = %self.platform,
            total_memory_mib,
            total_cpu,
            services,
            "Scaled service allocations"
        );
    }

    /// Log a plan refused by the caller's capacity floor
    pub fn log_insufficient_memory(&self, ram_gb: i64, min_ram_gb: i64) {
        warn!(
            event = "insufficient_memory",
            platform = %self.platform,
            ram_gb,
            min_ram_gb,
            "Host memory below recommended minimum"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer};
    use tracing_subscriber::prelude::*;

    /// Records `LEVEL:event` for every event carrying an `event` field
    #[derive(Clone, Default)]
    struct EventCapture {
        events: Arc<Mutex<Vec<String>>>,
    }

    struct EventName(Option<String>);

    impl Visit for EventName {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "event" {
                self.0 = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> Layer<S> for EventCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut name = EventName(None);
            event.record(&mut name);
            if let Some(name) = name.0 {
                let level = event.metadata().level();
                self.events.lock().unwrap().push(format!("{}:{}", level, name));
            }
        }
    }

    #[test]
    fn test_structured_logger_events() {
        let capture = EventCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            let logger = StructuredLogger::new(Platform::Linux);
            logger.log_probe(&ProbeReport {
                info: SystemInfo::new(4, 1 << 33),
                error: None,
            });
            logger.log_probe(&ProbeReport {
                info: SystemInfo::default(),
                error: Some(crate::ProbeError::Unsupported("other".into())),
            });
            logger.log_plan(8192, 4.0, 9);
            logger.log_insufficient_memory(4, 8);
        });

        let events = capture.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "INFO:probe_completed",
                "WARN:probe_degraded",
                "INFO:plan_computed",
                "WARN:insufficient_memory",
            ]
        );
    }
}
