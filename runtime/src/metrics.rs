//! Prometheus metrics for observability and monitoring.
//!
//! The Store records its metrics through the `metrics` facade; nothing is
//! collected until a recorder is installed. [`MetricsRecorder`] installs the
//! Prometheus exporter and renders the text exposition format on demand.
//!
//! # Example
//!
//! ```rust,no_run
//! use statecraft_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = MetricsRecorder::install()?;
//!
//! // ... dispatch some actions ...
//!
//! println!("{}", recorder.render());
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Actions accepted by `Store::send`
pub const ACTIONS_DISPATCHED: &str = "store_actions_dispatched_total";
/// Actions rejected because the store was shutting down
pub const ACTIONS_REJECTED: &str = "store_actions_rejected_total";
/// Time spent inside the reducer per action
pub const REDUCER_DURATION: &str = "store_reducer_duration_seconds";
/// Effects executed, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store_effects_executed_total";
/// Subscriber callbacks invoked
pub const SUBSCRIBERS_NOTIFIED: &str = "store_subscribers_notified_total";
/// Subscribers currently registered, summed over every live store
pub const SUBSCRIBERS: &str = "store_subscribers";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder.
///
/// Only one recorder can be installed per process.
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// Install the Prometheus recorder and describe the store metrics.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Build`] if the bucket configuration is rejected
    /// and [`MetricsError::Install`] if a recorder is already installed.
    pub fn install() -> Result<Self, MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_001, 0.000_01, 0.000_1, 0.001, 0.01, 0.1],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        let handle = builder
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;

        // Descriptions are dropped unless a recorder is already in place.
        register_metrics();
        tracing::info!("Prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder").finish_non_exhaustive()
    }
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(ACTIONS_DISPATCHED, "Total number of actions dispatched into stores");
    describe_counter!(
        ACTIONS_REJECTED,
        "Total number of actions rejected because the store was shutting down"
    );
    describe_histogram!(REDUCER_DURATION, "Time taken to reduce one action");
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects executed, by type");
    describe_counter!(SUBSCRIBERS_NOTIFIED, "Total number of subscriber notifications");
    describe_gauge!(SUBSCRIBERS, "Number of registered state subscribers");
}
