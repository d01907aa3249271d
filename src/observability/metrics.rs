//! Metrics collection for `vtshim`.
//!
//! Prometheus-compatible counters and gauges describing transition
//! lifecycles. The `record_*` helpers are no-ops until a recorder is
//! installed with [`init_metrics`].

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ShimError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Skip reason labels. Anything else is bucketed as `"__unknown__"`.
const KNOWN_SKIP_REASONS: [&str; 4] = [
    "AbortError",
    "InvalidStateError",
    "TimeoutError",
    "CallbackError",
];

/// Sanitizes a skip reason for use as a metrics label.
#[must_use]
pub fn sanitize_reason_label(reason: &str) -> &str {
    if KNOWN_SKIP_REASONS.contains(&reason) {
        reason
    } else {
        "__unknown__"
    }
}

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `ShimError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), ShimError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| ShimError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "vtshim_transitions_started_total",
        "Total number of transitions started"
    );
    describe_counter!(
        "vtshim_transitions_skipped_total",
        "Total number of transitions skipped, by reason"
    );
    describe_counter!(
        "vtshim_transitions_finished_total",
        "Total number of transitions that finished without being skipped"
    );
    describe_counter!(
        "vtshim_callback_failures_total",
        "Total number of update callbacks that failed"
    );
    describe_counter!(
        "vtshim_frames_total",
        "Frames spent evaluating animating transitions"
    );
    describe_gauge!(
        "vtshim_transition_active",
        "Whether a transition is registered (1 = active)"
    );
}

/// Records a started transition.
pub fn record_transition_started() {
    counter!("vtshim_transitions_started_total").increment(1);
}

/// Records a skipped transition.
pub fn record_transition_skipped(reason: &str) {
    let label = sanitize_reason_label(reason);
    counter!("vtshim_transitions_skipped_total", "reason" => label.to_owned()).increment(1);
}

/// Records a transition that ran to completion.
pub fn record_transition_finished() {
    counter!("vtshim_transitions_finished_total").increment(1);
}

/// Records a failed update callback.
pub fn record_callback_failure() {
    counter!("vtshim_callback_failures_total").increment(1);
}

/// Records one progress-loop frame spent on an animating transition.
pub fn record_frame() {
    counter!("vtshim_frames_total").increment(1);
}

/// Sets the active-transition gauge.
pub fn set_transition_active(active: bool) {
    gauge!("vtshim_transition_active").set(if active { 1.0 } else { 0.0 });
}
