// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job runner counters.
//!
//! Recorded through the metrics-rs facade. `vidcast worker` installs the
//! Prometheus exporter when `[metrics] enabled = true`; otherwise the
//! embedding process supplies a recorder or every call is a no-op.

use std::net::SocketAddr;

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use vidcast_core::{Platform, VidcastError};

/// Install the Prometheus recorder globally and serve it on `listen`.
///
/// Only one recorder can be installed per process.
pub fn install_exporter(listen: SocketAddr) -> Result<(), VidcastError> {
    PrometheusBuilder::new()
        .with_http_listener(listen)
        .install()
        .map_err(|e| VidcastError::Internal(format!("failed to install Prometheus exporter: {e}")))?;

    register_metrics();

    info!(%listen, "prometheus exporter listening");
    Ok(())
}

/// Register counter descriptions. Call once after installing a recorder.
pub fn register_metrics() {
    describe_counter!("vidcast_jobs_completed_total", "Publication jobs completed");
    describe_counter!(
        "vidcast_jobs_retried_total",
        "Failed publication attempts that were requeued"
    );
    describe_counter!(
        "vidcast_jobs_failed_total",
        "Publication jobs that exhausted their retries"
    );
}

pub(crate) fn record_completed(platform: Platform) {
    metrics::counter!("vidcast_jobs_completed_total", "platform" => platform.to_string()).increment(1);
}

pub(crate) fn record_retried(platform: Platform) {
    metrics::counter!("vidcast_jobs_retried_total", "platform" => platform.to_string()).increment(1);
}

pub(crate) fn record_failed(platform: Platform) {
    metrics::counter!("vidcast_jobs_failed_total", "platform" => platform.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_per_platform() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            record_completed(Platform::Youtube);
            record_retried(Platform::Tiktok);
            record_retried(Platform::Tiktok);
            record_failed(Platform::Twitter);
        });

        let rendered = handle.render();
        assert!(rendered.contains("vidcast_jobs_completed_total{platform=\"youtube\"} 1"), "{rendered}");
        assert!(rendered.contains("vidcast_jobs_retried_total{platform=\"tiktok\"} 2"), "{rendered}");
        assert!(rendered.contains("vidcast_jobs_failed_total{platform=\"twitter\"} 1"), "{rendered}");
        assert!(rendered.contains("# HELP vidcast_jobs_completed_total Publication jobs completed"));
    }
}
