// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vidcast worker` command implementation.
//!
//! Sweeps due and pending publication jobs every
//! `worker.sweep_interval_secs` until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use vidcast_config::VidcastConfig;
use vidcast_core::VidcastError;
use vidcast_platforms::ClientRegistry;
use vidcast_publish::{JobRunner, JobService, PublicationService, RunnerSettings};
use vidcast_storage::SqliteStore;

use crate::shutdown;

pub async fn run_worker(config: VidcastConfig, once: bool) -> Result<(), VidcastError> {
    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    let registry = ClientRegistry::builtin(&config)?;
    install_metrics(&config);

    let jobs = JobService::new(store.clone()).with_default_max_retries(config.worker.default_max_retries);
    let runner = JobRunner::new(
        jobs,
        PublicationService::new(Arc::new(registry)),
        store.clone(),
        store.clone(),
        RunnerSettings::from_config(&config.worker),
    );

    if once {
        let report = runner.sweep(Utc::now()).await?;
        crate::print_json(&report)?;
        drop(runner);
        return close(store).await;
    }

    let interval_secs = config.worker.sweep_interval_secs.max(1);
    info!(
        interval_secs,
        concurrency = config.worker.concurrency,
        batch_size = config.worker.batch_size,
        "vidcast worker started"
    );

    let cancel = shutdown::install_signal_handler();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = runner.sweep(Utc::now()).await {
                    error!(error = %e, "sweep failed");
                }
            }
        }
    }

    info!("vidcast worker stopped");
    drop(runner);
    close(store).await
}

fn install_metrics(config: &VidcastConfig) {
    if !config.metrics.enabled {
        debug!("prometheus metrics disabled by configuration");
        return;
    }
    let installed = config
        .metrics
        .listen
        .parse()
        .map_err(|e| VidcastError::Config(format!("metrics.listen: {e}")))
        .and_then(vidcast_publish::install_exporter);
    if let Err(e) = installed {
        warn!(error = %e, "prometheus initialization failed, continuing without metrics");
    }
}

async fn close(store: Arc<SqliteStore>) -> Result<(), VidcastError> {
    match Arc::try_unwrap(store) {
        Ok(store) => store.close().await,
        // Another handle is alive; the connection closes with the last one.
        Err(_) => Ok(()),
    }
}
