// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background execution of publication jobs.
//!
//! Each sweep gathers due scheduled jobs and pending jobs, then runs them
//! with bounded concurrency. A job run is: start, resolve workspace and
//! video, publish under a single timeout, persist what the platform
//! returned, and complete or fail the job.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use vidcast_config::model::WorkerConfig;
use vidcast_core::{
    CatalogStore, JobStatus, Platform, PublicationJob, StatsStore, VidcastError, Video, VideoStats,
    Workspace,
};

use crate::jobs::JobService;
use crate::recording;
use crate::service::{PublicationService, PublishStage};

/// Tunables for [`JobRunner`].
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Maximum jobs pulled from each source per sweep.
    pub batch_size: u32,
    /// Jobs executed at once.
    pub concurrency: usize,
    /// Bound on one whole publish call.
    pub publish_timeout: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from_config(&WorkerConfig::default())
    }
}

impl RunnerSettings {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            concurrency: config.concurrency.max(1),
            publish_timeout: Duration::from_secs(config.publish_timeout_secs),
        }
    }
}

/// What happened to one job during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Completed,
    /// Failed, back to `pending` with retries left.
    Retried,
    /// Failed with no retries left.
    Failed,
    /// Not run because another caller claimed it first or it vanished, or
    /// run but its result dropped because the job was cancelled meanwhile.
    Skipped,
}

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub attempted: usize,
    pub completed: usize,
    pub retried: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SweepReport {
    fn record(&mut self, outcome: JobOutcome) {
        self.attempted += 1;
        match outcome {
            JobOutcome::Completed => self.completed += 1,
            JobOutcome::Retried => self.retried += 1,
            JobOutcome::Failed => self.failed += 1,
            JobOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Drives publication jobs through [`PublicationService`].
#[derive(Clone)]
pub struct JobRunner {
    jobs: JobService,
    publisher: PublicationService,
    catalog: Arc<dyn CatalogStore>,
    stats: Arc<dyn StatsStore>,
    settings: RunnerSettings,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    pub fn new(
        jobs: JobService,
        publisher: PublicationService,
        catalog: Arc<dyn CatalogStore>,
        stats: Arc<dyn StatsStore>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            jobs,
            publisher,
            catalog,
            stats,
            settings,
        }
    }

    /// Run every job that is ready as of `now`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, VidcastError> {
        let due = self.jobs.due_jobs(now, self.settings.batch_size).await?;
        let pending = self.jobs.pending_jobs(self.settings.batch_size).await?;

        let mut seen = HashSet::new();
        let batch: Vec<PublicationJob> = due
            .into_iter()
            .chain(pending)
            .filter(|job| seen.insert(job.id.clone()))
            .collect();

        let mut report = SweepReport::default();
        if batch.is_empty() {
            return Ok(report);
        }

        let outcomes: Vec<JobOutcome> = futures::stream::iter(batch)
            .map(|job| async move {
                let (job_id, tenant_id) = (job.id.clone(), job.tenant_id.clone());
                self.execute(job).await.unwrap_or_else(|e| {
                    error!(job_id = %job_id, tenant_id = %tenant_id, error = %e, "job execution aborted");
                    JobOutcome::Skipped
                })
            })
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }
        info!(
            attempted = report.attempted,
            completed = report.completed,
            retried = report.retried,
            failed = report.failed,
            skipped = report.skipped,
            "sweep finished"
        );
        Ok(report)
    }

    /// Run one job to a new resting state.
    ///
    /// Errors are storage failures while recording the outcome; publish
    /// failures are folded into the job's own state.
    pub async fn execute(&self, job: PublicationJob) -> Result<JobOutcome, VidcastError> {
        let job = match self.jobs.start_job(&job.tenant_id, &job.id).await {
            Ok(job) => job,
            Err(e) if e.is_superseded() || matches!(e, VidcastError::NotFound { .. }) => {
                debug!(job_id = %job.id, error = %e, "job no longer runnable, skipping");
                return Ok(JobOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };
        debug!(job_id = %job.id, tenant_id = %job.tenant_id, platform = %job.platform, "job started");

        let (workspace, mut video) = match self.load_inputs(&job).await {
            Ok(inputs) => inputs,
            Err(e) => return self.record_failure(&job, &e).await,
        };

        let platform = job.platform;
        let before = video.external_id(platform).map(str::to_string);
        let attempt = tokio::time::timeout(
            self.settings.publish_timeout,
            self.publisher
                .publish_video_staged(&workspace, &mut video, platform.as_str()),
        )
        .await;

        // The upload may have landed even if a later step failed or timed out.
        let uploaded = video.external_id(platform).map(str::to_string);
        if let Some(media_id) = uploaded.as_deref().filter(|id| before.as_deref() != Some(*id)) {
            self.catalog
                .set_video_external_id(&job.tenant_id, &video.id, platform, media_id)
                .await?;
        }

        match attempt {
            Ok(Ok(stats)) => {
                self.store_stats(&job, &stats).await;
                self.record_success(&job, uploaded).await
            }
            Ok(Err(failure)) if failure.stage == PublishStage::FetchStats => {
                if failure.error.is_unsupported() {
                    debug!(job_id = %job.id, %platform, "platform has no stats endpoint");
                } else {
                    warn!(job_id = %job.id, %platform, error = %failure.error, "published but stats fetch failed");
                }
                self.record_success(&job, uploaded).await
            }
            Ok(Err(failure)) => {
                warn!(
                    job_id = %job.id,
                    %platform,
                    stage = %failure.stage,
                    progress = %failure.progress(),
                    error = %failure.error,
                    "publish attempt failed"
                );
                self.record_failure(&job, &failure.error).await
            }
            Err(_) => {
                let err = VidcastError::Timeout {
                    duration: self.settings.publish_timeout,
                };
                warn!(job_id = %job.id, %platform, error = %err, "publish attempt timed out");
                self.record_failure(&job, &err).await
            }
        }
    }

    async fn load_inputs(&self, job: &PublicationJob) -> Result<(Workspace, Video), VidcastError> {
        let workspace = self.resolve_workspace(job).await?;
        let video = self
            .catalog
            .get_video(&job.tenant_id, &job.video_id)
            .await?
            .ok_or_else(|| VidcastError::NotFound {
                entity: "video",
                id: job.video_id.clone(),
            })?;
        Ok((workspace, video))
    }

    /// The workspace named in the job config, else the user's first
    /// workspace connected to the job's platform.
    async fn resolve_workspace(&self, job: &PublicationJob) -> Result<Workspace, VidcastError> {
        if let Some(id) = job.workspace_id() {
            return self
                .catalog
                .get_workspace(&job.tenant_id, id)
                .await?
                .ok_or_else(|| VidcastError::NotFound {
                    entity: "workspace",
                    id: id.to_string(),
                });
        }
        self.catalog
            .list_workspaces(&job.tenant_id, &job.user_id)
            .await?
            .into_iter()
            .find(|ws| ws.is_connected(job.platform))
            .ok_or_else(|| VidcastError::Credentials {
                platform: job.platform,
                message: format!("user {} has no workspace connected to {}", job.user_id, job.platform),
            })
    }

    async fn store_stats(&self, job: &PublicationJob, stats: &VideoStats) {
        if let Err(e) = self.stats.record_stats(stats).await {
            warn!(job_id = %job.id, platform = %job.platform, error = %e, "failed to record stats");
        }
    }

    async fn record_success(
        &self,
        job: &PublicationJob,
        external_id: Option<String>,
    ) -> Result<JobOutcome, VidcastError> {
        let external_id = external_id.ok_or_else(|| {
            VidcastError::Internal(format!("job {} published without a media id", job.id))
        })?;
        let url = external_url(job.platform, &external_id);
        match self
            .jobs
            .complete_job(&job.tenant_id, &job.id, &external_id, url)
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_superseded() => return Ok(dropped(job, &e)),
            Err(e) => return Err(e),
        }
        recording::record_completed(job.platform);
        info!(job_id = %job.id, platform = %job.platform, %external_id, "job completed");
        Ok(JobOutcome::Completed)
    }

    async fn record_failure(&self, job: &PublicationJob, err: &VidcastError) -> Result<JobOutcome, VidcastError> {
        let failed = match self
            .jobs
            .fail_job(&job.tenant_id, &job.id, &err.to_string())
            .await
        {
            Ok(failed) => failed,
            Err(e) if e.is_superseded() => return Ok(dropped(job, &e)),
            Err(e) => return Err(e),
        };
        if failed.status == JobStatus::Failed {
            recording::record_failed(job.platform);
            Ok(JobOutcome::Failed)
        } else {
            recording::record_retried(job.platform);
            debug!(
                job_id = %job.id,
                retry_count = failed.retry_count,
                max_retries = failed.max_retries,
                "job requeued"
            );
            Ok(JobOutcome::Retried)
        }
    }
}

/// The job left `processing` while it ran, typically a cancel; its result is discarded.
fn dropped(job: &PublicationJob, err: &VidcastError) -> JobOutcome {
    info!(job_id = %job.id, platform = %job.platform, error = %err, "job changed while running, result dropped");
    JobOutcome::Skipped
}

/// Public watch URL, where the media id is enough to build one.
fn external_url(platform: Platform, external_id: &str) -> Option<String> {
    match platform {
        Platform::Youtube => Some(format!("https://www.youtube.com/watch?v={external_id}")),
        Platform::Facebook => Some(format!("https://www.facebook.com/watch/?v={external_id}")),
        _ => None,
    }
}
