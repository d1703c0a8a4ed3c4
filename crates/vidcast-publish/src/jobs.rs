// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted publication job lifecycle.
//!
//! [`JobService`] loads a job, applies one of the pure transitions on
//! [`PublicationJob`], and writes the result back through a [`JobStore`].
//! The write is conditional on the status that was read, so of two callers
//! racing on the same job exactly one wins; the other gets
//! [`VidcastError::Conflict`]. That makes [`JobService::start_job`] a claim.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vidcast_core::{
    DEFAULT_MAX_RETRIES, JobStatus, JobStore, NewPublicationJob, Platform, PublicationJob,
    VidcastError,
};

/// Partial update for a job that has not started yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl JobUpdate {
    fn apply(self, job: &mut PublicationJob, now: DateTime<Utc>) -> Result<(), VidcastError> {
        if !matches!(job.status, JobStatus::Pending | JobStatus::Scheduled) {
            return Err(VidcastError::InvalidTransition {
                job_id: job.id.clone(),
                from: job.status,
                action: "update",
            });
        }
        if let Some(max) = self.max_retries {
            if max == 0 || max < job.retry_count {
                return Err(VidcastError::Validation(format!(
                    "max_retries must be at least 1 and not below retry_count ({})",
                    job.retry_count
                )));
            }
            job.max_retries = max;
        }
        if let Some(config) = self.config {
            job.config = config;
        }
        if let Some(at) = self.scheduled_at {
            job.scheduled_at = Some(at);
            job.status = if at > now {
                JobStatus::Scheduled
            } else {
                JobStatus::Pending
            };
        }
        job.updated_at = now;
        Ok(())
    }
}

/// Job CRUD and state transitions over a [`JobStore`].
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn JobStore>,
    default_max_retries: u32,
}

impl std::fmt::Debug for JobService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobService")
            .field("default_max_retries", &self.default_max_retries)
            .finish_non_exhaustive()
    }
}

impl JobService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            default_max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Retry bound for requests that do not set one. Zero keeps the built-in default.
    pub fn with_default_max_retries(mut self, max_retries: u32) -> Self {
        if max_retries > 0 {
            self.default_max_retries = max_retries;
        }
        self
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub async fn create_job(
        &self,
        tenant_id: &str,
        user_id: &str,
        mut request: NewPublicationJob,
    ) -> Result<PublicationJob, VidcastError> {
        if request.video_id.trim().is_empty() {
            return Err(VidcastError::Validation("video_id must not be empty".into()));
        }
        if request.max_retries.is_none_or(|n| n == 0) {
            request.max_retries = Some(self.default_max_retries);
        }
        let job = PublicationJob::new(tenant_id, user_id, request, Utc::now());
        self.store.create_job(&job).await?;
        info!(
            job_id = %job.id,
            tenant_id,
            video_id = %job.video_id,
            platform = %job.platform,
            status = %job.status,
            "publication job created"
        );
        Ok(job)
    }

    pub async fn get_job(&self, tenant_id: &str, id: &str) -> Result<PublicationJob, VidcastError> {
        self.store
            .get_job(tenant_id, id)
            .await?
            .ok_or_else(|| VidcastError::NotFound {
                entity: "publication job",
                id: id.to_string(),
            })
    }

    pub async fn jobs_for_video(
        &self,
        tenant_id: &str,
        video_id: &str,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        self.store.list_jobs_by_video(tenant_id, video_id).await
    }

    pub async fn update_job(
        &self,
        tenant_id: &str,
        id: &str,
        update: JobUpdate,
    ) -> Result<PublicationJob, VidcastError> {
        self.transition(tenant_id, id, |job, now| update.apply(job, now))
            .await
    }

    /// Soft delete. Fails with `NotFound` when no live job matched.
    pub async fn delete_job(&self, tenant_id: &str, id: &str) -> Result<(), VidcastError> {
        if self.store.delete_job(tenant_id, id).await? {
            debug!(job_id = id, tenant_id, "publication job deleted");
            Ok(())
        } else {
            Err(VidcastError::NotFound {
                entity: "publication job",
                id: id.to_string(),
            })
        }
    }

    pub async fn list_jobs(
        &self,
        tenant_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        self.store.list_jobs(tenant_id, limit, offset).await
    }

    pub async fn jobs_by_status(
        &self,
        tenant_id: &str,
        status: JobStatus,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        self.store
            .list_jobs_by_status(tenant_id, status, limit, offset)
            .await
    }

    pub async fn jobs_by_platform(
        &self,
        tenant_id: &str,
        platform: Platform,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        self.store
            .list_jobs_by_platform(tenant_id, platform, limit, offset)
            .await
    }

    /// Scheduled jobs whose start time has passed, across all tenants.
    pub async fn due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        let jobs = self.store.list_scheduled_before(now, limit).await?;
        Ok(jobs.into_iter().filter(|j| j.is_due(now)).collect())
    }

    /// Pending jobs across all tenants, oldest first.
    pub async fn pending_jobs(&self, limit: u32) -> Result<Vec<PublicationJob>, VidcastError> {
        self.store.list_pending(limit).await
    }

    /// Claims the job for execution. Fails with `Conflict` when another
    /// caller started or changed it first.
    pub async fn start_job(&self, tenant_id: &str, id: &str) -> Result<PublicationJob, VidcastError> {
        self.transition(tenant_id, id, |job, now| job.start(now)).await
    }

    pub async fn complete_job(
        &self,
        tenant_id: &str,
        id: &str,
        external_id: &str,
        external_url: Option<String>,
    ) -> Result<PublicationJob, VidcastError> {
        self.transition(tenant_id, id, |job, now| {
            job.complete(external_id, external_url, now)
        })
        .await
    }

    /// Records a failed attempt; the job returns to `pending` or ends `failed`.
    pub async fn fail_job(
        &self,
        tenant_id: &str,
        id: &str,
        message: &str,
    ) -> Result<PublicationJob, VidcastError> {
        let job = self
            .transition(tenant_id, id, |job, now| job.fail(message, now))
            .await?;
        if job.status == JobStatus::Failed {
            warn!(
                job_id = id,
                tenant_id,
                retry_count = job.retry_count,
                error = message,
                "publication job failed permanently"
            );
        }
        Ok(job)
    }

    pub async fn cancel_job(&self, tenant_id: &str, id: &str) -> Result<PublicationJob, VidcastError> {
        self.transition(tenant_id, id, |job, now| job.cancel(now)).await
    }

    async fn transition<F>(&self, tenant_id: &str, id: &str, apply: F) -> Result<PublicationJob, VidcastError>
    where
        F: FnOnce(&mut PublicationJob, DateTime<Utc>) -> Result<(), VidcastError>,
    {
        let mut job = self.get_job(tenant_id, id).await?;
        let from = job.status;
        apply(&mut job, Utc::now())?;
        if !self.store.update_job_if_status(&job, from).await? {
            return Err(VidcastError::Conflict {
                job_id: id.to_string(),
                expected: from,
            });
        }
        debug!(job_id = id, tenant_id, %from, to = %job.status, "job transition");
        Ok(job)
    }
}
