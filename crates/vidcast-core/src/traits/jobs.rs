// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contract for publication jobs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::VidcastError;
use crate::job::PublicationJob;
use crate::types::{JobStatus, Platform};

/// Job storage. Every operation is tenant-scoped except the two
/// cross-tenant sweeps used by background schedulers.
///
/// Soft-deleted jobs are invisible to every read. Pagination bounds are
/// taken as given.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create_job(&self, job: &PublicationJob) -> Result<(), VidcastError>;

    async fn get_job(&self, tenant_id: &str, id: &str) -> Result<Option<PublicationJob>, VidcastError>;

    async fn list_jobs_by_video(
        &self,
        tenant_id: &str,
        video_id: &str,
    ) -> Result<Vec<PublicationJob>, VidcastError>;

    async fn list_jobs_by_status(
        &self,
        tenant_id: &str,
        status: JobStatus,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError>;

    async fn list_jobs_by_platform(
        &self,
        tenant_id: &str,
        platform: Platform,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError>;

    /// Cross-tenant: `scheduled` jobs whose start time is at or before `before`.
    ///
    /// A pure read; jobs stay `scheduled` until started.
    async fn list_scheduled_before(
        &self,
        before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError>;

    /// Cross-tenant: `pending` jobs, oldest first.
    async fn list_pending(&self, limit: u32) -> Result<Vec<PublicationJob>, VidcastError>;

    /// Replaces every mutable column of the job.
    async fn update_job(&self, job: &PublicationJob) -> Result<(), VidcastError>;

    /// Compare-and-set replace: writes `job` only while the stored status is
    /// still `expected`. Returns `false` when another writer changed the job
    /// first or no live job matched.
    async fn update_job_if_status(
        &self,
        job: &PublicationJob,
        expected: JobStatus,
    ) -> Result<bool, VidcastError>;

    /// Targeted status change. Returns `false` if no live job matched.
    async fn update_job_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: JobStatus,
    ) -> Result<bool, VidcastError>;

    /// Atomically increments `retry_count`, capped at `max_retries`, and
    /// returns the new value. `None` for missing or terminal jobs.
    async fn increment_retry_count(&self, tenant_id: &str, id: &str) -> Result<Option<u32>, VidcastError>;

    /// Soft delete. Returns `false` if no live job matched.
    async fn delete_job(&self, tenant_id: &str, id: &str) -> Result<bool, VidcastError>;

    async fn list_jobs(
        &self,
        tenant_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError>;
}
