// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication job CRUD and the cross-tenant scheduler sweeps.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use vidcast_core::{JobStatus, Platform, PublicationJob, VidcastError};

use crate::database::{
    Database, map_tr_err, opt_ts, parse_json, parse_opt_ts, parse_text, parse_ts, ts,
};

const COLUMNS: &str = "id, tenant_id, video_id, user_id, platform, status, config, external_id,
     external_url, error_message, retry_count, max_retries, scheduled_at, started_at,
     completed_at, created_at, updated_at, deleted_at";

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<PublicationJob> {
    let platform: String = row.get(4)?;
    let status: String = row.get(5)?;
    let config: String = row.get(6)?;
    let created_at: String = row.get(15)?;
    let updated_at: String = row.get(16)?;
    Ok(PublicationJob {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        video_id: row.get(2)?,
        user_id: row.get(3)?,
        platform: parse_text::<Platform>(4, &platform)?,
        status: parse_text::<JobStatus>(5, &status)?,
        config: parse_json(6, &config)?,
        external_id: row.get(7)?,
        external_url: row.get(8)?,
        error_message: row.get(9)?,
        retry_count: row.get(10)?,
        max_retries: row.get(11)?,
        scheduled_at: parse_opt_ts(12, row.get(12)?)?,
        started_at: parse_opt_ts(13, row.get(13)?)?,
        completed_at: parse_opt_ts(14, row.get(14)?)?,
        created_at: parse_ts(15, &created_at)?,
        updated_at: parse_ts(16, &updated_at)?,
        deleted_at: parse_opt_ts(17, row.get(17)?)?,
    })
}

/// Runs a SELECT returning jobs with the given positional parameters.
async fn query_jobs(
    db: &Database,
    sql: String,
    params: Vec<rusqlite::types::Value>,
) -> Result<Vec<PublicationJob>, VidcastError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(params), row_to_job)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new job.
pub async fn create_job(db: &Database, job: &PublicationJob) -> Result<(), VidcastError> {
    let job = job.clone();
    let config = serde_json::to_string(&job.config)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO publication_jobs ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
                ),
                params![
                    job.id,
                    job.tenant_id,
                    job.video_id,
                    job.user_id,
                    job.platform.as_str(),
                    job.status.to_string(),
                    config,
                    job.external_id,
                    job.external_url,
                    job.error_message,
                    job.retry_count,
                    job.max_retries,
                    opt_ts(job.scheduled_at.as_ref()),
                    opt_ts(job.started_at.as_ref()),
                    opt_ts(job.completed_at.as_ref()),
                    ts(&job.created_at),
                    ts(&job.updated_at),
                    opt_ts(job.deleted_at.as_ref()),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a live job by tenant and id.
pub async fn get_job(
    db: &Database,
    tenant_id: &str,
    id: &str,
) -> Result<Option<PublicationJob>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM publication_jobs
                     WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL"
                ),
                params![tenant_id, id],
                row_to_job,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All live jobs for a video, oldest first.
pub async fn list_jobs_by_video(
    db: &Database,
    tenant_id: &str,
    video_id: &str,
) -> Result<Vec<PublicationJob>, VidcastError> {
    query_jobs(
        db,
        format!(
            "SELECT {COLUMNS} FROM publication_jobs
             WHERE tenant_id = ?1 AND video_id = ?2 AND deleted_at IS NULL
             ORDER BY created_at ASC"
        ),
        vec![tenant_id.to_string().into(), video_id.to_string().into()],
    )
    .await
}

/// Live jobs in a given status, newest first.
pub async fn list_jobs_by_status(
    db: &Database,
    tenant_id: &str,
    status: JobStatus,
    limit: u32,
    offset: u32,
) -> Result<Vec<PublicationJob>, VidcastError> {
    query_jobs(
        db,
        format!(
            "SELECT {COLUMNS} FROM publication_jobs
             WHERE tenant_id = ?1 AND status = ?2 AND deleted_at IS NULL
             ORDER BY created_at DESC LIMIT ?3 OFFSET ?4"
        ),
        vec![
            tenant_id.to_string().into(),
            status.to_string().into(),
            i64::from(limit).into(),
            i64::from(offset).into(),
        ],
    )
    .await
}

/// Live jobs targeting a platform, newest first.
pub async fn list_jobs_by_platform(
    db: &Database,
    tenant_id: &str,
    platform: Platform,
    limit: u32,
    offset: u32,
) -> Result<Vec<PublicationJob>, VidcastError> {
    query_jobs(
        db,
        format!(
            "SELECT {COLUMNS} FROM publication_jobs
             WHERE tenant_id = ?1 AND platform = ?2 AND deleted_at IS NULL
             ORDER BY created_at DESC LIMIT ?3 OFFSET ?4"
        ),
        vec![
            tenant_id.to_string().into(),
            platform.as_str().to_string().into(),
            i64::from(limit).into(),
            i64::from(offset).into(),
        ],
    )
    .await
}

/// Every live job for a tenant, newest first.
pub async fn list_jobs(
    db: &Database,
    tenant_id: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<PublicationJob>, VidcastError> {
    query_jobs(
        db,
        format!(
            "SELECT {COLUMNS} FROM publication_jobs
             WHERE tenant_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
        ),
        vec![
            tenant_id.to_string().into(),
            i64::from(limit).into(),
            i64::from(offset).into(),
        ],
    )
    .await
}

/// Cross-tenant: scheduled jobs due at or before `before`, earliest first.
pub async fn list_scheduled_before(
    db: &Database,
    before: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<PublicationJob>, VidcastError> {
    query_jobs(
        db,
        format!(
            "SELECT {COLUMNS} FROM publication_jobs
             WHERE status = 'scheduled' AND scheduled_at IS NOT NULL
               AND scheduled_at <= ?1 AND deleted_at IS NULL
             ORDER BY scheduled_at ASC LIMIT ?2"
        ),
        vec![ts(&before).into(), i64::from(limit).into()],
    )
    .await
}

/// Cross-tenant: pending jobs, oldest first.
pub async fn list_pending(db: &Database, limit: u32) -> Result<Vec<PublicationJob>, VidcastError> {
    query_jobs(
        db,
        format!(
            "SELECT {COLUMNS} FROM publication_jobs
             WHERE status = 'pending' AND deleted_at IS NULL
             ORDER BY updated_at ASC LIMIT ?1"
        ),
        vec![i64::from(limit).into()],
    )
    .await
}

/// Writes every mutable column of a live job, optionally only while its
/// stored status still equals `expected`. Returns the number of rows changed.
async fn write_job(
    db: &Database,
    job: &PublicationJob,
    expected: Option<JobStatus>,
) -> Result<usize, VidcastError> {
    let job = job.clone();
    let config = serde_json::to_string(&job.config)?;
    let expected = expected.map(|status| status.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE publication_jobs SET
                    status = ?3, config = ?4, external_id = ?5, external_url = ?6,
                    error_message = ?7, retry_count = ?8, max_retries = ?9,
                    scheduled_at = ?10, started_at = ?11, completed_at = ?12,
                    updated_at = ?13
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL
                   AND (?14 IS NULL OR status = ?14)",
                params![
                    job.tenant_id,
                    job.id,
                    job.status.to_string(),
                    config,
                    job.external_id,
                    job.external_url,
                    job.error_message,
                    job.retry_count,
                    job.max_retries,
                    opt_ts(job.scheduled_at.as_ref()),
                    opt_ts(job.started_at.as_ref()),
                    opt_ts(job.completed_at.as_ref()),
                    ts(&job.updated_at),
                    expected,
                ],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Replace every mutable column of a live job.
pub async fn update_job(db: &Database, job: &PublicationJob) -> Result<(), VidcastError> {
    if write_job(db, job, None).await? == 0 {
        return Err(VidcastError::NotFound {
            entity: "publication job",
            id: job.id.clone(),
        });
    }
    Ok(())
}

/// Compare-and-set replace: writes only while the stored status is still
/// `expected`. Returns `false` when the job moved on or no live job matched.
pub async fn update_job_if_status(
    db: &Database,
    job: &PublicationJob,
    expected: JobStatus,
) -> Result<bool, VidcastError> {
    Ok(write_job(db, job, Some(expected)).await? > 0)
}

/// Targeted status change. Returns `false` if no live job matched.
pub async fn update_job_status(
    db: &Database,
    tenant_id: &str,
    id: &str,
    status: JobStatus,
) -> Result<bool, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    let now = ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE publication_jobs SET status = ?3, updated_at = ?4
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL",
                params![tenant_id, id, status.to_string(), now],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Increment `retry_count` in SQL and return the new value.
///
/// The count never passes `max_retries`, and jobs in a terminal state are
/// left alone (`None`, as for a missing job).
pub async fn increment_retry_count(
    db: &Database,
    tenant_id: &str,
    id: &str,
) -> Result<Option<u32>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    let now = ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "UPDATE publication_jobs
                 SET retry_count = MIN(retry_count + 1, max_retries), updated_at = ?3
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL
                   AND status NOT IN ('completed', 'failed', 'cancelled')
                 RETURNING retry_count",
                params![tenant_id, id, now],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Soft delete. Returns `false` if no live job matched.
pub async fn delete_job(db: &Database, tenant_id: &str, id: &str) -> Result<bool, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    let now = ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE publication_jobs SET deleted_at = ?3, updated_at = ?3
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL",
                params![tenant_id, id, now],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
