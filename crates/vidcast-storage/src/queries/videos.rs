// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Video CRUD operations.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use vidcast_core::{Platform, VidcastError, Video, VideoStatus};

use crate::database::{
    Database, map_tr_err, opt_ts, parse_json, parse_opt_ts, parse_text, parse_ts, ts,
};

const COLUMNS: &str = "id, tenant_id, user_id, title, description, tags, file_path, file_url,
     s3_bucket, s3_key, format, status, external_ids, created_at, updated_at, deleted_at";

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<Video> {
    let tags: String = row.get(5)?;
    let status: String = row.get(11)?;
    let external_ids: String = row.get(12)?;
    let created_at: String = row.get(13)?;
    let updated_at: String = row.get(14)?;
    Ok(Video {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        tags: parse_json(5, &tags)?,
        file_path: row.get(6)?,
        file_url: row.get(7)?,
        s3_bucket: row.get(8)?,
        s3_key: row.get(9)?,
        format: row.get(10)?,
        status: parse_text::<VideoStatus>(11, &status)?,
        external_ids: parse_json(12, &external_ids)?,
        created_at: parse_ts(13, &created_at)?,
        updated_at: parse_ts(14, &updated_at)?,
        deleted_at: parse_opt_ts(15, row.get(15)?)?,
    })
}

/// Insert a new video.
pub async fn create_video(db: &Database, video: &Video) -> Result<(), VidcastError> {
    let v = video.clone();
    let tags = serde_json::to_string(&v.tags)?;
    let external_ids = serde_json::to_string(&v.external_ids)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO videos ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
                ),
                params![
                    v.id,
                    v.tenant_id,
                    v.user_id,
                    v.title,
                    v.description,
                    tags,
                    v.file_path,
                    v.file_url,
                    v.s3_bucket,
                    v.s3_key,
                    v.format,
                    v.status.to_string(),
                    external_ids,
                    ts(&v.created_at),
                    ts(&v.updated_at),
                    opt_ts(v.deleted_at.as_ref()),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a live video by tenant and id.
pub async fn get_video(db: &Database, tenant_id: &str, id: &str) -> Result<Option<Video>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM videos
                     WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL"
                ),
                params![tenant_id, id],
                row_to_video,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite every mutable column of a live video.
pub async fn update_video(db: &Database, video: &Video) -> Result<(), VidcastError> {
    let v = video.clone();
    let id = v.id.clone();
    let tags = serde_json::to_string(&v.tags)?;
    let external_ids = serde_json::to_string(&v.external_ids)?;
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE videos SET
                    title = ?3, description = ?4, tags = ?5, file_path = ?6, file_url = ?7,
                    s3_bucket = ?8, s3_key = ?9, format = ?10, status = ?11,
                    external_ids = ?12, updated_at = ?13
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL",
                params![
                    v.tenant_id,
                    v.id,
                    v.title,
                    v.description,
                    tags,
                    v.file_path,
                    v.file_url,
                    v.s3_bucket,
                    v.s3_key,
                    v.format,
                    v.status.to_string(),
                    external_ids,
                    ts(&v.updated_at),
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(VidcastError::NotFound { entity: "video", id });
    }
    Ok(())
}

/// Set one platform's media id with `json_set`, leaving other entries as they are.
pub async fn set_video_external_id(
    db: &Database,
    tenant_id: &str,
    video_id: &str,
    platform: Platform,
    external_id: &str,
) -> Result<(), VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = video_id.to_string();
    let path = format!("$.{}", platform.as_str());
    let external_id = external_id.to_string();
    let now = ts(&Utc::now());
    let lookup_id = id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE videos SET external_ids = json_set(external_ids, ?3, ?4), updated_at = ?5
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL",
                params![tenant_id, lookup_id, path, external_id, now],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(VidcastError::NotFound { entity: "video", id });
    }
    Ok(())
}

/// Soft delete. Returns `false` if no live video matched.
pub async fn delete_video(db: &Database, tenant_id: &str, id: &str) -> Result<bool, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    let now = ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE videos SET deleted_at = ?3, updated_at = ?3
                 WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL",
                params![tenant_id, id, now],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
