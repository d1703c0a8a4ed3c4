// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Video stats upserts and snapshot history.

use rusqlite::{OptionalExtension, Row, params};

use vidcast_core::types::new_id;
use vidcast_core::{Platform, VidcastError, VideoStats, VideoStatsSnapshot};

use crate::database::{Database, map_tr_err, parse_text, parse_ts, ts};

const COLUMNS: &str = "id, tenant_id, video_id, platform, external_id, views, likes, dislikes,
     comments, shares, subscribers, watch_time_secs, avg_watch_time_secs, click_through_rate,
     engagement_rate, revenue, impressions, last_sync_at";

fn row_to_stats(row: &Row<'_>) -> rusqlite::Result<VideoStats> {
    let platform: String = row.get(3)?;
    let last_sync_at: String = row.get(17)?;
    Ok(VideoStats {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        video_id: row.get(2)?,
        platform: parse_text::<Platform>(3, &platform)?,
        external_id: row.get(4)?,
        views: row.get(5)?,
        likes: row.get(6)?,
        dislikes: row.get(7)?,
        comments: row.get(8)?,
        shares: row.get(9)?,
        subscribers: row.get(10)?,
        watch_time_secs: row.get(11)?,
        avg_watch_time_secs: row.get(12)?,
        click_through_rate: row.get(13)?,
        engagement_rate: row.get(14)?,
        revenue: row.get(15)?,
        impressions: row.get(16)?,
        last_sync_at: parse_ts(17, &last_sync_at)?,
    })
}

fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<VideoStatsSnapshot> {
    let created_at: String = row.get(7)?;
    Ok(VideoStatsSnapshot {
        id: row.get(0)?,
        stats_id: row.get(1)?,
        views: row.get(2)?,
        likes: row.get(3)?,
        comments: row.get(4)?,
        shares: row.get(5)?,
        revenue: row.get(6)?,
        created_at: parse_ts(7, &created_at)?,
    })
}

/// Upsert stats for (tenant, video, platform).
///
/// Runs in one transaction: the existing row, if any, is copied into
/// `video_stats_snapshots` and then overwritten in place, keeping its id.
pub async fn record_stats(db: &Database, stats: &VideoStats) -> Result<VideoStats, VidcastError> {
    let mut s = stats.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<VideoStats> = tx
                .query_row(
                    &format!(
                        "SELECT {COLUMNS} FROM video_stats
                         WHERE tenant_id = ?1 AND video_id = ?2 AND platform = ?3"
                    ),
                    params![s.tenant_id, s.video_id, s.platform.as_str()],
                    row_to_stats,
                )
                .optional()?;

            match existing {
                Some(prev) => {
                    tx.execute(
                        "INSERT INTO video_stats_snapshots
                            (id, stats_id, views, likes, comments, shares, revenue, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            new_id(),
                            prev.id,
                            prev.views,
                            prev.likes,
                            prev.comments,
                            prev.shares,
                            prev.revenue,
                            ts(&s.last_sync_at),
                        ],
                    )?;
                    s.id = prev.id;
                    tx.execute(
                        "UPDATE video_stats SET
                            external_id = ?2, views = ?3, likes = ?4, dislikes = ?5,
                            comments = ?6, shares = ?7, subscribers = ?8, watch_time_secs = ?9,
                            avg_watch_time_secs = ?10, click_through_rate = ?11,
                            engagement_rate = ?12, revenue = ?13, impressions = ?14,
                            last_sync_at = ?15
                         WHERE id = ?1",
                        params![
                            s.id,
                            s.external_id,
                            s.views,
                            s.likes,
                            s.dislikes,
                            s.comments,
                            s.shares,
                            s.subscribers,
                            s.watch_time_secs,
                            s.avg_watch_time_secs,
                            s.click_through_rate,
                            s.engagement_rate,
                            s.revenue,
                            s.impressions,
                            ts(&s.last_sync_at),
                        ],
                    )?;
                }
                None => {
                    tx.execute(
                        &format!(
                            "INSERT INTO video_stats ({COLUMNS})
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
                        ),
                        params![
                            s.id,
                            s.tenant_id,
                            s.video_id,
                            s.platform.as_str(),
                            s.external_id,
                            s.views,
                            s.likes,
                            s.dislikes,
                            s.comments,
                            s.shares,
                            s.subscribers,
                            s.watch_time_secs,
                            s.avg_watch_time_secs,
                            s.click_through_rate,
                            s.engagement_rate,
                            s.revenue,
                            s.impressions,
                            ts(&s.last_sync_at),
                        ],
                    )?;
                }
            }

            tx.commit()?;
            Ok(s)
        })
        .await
        .map_err(map_tr_err)
}

/// Stats for one platform of a video.
pub async fn get_stats(
    db: &Database,
    tenant_id: &str,
    video_id: &str,
    platform: Platform,
) -> Result<Option<VideoStats>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let video_id = video_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM video_stats
                     WHERE tenant_id = ?1 AND video_id = ?2 AND platform = ?3"
                ),
                params![tenant_id, video_id, platform.as_str()],
                row_to_stats,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Every platform's stats for a video, ordered by platform name.
pub async fn list_stats_for_video(
    db: &Database,
    tenant_id: &str,
    video_id: &str,
) -> Result<Vec<VideoStats>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let video_id = video_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM video_stats
                 WHERE tenant_id = ?1 AND video_id = ?2
                 ORDER BY platform ASC"
            ))?;
            let rows = stmt.query_map(params![tenant_id, video_id], row_to_stats)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Snapshot history for one stats row, newest first.
pub async fn stats_snapshots(
    db: &Database,
    stats_id: &str,
    limit: u32,
) -> Result<Vec<VideoStatsSnapshot>, VidcastError> {
    let stats_id = stats_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, stats_id, views, likes, comments, shares, revenue, created_at
                 FROM video_stats_snapshots
                 WHERE stats_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![stats_id, limit], row_to_snapshot)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
