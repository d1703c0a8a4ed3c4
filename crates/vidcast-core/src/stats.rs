// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-platform analytics, their history snapshots, and cross-platform totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Platform, new_id};
use crate::video::Video;

/// Analytics for one video on one platform.
///
/// One row exists per (tenant, video, platform); updates overwrite it after
/// a [`VideoStatsSnapshot`] of the previous values is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStats {
    pub id: String,
    pub tenant_id: String,
    pub video_id: String,
    pub platform: Platform,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub subscribers: i64,
    /// Total watch time in seconds.
    #[serde(default)]
    pub watch_time_secs: i64,
    #[serde(default)]
    pub avg_watch_time_secs: f64,
    #[serde(default)]
    pub click_through_rate: f64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub impressions: i64,
    pub last_sync_at: DateTime<Utc>,
}

impl VideoStats {
    /// Zeroed stats for `video` on `platform`, stamped with the current time.
    pub fn for_video(video: &Video, platform: Platform) -> Self {
        Self {
            id: new_id(),
            tenant_id: video.tenant_id.clone(),
            video_id: video.id.clone(),
            platform,
            external_id: video.external_id(platform).map(str::to_string),
            views: 0,
            likes: 0,
            dislikes: 0,
            comments: 0,
            shares: 0,
            subscribers: 0,
            watch_time_secs: 0,
            avg_watch_time_secs: 0.0,
            click_through_rate: 0.0,
            engagement_rate: 0.0,
            revenue: 0.0,
            impressions: 0,
            last_sync_at: Utc::now(),
        }
    }

    /// Recomputes `engagement_rate` as interactions per view, in percent.
    pub fn compute_engagement(&mut self) {
        self.engagement_rate = if self.views > 0 {
            let interactions = (self.likes + self.comments + self.shares) as f64;
            interactions / self.views as f64 * 100.0
        } else {
            0.0
        };
    }
}

/// Immutable copy of a [`VideoStats`] row taken before it was overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStatsSnapshot {
    pub id: String,
    pub stats_id: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub revenue: f64,
    pub created_at: DateTime<Utc>,
}

/// Totals for one video across every platform it has stats on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsAggregation {
    pub video_id: String,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_revenue: f64,
    pub platform_count: usize,
    /// Platform with the most views, if any stats exist.
    pub top_platform: Option<Platform>,
}

impl StatsAggregation {
    /// Folds per-platform rows into totals.
    pub fn from_rows(video_id: impl Into<String>, rows: &[VideoStats]) -> Self {
        let top_platform = rows
            .iter()
            .max_by_key(|s| s.views)
            .map(|s| s.platform);
        Self {
            video_id: video_id.into(),
            total_views: rows.iter().map(|s| s.views).sum(),
            total_likes: rows.iter().map(|s| s.likes).sum(),
            total_comments: rows.iter().map(|s| s.comments).sum(),
            total_shares: rows.iter().map(|s| s.shares).sum(),
            total_revenue: rows.iter().map(|s| s.revenue).sum(),
            platform_count: rows.len(),
            top_platform,
        }
    }
}
