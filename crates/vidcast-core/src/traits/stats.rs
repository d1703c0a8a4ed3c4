// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contract for video analytics.

use async_trait::async_trait;

use crate::error::VidcastError;
use crate::stats::{StatsAggregation, VideoStats, VideoStatsSnapshot};
use crate::types::Platform;

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Upserts by (tenant, video, platform).
    ///
    /// When a row already exists its current values are appended as a
    /// snapshot before being overwritten. Returns the stored row, which keeps
    /// the existing id on update.
    async fn record_stats(&self, stats: &VideoStats) -> Result<VideoStats, VidcastError>;

    async fn get_stats(
        &self,
        tenant_id: &str,
        video_id: &str,
        platform: Platform,
    ) -> Result<Option<VideoStats>, VidcastError>;

    async fn list_stats_for_video(&self, tenant_id: &str, video_id: &str) -> Result<Vec<VideoStats>, VidcastError>;

    /// History for one stats row, newest first.
    async fn stats_snapshots(&self, stats_id: &str, limit: u32) -> Result<Vec<VideoStatsSnapshot>, VidcastError>;

    async fn aggregate_stats(&self, tenant_id: &str, video_id: &str) -> Result<StatsAggregation, VidcastError>;
}
