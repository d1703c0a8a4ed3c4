// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use vidcast_config::model::StorageConfig;
use vidcast_core::{
    CatalogStore, JobStatus, JobStore, Platform, PublicationJob, StatsAggregation, StatsStore,
    VidcastError, Video, VideoStats, VideoStatsSnapshot, Workspace,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates every operation to the typed
/// query modules. One value implements [`JobStore`], [`CatalogStore`] and
/// [`StatsStore`]; clones share the same connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the configured database, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, VidcastError> {
        let db = Database::open_with_config(config).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and close the underlying connection.
    pub async fn close(self) -> Result<(), VidcastError> {
        self.db.close().await
    }
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn create_job(&self, job: &PublicationJob) -> Result<(), VidcastError> {
        queries::jobs::create_job(&self.db, job).await
    }

    async fn get_job(&self, tenant_id: &str, id: &str) -> Result<Option<PublicationJob>, VidcastError> {
        queries::jobs::get_job(&self.db, tenant_id, id).await
    }

    async fn list_jobs_by_video(
        &self,
        tenant_id: &str,
        video_id: &str,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        queries::jobs::list_jobs_by_video(&self.db, tenant_id, video_id).await
    }

    async fn list_jobs_by_status(
        &self,
        tenant_id: &str,
        status: JobStatus,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        queries::jobs::list_jobs_by_status(&self.db, tenant_id, status, limit, offset).await
    }

    async fn list_jobs_by_platform(
        &self,
        tenant_id: &str,
        platform: Platform,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        queries::jobs::list_jobs_by_platform(&self.db, tenant_id, platform, limit, offset).await
    }

    async fn list_scheduled_before(
        &self,
        before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        queries::jobs::list_scheduled_before(&self.db, before, limit).await
    }

    async fn list_pending(&self, limit: u32) -> Result<Vec<PublicationJob>, VidcastError> {
        queries::jobs::list_pending(&self.db, limit).await
    }

    async fn update_job(&self, job: &PublicationJob) -> Result<(), VidcastError> {
        queries::jobs::update_job(&self.db, job).await
    }

    async fn update_job_if_status(
        &self,
        job: &PublicationJob,
        expected: JobStatus,
    ) -> Result<bool, VidcastError> {
        queries::jobs::update_job_if_status(&self.db, job, expected).await
    }

    async fn update_job_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: JobStatus,
    ) -> Result<bool, VidcastError> {
        queries::jobs::update_job_status(&self.db, tenant_id, id, status).await
    }

    async fn increment_retry_count(&self, tenant_id: &str, id: &str) -> Result<Option<u32>, VidcastError> {
        queries::jobs::increment_retry_count(&self.db, tenant_id, id).await
    }

    async fn delete_job(&self, tenant_id: &str, id: &str) -> Result<bool, VidcastError> {
        queries::jobs::delete_job(&self.db, tenant_id, id).await
    }

    async fn list_jobs(
        &self,
        tenant_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PublicationJob>, VidcastError> {
        queries::jobs::list_jobs(&self.db, tenant_id, limit, offset).await
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn create_workspace(&self, workspace: &Workspace) -> Result<(), VidcastError> {
        queries::workspaces::create_workspace(&self.db, workspace).await
    }

    async fn get_workspace(&self, tenant_id: &str, id: &str) -> Result<Option<Workspace>, VidcastError> {
        queries::workspaces::get_workspace(&self.db, tenant_id, id).await
    }

    async fn list_workspaces(&self, tenant_id: &str, user_id: &str) -> Result<Vec<Workspace>, VidcastError> {
        queries::workspaces::list_workspaces(&self.db, tenant_id, user_id).await
    }

    async fn update_workspace(&self, workspace: &Workspace) -> Result<(), VidcastError> {
        queries::workspaces::update_workspace(&self.db, workspace).await
    }

    async fn create_video(&self, video: &Video) -> Result<(), VidcastError> {
        queries::videos::create_video(&self.db, video).await
    }

    async fn get_video(&self, tenant_id: &str, id: &str) -> Result<Option<Video>, VidcastError> {
        queries::videos::get_video(&self.db, tenant_id, id).await
    }

    async fn update_video(&self, video: &Video) -> Result<(), VidcastError> {
        queries::videos::update_video(&self.db, video).await
    }

    async fn set_video_external_id(
        &self,
        tenant_id: &str,
        video_id: &str,
        platform: Platform,
        external_id: &str,
    ) -> Result<(), VidcastError> {
        queries::videos::set_video_external_id(&self.db, tenant_id, video_id, platform, external_id)
            .await
    }

    async fn delete_video(&self, tenant_id: &str, id: &str) -> Result<bool, VidcastError> {
        queries::videos::delete_video(&self.db, tenant_id, id).await
    }
}

#[async_trait]
impl StatsStore for SqliteStore {
    async fn record_stats(&self, stats: &VideoStats) -> Result<VideoStats, VidcastError> {
        queries::stats::record_stats(&self.db, stats).await
    }

    async fn get_stats(
        &self,
        tenant_id: &str,
        video_id: &str,
        platform: Platform,
    ) -> Result<Option<VideoStats>, VidcastError> {
        queries::stats::get_stats(&self.db, tenant_id, video_id, platform).await
    }

    async fn list_stats_for_video(&self, tenant_id: &str, video_id: &str) -> Result<Vec<VideoStats>, VidcastError> {
        queries::stats::list_stats_for_video(&self.db, tenant_id, video_id).await
    }

    async fn stats_snapshots(&self, stats_id: &str, limit: u32) -> Result<Vec<VideoStatsSnapshot>, VidcastError> {
        queries::stats::stats_snapshots(&self.db, stats_id, limit).await
    }

    async fn aggregate_stats(&self, tenant_id: &str, video_id: &str) -> Result<StatsAggregation, VidcastError> {
        let rows = queries::stats::list_stats_for_video(&self.db, tenant_id, video_id).await?;
        Ok(StatsAggregation::from_rows(video_id, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;
    use vidcast_core::workspace::YoutubeCredentials;
    use vidcast_core::{NewPublicationJob, VideoStatus};

    async fn open_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (SqliteStore::new(db), dir)
    }

    fn job(tenant: &str, platform: Platform, scheduled_at: Option<DateTime<Utc>>) -> PublicationJob {
        let mut req = NewPublicationJob::new("video-1", platform);
        req.scheduled_at = scheduled_at;
        PublicationJob::new(tenant, "user-1", req, Utc::now())
    }

    #[tokio::test]
    async fn job_round_trip_and_tenant_isolation() {
        let (store, _dir) = open_store().await;
        let mut j = job("t1", Platform::Youtube, None);
        j.config = serde_json::json!({"workspace_id": "ws-1", "privacy": "public"});
        store.create_job(&j).await.unwrap();

        let loaded = store.get_job("t1", &j.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, j.id);
        assert_eq!(loaded.status, JobStatus::Pending);
        assert_eq!(loaded.config["privacy"], "public");
        assert_eq!(loaded.workspace_id(), Some("ws-1"));
        assert_eq!(loaded.created_at.timestamp_micros(), j.created_at.timestamp_micros());

        assert!(store.get_job("t2", &j.id).await.unwrap().is_none());
        assert!(store.list_jobs("t2", 10, 0).await.unwrap().is_empty());
        assert!(!store.delete_job("t2", &j.id).await.unwrap());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn soft_deleted_jobs_are_invisible() {
        let (store, _dir) = open_store().await;
        let j = job("t1", Platform::Tiktok, None);
        store.create_job(&j).await.unwrap();

        assert!(store.delete_job("t1", &j.id).await.unwrap());
        assert!(!store.delete_job("t1", &j.id).await.unwrap());
        assert!(store.get_job("t1", &j.id).await.unwrap().is_none());
        assert!(store.list_jobs_by_video("t1", "video-1").await.unwrap().is_empty());
        assert!(store.list_pending(10).await.unwrap().is_empty());
        assert!(!store.update_job_status("t1", &j.id, JobStatus::Cancelled).await.unwrap());
        assert!(store.increment_retry_count("t1", &j.id).await.unwrap().is_none());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn filters_and_pagination() {
        let (store, _dir) = open_store().await;
        for platform in [Platform::Youtube, Platform::Youtube, Platform::Facebook] {
            store.create_job(&job("t1", platform, None)).await.unwrap();
        }

        let yt = store
            .list_jobs_by_platform("t1", Platform::Youtube, 10, 0)
            .await
            .unwrap();
        assert_eq!(yt.len(), 2);
        let page = store.list_jobs("t1", 2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        let pending = store
            .list_jobs_by_status("t1", JobStatus::Pending, 10, 0)
            .await
            .unwrap();
        assert_eq!(pending.len(), 3);
        assert!(
            store
                .list_jobs_by_status("t1", JobStatus::Completed, 10, 0)
                .await
                .unwrap()
                .is_empty()
        );
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn scheduled_before_is_inclusive_and_read_only() {
        let (store, _dir) = open_store().await;
        let now = Utc::now();
        let at = now + Duration::minutes(5);
        let due = job("t1", Platform::Youtube, Some(at));
        let later = job("t2", Platform::Youtube, Some(at + Duration::hours(1)));
        assert_eq!(due.status, JobStatus::Scheduled);
        store.create_job(&due).await.unwrap();
        store.create_job(&later).await.unwrap();

        let first = store.list_scheduled_before(at, 10).await.unwrap();
        let second = store.list_scheduled_before(at, 10).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, due.id);
        assert_eq!(first, second);
        assert!(store.list_scheduled_before(now, 10).await.unwrap().is_empty());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_and_retry_increment() {
        let (store, _dir) = open_store().await;
        let mut j = job("t1", Platform::Twitter, None);
        store.create_job(&j).await.unwrap();

        assert_eq!(store.increment_retry_count("t1", &j.id).await.unwrap(), Some(1));
        assert_eq!(store.increment_retry_count("t1", &j.id).await.unwrap(), Some(2));

        j.start(Utc::now()).unwrap();
        j.retry_count = 2;
        j.complete("tw-1", None, Utc::now()).unwrap();
        store.update_job(&j).await.unwrap();
        let loaded = store.get_job("t1", &j.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Completed);
        assert_eq!(loaded.external_id.as_deref(), Some("tw-1"));
        assert!(loaded.started_at.is_some());
        assert!(loaded.completed_at.is_some());

        let mut ghost = job("t1", Platform::Twitter, None);
        ghost.id = "missing".into();
        assert!(matches!(
            store.update_job(&ghost).await,
            Err(VidcastError::NotFound { .. })
        ));
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn retry_increment_stops_at_bound() {
        let (store, _dir) = open_store().await;
        let req = NewPublicationJob::new("video-1", Platform::Instagram).max_retries(1);
        let j = PublicationJob::new("t1", "user-1", req, Utc::now());
        store.create_job(&j).await.unwrap();

        assert_eq!(store.increment_retry_count("t1", &j.id).await.unwrap(), Some(1));
        assert_eq!(store.increment_retry_count("t1", &j.id).await.unwrap(), Some(1));
        let loaded = store.get_job("t1", &j.id).await.unwrap().unwrap();
        assert!(loaded.retry_count <= loaded.max_retries);

        assert!(store.update_job_status("t1", &j.id, JobStatus::Cancelled).await.unwrap());
        assert_eq!(store.increment_retry_count("t1", &j.id).await.unwrap(), None);
        let loaded = store.get_job("t1", &j.id).await.unwrap().unwrap();
        assert_eq!(loaded.retry_count, 1);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn conditional_update_detects_lost_race() {
        let (store, _dir) = open_store().await;
        let j = job("t1", Platform::Youtube, None);
        store.create_job(&j).await.unwrap();

        // Two writers read the same pending job.
        let mut first = j.clone();
        let mut second = j.clone();
        first.start(Utc::now()).unwrap();
        second.start(Utc::now()).unwrap();

        assert!(store.update_job_if_status(&first, JobStatus::Pending).await.unwrap());
        assert!(!store.update_job_if_status(&second, JobStatus::Pending).await.unwrap());

        // A cancel landing mid-run is not overwritten by the runner's failure.
        assert!(store.update_job_status("t1", &j.id, JobStatus::Cancelled).await.unwrap());
        first.fail("upload rejected", Utc::now()).unwrap();
        assert!(!store.update_job_if_status(&first, JobStatus::Processing).await.unwrap());
        let loaded = store.get_job("t1", &j.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Cancelled);
        assert_eq!(loaded.retry_count, 0);

        let mut ghost = job("t1", Platform::Youtube, None);
        ghost.id = "missing".into();
        assert!(!store.update_job_if_status(&ghost, JobStatus::Pending).await.unwrap());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn workspace_and_video_round_trip() {
        let (store, _dir) = open_store().await;
        let mut ws = Workspace::new("t1", "u1", "main");
        ws.credentials.youtube = Some(YoutubeCredentials {
            access_token: "ya29".into(),
            ..Default::default()
        });
        store.create_workspace(&ws).await.unwrap();

        let loaded = store.get_workspace("t1", &ws.id).await.unwrap().unwrap();
        assert!(loaded.is_connected(Platform::Youtube));
        assert!(store.get_workspace("t2", &ws.id).await.unwrap().is_none());
        assert_eq!(store.list_workspaces("t1", "u1").await.unwrap().len(), 1);

        let mut video = Video::new("t1", "u1", "Launch");
        video.tags = vec!["rust".into()];
        video.status = VideoStatus::Ready;
        store.create_video(&video).await.unwrap();
        let loaded = store.get_video("t1", &video.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Launch");
        assert_eq!(loaded.tags, vec!["rust".to_string()]);
        assert_eq!(loaded.status, VideoStatus::Ready);
        assert!(loaded.is_ready());
        assert!(loaded.external_ids.is_empty());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn external_ids_are_set_per_platform() {
        let (store, _dir) = open_store().await;
        let video = Video::new("t1", "u1", "Launch");
        store.create_video(&video).await.unwrap();

        store
            .set_video_external_id("t1", &video.id, Platform::Youtube, "yt-42")
            .await
            .unwrap();
        store
            .set_video_external_id("t1", &video.id, Platform::Facebook, "fb-7")
            .await
            .unwrap();

        let loaded = store.get_video("t1", &video.id).await.unwrap().unwrap();
        assert_eq!(loaded.external_id(Platform::Youtube), Some("yt-42"));
        assert_eq!(loaded.external_id(Platform::Facebook), Some("fb-7"));
        assert_eq!(loaded.external_ids.len(), 2);

        assert!(store.delete_video("t1", &video.id).await.unwrap());
        assert!(store.get_video("t1", &video.id).await.unwrap().is_none());
        assert!(matches!(
            store
                .set_video_external_id("t1", &video.id, Platform::Youtube, "x")
                .await,
            Err(VidcastError::NotFound { .. })
        ));
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn record_stats_snapshots_previous_values() {
        let (store, _dir) = open_store().await;
        let video = Video::new("t1", "u1", "Launch");

        let mut first = VideoStats::for_video(&video, Platform::Youtube);
        first.views = 100;
        first.likes = 5;
        let stored = store.record_stats(&first).await.unwrap();
        assert!(store.stats_snapshots(&stored.id, 10).await.unwrap().is_empty());

        let mut second = VideoStats::for_video(&video, Platform::Youtube);
        second.views = 250;
        let updated = store.record_stats(&second).await.unwrap();
        assert_eq!(updated.id, stored.id);

        let snaps = store.stats_snapshots(&stored.id, 10).await.unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].views, 100);
        assert_eq!(snaps[0].likes, 5);

        let current = store
            .get_stats("t1", &video.id, Platform::Youtube)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.views, 250);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn aggregate_sums_platforms() {
        let (store, _dir) = open_store().await;
        let video = Video::new("t1", "u1", "Launch");
        for (platform, views) in [(Platform::Youtube, 300), (Platform::Facebook, 120)] {
            let mut s = VideoStats::for_video(&video, platform);
            s.views = views;
            s.likes = 10;
            store.record_stats(&s).await.unwrap();
        }

        let agg = store.aggregate_stats("t1", &video.id).await.unwrap();
        assert_eq!(agg.total_views, 420);
        assert_eq!(agg.total_likes, 20);
        assert_eq!(agg.platform_count, 2);
        assert_eq!(agg.top_platform, Some(Platform::Youtube));

        let empty = store.aggregate_stats("t2", &video.id).await.unwrap();
        assert_eq!(empty.platform_count, 0);
        store.close().await.unwrap();
    }
}
