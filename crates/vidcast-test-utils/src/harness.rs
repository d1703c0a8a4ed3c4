// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness backed by a temporary SQLite database.
//!
//! `TestHarness` opens a migrated [`SqliteStore`] in a fresh temp directory
//! and hands it out as each of the store traits. Seeding helpers persist the
//! fixtures from [`crate::fixtures`].

use std::sync::Arc;

use vidcast_config::model::StorageConfig;
use vidcast_core::{CatalogStore, JobStore, StatsStore, VidcastError, Video, Workspace};
use vidcast_storage::SqliteStore;

use crate::fixtures;

/// Builder for [`TestHarness`].
#[derive(Debug)]
pub struct TestHarnessBuilder {
    wal_mode: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self { wal_mode: true }
    }

    /// Toggle WAL journaling on the temp database.
    pub fn with_wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    pub async fn build(self) -> Result<TestHarness, VidcastError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| VidcastError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("vidcast-test.db");

        let config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: self.wal_mode,
        };
        let store = Arc::new(SqliteStore::open(&config).await?);

        Ok(TestHarness {
            store,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A migrated temp database plus seeding helpers.
pub struct TestHarness {
    store: Arc<SqliteStore>,
    config: StorageConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    /// Storage settings pointing at the temp database.
    pub fn storage_config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn job_store(&self) -> Arc<dyn JobStore> {
        self.store.clone()
    }

    pub fn catalog_store(&self) -> Arc<dyn CatalogStore> {
        self.store.clone()
    }

    pub fn stats_store(&self) -> Arc<dyn StatsStore> {
        self.store.clone()
    }

    /// Persist a workspace with every platform connected.
    pub async fn seed_workspace(&self, tenant_id: &str, user_id: &str) -> Result<Workspace, VidcastError> {
        let ws = fixtures::workspace(tenant_id, user_id);
        self.store.create_workspace(&ws).await?;
        Ok(ws)
    }

    pub async fn seed_ready_video(&self, tenant_id: &str, user_id: &str) -> Result<Video, VidcastError> {
        let video = fixtures::ready_video(tenant_id, user_id);
        self.store.create_video(&video).await?;
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_rows_are_readable() {
        let harness = TestHarness::builder().build().await.unwrap();
        let ws = harness.seed_workspace("t1", "u1").await.unwrap();
        let video = harness.seed_ready_video("t1", "u1").await.unwrap();

        let catalog = harness.catalog_store();
        let loaded = catalog.get_workspace("t1", &ws.id).await.unwrap().unwrap();
        assert_eq!(loaded.credentials.connected().len(), 6);
        assert!(catalog.get_video("t1", &video.id).await.unwrap().unwrap().is_ready());
    }

    #[tokio::test]
    async fn harnesses_are_isolated() {
        let a = TestHarness::builder().build().await.unwrap();
        let b = TestHarness::builder().with_wal_mode(false).build().await.unwrap();
        let video = a.seed_ready_video("t1", "u1").await.unwrap();
        assert!(b.catalog_store().get_video("t1", &video.id).await.unwrap().is_none());
        assert_ne!(a.storage_config().database_path, b.storage_config().database_path);
    }
}
