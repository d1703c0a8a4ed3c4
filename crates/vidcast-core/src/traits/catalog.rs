// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contract for workspaces and videos.

use async_trait::async_trait;

use crate::error::VidcastError;
use crate::types::Platform;
use crate::video::Video;
use crate::workspace::Workspace;

/// Tenant-scoped storage for the entities the publication pipeline reads.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_workspace(&self, workspace: &Workspace) -> Result<(), VidcastError>;

    async fn get_workspace(&self, tenant_id: &str, id: &str) -> Result<Option<Workspace>, VidcastError>;

    /// Workspaces owned by `user_id`, oldest first.
    async fn list_workspaces(&self, tenant_id: &str, user_id: &str) -> Result<Vec<Workspace>, VidcastError>;

    /// Overwrites name and credentials. Used by the OAuth refresh flow.
    async fn update_workspace(&self, workspace: &Workspace) -> Result<(), VidcastError>;

    async fn create_video(&self, video: &Video) -> Result<(), VidcastError>;

    async fn get_video(&self, tenant_id: &str, id: &str) -> Result<Option<Video>, VidcastError>;

    async fn update_video(&self, video: &Video) -> Result<(), VidcastError>;

    /// Writes a single platform's media id without touching the others, so
    /// concurrent publishes to different platforms do not clobber each other.
    async fn set_video_external_id(
        &self,
        tenant_id: &str,
        video_id: &str,
        platform: Platform,
        external_id: &str,
    ) -> Result<(), VidcastError>;

    /// Soft delete. Returns `false` if no live video matched.
    async fn delete_video(&self, tenant_id: &str, id: &str) -> Result<bool, VidcastError>;
}
