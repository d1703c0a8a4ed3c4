// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vidcast publish` and `vidcast sync-stats`.
//!
//! Both load the workspace and video from storage, call the publication
//! service directly, and persist whatever the platform returned.

use tracing::info;

use vidcast_core::{CatalogStore, StatsStore, VidcastError, Video, Workspace};
use vidcast_publish::{PublicationService, PublishStage};
use vidcast_storage::SqliteStore;

use crate::{TargetArgs, print_json};

async fn load_target(store: &SqliteStore, target: &TargetArgs) -> Result<(Workspace, Video), VidcastError> {
    let workspace = store
        .get_workspace(&target.tenant, &target.workspace)
        .await?
        .ok_or_else(|| VidcastError::NotFound {
            entity: "workspace",
            id: target.workspace.clone(),
        })?;
    let video = store
        .get_video(&target.tenant, &target.video)
        .await?
        .ok_or_else(|| VidcastError::NotFound {
            entity: "video",
            id: target.video.clone(),
        })?;
    Ok((workspace, video))
}

pub async fn run_publish(
    store: &SqliteStore,
    publisher: &PublicationService,
    target: &TargetArgs,
) -> Result<(), VidcastError> {
    let (workspace, mut video) = load_target(store, target).await?;
    let result = publisher
        .publish_video_staged(&workspace, &mut video, &target.platform)
        .await;

    // Keep the media id even when a later step failed.
    for (platform, id) in &video.external_ids {
        store
            .set_video_external_id(&target.tenant, &video.id, *platform, id)
            .await?;
    }

    match result {
        Ok(stats) => {
            let stats = store.record_stats(&stats).await?;
            info!(video_id = %video.id, platform = %stats.platform, "published from command line");
            print_json(&stats)
        }
        Err(failure) if failure.stage == PublishStage::FetchStats => {
            eprintln!("published, but stats are unavailable: {}", failure.error);
            print_json(&video.external_ids)
        }
        Err(failure) => {
            eprintln!("publish stopped at {} ({})", failure.stage, failure.progress());
            Err(failure.into_error())
        }
    }
}

pub async fn run_sync_stats(
    store: &SqliteStore,
    publisher: &PublicationService,
    target: &TargetArgs,
) -> Result<(), VidcastError> {
    let (workspace, video) = load_target(store, target).await?;
    let stats = publisher
        .sync_stats(&workspace, &video, &target.platform)
        .await?;
    let stats = store.record_stats(&stats).await?;
    print_json(&stats)
}
