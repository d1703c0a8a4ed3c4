// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The four-step publication pipeline.
//!
//! `PublicationService` resolves a client through the [`ClientFactory`] and
//! drives authenticate, upload, publish and fetch-stats in order. The first
//! failing step ends the call and its error is returned as-is.

use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

use vidcast_core::{ClientFactory, PlatformClient, VidcastError, Video, VideoStats, Workspace};

/// The step a staged publish was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    /// The video was checked for readiness.
    Validate,
    /// A client was requested from the factory.
    Resolve,
    Authenticate,
    Upload,
    Publish,
    FetchStats,
}

/// How far a failed publish got on the platform side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublishProgress {
    /// Nothing reached the platform.
    NotAttempted,
    /// The media was uploaded but is not visible.
    UploadedNotLive,
    /// The media is live; only the stats read failed.
    LiveWithoutStats,
}

/// A publish failure tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub stage: PublishStage,
    #[source]
    pub error: VidcastError,
}

impl StageFailure {
    fn at(stage: PublishStage) -> impl FnOnce(VidcastError) -> Self {
        move |error| Self { stage, error }
    }

    pub fn progress(&self) -> PublishProgress {
        match self.stage {
            PublishStage::Validate
            | PublishStage::Resolve
            | PublishStage::Authenticate
            | PublishStage::Upload => PublishProgress::NotAttempted,
            PublishStage::Publish => PublishProgress::UploadedNotLive,
            PublishStage::FetchStats => PublishProgress::LiveWithoutStats,
        }
    }

    pub fn into_error(self) -> VidcastError {
        self.error
    }
}

/// Orchestrates the authenticate, upload, publish and fetch-stats steps.
#[derive(Clone)]
pub struct PublicationService {
    factory: Arc<dyn ClientFactory>,
}

impl std::fmt::Debug for PublicationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationService").finish_non_exhaustive()
    }
}

impl PublicationService {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    /// Publish `video` to `platform` with the credentials in `workspace`.
    ///
    /// On a successful upload the media id is written to the video before
    /// publish runs, so it survives a later failure. Returns the stats read
    /// after publishing.
    pub async fn publish_video(
        &self,
        workspace: &Workspace,
        video: &mut Video,
        platform: &str,
    ) -> Result<VideoStats, VidcastError> {
        self.publish_video_staged(workspace, video, platform)
            .await
            .map_err(StageFailure::into_error)
    }

    /// Like [`publish_video`](Self::publish_video), but reports the failing stage.
    pub async fn publish_video_staged(
        &self,
        workspace: &Workspace,
        video: &mut Video,
        platform: &str,
    ) -> Result<VideoStats, StageFailure> {
        video
            .ensure_ready()
            .map_err(StageFailure::at(PublishStage::Validate))?;

        let mut client = self
            .factory
            .new_client(platform)
            .map_err(StageFailure::at(PublishStage::Resolve))?;
        let platform = client.platform();
        debug!(%platform, video_id = %video.id, workspace_id = %workspace.id, "publishing video");

        client
            .authenticate(workspace)
            .await
            .map_err(StageFailure::at(PublishStage::Authenticate))?;

        let media_id = client
            .upload(video)
            .await
            .map_err(StageFailure::at(PublishStage::Upload))?;
        video.set_external_id(platform, media_id.clone());
        debug!(%platform, video_id = %video.id, %media_id, "upload complete");

        client
            .publish(video, workspace)
            .await
            .map_err(StageFailure::at(PublishStage::Publish))?;

        let stats = fetch_stats(client.as_ref(), video)
            .await
            .map_err(StageFailure::at(PublishStage::FetchStats))?;

        info!(%platform, video_id = %video.id, %media_id, "video published");
        Ok(stats)
    }

    /// Refresh analytics for an already-published video.
    pub async fn sync_stats(
        &self,
        workspace: &Workspace,
        video: &Video,
        platform: &str,
    ) -> Result<VideoStats, VidcastError> {
        let mut client = self.factory.new_client(platform)?;
        client.authenticate(workspace).await?;
        fetch_stats(client.as_ref(), video).await
    }
}

async fn fetch_stats(client: &dyn PlatformClient, video: &Video) -> Result<VideoStats, VidcastError> {
    client.fetch_stats(video).await.inspect_err(|e| {
        if e.is_unsupported() {
            debug!(platform = %client.platform(), "stats not available for platform");
        } else {
            warn!(platform = %client.platform(), video_id = %video.id, error = %e, "stats fetch failed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcast_core::{Platform, VideoStatus};
    use vidcast_test_utils::{Call, MockFactory, RecordingClient, fixtures};

    fn service(factory: MockFactory) -> PublicationService {
        PublicationService::new(Arc::new(factory))
    }

    #[tokio::test]
    async fn successful_publish_runs_steps_in_order() {
        let client = RecordingClient::new(Platform::Youtube).with_media_id("yt-42");
        let calls = client.calls();
        let svc = service(MockFactory::new().with_client(client));
        let ws = fixtures::workspace("t1", "u1");
        let mut video = fixtures::ready_video("t1", "u1");

        let stats = svc.publish_video(&ws, &mut video, "youtube").await.unwrap();

        assert_eq!(
            calls.snapshot(),
            vec![Call::Authenticate, Call::Upload, Call::Publish, Call::FetchStats]
        );
        assert_eq!(video.external_id(Platform::Youtube), Some("yt-42"));
        assert_eq!(stats.views, 0);
        assert_eq!(stats.platform, Platform::Youtube);
    }

    #[tokio::test]
    async fn failure_at_each_step_short_circuits() {
        let cases = [
            (Call::Authenticate, vec![Call::Authenticate], PublishProgress::NotAttempted),
            (Call::Upload, vec![Call::Authenticate, Call::Upload], PublishProgress::NotAttempted),
            (
                Call::Publish,
                vec![Call::Authenticate, Call::Upload, Call::Publish],
                PublishProgress::UploadedNotLive,
            ),
            (
                Call::FetchStats,
                vec![Call::Authenticate, Call::Upload, Call::Publish, Call::FetchStats],
                PublishProgress::LiveWithoutStats,
            ),
        ];

        for (step, expected_calls, expected_progress) in cases {
            let client = RecordingClient::new(Platform::Tiktok)
                .with_media_id("tt-1")
                .failing_at(step);
            let calls = client.calls();
            let svc = service(MockFactory::new().with_client(client));
            let ws = fixtures::workspace("t1", "u1");
            let mut video = fixtures::ready_video("t1", "u1");

            let failure = svc
                .publish_video_staged(&ws, &mut video, "tiktok")
                .await
                .unwrap_err();
            assert_eq!(calls.snapshot(), expected_calls, "step {step:?}");
            assert_eq!(failure.progress(), expected_progress, "step {step:?}");

            let uploaded = matches!(step, Call::Publish | Call::FetchStats);
            assert_eq!(video.external_id(Platform::Tiktok).is_some(), uploaded);
        }
    }

    #[tokio::test]
    async fn errors_are_returned_verbatim() {
        let client = RecordingClient::new(Platform::Facebook).failing_with(Call::Authenticate, || {
            VidcastError::Credentials {
                platform: Platform::Facebook,
                message: "page_id must be numeric".into(),
            }
        });
        let svc = service(MockFactory::new().with_client(client));
        let mut video = fixtures::ready_video("t1", "u1");

        let err = svc
            .publish_video(&fixtures::workspace("t1", "u1"), &mut video, "facebook")
            .await
            .unwrap_err();
        assert!(matches!(err, VidcastError::Credentials { .. }));
        assert!(err.to_string().contains("page_id must be numeric"));
    }

    #[tokio::test]
    async fn only_the_target_platform_id_is_written() {
        let client = RecordingClient::new(Platform::Instagram).with_media_id("ig-9");
        let svc = service(MockFactory::new().with_client(client));
        let mut video = fixtures::ready_video("t1", "u1");
        video.set_external_id(Platform::Youtube, "yt-1");

        svc.publish_video(&fixtures::workspace("t1", "u1"), &mut video, "instagram")
            .await
            .unwrap();

        assert_eq!(video.external_id(Platform::Youtube), Some("yt-1"));
        assert_eq!(video.external_id(Platform::Instagram), Some("ig-9"));
        assert_eq!(video.external_ids.len(), 2);
    }

    #[tokio::test]
    async fn each_platform_writes_only_its_own_id() {
        let factory = Platform::ALL
            .into_iter()
            .fold(MockFactory::new(), |f, p| f.with_client(RecordingClient::new(p)));
        let svc = service(factory);
        let ws = fixtures::workspace("t1", "u1");

        for platform in Platform::ALL {
            let mut video = fixtures::ready_video("t1", "u1");
            svc.publish_video(&ws, &mut video, platform.as_str())
                .await
                .unwrap_or_else(|e| panic!("{platform}: {e}"));

            let expected = format!("{platform}-media-1");
            assert_eq!(video.external_ids.len(), 1, "{platform}");
            assert_eq!(video.external_id(platform), Some(expected.as_str()), "{platform}");
        }
    }

    #[tokio::test]
    async fn unknown_platform_fails_before_any_call() {
        let client = RecordingClient::new(Platform::Youtube);
        let calls = client.calls();
        let svc = service(MockFactory::new().with_client(client));
        let mut video = fixtures::ready_video("t1", "u1");

        let failure = svc
            .publish_video_staged(&fixtures::workspace("t1", "u1"), &mut video, "linkedin")
            .await
            .unwrap_err();
        assert_eq!(failure.stage, PublishStage::Resolve);
        assert!(matches!(failure.error, VidcastError::UnsupportedPlatform(_)));
        assert!(calls.snapshot().is_empty());
    }

    #[tokio::test]
    async fn unready_video_is_rejected() {
        let client = RecordingClient::new(Platform::Youtube);
        let calls = client.calls();
        let svc = service(MockFactory::new().with_client(client));
        let mut video = fixtures::ready_video("t1", "u1");
        video.status = VideoStatus::Processing;

        let err = svc
            .publish_video(&fixtures::workspace("t1", "u1"), &mut video, "youtube")
            .await
            .unwrap_err();
        assert!(matches!(err, VidcastError::VideoNotReady { .. }));
        assert!(calls.snapshot().is_empty());
        assert!(video.external_ids.is_empty());
    }

    #[tokio::test]
    async fn sync_stats_only_authenticates_and_fetches() {
        let client = RecordingClient::new(Platform::Youtube).with_views(1234);
        let calls = client.calls();
        let svc = service(MockFactory::new().with_client(client));
        let mut video = fixtures::ready_video("t1", "u1");
        video.set_external_id(Platform::Youtube, "yt-42");

        let stats = svc
            .sync_stats(&fixtures::workspace("t1", "u1"), &video, "youtube")
            .await
            .unwrap();
        assert_eq!(stats.views, 1234);
        assert_eq!(calls.snapshot(), vec![Call::Authenticate, Call::FetchStats]);
    }
}
