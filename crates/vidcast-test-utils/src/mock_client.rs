// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable platform client for deterministic tests.
//!
//! `RecordingClient` logs every capability call it receives and can be told
//! to fail a given step, either always or for the first N attempts. Clones
//! share the call log and the failure script, so a [`MockFactory`] can hand
//! out fresh clients on every request while tests observe all of them.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vidcast_core::{ClientFactory, Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

/// One capability call on a [`RecordingClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Authenticate,
    Upload,
    Publish,
    FetchStats,
}

/// Shared, ordered record of calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    /// Calls recorded so far, in order.
    pub fn snapshot(&self) -> Vec<Call> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, call: Call) -> usize {
        self.snapshot().into_iter().filter(|c| *c == call).count()
    }
}

type ErrorFn = Arc<dyn Fn() -> VidcastError + Send + Sync>;

struct Failure {
    /// `None` fails forever.
    remaining: Option<usize>,
    error: ErrorFn,
}

/// A fake [`PlatformClient`] that records calls and follows a failure script.
#[derive(Clone)]
pub struct RecordingClient {
    platform: Platform,
    media_id: String,
    views: i64,
    delays: HashMap<Call, Duration>,
    failures: Arc<Mutex<HashMap<Call, Failure>>>,
    calls: CallLog,
    authenticated: bool,
}

impl std::fmt::Debug for RecordingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingClient")
            .field("platform", &self.platform)
            .field("media_id", &self.media_id)
            .finish_non_exhaustive()
    }
}

impl RecordingClient {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            media_id: format!("{platform}-media-1"),
            views: 0,
            delays: HashMap::new(),
            failures: Arc::new(Mutex::new(HashMap::new())),
            calls: CallLog::default(),
            authenticated: false,
        }
    }

    /// Media id returned from `upload`.
    pub fn with_media_id(mut self, id: impl Into<String>) -> Self {
        self.media_id = id.into();
        self
    }

    /// View count reported by `fetch_stats`.
    pub fn with_views(mut self, views: i64) -> Self {
        self.views = views;
        self
    }

    /// Sleep before answering `call`.
    pub fn with_delay(mut self, call: Call, delay: Duration) -> Self {
        self.delays.insert(call, delay);
        self
    }

    /// Fail `call` on every attempt with a 500 platform error.
    pub fn failing_at(self, call: Call) -> Self {
        let platform = self.platform;
        self.script(call, None, Arc::new(move || server_error(platform, call)))
    }

    /// Fail `call` on the first `times` attempts, then succeed.
    pub fn failing_times(self, call: Call, times: usize) -> Self {
        let platform = self.platform;
        self.script(call, Some(times), Arc::new(move || server_error(platform, call)))
    }

    /// Fail `call` on every attempt with the error built by `error`.
    pub fn failing_with(
        self,
        call: Call,
        error: impl Fn() -> VidcastError + Send + Sync + 'static,
    ) -> Self {
        self.script(call, None, Arc::new(error))
    }

    /// Handle to the call log shared by every clone of this client.
    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    fn script(self, call: Call, remaining: Option<usize>, error: ErrorFn) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(call, Failure { remaining, error });
        }
        self
    }

    async fn enter(&self, call: Call) -> Result<(), VidcastError> {
        self.calls.push(call);
        if let Some(delay) = self.delays.get(&call) {
            tokio::time::sleep(*delay).await;
        }
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| VidcastError::Internal("failure script poisoned".into()))?;
        let Some(failure) = failures.get_mut(&call) else {
            return Ok(());
        };
        match failure.remaining.as_mut() {
            None => Err((failure.error)()),
            Some(0) => Ok(()),
            Some(n) => {
                *n -= 1;
                Err((failure.error)())
            }
        }
    }

    fn require_auth(&self) -> Result<(), VidcastError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(VidcastError::NotAuthenticated {
                platform: self.platform,
            })
        }
    }
}

fn server_error(platform: Platform, call: Call) -> VidcastError {
    VidcastError::Platform {
        platform,
        message: format!("{call:?} rejected by mock"),
        status: Some(500),
        source: None,
    }
}

#[async_trait]
impl PlatformClient for RecordingClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        self.enter(Call::Authenticate).await?;
        if !workspace.is_connected(self.platform) {
            return Err(VidcastError::Credentials {
                platform: self.platform,
                message: "workspace is not connected".into(),
            });
        }
        self.authenticated = true;
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        self.enter(Call::Upload).await?;
        self.require_auth()?;
        video.ensure_ready()?;
        Ok(self.media_id.clone())
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        self.enter(Call::Publish).await?;
        self.require_auth()?;
        video.require_external_id(self.platform)?;
        Ok(())
    }

    async fn fetch_stats(&self, video: &Video) -> Result<VideoStats, VidcastError> {
        self.enter(Call::FetchStats).await?;
        self.require_auth()?;
        let mut stats = VideoStats::for_video(video, self.platform);
        stats.views = self.views;
        Ok(stats)
    }
}

/// A [`ClientFactory`] handing out clones of registered [`RecordingClient`]s.
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    clients: HashMap<Platform, RecordingClient>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for its own platform, replacing any previous one.
    pub fn with_client(mut self, client: RecordingClient) -> Self {
        self.clients.insert(client.platform, client);
        self
    }
}

impl ClientFactory for MockFactory {
    fn new_client(&self, platform: &str) -> Result<Box<dyn PlatformClient>, VidcastError> {
        let client = Platform::from_str(platform)
            .ok()
            .and_then(|p| self.clients.get(&p))
            .ok_or_else(|| VidcastError::UnsupportedPlatform(platform.to_string()))?;
        let mut client = client.clone();
        client.authenticated = false;
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn failing_times_recovers() {
        let client = RecordingClient::new(Platform::Youtube).failing_times(Call::Upload, 1);
        let factory = MockFactory::new().with_client(client);
        let ws = fixtures::workspace("t1", "u1");
        let video = fixtures::ready_video("t1", "u1");

        let mut first = factory.new_client("youtube").unwrap();
        first.authenticate(&ws).await.unwrap();
        assert!(first.upload(&video).await.is_err());

        let mut second = factory.new_client("youtube").unwrap();
        second.authenticate(&ws).await.unwrap();
        assert_eq!(second.upload(&video).await.unwrap(), "youtube-media-1");
    }

    #[tokio::test]
    async fn upload_requires_authentication() {
        let factory = MockFactory::new().with_client(RecordingClient::new(Platform::Tiktok));
        let client = factory.new_client("tiktok").unwrap();
        let err = client
            .upload(&fixtures::ready_video("t1", "u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, VidcastError::NotAuthenticated { .. }));
    }

    #[test]
    fn unregistered_platform_is_unsupported() {
        let factory = MockFactory::new().with_client(RecordingClient::new(Platform::Tiktok));
        for id in ["youtube", "TikTok", ""] {
            assert!(matches!(
                factory.new_client(id),
                Err(VidcastError::UnsupportedPlatform(_))
            ));
        }
    }
}
