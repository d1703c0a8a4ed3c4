// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform client capability contract and the factory that builds clients.

use async_trait::async_trait;

use crate::error::VidcastError;
use crate::stats::VideoStats;
use crate::types::Platform;
use crate::video::Video;
use crate::workspace::Workspace;

/// One external platform's four-step publishing protocol.
///
/// A client holds no state between calls except the handle established by
/// [`authenticate`](Self::authenticate), which must precede the other
/// operations. The orchestrator enforces that ordering; clients reject
/// out-of-order calls with [`VidcastError::NotAuthenticated`].
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// The platform this client talks to.
    fn platform(&self) -> Platform;

    /// Validates the workspace's credentials for this platform and keeps an
    /// authenticated handle.
    ///
    /// Missing or malformed fields fail with [`VidcastError::Credentials`]
    /// before any network traffic.
    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError>;

    /// Sends the media and metadata without making it public.
    ///
    /// Returns the platform-assigned media id.
    async fn upload(&self, video: &Video) -> Result<String, VidcastError>;

    /// Makes previously uploaded media visible.
    ///
    /// Requires `video` to carry this platform's media id.
    async fn publish(&self, video: &Video, workspace: &Workspace) -> Result<(), VidcastError>;

    /// Current analytics for a published video.
    ///
    /// Platforms without stats support return [`VidcastError::Unsupported`].
    async fn fetch_stats(&self, video: &Video) -> Result<VideoStats, VidcastError>;
}

/// Maps a platform identifier to a fresh, unauthenticated client.
///
/// Construction must not perform network I/O.
pub trait ClientFactory: Send + Sync {
    /// Fails with [`VidcastError::UnsupportedPlatform`] for identifiers outside
    /// the known set, including the empty string and case variants.
    fn new_client(&self, platform: &str) -> Result<Box<dyn PlatformClient>, VidcastError>;
}
