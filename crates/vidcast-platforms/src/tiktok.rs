// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TikTok Content Posting API client.
//!
//! Upload initializes a `PULL_FROM_URL` post so TikTok fetches the file from
//! the video's public URL. Publish confirms the post finished processing.
//! The publish id TikTok returns is not a video id, so stats are unsupported.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use vidcast_config::model::EndpointConfig;
use vidcast_core::{Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

use crate::http;

const API_BASE: &str = "https://open.tiktokapis.com/v2";

const PLATFORM: Platform = Platform::Tiktok;

/// TikTok caps titles at 2200 characters.
const MAX_TITLE_CHARS: usize = 2200;

#[derive(Debug, Clone)]
pub struct TiktokClient {
    http: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
}

/// Every response wraps its payload next to an `error` object whose code is
/// `"ok"` on success.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct InitData {
    publish_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: String,
    #[serde(default)]
    fail_reason: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, VidcastError> {
        if self.error.code != "ok" {
            return Err(VidcastError::Platform {
                platform: PLATFORM,
                message: format!("{}: {}", self.error.code, self.error.message),
                status: None,
                source: None,
            });
        }
        self.data.ok_or_else(|| VidcastError::Platform {
            platform: PLATFORM,
            message: "response carried no data".to_string(),
            status: None,
            source: None,
        })
    }
}

impl TiktokClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: API_BASE.to_string(),
            access_token: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: &EndpointConfig) -> Self {
        if let Some(base) = &endpoints.api_base {
            self.api_base = base.clone();
        }
        self
    }

    fn bearer(&self) -> Result<String, VidcastError> {
        self.access_token
            .as_ref()
            .map(|t| format!("Bearer {t}"))
            .ok_or(VidcastError::NotAuthenticated { platform: PLATFORM })
    }
}

#[async_trait]
impl PlatformClient for TiktokClient {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        let creds = workspace
            .credentials
            .tiktok
            .as_ref()
            .ok_or_else(|| http::not_connected(PLATFORM))?;
        http::require_field(PLATFORM, "client_key", &creds.client_key)?;
        let token = http::require_field(PLATFORM, "access_token", &creds.access_token)?;
        self.access_token = Some(token.to_string());
        debug!(workspace_id = %workspace.id, "tiktok client authenticated");
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        let bearer = self.bearer()?;
        let video_url = video.require_file_url()?;
        let title: String = video.caption().chars().take(MAX_TITLE_CHARS).collect();

        let body = json!({
            "post_info": {
                "title": title,
                "privacy_level": "SELF_ONLY",
                "disable_comment": false,
                "disable_duet": false,
                "disable_stitch": false,
            },
            "source_info": {
                "source": "PULL_FROM_URL",
                "video_url": video_url,
            },
        });

        let envelope: Envelope<InitData> = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(&self.api_base, "post/publish/video/init/"))
                .header(AUTHORIZATION, bearer)
                .json(&body),
        )
        .await?;
        let publish_id = envelope.into_data()?.publish_id;

        info!(video_id = %video.id, %publish_id, "tiktok post initialized");
        Ok(publish_id)
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        let bearer = self.bearer()?;
        let publish_id = video.require_external_id(PLATFORM)?;

        let envelope: Envelope<StatusData> = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(&self.api_base, "post/publish/status/fetch/"))
                .header(AUTHORIZATION, bearer)
                .json(&json!({ "publish_id": publish_id })),
        )
        .await?;
        let status = envelope.into_data()?;

        match status.status.as_str() {
            "PUBLISH_COMPLETE" => Ok(()),
            "FAILED" => Err(VidcastError::Platform {
                platform: PLATFORM,
                message: format!(
                    "post {publish_id} failed: {}",
                    status.fail_reason.as_deref().unwrap_or("unknown reason")
                ),
                status: Some(422),
                source: None,
            }),
            // Still downloading or processing; a later attempt can succeed.
            other => Err(VidcastError::Platform {
                platform: PLATFORM,
                message: format!("post {publish_id} not live yet (status {other})"),
                status: None,
                source: None,
            }),
        }
    }

    async fn fetch_stats(&self, _video: &Video) -> Result<VideoStats, VidcastError> {
        self.bearer()?;
        Err(VidcastError::Unsupported {
            platform: PLATFORM,
            operation: "fetch stats",
        })
    }
}
