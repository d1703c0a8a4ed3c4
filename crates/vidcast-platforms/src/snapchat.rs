// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapchat public profile client: upload media, then post it as a story.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use vidcast_config::model::EndpointConfig;
use vidcast_core::{Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

use crate::http;

const API_BASE: &str = "https://businessapi.snapchat.com/v1";

const PLATFORM: Platform = Platform::Snapchat;

#[derive(Clone)]
pub struct SnapchatClient {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    session: Option<Session>,
}

#[derive(Clone)]
struct Session {
    profile_id: String,
    bearer: String,
}

impl std::fmt::Debug for SnapchatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapchatClient")
            .field("api_base", &self.api_base)
            .field("upload_base", &self.upload_base)
            .field("authenticated", &self.session.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    media_id: String,
}

impl SnapchatClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: API_BASE.to_string(),
            upload_base: API_BASE.to_string(),
            session: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: &EndpointConfig) -> Self {
        if let Some(base) = &endpoints.api_base {
            self.api_base = base.clone();
            self.upload_base = base.clone();
        }
        if let Some(base) = &endpoints.upload_base {
            self.upload_base = base.clone();
        }
        self
    }

    fn session(&self) -> Result<&Session, VidcastError> {
        self.session
            .as_ref()
            .ok_or(VidcastError::NotAuthenticated { platform: PLATFORM })
    }
}

#[async_trait]
impl PlatformClient for SnapchatClient {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        let creds = workspace
            .credentials
            .snapchat
            .as_ref()
            .ok_or_else(|| http::not_connected(PLATFORM))?;
        let profile_id = http::require_field(PLATFORM, "profile_id", &creds.profile_id)?;
        let token = http::require_field(PLATFORM, "access_token", &creds.access_token)?;
        self.session = Some(Session {
            profile_id: profile_id.to_string(),
            bearer: format!("Bearer {token}"),
        });
        debug!(workspace_id = %workspace.id, "snapchat client authenticated");
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        let session = self.session()?;
        let file_path = video.require_file_path()?;
        let file = http::VideoFile::open(file_path).await?;
        let size = file.len();

        let part = reqwest::multipart::Part::stream_with_length(file.into_body(), size)
            .file_name(format!("{}.mp4", video.id))
            .mime_str(http::video_mime(video.format.as_deref()))
            .map_err(|e| VidcastError::transport(PLATFORM, e))?;
        let form = reqwest::multipart::Form::new()
            .text("type", "VIDEO")
            .part("file", part);

        let media: MediaResponse = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(
                    &self.upload_base,
                    &format!("public_profiles/{}/media", session.profile_id),
                ))
                .header(AUTHORIZATION, &session.bearer)
                .multipart(form),
        )
        .await?;

        info!(video_id = %video.id, media_id = %media.media_id, bytes = size, "snapchat media uploaded");
        Ok(media.media_id)
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        let session = self.session()?;
        let media_id = video.require_external_id(PLATFORM)?;

        http::send_empty(
            PLATFORM,
            self.http
                .post(http::endpoint(
                    &self.api_base,
                    &format!("public_profiles/{}/stories", session.profile_id),
                ))
                .header(AUTHORIZATION, &session.bearer)
                .json(&json!({ "media_id": media_id })),
        )
        .await?;

        info!(video_id = %video.id, %media_id, "snapchat story posted");
        Ok(())
    }

    async fn fetch_stats(&self, _video: &Video) -> Result<VideoStats, VidcastError> {
        self.session()?;
        Err(VidcastError::Unsupported {
            platform: PLATFORM,
            operation: "fetch stats",
        })
    }
}
