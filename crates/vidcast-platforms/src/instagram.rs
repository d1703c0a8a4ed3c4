// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instagram Graph API client for Reels.
//!
//! Upload creates a media container from the video's public URL; publish
//! turns the container into a live Reel. The container id is not the media
//! id of the published Reel, so stats are unsupported.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use vidcast_config::model::EndpointConfig;
use vidcast_core::{Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

use crate::http;

pub(crate) const GRAPH_BASE: &str = "https://graph.facebook.com/v17.0";

const PLATFORM: Platform = Platform::Instagram;

#[derive(Clone)]
pub struct InstagramClient {
    http: reqwest::Client,
    api_base: String,
    session: Option<Session>,
}

#[derive(Clone)]
struct Session {
    user_id: String,
    access_token: String,
}

impl std::fmt::Debug for InstagramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramClient")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.session.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

impl InstagramClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: GRAPH_BASE.to_string(),
            session: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: &EndpointConfig) -> Self {
        if let Some(base) = &endpoints.api_base {
            self.api_base = base.clone();
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
impl PlatformClient for InstagramClient {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        let creds = workspace
            .credentials
            .instagram
            .as_ref()
            .ok_or_else(|| http::not_connected(PLATFORM))?;
        let user_id = http::require_numeric(PLATFORM, "user_id", &creds.user_id)?;
        let access_token = http::require_field(PLATFORM, "access_token", &creds.access_token)?;
        self.session = Some(Session {
            user_id: user_id.to_string(),
            access_token: access_token.to_string(),
        });
        debug!(workspace_id = %workspace.id, "instagram client authenticated");
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        let session = self.session()?;
        let video_url = video.require_file_url()?;

        let body = json!({
            "media_type": "REELS",
            "video_url": video_url,
            "caption": video.caption(),
            "access_token": session.access_token,
        });
        let container: IdResponse = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(
                    &self.api_base,
                    &format!("{}/media", session.user_id),
                ))
                .json(&body),
        )
        .await?;

        info!(video_id = %video.id, container_id = %container.id, "instagram container created");
        Ok(container.id)
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        let session = self.session()?;
        let creation_id = video.require_external_id(PLATFORM)?;

        let published: IdResponse = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(
                    &self.api_base,
                    &format!("{}/media_publish", session.user_id),
                ))
                .json(&json!({
                    "creation_id": creation_id,
                    "access_token": session.access_token,
                })),
        )
        .await?;

        info!(video_id = %video.id, media_id = %published.id, "instagram reel published");
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
