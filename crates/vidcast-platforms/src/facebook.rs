// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Page video client.
//!
//! Videos are uploaded unpublished from their public URL and flipped to
//! published afterwards. Every call is signed with `appsecret_proof`.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{debug, info};

use vidcast_config::model::EndpointConfig;
use vidcast_core::{Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

use crate::http;
use crate::instagram::GRAPH_BASE;

type HmacSha256 = Hmac<Sha256>;

const PLATFORM: Platform = Platform::Facebook;

const STATS_FIELDS: &str = "views,likes.summary(true),comments.summary(true)";

#[derive(Clone)]
pub struct FacebookClient {
    http: reqwest::Client,
    api_base: String,
    session: Option<Session>,
}

#[derive(Clone)]
struct Session {
    page_id: String,
    page_token: String,
    appsecret_proof: String,
}

impl std::fmt::Debug for FacebookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacebookClient")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.session.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SuccessResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    total_count: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Edge {
    #[serde(default)]
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct VideoFields {
    #[serde(default)]
    views: i64,
    #[serde(default)]
    likes: Edge,
    #[serde(default)]
    comments: Edge,
}

/// `hex(HMAC-SHA256(key = app_secret, message = access_token))`.
pub fn appsecret_proof(app_secret: &str, access_token: &str) -> Result<String, VidcastError> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).map_err(|e| {
        VidcastError::Credentials {
            platform: PLATFORM,
            message: format!("invalid app_secret: {e}"),
        }
    })?;
    mac.update(access_token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

impl FacebookClient {
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
impl PlatformClient for FacebookClient {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        let creds = workspace
            .credentials
            .facebook
            .as_ref()
            .ok_or_else(|| http::not_connected(PLATFORM))?;
        http::require_field(PLATFORM, "app_id", &creds.app_id)?;
        let app_secret = http::require_field(PLATFORM, "app_secret", &creds.app_secret)?;
        let page_id = http::require_numeric(PLATFORM, "page_id", &creds.page_id)?;
        let page_token = http::require_field(PLATFORM, "page_token", &creds.page_token)?;

        self.session = Some(Session {
            page_id: page_id.to_string(),
            page_token: page_token.to_string(),
            appsecret_proof: appsecret_proof(app_secret, page_token)?,
        });
        debug!(workspace_id = %workspace.id, "facebook client authenticated");
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        let session = self.session()?;
        let file_url = video.require_file_url()?;

        let body = json!({
            "file_url": file_url,
            "title": video.title,
            "description": video.caption(),
            "published": false,
            "access_token": session.page_token,
            "appsecret_proof": session.appsecret_proof,
        });
        let created: IdResponse = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(
                    &self.api_base,
                    &format!("{}/videos", session.page_id),
                ))
                .json(&body),
        )
        .await?;

        info!(video_id = %video.id, facebook_id = %created.id, "facebook video uploaded unpublished");
        Ok(created.id)
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        let session = self.session()?;
        let facebook_id = video.require_external_id(PLATFORM)?;

        let response: SuccessResponse = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(&self.api_base, facebook_id))
                .json(&json!({
                    "published": true,
                    "access_token": session.page_token,
                    "appsecret_proof": session.appsecret_proof,
                })),
        )
        .await?;

        if !response.success {
            return Err(VidcastError::Platform {
                platform: PLATFORM,
                message: format!("publishing video {facebook_id} was not acknowledged"),
                status: None,
                source: None,
            });
        }
        Ok(())
    }

    async fn fetch_stats(&self, video: &Video) -> Result<VideoStats, VidcastError> {
        let session = self.session()?;
        let facebook_id = video.require_external_id(PLATFORM)?;

        let url = http::url_with_params(
            PLATFORM,
            &self.api_base,
            facebook_id,
            &[
                ("fields", STATS_FIELDS),
                ("access_token", &session.page_token),
                ("appsecret_proof", &session.appsecret_proof),
            ],
        )?;
        let fields: VideoFields = http::send_json(PLATFORM, self.http.get(url)).await?;

        let mut stats = VideoStats::for_video(video, PLATFORM);
        stats.views = fields.views;
        stats.likes = fields.likes.summary.total_count;
        stats.comments = fields.comments.summary.total_count;
        stats.compute_engagement();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcast_core::workspace::FacebookCredentials;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new("t1", "u1", "fb");
        ws.credentials.facebook = Some(FacebookCredentials {
            app_id: "app".into(),
            app_secret: "shh".into(),
            page_id: "1029".into(),
            page_token: "EAAB".into(),
        });
        ws
    }

    async fn authed(server: &MockServer) -> FacebookClient {
        let mut c = FacebookClient::new(reqwest::Client::new()).with_endpoints(&EndpointConfig {
            api_base: Some(server.uri()),
            upload_base: None,
        });
        c.authenticate(&workspace()).await.unwrap();
        c
    }

    fn video() -> Video {
        let mut v = Video::new("t1", "u1", "Keynote");
        v.file_url = Some("https://cdn.example.com/keynote.mp4".into());
        v
    }

    #[test]
    fn appsecret_proof_is_hex_hmac() {
        let proof = appsecret_proof("shh", "EAAB").unwrap();
        assert_eq!(proof.len(), 64);
        assert!(proof.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(proof, appsecret_proof("shh", "EAAB").unwrap());
        assert_ne!(proof, appsecret_proof("other", "EAAB").unwrap());
    }

    #[tokio::test]
    async fn authenticate_requires_numeric_page() {
        let mut ws = workspace();
        if let Some(creds) = ws.credentials.facebook.as_mut() {
            creds.page_id = "my-page".into();
        }
        let mut c = FacebookClient::new(reqwest::Client::new());
        let err = c.authenticate(&ws).await.unwrap_err();
        assert!(err.to_string().contains("page_id"));
    }

    #[tokio::test]
    async fn upload_is_unpublished_and_signed() {
        let server = MockServer::start().await;
        let proof = appsecret_proof("shh", "EAAB").unwrap();
        Mock::given(method("POST"))
            .and(path("/1029/videos"))
            .and(body_partial_json(json!({
                "file_url": "https://cdn.example.com/keynote.mp4",
                "published": false,
                "appsecret_proof": proof,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "fbv-1"})))
            .mount(&server)
            .await;

        let c = authed(&server).await;
        assert_eq!(c.upload(&video()).await.unwrap(), "fbv-1");
    }

    #[tokio::test]
    async fn publish_requires_success_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fbv-1"))
            .and(body_partial_json(json!({"published": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let c = authed(&server).await;
        let mut v = video();
        v.set_external_id(Platform::Facebook, "fbv-1");
        let err = c.publish(&v, &workspace()).await.unwrap_err();
        assert!(err.to_string().contains("not acknowledged"));
    }

    #[tokio::test]
    async fn fetch_stats_reads_summaries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fbv-1"))
            .and(query_param("fields", STATS_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "fbv-1",
                "views": 200,
                "likes": {"data": [], "summary": {"total_count": 10}},
                "comments": {"data": [], "summary": {"total_count": 4}}
            })))
            .mount(&server)
            .await;

        let c = authed(&server).await;
        let mut v = video();
        v.set_external_id(Platform::Facebook, "fbv-1");
        let stats = c.fetch_stats(&v).await.unwrap();
        assert_eq!(stats.views, 200);
        assert_eq!(stats.likes, 10);
        assert_eq!(stats.comments, 4);
        assert_eq!(stats.external_id.as_deref(), Some("fbv-1"));
        assert!((stats.engagement_rate - 7.0).abs() < 1e-9);
    }
}
