// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YouTube Data API v3 client.
//!
//! Uploads go through the resumable protocol: a metadata request opens an
//! upload session and the file bytes are PUT to the returned location. The
//! video is inserted as `private` and flipped to `public` on publish.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, LOCATION};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use vidcast_config::model::EndpointConfig;
use vidcast_core::{Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

use crate::http;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

const PLATFORM: Platform = Platform::Youtube;

/// YouTube client. Holds a bearer token once authenticated.
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<StatisticsItem>,
}

#[derive(Debug, Deserialize)]
struct StatisticsItem {
    statistics: Statistics,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    dislike_count: Option<String>,
    comment_count: Option<String>,
}

fn count(value: &Option<String>) -> i64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

impl YoutubeClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
            access_token: None,
        }
    }

    /// Applies configured endpoint overrides.
    pub fn with_endpoints(mut self, endpoints: &EndpointConfig) -> Self {
        if let Some(base) = &endpoints.api_base {
            self.api_base = base.clone();
        }
        if let Some(base) = &endpoints.upload_base {
            self.upload_base = base.clone();
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
impl PlatformClient for YoutubeClient {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        let creds = workspace
            .credentials
            .youtube
            .as_ref()
            .ok_or_else(|| http::not_connected(PLATFORM))?;
        let token = http::require_field(PLATFORM, "access_token", &creds.access_token)?;
        self.access_token = Some(token.to_string());
        debug!(workspace_id = %workspace.id, "youtube client authenticated");
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        let bearer = self.bearer()?;
        let path = video.require_file_path()?;
        let file = http::VideoFile::open(path).await?;
        let size = file.len();
        let mime = http::video_mime(video.format.as_deref());

        let url = http::url_with_params(
            PLATFORM,
            &self.upload_base,
            "videos",
            &[("uploadType", "resumable"), ("part", "snippet,status")],
        )?;
        let metadata = json!({
            "snippet": {
                "title": video.title,
                "description": video.description,
                "tags": video.tags,
            },
            "status": { "privacyStatus": "private" },
        });

        let session = http::ensure_success(
            PLATFORM,
            http::send(
                PLATFORM,
                self.http
                    .post(url)
                    .header(AUTHORIZATION, &bearer)
                    .header("X-Upload-Content-Type", mime)
                    .header("X-Upload-Content-Length", size)
                    .json(&metadata),
            )
            .await?,
        )
        .await?;

        let location = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| VidcastError::Platform {
                platform: PLATFORM,
                message: "resumable upload session returned no Location header".to_string(),
                status: Some(session.status().as_u16()),
                source: None,
            })?;

        debug!(video_id = %video.id, size, "streaming video bytes to youtube");
        let resource: VideoResource = http::send_json(
            PLATFORM,
            self.http
                .put(location)
                .header(AUTHORIZATION, &bearer)
                .header(reqwest::header::CONTENT_TYPE, mime)
                .header(reqwest::header::CONTENT_LENGTH, size)
                .body(file.into_body()),
        )
        .await?;

        info!(video_id = %video.id, youtube_id = %resource.id, "youtube upload complete");
        Ok(resource.id)
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        let bearer = self.bearer()?;
        let id = video.require_external_id(PLATFORM)?;
        let url = http::url_with_params(PLATFORM, &self.api_base, "videos", &[("part", "status")])?;

        http::send_empty(
            PLATFORM,
            self.http
                .put(url)
                .header(AUTHORIZATION, bearer)
                .json(&json!({ "id": id, "status": { "privacyStatus": "public" } })),
        )
        .await
    }

    async fn fetch_stats(&self, video: &Video) -> Result<VideoStats, VidcastError> {
        let bearer = self.bearer()?;
        let id = video.require_external_id(PLATFORM)?;
        let url = http::url_with_params(
            PLATFORM,
            &self.api_base,
            "videos",
            &[("part", "statistics"), ("id", id)],
        )?;

        let list: VideoListResponse =
            http::send_json(PLATFORM, self.http.get(url).header(AUTHORIZATION, bearer)).await?;
        let item = list.items.into_iter().next().ok_or_else(|| VidcastError::Platform {
            platform: PLATFORM,
            message: format!("video {id} not found"),
            status: Some(404),
            source: None,
        })?;

        let mut stats = VideoStats::for_video(video, PLATFORM);
        stats.views = count(&item.statistics.view_count);
        stats.likes = count(&item.statistics.like_count);
        stats.dislikes = count(&item.statistics.dislike_count);
        stats.comments = count(&item.statistics.comment_count);
        stats.compute_engagement();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcast_core::VideoStatus;
    use vidcast_core::workspace::YoutubeCredentials;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn workspace(token: &str) -> Workspace {
        let mut ws = Workspace::new("t1", "u1", "channel");
        ws.credentials.youtube = Some(YoutubeCredentials {
            access_token: token.to_string(),
            ..Default::default()
        });
        ws
    }

    fn client(server: &MockServer) -> YoutubeClient {
        YoutubeClient::new(reqwest::Client::new()).with_endpoints(&EndpointConfig {
            api_base: Some(server.uri()),
            upload_base: Some(format!("{}/upload", server.uri())),
        })
    }

    fn ready_video() -> Video {
        let mut video = Video::new("t1", "u1", "Launch day");
        video.status = VideoStatus::Ready;
        video
    }

    #[tokio::test]
    async fn authenticate_requires_token() {
        let mut c = YoutubeClient::new(reqwest::Client::new());
        let err = c.authenticate(&workspace("  ")).await.unwrap_err();
        assert!(err.is_credentials());

        let err = c
            .authenticate(&Workspace::new("t1", "u1", "empty"))
            .await
            .unwrap_err();
        assert!(err.is_credentials());
    }

    #[tokio::test]
    async fn calls_before_authenticate_are_rejected() {
        let c = YoutubeClient::new(reqwest::Client::new());
        let err = c.upload(&ready_video()).await.unwrap_err();
        assert!(matches!(err, VidcastError::NotAuthenticated { platform: Platform::Youtube }));
    }

    #[tokio::test]
    async fn resumable_upload_returns_video_id() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"fake-mp4-bytes").unwrap();

        Mock::given(method("POST"))
            .and(path("/upload/videos"))
            .and(query_param("uploadType", "resumable"))
            .and(header("authorization", "Bearer ya29.token"))
            .and(body_partial_json(json!({"status": {"privacyStatus": "private"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Location", format!("{}/upload/session/abc", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/upload/session/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "yt-42"})))
            .mount(&server)
            .await;

        let mut c = client(&server);
        c.authenticate(&workspace("ya29.token")).await.unwrap();
        let mut video = ready_video();
        video.file_path = Some(file.to_string_lossy().into_owned());

        assert_eq!(c.upload(&video).await.unwrap(), "yt-42");
    }

    #[tokio::test]
    async fn upload_without_file_is_validation_error() {
        let server = MockServer::start().await;
        let mut c = client(&server);
        c.authenticate(&workspace("tok")).await.unwrap();
        let err = c.upload(&ready_video()).await.unwrap_err();
        assert!(matches!(err, VidcastError::Validation(_)));
    }

    #[tokio::test]
    async fn publish_flips_privacy_to_public() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/videos"))
            .and(query_param("part", "status"))
            .and(body_partial_json(json!({"id": "yt-42", "status": {"privacyStatus": "public"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "yt-42"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut c = client(&server);
        let ws = workspace("tok");
        c.authenticate(&ws).await.unwrap();
        let mut video = ready_video();
        video.set_external_id(Platform::Youtube, "yt-42");
        c.publish(&video, &ws).await.unwrap();
    }

    #[tokio::test]
    async fn publish_requires_media_id() {
        let server = MockServer::start().await;
        let mut c = client(&server);
        let ws = workspace("tok");
        c.authenticate(&ws).await.unwrap();
        let err = c.publish(&ready_video(), &ws).await.unwrap_err();
        assert!(matches!(err, VidcastError::Validation(_)));
    }

    #[tokio::test]
    async fn fetch_stats_parses_string_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("part", "statistics"))
            .and(query_param("id", "yt-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "yt-42",
                    "statistics": {
                        "viewCount": "1000",
                        "likeCount": "80",
                        "commentCount": "20"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let mut c = client(&server);
        c.authenticate(&workspace("tok")).await.unwrap();
        let mut video = ready_video();
        video.set_external_id(Platform::Youtube, "yt-42");

        let stats = c.fetch_stats(&video).await.unwrap();
        assert_eq!(stats.views, 1000);
        assert_eq!(stats.likes, 80);
        assert_eq!(stats.comments, 20);
        assert_eq!(stats.dislikes, 0);
        assert_eq!(stats.external_id.as_deref(), Some("yt-42"));
        assert!((stats.engagement_rate - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn fetch_stats_for_unknown_video_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let mut c = client(&server);
        c.authenticate(&workspace("tok")).await.unwrap();
        let mut video = ready_video();
        video.set_external_id(Platform::Youtube, "gone");
        let err = c.fetch_stats(&video).await.unwrap_err();
        assert!(matches!(err, VidcastError::Platform { status: Some(404), .. }));
    }
}
