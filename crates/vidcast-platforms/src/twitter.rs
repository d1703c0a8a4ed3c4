// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! X (Twitter) API v2 client.
//!
//! Upload runs the chunked media flow (initialize, append, finalize, then
//! status polling while the video is processed). Publish posts a tweet that
//! attaches the media id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use vidcast_config::model::EndpointConfig;
use vidcast_core::{Platform, PlatformClient, VidcastError, Video, VideoStats, Workspace};

use crate::http;

const API_BASE: &str = "https://api.x.com/2";

const PLATFORM: Platform = Platform::Twitter;

const CHUNK_SIZE: usize = 1024 * 1024;
const MAX_TWEET_CHARS: usize = 280;
const MAX_STATUS_POLLS: u32 = 20;
const MAX_CHECK_AFTER_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaEnvelope {
    data: MediaData,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    id: String,
    #[serde(default)]
    processing_info: Option<ProcessingInfo>,
}

#[derive(Debug, Deserialize)]
struct ProcessingInfo {
    state: String,
    #[serde(default)]
    check_after_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TweetEnvelope {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

impl TwitterClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: API_BASE.to_string(),
            upload_base: API_BASE.to_string(),
            access_token: None,
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

    fn bearer(&self) -> Result<String, VidcastError> {
        self.access_token
            .as_ref()
            .map(|t| format!("Bearer {t}"))
            .ok_or(VidcastError::NotAuthenticated { platform: PLATFORM })
    }

    async fn append_chunks(
        &self,
        bearer: &str,
        media_id: &str,
        mime: &str,
        file: &mut http::VideoFile,
    ) -> Result<(), VidcastError> {
        let url = http::endpoint(&self.upload_base, &format!("media/upload/{media_id}/append"));
        let segments = file.len().div_ceil(CHUNK_SIZE as u64);
        let mut segment_index = 0u64;
        loop {
            let chunk = file.next_chunk(CHUNK_SIZE).await?;
            if chunk.is_empty() {
                break;
            }
            debug!(%media_id, segment = segment_index + 1, segments, "appending media segment");
            let part = reqwest::multipart::Part::bytes(chunk)
                .mime_str(mime)
                .map_err(|e| VidcastError::transport(PLATFORM, e))?;
            let form = reqwest::multipart::Form::new()
                .text("segment_index", segment_index.to_string())
                .part("media", part);
            http::send_empty(
                PLATFORM,
                self.http
                    .post(&url)
                    .header(AUTHORIZATION, bearer)
                    .multipart(form),
            )
            .await?;
            segment_index += 1;
        }
        Ok(())
    }

    /// Polls the status endpoint until processing succeeds, fails, or the
    /// poll budget runs out.
    async fn wait_for_processing(&self, bearer: &str, media_id: &str) -> Result<(), VidcastError> {
        let url = http::url_with_params(
            PLATFORM,
            &self.upload_base,
            "media/upload",
            &[("command", "STATUS"), ("media_id", media_id)],
        )?;

        for _ in 0..MAX_STATUS_POLLS {
            let status: MediaEnvelope = http::send_json(
                PLATFORM,
                self.http.get(url.clone()).header(AUTHORIZATION, bearer),
            )
            .await?;

            let Some(info) = status.data.processing_info else {
                return Ok(());
            };
            match info.state.as_str() {
                "succeeded" => return Ok(()),
                "failed" => {
                    return Err(VidcastError::Platform {
                        platform: PLATFORM,
                        message: format!("media {media_id} processing failed"),
                        status: Some(422),
                        source: None,
                    });
                }
                _ => {
                    let wait = info.check_after_secs.unwrap_or(5).min(MAX_CHECK_AFTER_SECS);
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
            }
        }

        warn!(%media_id, "media still processing after status poll budget");
        Err(VidcastError::Platform {
            platform: PLATFORM,
            message: format!("media {media_id} still processing after {MAX_STATUS_POLLS} polls"),
            status: None,
            source: None,
        })
    }
}

#[async_trait]
impl PlatformClient for TwitterClient {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    async fn authenticate(&mut self, workspace: &Workspace) -> Result<(), VidcastError> {
        let creds = workspace
            .credentials
            .twitter
            .as_ref()
            .ok_or_else(|| http::not_connected(PLATFORM))?;
        let token = http::require_field(PLATFORM, "access_token", &creds.access_token)?;
        self.access_token = Some(token.to_string());
        debug!(workspace_id = %workspace.id, "twitter client authenticated");
        Ok(())
    }

    async fn upload(&self, video: &Video) -> Result<String, VidcastError> {
        let bearer = self.bearer()?;
        let file_path = video.require_file_path()?;
        let mut file = http::VideoFile::open(file_path).await?;
        let size = file.len();
        let mime = http::video_mime(video.format.as_deref());

        let init: MediaEnvelope = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(&self.upload_base, "media/upload/initialize"))
                .header(AUTHORIZATION, &bearer)
                .json(&json!({
                    "media_type": mime,
                    "total_bytes": size,
                    "media_category": "tweet_video",
                })),
        )
        .await?;
        let media_id = init.data.id;

        self.append_chunks(&bearer, &media_id, mime, &mut file).await?;

        let finalized: MediaEnvelope = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(
                    &self.upload_base,
                    &format!("media/upload/{media_id}/finalize"),
                ))
                .header(AUTHORIZATION, &bearer),
        )
        .await?;
        if finalized
            .data
            .processing_info
            .is_some_and(|info| info.state != "succeeded")
        {
            self.wait_for_processing(&bearer, &media_id).await?;
        }

        info!(video_id = %video.id, %media_id, bytes = size, "twitter media uploaded");
        Ok(media_id)
    }

    async fn publish(&self, video: &Video, _workspace: &Workspace) -> Result<(), VidcastError> {
        let bearer = self.bearer()?;
        let media_id = video.require_external_id(PLATFORM)?;
        let text: String = video.caption().chars().take(MAX_TWEET_CHARS).collect();

        let tweet: TweetEnvelope = http::send_json(
            PLATFORM,
            self.http
                .post(http::endpoint(&self.api_base, "tweets"))
                .header(AUTHORIZATION, bearer)
                .json(&json!({
                    "text": text,
                    "media": { "media_ids": [media_id] },
                })),
        )
        .await?;

        info!(video_id = %video.id, tweet_id = %tweet.data.id, "tweet posted");
        Ok(())
    }

    async fn fetch_stats(&self, _video: &Video) -> Result<VideoStats, VidcastError> {
        self.bearer()?;
        Err(VidcastError::Unsupported {
            platform: PLATFORM,
            operation: "fetch stats",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vidcast_core::workspace::TwitterCredentials;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new("t1", "u1", "x");
        ws.credentials.twitter = Some(TwitterCredentials {
            access_token: "x-token".into(),
            refresh_token: None,
        });
        ws
    }

    async fn authed(server: &MockServer) -> TwitterClient {
        let mut c = TwitterClient::new(reqwest::Client::new()).with_endpoints(&EndpointConfig {
            api_base: Some(server.uri()),
            upload_base: None,
        });
        c.authenticate(&workspace()).await.unwrap();
        c
    }

    fn video_on_disk(dir: &tempfile::TempDir, bytes: usize) -> Video {
        let file_path = dir.path().join("clip.mp4");
        let mut f = std::fs::File::create(&file_path).unwrap();
        f.write_all(&vec![7u8; bytes]).unwrap();
        let mut v = Video::new("t1", "u1", "Clip");
        v.file_path = Some(file_path.to_string_lossy().into_owned());
        v
    }

    #[tokio::test]
    async fn chunked_upload_appends_every_segment() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let video = video_on_disk(&dir, CHUNK_SIZE + 10);

        Mock::given(method("POST"))
            .and(path("/media/upload/initialize"))
            .and(body_partial_json(json!({
                "media_type": "video/mp4",
                "total_bytes": CHUNK_SIZE + 10,
                "media_category": "tweet_video"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "m-1"}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/media/upload/m-1/append"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/media/upload/m-1/finalize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "m-1", "processing_info": {"state": "pending", "check_after_secs": 0}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/media/upload"))
            .and(query_param("command", "STATUS"))
            .and(query_param("media_id", "m-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "m-1", "processing_info": {"state": "succeeded"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let c = authed(&server).await;
        assert_eq!(c.upload(&video).await.unwrap(), "m-1");
    }

    #[tokio::test]
    async fn failed_processing_is_not_retryable() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let video = video_on_disk(&dir, 16);

        Mock::given(method("POST"))
            .and(path("/media/upload/initialize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "m-2"}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/media/upload/m-2/append"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/media/upload/m-2/finalize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "m-2", "processing_info": {"state": "in_progress", "check_after_secs": 0}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/media/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "m-2", "processing_info": {"state": "failed"}}
            })))
            .mount(&server)
            .await;

        let c = authed(&server).await;
        let err = c.upload(&video).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("processing failed"));
    }

    #[tokio::test]
    async fn upload_without_file_path_is_validation_error() {
        let server = MockServer::start().await;
        let c = authed(&server).await;
        let err = c.upload(&Video::new("t1", "u1", "nofile")).await.unwrap_err();
        assert!(matches!(err, VidcastError::Validation(_)));
    }

    #[tokio::test]
    async fn publish_posts_tweet_with_media() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tweets"))
            .and(body_partial_json(json!({
                "text": "Clip",
                "media": {"media_ids": ["m-1"]}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"id": "1790000000000000000", "text": "Clip"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let c = authed(&server).await;
        let mut video = Video::new("t1", "u1", "Clip");
        video.set_external_id(Platform::Twitter, "m-1");
        c.publish(&video, &workspace()).await.unwrap();
    }

    #[test]
    fn upload_base_overrides_api_base() {
        let c = TwitterClient::new(reqwest::Client::new()).with_endpoints(&EndpointConfig {
            api_base: Some("http://api.local".into()),
            upload_base: Some("http://upload.local".into()),
        });
        assert_eq!(c.api_base, "http://api.local");
        assert_eq!(c.upload_base, "http://upload.local");
    }
}
