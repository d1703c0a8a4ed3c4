// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for platform clients.
//!
//! Every client maps transport failures and non-2xx responses through these
//! helpers so errors carry the platform, the status code and the body.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use vidcast_config::model::HttpConfig;
use vidcast_core::{Platform, VidcastError};

/// Builds the shared `reqwest` client. No connection is opened here.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client, VidcastError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| VidcastError::Config(format!("failed to build HTTP client: {e}")))
}

/// Sends a request, mapping transport errors to [`VidcastError::Platform`].
pub(crate) async fn send(
    platform: Platform,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, VidcastError> {
    request
        .send()
        .await
        .map_err(|e| VidcastError::transport(platform, e))
}

/// Passes successful responses through; turns anything else into an error
/// carrying the status and body.
pub(crate) async fn ensure_success(
    platform: Platform,
    response: reqwest::Response,
) -> Result<reqwest::Response, VidcastError> {
    let status = response.status();
    debug!(%platform, status = %status, "platform response received");
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(VidcastError::Platform {
        platform,
        message: format!("API returned {status}: {body}"),
        status: Some(status.as_u16()),
        source: None,
    })
}

/// Sends, checks the status, and decodes a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    platform: Platform,
    request: reqwest::RequestBuilder,
) -> Result<T, VidcastError> {
    let response = ensure_success(platform, send(platform, request).await?).await?;
    response.json::<T>().await.map_err(|e| VidcastError::Platform {
        platform,
        message: format!("failed to parse response: {e}"),
        status: None,
        source: Some(Box::new(e)),
    })
}

/// Sends and checks the status, discarding the body.
pub(crate) async fn send_empty(
    platform: Platform,
    request: reqwest::RequestBuilder,
) -> Result<(), VidcastError> {
    ensure_success(platform, send(platform, request).await?).await?;
    Ok(())
}

/// Joins a base URL and path and appends query parameters.
pub(crate) fn url_with_params(
    platform: Platform,
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<reqwest::Url, VidcastError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    reqwest::Url::parse_with_params(&raw, params)
        .map_err(|e| VidcastError::Config(format!("invalid {platform} endpoint `{raw}`: {e}")))
}

/// Joins a base URL and path.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Returns the trimmed value or a credential error naming the field.
pub(crate) fn require_field<'a>(
    platform: Platform,
    field: &str,
    value: &'a str,
) -> Result<&'a str, VidcastError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VidcastError::Credentials {
            platform,
            message: format!("{field} is empty"),
        });
    }
    Ok(trimmed)
}

/// Like [`require_field`] but also insists on an all-digit identifier.
pub(crate) fn require_numeric<'a>(
    platform: Platform,
    field: &str,
    value: &'a str,
) -> Result<&'a str, VidcastError> {
    let trimmed = require_field(platform, field, value)?;
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(VidcastError::Credentials {
            platform,
            message: format!("{field} must be numeric, got `{trimmed}`"),
        });
    }
    Ok(trimmed)
}

/// Error for a workspace with no credential slot for `platform`.
pub(crate) fn not_connected(platform: Platform) -> VidcastError {
    VidcastError::Credentials {
        platform,
        message: "workspace is not connected to this platform".to_string(),
    }
}

/// A local video file opened for upload. Contents are streamed, never
/// loaded whole.
#[derive(Debug)]
pub(crate) struct VideoFile {
    path: String,
    file: tokio::fs::File,
    len: u64,
}

impl VideoFile {
    pub(crate) async fn open(path: &str) -> Result<Self, VidcastError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| unreadable(path, e))?;
        let len = file.metadata().await.map_err(|e| unreadable(path, e))?.len();
        Ok(Self {
            path: path.to_string(),
            file,
            len,
        })
    }

    /// Size in bytes.
    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    /// The remaining contents as a streaming request body.
    pub(crate) fn into_body(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(ReaderStream::new(self.file))
    }

    /// Reads up to `max` bytes. Empty at end of file.
    pub(crate) async fn next_chunk(&mut self, max: usize) -> Result<Vec<u8>, VidcastError> {
        let mut chunk = Vec::with_capacity(max);
        (&mut self.file)
            .take(max as u64)
            .read_to_end(&mut chunk)
            .await
            .map_err(|e| unreadable(&self.path, e))?;
        Ok(chunk)
    }
}

fn unreadable(path: &str, err: std::io::Error) -> VidcastError {
    VidcastError::Validation(format!("cannot read video file `{path}`: {err}"))
}

/// MIME type for a video's container format. Quicktime is sent as MP4.
pub(crate) fn video_mime(format: Option<&str>) -> &'static str {
    match format.map(|f| f.trim_start_matches('.').to_ascii_lowercase()) {
        Some(f) if f == "webm" => "video/webm",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn video_file_reads_in_bounded_chunks() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[1u8; 10]).unwrap();
        let mut file = VideoFile::open(tmp.path().to_str().unwrap()).await.unwrap();
        assert_eq!(file.len(), 10);

        assert_eq!(file.next_chunk(4).await.unwrap().len(), 4);
        assert_eq!(file.next_chunk(4).await.unwrap().len(), 4);
        assert_eq!(file.next_chunk(4).await.unwrap(), vec![1u8; 2]);
        assert!(file.next_chunk(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_video_file_is_validation_error() {
        let err = VideoFile::open("/nonexistent/vidcast/clip.mp4").await.unwrap_err();
        assert!(matches!(err, VidcastError::Validation(ref m) if m.contains("clip.mp4")));
    }

    #[test]
    fn require_field_rejects_whitespace() {
        let err = require_field(Platform::Tiktok, "access_token", "   ").unwrap_err();
        assert!(err.is_credentials());
        assert!(err.to_string().contains("access_token is empty"));
        assert_eq!(require_field(Platform::Tiktok, "x", " ok ").unwrap(), "ok");
    }

    #[test]
    fn require_numeric_rejects_letters() {
        assert!(require_numeric(Platform::Instagram, "user_id", "17841400").is_ok());
        let err = require_numeric(Platform::Instagram, "user_id", "abc123").unwrap_err();
        assert!(err.to_string().contains("must be numeric"));
    }

    #[test]
    fn url_with_params_joins_and_encodes() {
        let url = url_with_params(
            Platform::Youtube,
            "http://localhost:9000/youtube/v3/",
            "/videos",
            &[("part", "statistics"), ("id", "a b")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/youtube/v3/videos?part=statistics&id=a+b"
        );
    }

    #[test]
    fn mime_defaults_to_mp4() {
        assert_eq!(video_mime(None), "video/mp4");
        assert_eq!(video_mime(Some("mov")), "video/mp4");
        assert_eq!(video_mime(Some("WEBM")), "video/webm");
    }

    #[tokio::test]
    async fn non_success_status_becomes_platform_error() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = send_empty(Platform::Facebook, client.get(server.uri()))
            .await
            .unwrap_err();
        match err {
            VidcastError::Platform { status, message, .. } => {
                assert_eq!(status, Some(503));
                assert!(message.contains("maintenance"));
            }
            other => panic!("expected Platform error, got {other:?}"),
        }
    }
}
