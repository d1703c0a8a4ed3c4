// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Video metadata and per-platform external identifiers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VidcastError;
use crate::types::{Platform, VideoStatus, new_id};

/// A unit of content owned by a tenant and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Local path of the rendered file, used by clients that push bytes.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Publicly reachable URL, used by clients that let the platform pull.
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub s3_key: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    pub status: VideoStatus,
    /// Media id assigned by each platform on upload.
    #[serde(default)]
    pub external_ids: BTreeMap<Platform, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Creates a video record in the `uploading` state.
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            file_path: None,
            file_url: None,
            s3_bucket: None,
            s3_key: None,
            format: None,
            status: VideoStatus::Uploading,
            external_ids: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == VideoStatus::Ready
    }

    /// Fails with [`VidcastError::VideoNotReady`] unless the video is `ready`.
    pub fn ensure_ready(&self) -> Result<(), VidcastError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(VidcastError::VideoNotReady {
                video_id: self.id.clone(),
                status: self.status,
            })
        }
    }

    /// Records the media id a platform assigned on upload.
    ///
    /// Only the entry for `platform` is touched.
    pub fn set_external_id(&mut self, platform: Platform, id: impl Into<String>) {
        self.external_ids.insert(platform, id.into());
        self.updated_at = Utc::now();
    }

    pub fn external_id(&self, platform: Platform) -> Option<&str> {
        self.external_ids.get(&platform).map(String::as_str)
    }

    /// Like [`external_id`](Self::external_id) but fails when the platform
    /// has not assigned an id yet.
    pub fn require_external_id(&self, platform: Platform) -> Result<&str, VidcastError> {
        self.external_id(platform).ok_or_else(|| {
            VidcastError::Validation(format!(
                "video {} has no {platform} media id; upload first",
                self.id
            ))
        })
    }

    /// Local file path, or a validation error.
    pub fn require_file_path(&self) -> Result<&str, VidcastError> {
        self.file_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                VidcastError::Validation(format!("video {} has no local file path", self.id))
            })
    }

    /// Public file URL, or a validation error.
    pub fn require_file_url(&self) -> Result<&str, VidcastError> {
        self.file_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                VidcastError::Validation(format!("video {} has no public file URL", self.id))
            })
    }

    /// Caption text used by platforms without separate title and description.
    pub fn caption(&self) -> String {
        let mut caption = self.title.clone();
        if !self.description.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&self.description);
        }
        let hashtags: Vec<String> = self
            .tags
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{}", t.trim_start_matches('#')))
            .collect();
        if !hashtags.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&hashtags.join(" "));
        }
        caption
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_external_id_touches_only_that_platform() {
        let mut video = Video::new("t1", "u1", "Launch");
        video.set_external_id(Platform::Tiktok, "tt-1");
        assert_eq!(video.external_id(Platform::Tiktok), Some("tt-1"));
        assert_eq!(video.external_ids.len(), 1);
        for platform in Platform::ALL.into_iter().filter(|p| *p != Platform::Tiktok) {
            assert_eq!(video.external_id(platform), None);
        }
    }

    #[test]
    fn ensure_ready_rejects_processing_video() {
        let mut video = Video::new("t1", "u1", "Launch");
        video.status = VideoStatus::Processing;
        let err = video.ensure_ready().unwrap_err();
        assert!(matches!(
            err,
            VidcastError::VideoNotReady { status: VideoStatus::Processing, .. }
        ));

        video.status = VideoStatus::Ready;
        assert!(video.ensure_ready().is_ok());
    }

    #[test]
    fn require_external_id_reports_missing_upload() {
        let video = Video::new("t1", "u1", "Launch");
        let err = video.require_external_id(Platform::Youtube).unwrap_err();
        assert!(err.to_string().contains("youtube"));
    }

    #[test]
    fn caption_includes_hashtags() {
        let mut video = Video::new("t1", "u1", "Launch");
        video.description = "New release".into();
        video.tags = vec!["rust".into(), "#video".into()];
        assert_eq!(video.caption(), "Launch\n\nNew release\n\n#rust #video");
    }

    #[test]
    fn external_ids_serialize_by_platform_name() {
        let mut video = Video::new("t1", "u1", "Launch");
        video.set_external_id(Platform::Youtube, "yt-42");
        let json = serde_json::to_value(&video.external_ids).unwrap();
        assert_eq!(json, serde_json::json!({"youtube": "yt-42"}));
    }
}
