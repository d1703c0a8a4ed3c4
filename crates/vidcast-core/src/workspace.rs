// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workspaces: a user's named bundle of per-platform credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Platform, new_id};

/// A user's platform credential bundle, scoped to a tenant and user.
///
/// Only an external OAuth refresh flow mutates the credentials; the
/// publication pipeline treats a workspace as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub credentials: PlatformCredentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Creates a workspace with no connected platforms.
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            name: name.into(),
            credentials: PlatformCredentials::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the credential slot for `platform` is populated.
    pub fn is_connected(&self, platform: Platform) -> bool {
        self.credentials.is_connected(platform)
    }
}

/// One optional credential slot per supported platform.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<YoutubeCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<TiktokCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<InstagramCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<FacebookCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapchat: Option<SnapchatCredentials>,
}

impl PlatformCredentials {
    /// Whether a slot exists for `platform`. Field contents are not checked here.
    pub fn is_connected(&self, platform: Platform) -> bool {
        match platform {
            Platform::Youtube => self.youtube.is_some(),
            Platform::Tiktok => self.tiktok.is_some(),
            Platform::Instagram => self.instagram.is_some(),
            Platform::Facebook => self.facebook.is_some(),
            Platform::Twitter => self.twitter.is_some(),
            Platform::Snapchat => self.snapchat.is_some(),
        }
    }

    /// Platforms with a populated slot.
    pub fn connected(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.is_connected(*p))
            .collect()
    }
}

// Tokens must never reach log output, so only the connected set is shown.
impl std::fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field("connected", &self.connected())
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct YoutubeCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TiktokCredentials {
    pub client_key: String,
    pub access_token: String,
    #[serde(default)]
    pub open_id: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct InstagramCredentials {
    /// Numeric Instagram business account id.
    pub user_id: String,
    pub access_token: String,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FacebookCredentials {
    pub app_id: String,
    pub app_secret: String,
    /// Numeric page id.
    pub page_id: String,
    pub page_token: String,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TwitterCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SnapchatCredentials {
    pub profile_id: String,
    pub access_token: String,
}
