// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common enums shared by the domain models, stores, and platform clients.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// An external platform a video can be published to.
///
/// Parsing accepts only the exact lowercase identifier, so `"YouTube"` and
/// `""` are rejected.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
    Facebook,
    Twitter,
    Snapchat,
}

impl Platform {
    /// Every supported platform, in registry order.
    pub const ALL: [Platform; 6] = [
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::Snapchat,
    ];

    /// The lowercase identifier used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Processing state of an uploaded video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Uploading,
    Processing,
    Ready,
    Failed,
    Archived,
}

/// Lifecycle state of a publication job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Scheduled,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Generates a fresh random identifier for a new record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
