// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vidcast publication pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::types::{JobStatus, Platform, VideoStatus};

/// The primary error type used across platform clients, stores, and services.
#[derive(Debug, Error)]
pub enum VidcastError {
    /// Process configuration errors (invalid TOML, bad endpoint overrides).
    #[error("configuration error: {0}")]
    Config(String),

    /// Workspace credentials for a platform are missing or malformed.
    #[error("{platform} credentials invalid: {message}")]
    Credentials { platform: Platform, message: String },

    /// A client operation was invoked before `authenticate`.
    #[error("{platform} client is not authenticated")]
    NotAuthenticated { platform: Platform },

    /// The platform integration does not implement this operation.
    ///
    /// Callers must treat this as permanent, never as "no data yet".
    #[error("{operation} not implemented for {platform}")]
    Unsupported {
        platform: Platform,
        operation: &'static str,
    },

    /// The client factory was asked for an identifier outside the known set.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Network or platform API failure.
    #[error("{platform} API error: {message}")]
    Platform {
        platform: Platform,
        message: String,
        /// HTTP status when the platform answered at all.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input supplied by the caller.
    #[error("validation error: {0}")]
    Validation(String),

    /// Publish attempted on a video that has not finished processing.
    #[error("video {video_id} is not ready for publishing (status: {status})")]
    VideoNotReady { video_id: String, status: VideoStatus },

    /// Publication job state machine violation.
    #[error("job {job_id}: cannot {action} a job in status {from}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        action: &'static str,
    },

    /// A job changed (or was deleted) between read and write; nothing was written.
    #[error("job {job_id} changed concurrently, expected status {expected}")]
    Conflict { job_id: String, expected: JobStatus },

    /// Requested record does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VidcastError {
    /// Builds a `Platform` error from a transport failure.
    pub fn transport(platform: Platform, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        VidcastError::Platform {
            platform,
            message: format!("HTTP request failed: {err}"),
            status: None,
            source: Some(Box::new(err)),
        }
    }

    /// True for the stable "operation not implemented" marker.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, VidcastError::Unsupported { .. })
    }

    /// True when the failure stems from workspace credentials.
    pub fn is_credentials(&self) -> bool {
        matches!(
            self,
            VidcastError::Credentials { .. } | VidcastError::NotAuthenticated { .. }
        )
    }

    /// True when a job is no longer in a state the caller may act on:
    /// another writer got there first, or the transition is not allowed.
    pub fn is_superseded(&self) -> bool {
        matches!(
            self,
            VidcastError::Conflict { .. } | VidcastError::InvalidTransition { .. }
        )
    }

    /// Whether repeating the same call could plausibly succeed.
    ///
    /// Transport failures, rate limits, server errors and timeouts qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            VidcastError::Platform { status: None, .. } => true,
            VidcastError::Platform {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            VidcastError::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for VidcastError {
    fn from(err: serde_json::Error) -> Self {
        VidcastError::Internal(format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_is_distinguishable() {
        let err = VidcastError::Unsupported {
            platform: Platform::Snapchat,
            operation: "fetch stats",
        };
        assert!(err.is_unsupported());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "fetch stats not implemented for snapchat");
    }

    #[test]
    fn retryable_classification() {
        let server = VidcastError::Platform {
            platform: Platform::Youtube,
            message: "boom".into(),
            status: Some(503),
            source: None,
        };
        let rejected = VidcastError::Platform {
            platform: Platform::Youtube,
            message: "bad request".into(),
            status: Some(400),
            source: None,
        };
        let limited = VidcastError::Platform {
            platform: Platform::Tiktok,
            message: "slow down".into(),
            status: Some(429),
            source: None,
        };
        assert!(server.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(limited.is_retryable());
        assert!(VidcastError::Timeout { duration: Duration::from_secs(1) }.is_retryable());
        assert!(!VidcastError::UnsupportedPlatform("myspace".into()).is_retryable());
    }

    #[test]
    fn lost_races_are_superseded() {
        let conflict = VidcastError::Conflict {
            job_id: "j1".into(),
            expected: JobStatus::Pending,
        };
        assert!(conflict.is_superseded());
        assert!(!conflict.is_retryable());
        assert_eq!(conflict.to_string(), "job j1 changed concurrently, expected status pending");
        assert!(!VidcastError::NotFound { entity: "video", id: "v".into() }.is_superseded());
    }

    #[test]
    fn credential_errors_are_flagged() {
        let err = VidcastError::Credentials {
            platform: Platform::Instagram,
            message: "user_id is empty".into(),
        };
        assert!(err.is_credentials());
        assert!(VidcastError::NotAuthenticated { platform: Platform::Facebook }.is_credentials());
        assert!(!VidcastError::Validation("x".into()).is_credentials());
    }
}
