// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication jobs and their lifecycle state machine.
//!
//! ```text
//!             +-----------+
//!  create --->|  pending  |<-----------------+
//!      \      +-----------+                  | fail (retries left)
//!       \           | start                  |
//!        v          v                        |
//!  +-----------+  start  +------------+------+
//!  | scheduled |-------->| processing |---------> completed
//!  +-----------+         +------------+
//!                              | fail (retries exhausted)
//!                              v
//!                            failed
//! ```
//!
//! Any non-terminal job may be cancelled. The transition methods here are
//! pure; persisting the result is the job service's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VidcastError;
use crate::types::{JobStatus, Platform, new_id};

/// Retry bound applied when a job is created without one (or with zero).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Persisted record for "publish video V to platform P".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationJob {
    pub id: String,
    pub tenant_id: String,
    pub video_id: String,
    pub user_id: String,
    pub platform: Platform,
    pub status: JobStatus,
    /// Opaque platform-specific settings supplied by the requester.
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Request to create a publication job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPublicationJob {
    pub video_id: String,
    pub platform: Platform,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewPublicationJob {
    pub fn new(video_id: impl Into<String>, platform: Platform) -> Self {
        Self {
            video_id: video_id.into(),
            platform,
            config: serde_json::Value::Null,
            max_retries: None,
            scheduled_at: None,
        }
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

impl PublicationJob {
    /// Builds a new job as of `now`.
    ///
    /// The job is `scheduled` only when `scheduled_at` lies strictly after
    /// `now`; a past or present start time yields a `pending` job that keeps
    /// the requested time for reference.
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        request: NewPublicationJob,
        now: DateTime<Utc>,
    ) -> Self {
        let status = match request.scheduled_at {
            Some(at) if at > now => JobStatus::Scheduled,
            _ => JobStatus::Pending,
        };
        let max_retries = match request.max_retries {
            Some(n) if n > 0 => n,
            _ => DEFAULT_MAX_RETRIES,
        };
        Self {
            id: new_id(),
            tenant_id: tenant_id.into(),
            video_id: request.video_id,
            user_id: user_id.into(),
            platform: request.platform,
            status,
            config: request.config,
            external_id: None,
            external_url: None,
            error_message: None,
            retry_count: 0,
            max_retries,
            scheduled_at: request.scheduled_at,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A job is due when it is `scheduled` and its start time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Scheduled && self.scheduled_at.is_some_and(|at| at <= now)
    }

    /// Workspace explicitly chosen by the requester, if any.
    pub fn workspace_id(&self) -> Option<&str> {
        self.config.get("workspace_id").and_then(|v| v.as_str())
    }

    /// `pending`/`scheduled` -> `processing`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), VidcastError> {
        match self.status {
            JobStatus::Pending | JobStatus::Scheduled => {
                self.status = JobStatus::Processing;
                self.started_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            from => Err(self.invalid(from, "start")),
        }
    }

    /// `processing` -> `completed`.
    pub fn complete(
        &mut self,
        external_id: impl Into<String>,
        external_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), VidcastError> {
        match self.status {
            JobStatus::Processing => {
                self.status = JobStatus::Completed;
                self.external_id = Some(external_id.into());
                self.external_url = external_url;
                self.error_message = None;
                self.completed_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            from => Err(self.invalid(from, "complete")),
        }
    }

    /// Records a failed attempt.
    ///
    /// Increments `retry_count` and keeps `message`. The job goes back to
    /// `pending` while retries remain and becomes `failed` once
    /// `retry_count` reaches `max_retries`.
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Result<(), VidcastError> {
        if self.is_terminal() {
            return Err(self.invalid(self.status, "fail"));
        }
        self.retry_count = (self.retry_count + 1).min(self.max_retries);
        self.error_message = Some(message.into());
        self.status = if self.retry_count >= self.max_retries {
            JobStatus::Failed
        } else {
            JobStatus::Pending
        };
        self.updated_at = now;
        Ok(())
    }

    /// Any non-terminal state -> `cancelled`.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), VidcastError> {
        if self.is_terminal() {
            return Err(self.invalid(self.status, "cancel"));
        }
        self.status = JobStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    fn invalid(&self, from: JobStatus, action: &'static str) -> VidcastError {
        VidcastError::InvalidTransition {
            job_id: self.id.clone(),
            from,
            action,
        }
    }
}
