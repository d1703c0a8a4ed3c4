// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vidcast publication pipeline.
//!
//! Defines the domain models (workspaces, videos, stats, publication jobs),
//! the error taxonomy, and the traits implemented by platform clients and
//! storage backends.

pub mod error;
pub mod job;
pub mod stats;
pub mod traits;
pub mod types;
pub mod video;
pub mod workspace;

pub use error::VidcastError;
pub use job::{DEFAULT_MAX_RETRIES, NewPublicationJob, PublicationJob};
pub use stats::{StatsAggregation, VideoStats, VideoStatsSnapshot};
pub use types::{JobStatus, Platform, VideoStatus};
pub use video::Video;
pub use workspace::{PlatformCredentials, Workspace};

pub use traits::{CatalogStore, ClientFactory, JobStore, PlatformClient, StatsStore};
