// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication orchestration for Vidcast.
//!
//! - [`PublicationService`] runs the authenticate, upload, publish and
//!   fetch-stats sequence against one platform.
//! - [`JobService`] persists publication jobs and their state transitions.
//! - [`JobRunner`] executes due and pending jobs in the background.

pub mod jobs;
pub mod recording;
pub mod runner;
pub mod service;

pub use jobs::{JobService, JobUpdate};
pub use recording::{install_exporter, register_metrics};
pub use runner::{JobOutcome, JobRunner, RunnerSettings, SweepReport};
pub use service::{PublicationService, PublishProgress, PublishStage, StageFailure};
