// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the publication pipeline and its collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod catalog;
pub mod client;
pub mod jobs;
pub mod stats;

pub use catalog::CatalogStore;
pub use client::{ClientFactory, PlatformClient};
pub use jobs::JobStore;
pub use stats::StatsStore;
