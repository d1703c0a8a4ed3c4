// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform clients for the Vidcast publication pipeline.
//!
//! One [`PlatformClient`](vidcast_core::PlatformClient) implementation per
//! supported platform, plus the [`ClientRegistry`] that builds them by
//! identifier.

pub mod facebook;
pub(crate) mod http;
pub mod instagram;
pub mod registry;
pub mod snapchat;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

pub use facebook::FacebookClient;
pub use http::build_http_client;
pub use instagram::InstagramClient;
pub use registry::{ClientConstructor, ClientRegistry};
pub use snapchat::SnapchatClient;
pub use tiktok::TiktokClient;
pub use twitter::TwitterClient;
pub use youtube::YoutubeClient;
