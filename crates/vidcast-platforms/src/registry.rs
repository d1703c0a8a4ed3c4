// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of platform client constructors.
//!
//! `ClientRegistry` maps each [`Platform`] to a constructor and hands out a
//! fresh, unauthenticated client per request. Construction never touches the
//! network.

use std::collections::HashMap;
use std::str::FromStr;

use vidcast_config::VidcastConfig;
use vidcast_config::model::{EndpointConfig, PlatformsConfig};
use vidcast_core::{ClientFactory, Platform, PlatformClient, VidcastError};

use crate::http::build_http_client;
use crate::{
    FacebookClient, InstagramClient, SnapchatClient, TiktokClient, TwitterClient, YoutubeClient,
};

/// Builds a client from the shared HTTP client and the platform's endpoints.
pub type ClientConstructor =
    Box<dyn Fn(reqwest::Client, &EndpointConfig) -> Box<dyn PlatformClient> + Send + Sync>;

struct ClientEntry {
    endpoints: EndpointConfig,
    constructor: ClientConstructor,
}

impl std::fmt::Debug for ClientEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEntry")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// Maps platform identifiers to client constructors.
#[derive(Debug)]
pub struct ClientRegistry {
    http: reqwest::Client,
    entries: HashMap<Platform, ClientEntry>,
}

impl ClientRegistry {
    /// Create an empty registry sharing `http` across all clients.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            entries: HashMap::new(),
        }
    }

    /// Registry with all six built-in clients, wired to the configured
    /// endpoints and HTTP settings.
    pub fn builtin(config: &VidcastConfig) -> Result<Self, VidcastError> {
        let http = build_http_client(&config.http)?;
        Ok(Self::with_builtin_clients(http, &config.platforms))
    }

    /// Like [`builtin`](Self::builtin) but with a caller-supplied HTTP client.
    pub fn with_builtin_clients(http: reqwest::Client, platforms: &PlatformsConfig) -> Self {
        let mut registry = Self::new(http);
        registry.register(
            Platform::Youtube,
            platforms.youtube.clone(),
            Box::new(|http, ep| Box::new(YoutubeClient::new(http).with_endpoints(ep))),
        );
        registry.register(
            Platform::Tiktok,
            platforms.tiktok.clone(),
            Box::new(|http, ep| Box::new(TiktokClient::new(http).with_endpoints(ep))),
        );
        registry.register(
            Platform::Instagram,
            platforms.instagram.clone(),
            Box::new(|http, ep| Box::new(InstagramClient::new(http).with_endpoints(ep))),
        );
        registry.register(
            Platform::Facebook,
            platforms.facebook.clone(),
            Box::new(|http, ep| Box::new(FacebookClient::new(http).with_endpoints(ep))),
        );
        registry.register(
            Platform::Twitter,
            platforms.twitter.clone(),
            Box::new(|http, ep| Box::new(TwitterClient::new(http).with_endpoints(ep))),
        );
        registry.register(
            Platform::Snapchat,
            platforms.snapchat.clone(),
            Box::new(|http, ep| Box::new(SnapchatClient::new(http).with_endpoints(ep))),
        );
        registry
    }

    /// Register (or replace) the constructor for `platform`.
    pub fn register(
        &mut self,
        platform: Platform,
        endpoints: EndpointConfig,
        constructor: ClientConstructor,
    ) {
        self.entries.insert(
            platform,
            ClientEntry {
                endpoints,
                constructor,
            },
        );
    }

    /// Whether a constructor is registered for `platform`.
    pub fn contains(&self, platform: Platform) -> bool {
        self.entries.contains_key(&platform)
    }

    /// Registered platforms, sorted.
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.entries.keys().copied().collect();
        platforms.sort();
        platforms
    }

    /// Build a client for an already-parsed platform.
    pub fn client_for(&self, platform: Platform) -> Result<Box<dyn PlatformClient>, VidcastError> {
        let entry = self
            .entries
            .get(&platform)
            .ok_or_else(|| VidcastError::UnsupportedPlatform(platform.to_string()))?;
        Ok((entry.constructor)(self.http.clone(), &entry.endpoints))
    }
}

impl ClientFactory for ClientRegistry {
    fn new_client(&self, platform: &str) -> Result<Box<dyn PlatformClient>, VidcastError> {
        let parsed = Platform::from_str(platform)
            .map_err(|_| VidcastError::UnsupportedPlatform(platform.to_string()))?;
        if !self.contains(parsed) {
            return Err(VidcastError::UnsupportedPlatform(platform.to_string()));
        }
        self.client_for(parsed)
    }
}
