// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ready-made domain values.

use vidcast_core::workspace::{
    FacebookCredentials, InstagramCredentials, SnapchatCredentials, TiktokCredentials,
    TwitterCredentials, YoutubeCredentials,
};
use vidcast_core::{PlatformCredentials, Video, VideoStatus, Workspace};

/// A workspace with every platform slot populated with plausible values.
pub fn workspace(tenant_id: &str, user_id: &str) -> Workspace {
    let mut ws = Workspace::new(tenant_id, user_id, "Fixture workspace");
    ws.credentials = all_credentials();
    ws
}

/// A workspace with no platform connected.
pub fn empty_workspace(tenant_id: &str, user_id: &str) -> Workspace {
    Workspace::new(tenant_id, user_id, "Empty workspace")
}

pub fn all_credentials() -> PlatformCredentials {
    PlatformCredentials {
        youtube: Some(YoutubeCredentials {
            access_token: "yt-token".into(),
            refresh_token: Some("yt-refresh".into()),
            channel_id: Some("UC123".into()),
        }),
        tiktok: Some(TiktokCredentials {
            client_key: "tt-client".into(),
            access_token: "tt-token".into(),
            open_id: None,
        }),
        instagram: Some(InstagramCredentials {
            user_id: "17841400000000000".into(),
            access_token: "ig-token".into(),
        }),
        facebook: Some(FacebookCredentials {
            app_id: "1234".into(),
            app_secret: "fb-secret".into(),
            page_id: "1000000001".into(),
            page_token: "fb-page-token".into(),
        }),
        twitter: Some(TwitterCredentials {
            access_token: "tw-token".into(),
            refresh_token: None,
        }),
        snapchat: Some(SnapchatCredentials {
            profile_id: "snap-profile".into(),
            access_token: "snap-token".into(),
        }),
    }
}

/// A `ready` video with both a local file and a public URL.
pub fn ready_video(tenant_id: &str, user_id: &str) -> Video {
    let mut video = Video::new(tenant_id, user_id, "Launch day");
    video.description = "Behind the scenes".into();
    video.tags = vec!["launch".into(), "bts".into()];
    video.file_path = Some("/var/lib/vidcast/media/launch.mp4".into());
    video.file_url = Some("https://cdn.example.com/media/launch.mp4".into());
    video.format = Some("mp4".into());
    video.status = VideoStatus::Ready;
    video
}
