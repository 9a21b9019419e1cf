pub mod network {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8000;
    pub const TIMEOUT_UPSTREAM_REQUEST_MS: u64 = 15_000;
    pub const TIMEOUT_OAUTH_REQUEST_MS: u64 = 15_000;
}

pub mod retry {
    pub const MAX_ATTEMPTS: usize = 3;
}

pub mod limits {
    pub const MAX_RESULTS: u64 = 50;
    pub const MAX_COMMENT_RESULTS: u64 = 100;
    pub const MIN_RESULTS: u64 = 1;
}

pub mod youtube {
    pub const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
    pub const DEFAULT_REGION: &str = "US";
    pub const RELEVANCE_LANGUAGE: &str = "en";
    pub const SAFE_SEARCH: &str = "moderate";
    pub const VIDEO_PARTS: &str = "snippet,statistics,contentDetails,status";
    pub const TRENDING_PARTS: &str = "snippet,statistics,contentDetails";
    pub const CHANNEL_PARTS: &str = "snippet,statistics,contentDetails,brandingSettings";
    pub const MY_CHANNEL_PARTS: &str = "snippet,statistics,contentDetails";
    pub const PLAYLIST_PARTS: &str = "snippet,contentDetails,status";
    pub const ENRICHED_FIELDS: &[&str] = &["statistics", "contentDetails"];
}

pub mod auth {
    pub const ACCESS_COOKIE: &str = "yt_access_token";
    pub const REFRESH_COOKIE: &str = "yt_refresh_token";
    pub const ACCESS_MAX_AGE_SECS: u64 = 3_600;
    pub const REFRESH_MAX_AGE_SECS: u64 = 30 * 24 * 3_600;
}

pub mod oauth {
    pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
    pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
    pub const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
    pub const SCOPES: &[&str] = &[
        "openid",
        "profile",
        "email",
        "https://www.googleapis.com/auth/youtube.force-ssl",
        "https://www.googleapis.com/auth/youtube",
        "https://www.googleapis.com/auth/youtube.readonly",
    ];
}
