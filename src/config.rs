use crate::constants::{auth, network, oauth, retry, youtube};
use clap::Parser;
use std::time::Duration;

/// Runtime configuration, read from flags with environment fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "ytmcp", version, about = "YouTube Data API tool server")]
pub struct Config {
    #[arg(long, env = "HOST", default_value = network::DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = network::DEFAULT_PORT)]
    pub port: u16,

    /// Server-held key used for public (non-OAuth) reads.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    #[arg(long, env = "YOUTUBE_API_BASE_URL", default_value = youtube::BASE_URL)]
    pub youtube_api_base_url: String,

    #[arg(long, env = "YOUTUBE_REQUEST_TIMEOUT_MS", default_value_t = network::TIMEOUT_UPSTREAM_REQUEST_MS)]
    pub request_timeout_ms: u64,

    #[arg(long, env = "YOUTUBE_MAX_ATTEMPTS", default_value_t = retry::MAX_ATTEMPTS)]
    pub max_attempts: usize,

    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:3001"
    )]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "SESSION_COOKIE", default_value = auth::ACCESS_COOKIE)]
    pub session_cookie: String,

    #[arg(long, env = "GOOGLE_CLIENT_ID", default_value = "")]
    pub google_client_id: String,

    #[arg(long, env = "GOOGLE_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub google_client_secret: String,

    #[arg(long, env = "GOOGLE_REDIRECT_URI", default_value = "")]
    pub google_redirect_uri: String,

    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_url: String,

    #[arg(long, env = "GOOGLE_AUTH_URL", default_value = oauth::AUTH_URL)]
    pub google_auth_url: String,

    #[arg(long, env = "GOOGLE_TOKEN_URL", default_value = oauth::TOKEN_URL)]
    pub google_token_url: String,

    #[arg(long, env = "GOOGLE_USERINFO_URL", default_value = oauth::USERINFO_URL)]
    pub google_userinfo_url: String,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.youtube_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}
