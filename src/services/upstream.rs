use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::errors::UpstreamError;
use crate::services::logger::Logger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamAuth {
    /// Server-held API key appended as the `key` query parameter.
    ApiKey,
    Bearer(String),
}

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: UpstreamAuth,
}

impl UpstreamRequest {
    pub fn public(endpoint: &str) -> Self {
        Self {
            method: Method::GET,
            endpoint: endpoint.to_string(),
            query: Vec::new(),
            body: None,
            auth: UpstreamAuth::ApiKey,
        }
    }

    /// Switches a public read to the caller's OAuth quota when a token is present.
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        if let Some(token) = non_blank(token) {
            self.auth = UpstreamAuth::Bearer(token.to_string());
        }
        self
    }

    pub fn authenticated(
        method: Method,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<Self, UpstreamError> {
        let token = non_blank(token).ok_or(UpstreamError::MissingToken)?;
        Ok(Self {
            method,
            endpoint: endpoint.to_string(),
            query: Vec::new(),
            body: None,
            auth: UpstreamAuth::Bearer(token.to_string()),
        })
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn optional_param(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match &self.auth {
            UpstreamAuth::Bearer(token) => Some(token.as_str()),
            UpstreamAuth::ApiKey => None,
        }
    }
}

fn non_blank(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

#[async_trait]
pub trait UpstreamApi: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError>;
}

/// reqwest-backed client for the YouTube Data API.
pub struct HttpUpstream {
    logger: Logger,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    max_attempts: usize,
}

impl HttpUpstream {
    pub fn new(logger: Logger, client: Client, config: &Config) -> Self {
        Self {
            logger: logger.child("upstream"),
            client,
            base_url: config.youtube_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
            timeout: config.request_timeout(),
            max_attempts: config.max_attempts.max(1),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        let url = self.endpoint_url(&request.endpoint);
        let mut timed_out = false;

        for attempt in 1..=self.max_attempts {
            let mut builder = self
                .client
                .request(request.method.clone(), &url)
                .query(&request.query)
                .timeout(self.timeout);
            match &request.auth {
                UpstreamAuth::ApiKey => {
                    if let Some(key) = &self.api_key {
                        builder = builder.query(&[("key", key.as_str())]);
                    }
                }
                UpstreamAuth::Bearer(token) => {
                    builder = builder
                        .bearer_auth(token)
                        .header(ACCEPT, "application/json");
                }
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) if err.is_timeout() => {
                    timed_out = true;
                    self.logger.warn(
                        "Upstream timeout",
                        Some(&serde_json::json!({
                            "endpoint": request.endpoint,
                            "attempt": attempt,
                            "max_attempts": self.max_attempts,
                        })),
                    );
                    continue;
                }
                Err(err) => return Err(UpstreamError::Transport(err.to_string())),
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                timed_out = false;
                self.logger.warn(
                    "Rate limited",
                    Some(&serde_json::json!({
                        "endpoint": request.endpoint,
                        "attempt": attempt,
                        "max_attempts": self.max_attempts,
                    })),
                );
                continue;
            }

            let body = match response.bytes().await {
                Ok(body) => body,
                Err(err) if err.is_timeout() => {
                    timed_out = true;
                    self.logger.warn(
                        "Upstream timeout",
                        Some(&serde_json::json!({
                            "endpoint": request.endpoint,
                            "attempt": attempt,
                            "max_attempts": self.max_attempts,
                        })),
                    );
                    continue;
                }
                Err(err) => return Err(UpstreamError::Transport(err.to_string())),
            };

            if status.as_u16() >= 400 {
                return Err(UpstreamError::Api {
                    status: status.as_u16(),
                    message: upstream_error_message(&body),
                });
            }
            if status == StatusCode::NO_CONTENT || body.is_empty() {
                return Ok(serde_json::json!({ "success": true }));
            }
            return serde_json::from_slice(&body)
                .map_err(|err| UpstreamError::Decode(err.to_string()));
        }

        if timed_out {
            self.logger.error(
                "Upstream timeout after retries",
                Some(&serde_json::json!({ "endpoint": request.endpoint })),
            );
            Err(UpstreamError::Timeout)
        } else {
            Err(UpstreamError::MaxRetries)
        }
    }
}

/// Pulls `error.message` out of a YouTube error body.
pub(crate) fn upstream_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_requires_token() {
        assert_eq!(
            UpstreamRequest::authenticated(Method::POST, "videos/rate", None).unwrap_err(),
            UpstreamError::MissingToken
        );
        assert_eq!(
            UpstreamRequest::authenticated(Method::POST, "videos/rate", Some("  ")).unwrap_err(),
            UpstreamError::MissingToken
        );
    }

    #[test]
    fn public_request_upgrades_to_bearer() {
        let request = UpstreamRequest::public("videos").with_token(Some("tok"));
        assert_eq!(request.bearer_token(), Some("tok"));
        let request = UpstreamRequest::public("videos").with_token(Some(""));
        assert_eq!(request.auth, UpstreamAuth::ApiKey);
    }

    #[test]
    fn error_message_falls_back() {
        assert_eq!(
            upstream_error_message(br#"{"error":{"message":"Video not found"}}"#),
            "Video not found"
        );
        assert_eq!(upstream_error_message(b"<html>"), "Unknown error");
        assert_eq!(upstream_error_message(b""), "Unknown error");
    }
}
