#![allow(dead_code)]

use async_trait::async_trait;
use clap::Parser;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use ytmcp::config::Config;
use ytmcp::errors::UpstreamError;
use ytmcp::services::upstream::{UpstreamApi, UpstreamRequest};

pub static ENV_LOCK: Lazy<AsyncMutex<()>> = Lazy::new(|| AsyncMutex::new(()));

pub fn test_config(extra: &[&str]) -> Config {
    let mut args = vec!["ytmcp", "--youtube-api-key", "test-key", "--log-level", "error"];
    args.extend_from_slice(extra);
    Config::try_parse_from(args).expect("test config")
}

/// Records every request and answers from per-endpoint queues. The last queued
/// reply for an endpoint keeps answering; unknown endpoints get `{"items": []}`.
#[derive(Default)]
pub struct StubUpstream {
    replies: Mutex<HashMap<String, VecDeque<Result<Value, UpstreamError>>>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl StubUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, endpoint: &str, reply: Result<Value, UpstreamError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> UpstreamRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("at least one upstream request")
    }
}

#[async_trait]
impl UpstreamApi for StubUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        let endpoint = request.endpoint.clone();
        self.requests.lock().unwrap().push(request);
        let mut replies = self.replies.lock().unwrap();
        let Some(queue) = replies.get_mut(&endpoint) else {
            return Ok(serde_json::json!({ "items": [] }));
        };
        if queue.len() > 1 {
            return queue.pop_front().expect("queued reply");
        }
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Ok(serde_json::json!({ "items": [] })))
    }
}
