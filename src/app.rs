use crate::config::Config;
use crate::errors::ToolError;
use crate::managers::youtube::YouTubeManager;
use crate::mcp::catalog::tool_catalog;
use crate::mcp::tools::Tool;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::upstream::{HttpUpstream, UpstreamApi};
use crate::services::validation::Validation;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Config,
    pub tool_executor: Arc<ToolExecutor>,
    /// Shared client for the OAuth endpoints.
    pub http: reqwest::Client,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing = Vec::new();
        let mut unknown = Vec::new();
        for tool in tool_catalog().iter() {
            if Tool::from_name(&tool.name).is_none() {
                unknown.push(tool.name.clone());
            } else if !handlers.contains_key(&tool.name) {
                missing.push(tool.name.clone());
            }
        }
        let uncatalogued: Vec<String> = Tool::ALL
            .iter()
            .map(|tool| tool.name().to_string())
            .filter(|name| !tool_catalog().iter().any(|def| &def.name == name))
            .collect();
        if missing.is_empty() && unknown.is_empty() && uncatalogued.is_empty() {
            return Ok(());
        }
        missing.sort();
        unknown.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "Every tool in tool_catalog.json needs a Tool variant and a handler, and every Tool variant needs a catalog entry.",
            )
            .with_details(serde_json::json!({
                "missing_handlers": missing,
                "unknown_tools": unknown,
                "uncatalogued_tools": uncatalogued,
            })))
    }

    fn build_http_client() -> Result<reqwest::Client, ToolError> {
        reqwest::Client::builder()
            .user_agent(concat!("ytmcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))
    }

    pub fn initialize(config: Config) -> Result<Self, ToolError> {
        let logger = Logger::with_level("ytmcp", &config.log_level);
        let http = Self::build_http_client()?;
        if config.api_key().is_none() {
            logger.warn(
                "YOUTUBE_API_KEY is not set; public tools only work with a caller token",
                None,
            );
        }
        let upstream: Arc<dyn UpstreamApi> =
            Arc::new(HttpUpstream::new(logger.clone(), http.clone(), &config));
        Self::assemble(logger, config, http, upstream)
    }

    /// Builds the app around a caller-supplied YouTube client.
    pub fn with_upstream(config: Config, upstream: Arc<dyn UpstreamApi>) -> Result<Self, ToolError> {
        let logger = Logger::with_level("ytmcp", &config.log_level);
        let http = Self::build_http_client()?;
        Self::assemble(logger, config, http, upstream)
    }

    fn assemble(
        logger: Logger,
        config: Config,
        http: reqwest::Client,
        upstream: Arc<dyn UpstreamApi>,
    ) -> Result<Self, ToolError> {
        let youtube_manager = Arc::new(YouTubeManager::new(
            logger.clone(),
            Validation::new(),
            upstream,
        ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for tool in Tool::ALL {
            handlers.insert(tool.name().to_string(), youtube_manager.clone());
        }

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        logger.info(
            "Tool registry ready",
            Some(&serde_json::json!({ "tools": tool_executor.tool_names().len() })),
        );

        Ok(Self {
            logger,
            config,
            tool_executor,
            http,
        })
    }
}
