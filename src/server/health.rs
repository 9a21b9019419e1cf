use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::App;

pub(crate) async fn home() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "YouTube MCP Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "oauth": "/oauth/login",
            "mcp_tools": "/mcp/tools",
            "mcp_call": "/mcp/call",
        },
    }))
}

pub(crate) async fn health(State(app): State<Arc<App>>) -> Json<Value> {
    let now = chrono::Utc::now();
    Json(json!({
        "status": "healthy",
        "timestamp": now.timestamp_millis() as f64 / 1000.0,
        "services": {
            "youtube_api": "operational",
            "oauth": "operational",
            "mcp_server": "operational",
        },
        "tools": app.tool_executor.tool_names().len(),
        "logging": app.logger.stats(),
    }))
}
