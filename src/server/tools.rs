use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::App;
use crate::mcp::catalog::tool_catalog;
use crate::mcp::envelope::ToolResult;
use crate::server::error::ApiError;
use crate::services::auth_token::extract_bearer_token;

pub(crate) async fn list_tools() -> Json<Value> {
    let tools = tool_catalog();
    Json(json!({
        "tools": tools,
        "total_count": tools.len(),
    }))
}

/// `POST /mcp/call` with `{tool_name, arguments}`. Tool failures still answer 200
/// with a `success: false` envelope; only malformed requests map to HTTP errors.
pub(crate) async fn call_tool(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ToolResult>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|err| {
        app.logger.error(
            "MCP call error",
            Some(&json!({ "error": err.to_string() })),
        );
        ApiError::internal(err.to_string())
    })?;
    let Some(request) = payload.as_object() else {
        return Err(ApiError::internal("request body must be a JSON object"));
    };
    let Some(tool_name) = request.get("tool_name") else {
        return Err(ApiError::detail("Missing 'tool_name' in request"));
    };
    // A non-string name is dispatched by its JSON text and lands on the unknown-tool envelope.
    let tool_name = match tool_name {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    };
    let tool_name = tool_name.as_str();
    let arguments = match request.get("arguments") {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(args @ Value::Object(_)) => args.clone(),
        Some(_) => {
            return Ok(Json(ToolResult::failure(
                tool_name,
                "Invalid arguments: 'arguments' must be an object",
            )))
        }
    };

    let token = extract_bearer_token(&headers, &app.config.session_cookie);
    let result = app
        .tool_executor
        .execute(tool_name, arguments, token.as_deref())
        .await;
    Ok(Json(result))
}
