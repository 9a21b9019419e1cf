use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{ToolError, ToolErrorKind};
use crate::mcp::catalog::{tool_names, validate_tool_args};
use crate::mcp::envelope::ToolResult;
use crate::mcp::tools::Tool;
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;

/// One resolved invocation handed to a handler.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub tool: Tool,
    pub args: Value,
    pub token: Option<String>,
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, call: ToolCall) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    /// Registered tool names in catalog order.
    pub fn tool_names(&self) -> Vec<String> {
        tool_names()
            .into_iter()
            .filter(|name| self.handlers.contains_key(name))
            .collect()
    }

    fn unknown_tool(&self, tool_name: &str) -> ToolResult {
        let available = self.tool_names();
        let suggestions = suggest(tool_name, &available, 3);
        let error = if suggestions.is_empty() {
            format!("Unknown tool: {}", tool_name)
        } else {
            format!(
                "Unknown tool: {}. Did you mean: {}?",
                tool_name,
                suggestions.join(", ")
            )
        };
        ToolResult::unknown_tool(tool_name, error, available)
    }

    /// Runs one tool. Every failure is folded into the returned envelope.
    pub async fn execute(&self, tool_name: &str, args: Value, token: Option<&str>) -> ToolResult {
        let started = Instant::now();
        let trace_id = uuid::Uuid::new_v4().to_string();
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let resolved = Tool::from_name(tool_name)
            .and_then(|tool| self.handlers.get(tool_name).map(|handler| (tool, handler)));
        let Some((tool, handler)) = resolved else {
            self.logger.warn(
                "Unknown tool",
                Some(&serde_json::json!({ "tool": tool_name, "trace_id": trace_id })),
            );
            return self.unknown_tool(tool_name);
        };

        self.logger.info(
            "Executing tool",
            Some(&serde_json::json!({
                "tool": tool_name,
                "authenticated": token.is_some(),
                "trace_id": trace_id,
            })),
        );

        if tool.requires_auth() && token.is_none() {
            self.logger.warn(
                "Authentication required",
                Some(&serde_json::json!({ "tool": tool_name, "trace_id": trace_id })),
            );
            return ToolResult::auth_required(tool_name);
        }

        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        if let Err(err) = validate_tool_args(tool_name, &args) {
            return ToolResult::failure(tool_name, err.message);
        }

        let call = ToolCall { tool, args, token };
        let outcome = AssertUnwindSafe(handler.handle(call)).catch_unwind().await;
        let result = match outcome {
            Ok(Ok(data)) => ToolResult::ok(tool_name, data),
            Ok(Err(err)) => self.error_envelope(tool_name, err, &trace_id),
            Err(panic) => {
                let err = ToolError::internal(panic_message(panic.as_ref()))
                    .with_hint("handler panicked");
                self.error_envelope(tool_name, err, &trace_id)
            }
        };

        self.logger.info(
            "Tool finished",
            Some(&serde_json::json!({
                "tool": tool_name,
                "success": result.success,
                "auth_required": result.is_auth_required(),
                "trace_id": trace_id,
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        result
    }

    fn error_envelope(&self, tool_name: &str, err: ToolError, trace_id: &str) -> ToolResult {
        let meta = serde_json::json!({
            "tool": tool_name,
            "code": err.code,
            "error": err.message,
            "trace_id": trace_id,
        });
        match err.kind {
            ToolErrorKind::AuthRequired => ToolResult::auth_required(tool_name),
            ToolErrorKind::InvalidParams => ToolResult::failure(tool_name, err.message),
            _ if err.is_upstream() => {
                self.logger.warn("YouTube API error", Some(&meta));
                ToolResult::failure(tool_name, err.message)
            }
            _ => {
                self.logger.error("Tool execution failed", Some(&meta));
                let trace = render_trace(&err, tool_name, trace_id);
                ToolResult::internal(tool_name, &err.message, trace)
            }
        }
    }
}

fn render_trace(err: &ToolError, tool_name: &str, trace_id: &str) -> String {
    let mut lines = vec![
        format!("{} in {}: {}", err.code, tool_name, err.message),
        format!("trace_id: {}", trace_id),
    ];
    if let Some(hint) = &err.hint {
        lines.push(format!("hint: {}", hint));
    }
    if let Some(details) = &err.details {
        lines.push(format!("details: {}", details));
    }
    lines.join("\n")
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = panic.downcast_ref::<String>() {
        return text.clone();
    }
    "handler panicked".to_string()
}
