use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// Uniform result of a tool invocation. Absent fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ToolResult {
    fn base(success: bool, tool: &str) -> Self {
        Self {
            success,
            tool: Some(tool.to_string()),
            data: None,
            error: None,
            auth_required: None,
            available_tools: None,
            trace: None,
        }
    }

    pub fn ok(tool: &str, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::base(true, tool)
        }
    }

    pub fn failure(tool: &str, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(false, tool)
        }
    }

    pub fn auth_required(tool: &str) -> Self {
        Self {
            auth_required: Some(true),
            ..Self::failure(tool, AUTH_REQUIRED_MESSAGE)
        }
    }

    pub fn unknown_tool(tool: &str, error: impl Into<String>, available: Vec<String>) -> Self {
        Self {
            available_tools: Some(available),
            ..Self::failure(tool, error)
        }
    }

    pub fn internal(tool: &str, message: &str, trace: String) -> Self {
        Self {
            trace: Some(trace),
            ..Self::failure(tool, format!("Internal error: {}", message))
        }
    }

    pub fn is_auth_required(&self) -> bool {
        self.auth_required == Some(true)
    }
}
