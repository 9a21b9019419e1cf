mod tool_error;
mod upstream_error;

pub use tool_error::{ToolError, ToolErrorKind};
pub use upstream_error::UpstreamError;
