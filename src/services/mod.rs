pub mod auth_token;
pub mod logger;
pub mod tool_executor;
pub mod upstream;
pub mod validation;
