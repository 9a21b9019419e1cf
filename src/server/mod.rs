use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::app::App;
use crate::config::Config;
use crate::errors::ToolError;

pub mod error;
mod health;
mod oauth;
mod tools;

pub use error::ApiError;

const PROCESS_TIME_HEADER: &str = "x-process-time";

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([HeaderName::from_static(PROCESS_TIME_HEADER)])
}

async fn log_requests(State(app): State<Arc<App>>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    app.logger.info(
        "Request",
        Some(&serde_json::json!({ "method": method, "path": path })),
    );

    let mut response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64();
    app.logger.info(
        "Response",
        Some(&serde_json::json!({
            "method": method,
            "path": path,
            "status": response.status().as_u16(),
            "process_time": format!("{:.3}s", elapsed),
        })),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("{:.6}", elapsed)) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(PROCESS_TIME_HEADER), value);
    }
    response
}

async fn not_found(request: Request) -> Response {
    ApiError::not_found(request.uri().path()).into_response()
}

pub fn router(app: Arc<App>) -> Router {
    let cors = cors_layer(&app.config.origins());
    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health))
        .route("/mcp/tools", get(tools::list_tools))
        .route("/mcp/call", post(tools::call_tool))
        .route("/oauth/login", get(oauth::login))
        .route("/oauth/callback", get(oauth::callback))
        .route("/oauth/userinfo", get(oauth::userinfo))
        .route("/oauth/logout", get(oauth::logout))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(app.clone(), log_requests))
        .layer(cors)
        .with_state(app)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

pub async fn run(config: Config) -> Result<(), ToolError> {
    let addr = config.bind_addr();
    let app = Arc::new(App::initialize(config)?);
    let listener = TcpListener::bind(&addr).await?;
    app.logger.info(
        "YouTube MCP server listening",
        Some(&serde_json::json!({ "addr": addr })),
    );
    axum::serve(listener, router(app.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    app.logger.info("YouTube MCP server stopped", None);
    Ok(())
}
