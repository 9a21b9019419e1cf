mod common;
use common::{test_config, StubUpstream, ENV_LOCK};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ytmcp::app::App;
use ytmcp::server::router;

const FRONTEND: &str = "http://frontend.test";

fn routes(stub: &Arc<StubUpstream>, extra: &[&str]) -> Router {
    let mut args = vec![
        "--frontend-url",
        FRONTEND,
        "--google-client-id",
        "client-123",
        "--google-client-secret",
        "secret-456",
        "--google-redirect-uri",
        "http://localhost:8000/oauth/callback",
        "--allowed-origins",
        "http://localhost:3000",
    ];
    args.extend_from_slice(extra);
    let app = App::with_upstream(test_config(&args), stub.clone()).expect("app");
    router(Arc::new(app))
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn call(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp/call")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn tool_discovery_lists_the_registry() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[]).oneshot(get("/mcp/tools")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-process-time"));

    let body = body_json(response).await;
    assert_eq!(body["total_count"], 22);
    let tools = body["tools"].as_array().expect("tools");
    assert_eq!(tools.len(), 22);
    assert_eq!(tools[0]["name"], "search_videos");
    assert_eq!(tools[0]["input_schema"]["required"], json!(["query"]));
}

#[tokio::test]
async fn missing_tool_name_is_a_400() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[])
        .oneshot(call(r#"{"arguments": {}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Missing 'tool_name' in request"})
    );
}

#[tokio::test]
async fn malformed_json_is_a_500_envelope() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[])
        .oneshot(call("{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Internal server error: "));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn auth_required_envelope_over_http() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[])
        .oneshot(call(r#"{"tool_name": "like_video", "arguments": {"video_id": "v1"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": false,
            "tool": "like_video",
            "error": "Authentication required",
            "auth_required": true
        })
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn token_is_read_from_cookie_and_header_wins() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let app = routes(&stub, &[]);

    let mut request = call(r#"{"tool_name": "my_channel"}"#);
    request.headers_mut().insert(
        header::COOKIE,
        "theme=dark; yt_access_token=cookie-token".parse().unwrap(),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await["success"], true);
    assert_eq!(stub.last_request().bearer_token(), Some("cookie-token"));

    let mut request = call(r#"{"tool_name": "my_channel", "arguments": null}"#);
    request.headers_mut().insert(
        header::COOKIE,
        "yt_access_token=cookie-token".parse().unwrap(),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer header-token".parse().unwrap(),
    );
    app.oneshot(request).await.unwrap();
    assert_eq!(stub.last_request().bearer_token(), Some("header-token"));
}

#[tokio::test]
async fn non_object_arguments_answer_with_an_envelope() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[])
        .oneshot(call(r#"{"tool_name": "video_details", "arguments": "abc"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["tool"], "video_details");
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("'arguments' must be an object"));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn numeric_tool_name_is_an_unknown_tool() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[])
        .oneshot(call(r#"{"tool_name": 5, "arguments": {}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["tool"], "5");
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Unknown tool: 5"));
    assert_eq!(body["available_tools"].as_array().map(Vec::len), Some(22));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn health_and_unknown_paths() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let app = routes(&stub, &[]);

    let health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body = body_json(health).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tools"], 22);
    assert!(body["timestamp"].is_f64());

    let missing = app.oneshot(get("/nope")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(missing).await,
        json!({
            "error": "Not Found",
            "path": "/nope",
            "message": "The requested resource was not found"
        })
    );
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let request = Request::builder()
        .uri("/mcp/tools")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = routes(&stub, &[]).oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn login_redirects_to_google_consent() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[]).oneshot(get("/oauth/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let target = url::Url::parse(&location(&response)).expect("redirect url");
    assert_eq!(target.host_str(), Some("accounts.google.com"));
    let params: std::collections::HashMap<String, String> =
        target.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], "client-123");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["access_type"], "offline");
    assert_eq!(params["prompt"], "consent");
    assert!(params["scope"].contains("https://www.googleapis.com/auth/youtube.force-ssl"));
}

#[tokio::test]
async fn callback_without_code_is_rejected() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[])
        .oneshot(get("/oauth/callback"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No code"}));
}

#[tokio::test]
async fn callback_exchanges_code_and_sets_cookies() {
    let _guard = ENV_LOCK.lock().await;
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&google)
        .await;

    let stub = StubUpstream::new();
    let token_url = format!("{}/token", google.uri());
    let response = routes(&stub, &["--google-token-url", &token_url])
        .oneshot(get("/oauth/callback?code=auth-code"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), format!("{}?connected=true", FRONTEND));

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("yt_access_token=access-1;"));
    assert!(cookies[0].contains("Max-Age=3600"));
    assert!(cookies[1].starts_with("yt_refresh_token=refresh-1;"));
    assert!(cookies[1].contains("Max-Age=2592000"));
}

#[tokio::test]
async fn callback_passes_token_errors_through() {
    let _guard = ENV_LOCK.lock().await;
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .mount(&google)
        .await;

    let stub = StubUpstream::new();
    let token_url = format!("{}/token", google.uri());
    let response = routes(&stub, &["--google-token-url", &token_url])
        .oneshot(get("/oauth/callback?code=stale"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_grant");
}

#[tokio::test]
async fn userinfo_reports_profile_when_logged_in() {
    let _guard = ENV_LOCK.lock().await;
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header_is("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1",
            "name": "Ada",
            "email": "ada@example.com",
            "picture": "https://example.com/ada.png"
        })))
        .mount(&google)
        .await;

    let stub = StubUpstream::new();
    let userinfo_url = format!("{}/userinfo", google.uri());
    let app = routes(&stub, &["--google-userinfo-url", &userinfo_url]);

    let anonymous = app.clone().oneshot(get("/oauth/userinfo")).await.unwrap();
    assert_eq!(body_json(anonymous).await, json!({"logged_in": false}));

    let mut request = get("/oauth/userinfo");
    request
        .headers_mut()
        .insert(header::COOKIE, "yt_access_token=access-1".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({
            "logged_in": true,
            "profile": {
                "name": "Ada",
                "email": "ada@example.com",
                "picture": "https://example.com/ada.png"
            }
        })
    );
}

#[tokio::test]
async fn logout_clears_both_cookies() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubUpstream::new();
    let response = routes(&stub, &[]).oneshot(get("/oauth/logout")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), format!("{}/?logout=true", FRONTEND));

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|cookie| cookie.contains("Max-Age=0")));
    assert!(cookies[0].starts_with("yt_access_token="));
    assert!(cookies[1].starts_with("yt_refresh_token="));
}
