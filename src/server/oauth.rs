use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::app::App;
use crate::constants::auth::{ACCESS_MAX_AGE_SECS, REFRESH_COOKIE, REFRESH_MAX_AGE_SECS};
use crate::constants::network::TIMEOUT_OAUTH_REQUEST_MS;
use crate::constants::oauth::SCOPES;
use crate::server::error::ApiError;
use crate::services::auth_token::extract_bearer_token;

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackQuery {
    code: Option<String>,
}

fn oauth_timeout() -> Duration {
    Duration::from_millis(TIMEOUT_OAUTH_REQUEST_MS)
}

fn session_cookie(name: &str, value: &str, max_age: u64) -> Result<HeaderValue, ApiError> {
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=None",
        name,
        urlencoding::encode(value),
        max_age
    );
    HeaderValue::from_str(&cookie).map_err(|err| ApiError::internal(err.to_string()))
}

fn expired_cookie(name: &str) -> Result<HeaderValue, ApiError> {
    let cookie = format!(
        "{}=\"\"; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; HttpOnly; Secure; SameSite=None",
        name
    );
    HeaderValue::from_str(&cookie).map_err(|err| ApiError::internal(err.to_string()))
}

/// Google consent URL for the configured client.
pub(crate) fn authorization_url(app: &App) -> Result<Url, ApiError> {
    let mut url = Url::parse(&app.config.google_auth_url)
        .map_err(|err| ApiError::internal(format!("invalid GOOGLE_AUTH_URL: {}", err)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &app.config.google_client_id)
        .append_pair("redirect_uri", &app.config.google_redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", &SCOPES.join(" "));
    Ok(url)
}

pub(crate) async fn login(State(app): State<Arc<App>>) -> Result<Redirect, ApiError> {
    let url = authorization_url(&app)?;
    app.logger.info("OAuth login redirect", None);
    Ok(Redirect::temporary(url.as_str()))
}

pub(crate) async fn callback(
    State(app): State<Arc<App>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(code) = query.code.filter(|code| !code.trim().is_empty()) else {
        return Err(ApiError::bad_request(json!({ "error": "No code" })));
    };

    let form = [
        ("client_id", app.config.google_client_id.as_str()),
        ("client_secret", app.config.google_client_secret.as_str()),
        ("code", code.as_str()),
        ("grant_type", "authorization_code"),
        ("redirect_uri", app.config.google_redirect_uri.as_str()),
    ];
    let response = app
        .http
        .post(&app.config.google_token_url)
        .form(&form)
        .timeout(oauth_timeout())
        .send()
        .await
        .map_err(|err| {
            app.logger.error(
                "OAuth token exchange failed",
                Some(&json!({ "error": err.to_string() })),
            );
            ApiError::bad_gateway(format!("Token exchange failed: {}", err))
        })?;
    let tokens: Value = response
        .json()
        .await
        .map_err(|err| ApiError::bad_gateway(format!("Invalid token response: {}", err)))?;

    let access_token = tokens
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty());
    let Some(access_token) = access_token else {
        app.logger.warn("OAuth token response without access_token", None);
        return Err(ApiError::bad_request(tokens));
    };

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        session_cookie(&app.config.session_cookie, access_token, ACCESS_MAX_AGE_SECS)?,
    );
    if let Some(refresh_token) = tokens
        .get("refresh_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
    {
        headers.append(
            SET_COOKIE,
            session_cookie(REFRESH_COOKIE, refresh_token, REFRESH_MAX_AGE_SECS)?,
        );
    }

    app.logger.info("OAuth login completed", None);
    let target = format!("{}?connected=true", app.config.frontend_url);
    Ok((headers, Redirect::temporary(&target)).into_response())
}

pub(crate) async fn userinfo(State(app): State<Arc<App>>, headers: HeaderMap) -> Json<Value> {
    let logged_out = Json(json!({ "logged_in": false }));
    let Some(token) = extract_bearer_token(&headers, &app.config.session_cookie) else {
        return logged_out;
    };
    let response = app
        .http
        .get(&app.config.google_userinfo_url)
        .bearer_auth(token)
        .timeout(oauth_timeout())
        .send()
        .await;
    let profile: Value = match response {
        Ok(response) if response.status() == reqwest::StatusCode::OK => {
            match response.json().await {
                Ok(profile) => profile,
                Err(_) => return logged_out,
            }
        }
        _ => return logged_out,
    };
    Json(json!({
        "logged_in": true,
        "profile": {
            "name": profile.get("name"),
            "email": profile.get("email"),
            "picture": profile.get("picture"),
        },
    }))
}

pub(crate) async fn logout(State(app): State<Arc<App>>) -> Result<Response, ApiError> {
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, expired_cookie(&app.config.session_cookie)?);
    headers.append(SET_COOKIE, expired_cookie(REFRESH_COOKIE)?);
    let target = format!(
        "{}/?logout=true",
        app.config.frontend_url.trim_end_matches('/')
    );
    Ok((headers, Redirect::temporary(&target)).into_response())
}
