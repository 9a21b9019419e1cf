use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use std::collections::HashMap;

const BEARER_PREFIX: &str = "Bearer ";

/// Cookies parsed from every `Cookie` header on a request. Values are
/// percent-decoded; pairs that fail to decode are dropped.
#[derive(Debug, Default)]
pub struct SessionCookies {
    values: HashMap<String, String>,
}

impl SessionCookies {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            for pair in raw.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() || values.contains_key(name) {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                let Ok(decoded) = urlencoding::decode(value) else {
                    continue;
                };
                values.insert(name.to_string(), decoded.into_owned());
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Resolves the caller's OAuth token. Precedence: `Authorization: Bearer`,
/// then the parsed session cookie, then a raw scan of the `Cookie` header.
pub fn extract_bearer_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    from_authorization(headers)
        .or_else(|| {
            SessionCookies::from_headers(headers)
                .get(cookie_name)
                .map(str::to_string)
        })
        .or_else(|| from_raw_cookie(headers, cookie_name))
}

fn from_authorization(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

// Catches headers the structured jar rejects (non-visible bytes, bad escapes).
fn from_raw_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?;
    let raw = String::from_utf8_lossy(raw.as_bytes());
    let prefix = format!("{}=", cookie_name);
    raw.split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
