//! Session cookie extraction for Axum
//!
//! The auth provider stores the signed-in user as a JSON object in a
//! cookie (optionally percent-encoded). `CurrentUser` yields that user, or
//! `None` when the cookie is missing or unreadable; it never rejects.

use axum::{extract::FromRequestParts, http::header::COOKIE, http::request::Parts};
use relation_core::SessionUser;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use crate::server::AppState;

/// Cookie holding the session user
pub const DEFAULT_SESSION_COOKIE: &str = "relation_session";

/// Axum extractor for the optional signed-in user.
pub struct CurrentUser(pub Option<SessionUser>);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let cookie_name = parts
            .extensions
            .get::<Arc<AppState>>()
            .map(|s| s.cookie_name.clone())
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

        let user = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| cookie_value(header, &cookie_name))
            .and_then(|raw| parse_session(&raw));
        Ok(CurrentUser(user))
    }
}

/// Value of cookie `name` in a `Cookie` header.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.trim_matches('"').to_string())
    })
}

/// Decode a session cookie value: raw JSON first, then percent-decoded JSON.
fn parse_session(raw: &str) -> Option<SessionUser> {
    if let Ok(user) = serde_json::from_str::<SessionUser>(raw) {
        return Some(user);
    }
    let decoded = percent_decode(raw)?;
    match serde_json::from_str::<SessionUser>(&decoded) {
        Ok(user) => Some(user),
        Err(e) => {
            debug!("Ignoring unreadable session cookie: {}", e);
            None
        }
    }
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = input.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(cookie: Option<&str>) -> Option<SessionUser> {
        let mut builder = Request::builder().uri("/");
        if let Some(c) = cookie {
            builder = builder.header(COOKIE, c);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        user
    }

    #[tokio::test]
    async fn test_plain_json_cookie() {
        let user = extract(Some(
            r#"theme=dark; relation_session={"id":"42","nickname":"Mina"}"#,
        ))
        .await
        .unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.nickname.as_deref(), Some("Mina"));
        assert!(user.email.is_none());
    }

    #[tokio::test]
    async fn test_percent_encoded_cookie() {
        let user = extract(Some(
            "relation_session=%7B%22id%22%3A%227%22%2C%22nickname%22%3A%22Jun%20K%22%7D",
        ))
        .await
        .unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.nickname.as_deref(), Some("Jun K"));
    }

    #[tokio::test]
    async fn test_missing_or_broken_cookie() {
        assert!(extract(None).await.is_none());
        assert!(extract(Some("relation_session=not-json")).await.is_none());
        assert!(extract(Some("other={\"id\":\"1\"}")).await.is_none());
    }

    #[test]
    fn test_percent_decode_rejects_truncated_escape() {
        assert_eq!(percent_decode("%7"), None);
        assert_eq!(percent_decode("a%20b").as_deref(), Some("a b"));
    }
}
