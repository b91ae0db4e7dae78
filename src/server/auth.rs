use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::core::config::Credentials;
use crate::server::AppState;

const REALM: &str = "Basic realm=\"stockshare\", charset=\"UTF-8\"";

/// Decodes an `Authorization: Basic ...` header value.
pub fn parse_basic_auth(value: &str) -> Option<Credentials> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// `true` when no credentials are configured or the header carries matching ones.
pub fn is_authorized(expected: Option<&Credentials>, authorization: Option<&HeaderValue>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    authorization
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth)
        .is_some_and(|supplied| credentials_match(&supplied, expected))
}

fn credentials_match(supplied: &Credentials, expected: &Credentials) -> bool {
    let username = supplied
        .username
        .as_bytes()
        .ct_eq(expected.username.as_bytes());
    let password = supplied
        .password
        .as_bytes()
        .ct_eq(expected.password.as_bytes());
    (username & password).into()
}

pub async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let supplied = request.headers().get(header::AUTHORIZATION);
    if is_authorized(state.credentials.as_deref(), supplied) {
        return next.run(request).await;
    }

    warn!(uri = %request.uri(), "rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        "authentication required",
    )
        .into_response()
}
