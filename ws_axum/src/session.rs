use axum::extract::FromRequestParts;
use axum::http::StatusCode;

/// Header carrying the widget session id for routes that do not take it in
/// the path.
pub const SESSION_HEADER: &str = "x-widget-session";

/// Extracts the widget session id from the `x-widget-session` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

fn header_token(parts: &axum::http::request::Parts) -> Option<String> {
    parts
        .headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        tracing::debug!("Extracting widget session token");

        header_token(parts).map_or(
            Err((StatusCode::BAD_REQUEST, "missing x-widget-session header")),
            |token| Ok(Self(token)),
        )
    }
}
