use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;
use widget_sync::WidgetError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found")]
    SessionNotFound,
    #[error("Too many live sessions")]
    TooManySessions,
    #[error("Unknown page template: {0}")]
    UnknownTemplate(String),
    #[error("Widget error: {0}")]
    Widget(#[from] WidgetError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::SessionNotFound => StatusCode::NOT_FOUND,
            Self::TooManySessions => StatusCode::SERVICE_UNAVAILABLE,
            Self::UnknownTemplate(_) | Self::Widget(_) => {
                tracing::error!("request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() })))
            .into_response()
    }
}
