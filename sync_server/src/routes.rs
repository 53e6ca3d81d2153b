use crate::config::Config;
use crate::error::ApiError;
use crate::sessions::SessionStore;
use crate::templates;
use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, State},
    http::{
        Request, StatusCode,
        header::{self, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, ORIGIN},
        HeaderName,
    },
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer,
};
use types::InstructionBatch;
use ws_axum::session::{SESSION_HEADER, SessionToken};

#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub sessions: SessionStore,
}

impl AppContext {
    pub fn with_config(config: Config) -> Self {
        let sessions = SessionStore::new(config.max_sessions, config.session_idle());
        Self { config, sessions }
    }
}

impl ws_app::ContextProvider<Config> for AppContext {
    async fn new(config: Config) -> Self {
        if templates::lookup(&config.page_template).is_none() {
            tracing::warn!(
                "page template {} does not exist; session creation will fail",
                config.page_template
            );
        }
        Self::with_config(config)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub session_id: String,
    #[serde(flatten)]
    pub batch: InstructionBatch,
}

type Fields = Vec<(String, String)>;

pub fn app(context: Arc<AppContext>) -> Router {
    // Set up a trace layer
    let trace_layer = TraceLayer::new_for_http().on_request(
        |request: &Request<Body>, _: &tracing::Span| {
            tracing::info!(
                "received request: {method} {uri}",
                method = request.method(),
                uri = request.uri()
            );
        },
    );

    // Set up a CORS layer
    let cors_layer = CorsLayer::new()
        .allow_headers([
            ACCEPT,
            ACCEPT_ENCODING,
            CONTENT_TYPE,
            ORIGIN,
            HeaderName::from_static(SESSION_HEADER),
        ])
        .allow_methods(tower_http::cors::Any)
        .allow_origin(tower_http::cors::Any);

    let compression_layer = CompressionLayer::new().gzip(true).deflate(true);

    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/postback", post(postback))
        .route("/sessions/{id}/render", get(render))
        .route("/postback", post(postback_with_header))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "application/json")],
                Json(json!({
                    "message": "not found",
                })),
            )
        })
        .layer(cors_layer)
        .layer(trace_layer)
        .layer(compression_layer)
        .with_state(context)
}

async fn health() -> impl IntoResponse {
    tracing::debug!("health check");

    Json(json!({ "status": "UP" }))
}

async fn create_session(
    State(ctx): State<Arc<AppContext>>,
) -> Result<(StatusCode, Json<CreatedSession>), ApiError> {
    let template = &ctx.config.page_template;
    let build = templates::lookup(template)
        .ok_or_else(|| ApiError::UnknownTemplate(template.clone()))?;

    let page = build()?;
    let (id, session) = ctx.sessions.create(page).await?;

    let batch = session.lock().await.page.initial_render();

    Ok((
        StatusCode::CREATED,
        Json(CreatedSession {
            session_id: id.to_string(),
            batch,
        }),
    ))
}

async fn run_postback(
    ctx: &AppContext,
    id: &str,
    fields: Fields,
) -> Result<Json<InstructionBatch>, ApiError> {
    let session = ctx.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.touch();

    tracing::debug!("postback for {id} with {} field(s)", fields.len());

    let batch = session.page.process_postback(fields)?;

    Ok(Json(batch))
}

async fn postback(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Form(fields): Form<Fields>,
) -> Result<Json<InstructionBatch>, ApiError> {
    run_postback(&ctx, &id, fields).await
}

async fn postback_with_header(
    State(ctx): State<Arc<AppContext>>,
    SessionToken(id): SessionToken,
    Form(fields): Form<Fields>,
) -> Result<Json<InstructionBatch>, ApiError> {
    run_postback(&ctx, &id, fields).await
}

async fn render(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<InstructionBatch>, ApiError> {
    let session = ctx.sessions.get(&id).await?;
    let mut session = session.lock().await;
    session.touch();

    Ok(Json(session.page.full_render()))
}

async fn delete_session(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::OptionValue;
    use widget_sync::PostbackBuilder;

    fn context(config: Config) -> Arc<AppContext> {
        Arc::new(AppContext::with_config(config))
    }

    async fn new_session(ctx: &Arc<AppContext>) -> CreatedSession {
        let (status, Json(created)) =
            create_session(State(Arc::clone(ctx))).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[test]
    fn test_router_builds() {
        let _router = app(context(Config::default()));
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_session_returns_initial_render() {
        let ctx = context(Config::default());
        let created = new_session(&ctx).await;

        assert!(!created.batch.instructions.is_empty());
        assert!(created.batch.instructions.iter().all(|i| i.is_init()));

        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("session_id").is_some());
        assert!(json.get("instructions").is_some());
        assert!(json.get("validation").is_none());
    }

    #[tokio::test]
    async fn test_postback_round_trip() {
        let ctx = context(Config::default());
        let created = new_session(&ctx).await;

        let fields = PostbackBuilder::new()
            .feedback("volume", "_Value", "20")
            .event("volume", "change")
            .build();
        let Json(batch) = postback(
            State(Arc::clone(&ctx)),
            Path(created.session_id.clone()),
            Form(fields),
        )
        .await
        .unwrap();

        assert_eq!(batch.instructions.len(), 1);
        assert_eq!(batch.instructions[0].args[2], OptionValue::Integer(20));
    }

    #[tokio::test]
    async fn test_postback_with_header_token() {
        let ctx = context(Config::default());
        let created = new_session(&ctx).await;

        let fields = PostbackBuilder::new()
            .feedback("tasks", "_ItemArray", "b,a")
            .build();
        let Json(batch) = postback_with_header(
            State(Arc::clone(&ctx)),
            SessionToken(created.session_id),
            Form(fields),
        )
        .await
        .unwrap();

        assert!(batch.instructions.is_empty());
    }

    #[tokio::test]
    async fn test_stale_feedback_does_not_fail_request() {
        let ctx = context(Config::default());
        let created = new_session(&ctx).await;

        let fields = PostbackBuilder::new()
            .feedback("gone", "_Value", "1")
            .field("plain_input", "hello")
            .event("gone", "change")
            .build();
        let result = postback(
            State(Arc::clone(&ctx)),
            Path(created.session_id),
            Form(fields),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_render_reinitializes_page() {
        let ctx = context(Config::default());
        let created = new_session(&ctx).await;

        let Json(batch) = render(State(Arc::clone(&ctx)), Path(created.session_id))
            .await
            .unwrap();

        assert_eq!(batch.instructions.len(), created.batch.instructions.len());
        assert!(batch.instructions.iter().all(|i| i.is_init()));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let ctx = context(Config::default());
        let created = new_session(&ctx).await;

        let status = delete_session(
            State(Arc::clone(&ctx)),
            Path(created.session_id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let result =
            render(State(Arc::clone(&ctx)), Path(created.session_id)).await;
        assert!(matches!(result, Err(ApiError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_unknown_template() {
        let ctx = context(Config {
            page_template: "nope".to_string(),
            ..Config::default()
        });
        let result = create_session(State(ctx)).await;
        assert!(matches!(result, Err(ApiError::UnknownTemplate(_))));
    }

    #[tokio::test]
    async fn test_session_limit() {
        let ctx = context(Config {
            max_sessions: 1,
            ..Config::default()
        });
        new_session(&ctx).await;

        let result = create_session(State(Arc::clone(&ctx))).await;
        assert!(matches!(result, Err(ApiError::TooManySessions)));
    }
}
