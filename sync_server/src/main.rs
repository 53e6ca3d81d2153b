/**
 * Entrypoint for the widget sync HTTP service.
 *
 * Each session holds one page of server-side widget models. Browsers post
 * feedback and events to their session and receive the instructions that
 * bring their widgets in line with the models.
 */
use std::sync::Arc;

mod config;
mod error;
mod routes;
mod sessions;
mod templates;

use config::Config;
use routes::AppContext;

#[tokio::main]
async fn main() {
    // Initialize the application context (which also initializes tracing)
    let app_context = ws_app::create_app_context::<AppContext, Config>()
        .await
        .expect("Failed to create app context");

    let bind_address = app_context.config.bind_address.clone();
    let app = routes::app(Arc::new(app_context));

    if let Err(e) = ws_axum::run_app(app, &bind_address).await {
        tracing::error!("server stopped: {e}");
        std::process::exit(1);
    }
}
