//! API module providing the HTTP surface.
//!
//! - `login` - Token login endpoints (/api/login/*)
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod health;
pub mod login;
pub mod openapi;

pub use login::LoginAppState;

use crate::AppResources;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Build the application router. Shared with the integration tests so they
/// exercise the same middleware stack as the binary.
pub fn build_router(login_state: LoginAppState, app_resources: AppResources) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api/login", login::router(login_state))
        .routes(routes!(health::health))
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(login_state, app_resources))]
pub async fn start_webserver(
    login_state: LoginAppState,
    app_resources: AppResources,
) -> color_eyre::Result<()> {
    let router = build_router(login_state, app_resources);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!(addr = "0.0.0.0:8080", "Server running");
    axum::serve(listener, router)
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
