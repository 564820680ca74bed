//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Faucet endpoints are mounted under `/api/v1`; the chat dispatcher calls
//! them when a user opens the faucet screen or presses "Claim".

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document for the REST endpoints.
#[cfg(feature = "swagger-ui")]
#[derive(utoipa::OpenApi)]
#[openapi(
    info(title = "faucet-gateway", description = "Faucet claims for the chat-bot front end"),
    paths(
        handlers::system::health_handler,
        handlers::faucet::list_tiers,
        handlers::faucet::show_screen,
        handlers::faucet::handle_callback,
    ),
    tags(
        (name = "Faucet", description = "Cooldown-gated claims"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, Swagger UI and the HTTP
/// middleware stack.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router()
        .route("/ws", get(ws_handler))
        .layer(TimeoutLayer::new(request_timeout));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
