pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))

        // API routes
        .nest("/api/events", event_routes())

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::events::list).post(handlers::events::create))
        .route("/conflicts", post(handlers::events::check_conflicts))
        .route("/:id", get(handlers::events::get).put(handlers::events::update))
        .route("/:id/status", post(handlers::events::change_status))
        .route("/:id/archive", post(handlers::events::archive))
        .route("/:id/attendees", get(handlers::attendees::list).post(handlers::attendees::add))
}
