//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router for the state's role.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().route("/health", get(handlers::health_check));

    if state.orchestrator.is_some() {
        let resource_routes = Router::new()
            .route(
                "/resources",
                post(handlers::upload_resource)
                    .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
                    .delete(handlers::delete_resources),
            )
            .route("/resources/{id}", get(handlers::get_resource));
        router = router.merge(resource_routes);
    }

    if state.songs.is_some() {
        let song_routes = Router::new()
            .route(
                "/songs",
                post(handlers::create_song).delete(handlers::delete_songs),
            )
            .route("/songs/{id}", get(handlers::get_song));
        router = router.merge(song_routes);
    }

    if state.config.server.metrics_enabled {
        crate::metrics::register_metrics();
        router = router.route("/metrics", get(metrics_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
