use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_size as usize;

    let mut router = Router::new()
        // Assets
        .route("/assets", get(handlers::list_assets))
        .route("/assets", post(handlers::create_asset))
        .route("/assets/:id", delete(handlers::delete_asset))
        .route("/assets/:id", get(handlers::get_asset))
        .route("/assets/:id/tests", get(handlers::list_test_history))
        .route("/assets/:id/tests", post(handlers::append_test_entry))
        // Certificates
        .route("/certificates", post(handlers::save_certificate))
        .route("/certificates/:id", get(handlers::get_certificate))
        // Customers
        .route(
            "/customers/:customer_id/next-asset-id",
            get(handlers::next_asset_id),
        )
        .route("/customers/:customer_id/counter", get(handlers::get_counter))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled, purge route is available");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
