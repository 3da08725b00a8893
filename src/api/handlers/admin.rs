use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub assets_deleted: u64,
    pub counters_deleted: u64,
    pub reports_deleted: u64,
    pub test_entries_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state.db.purge_all()?;

    tracing::warn!(
        assets = stats.assets,
        reports = stats.reports,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        assets_deleted: stats.assets,
        counters_deleted: stats.counters,
        reports_deleted: stats.reports,
        test_entries_deleted: stats.test_entries,
    }))
}
