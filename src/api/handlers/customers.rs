use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::allocator::normalize_customer_code;
use crate::api::response::{ApiError, JSend};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct NextAssetIdResponse {
    pub asset_id: String,
    pub customer_id: String,
}

#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub customer_id: String,
    pub next_counter: u64,
    pub updated_at: String,
}

/// Preview the next asset id for a customer. Nothing is reserved, and this
/// never fails: degraded paths still produce an id.
pub async fn next_asset_id(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Json<JSend<NextAssetIdResponse>> {
    let asset_id = state.allocator.allocate_next_id(&customer_id).await;
    JSend::success(NextAssetIdResponse {
        asset_id,
        customer_id,
    })
}

pub async fn get_counter(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<JSend<CounterResponse>>, ApiError> {
    let code = normalize_customer_code(&customer_id);
    let counter = state
        .db
        .get_counter(code)?
        .ok_or_else(|| ApiError::not_found("No asset counter for customer"))?;

    Ok(JSend::success(CounterResponse {
        customer_id: counter.customer_id,
        next_counter: counter.next_counter,
        updated_at: counter.updated_at.to_rfc3339(),
    }))
}
