use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::allocator::NewAsset;
use crate::api::response::{
    require_non_blank, ApiError, AppJson, AppQuery, JSend, JSendPaginated, Pagination,
};
use crate::storage::models::{AssetRecord, TestHistoryEntry, TestResult};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub asset_id: Option<String>,
    pub created_at: String,
    pub created_by: String,
    pub customer_id: String,
    pub file_url: String,
    pub id: String,
    pub job_id: String,
    pub name: String,
    pub report_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestEntryResponse {
    pub asset_record_id: String,
    pub id: String,
    pub job_id: String,
    pub notes: Option<String>,
    pub result: TestResult,
    pub technician: Option<String>,
    pub tested_at: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAssetRequest {
    pub job_id: String,
    pub customer_id: String,
    pub name: String,
    pub file_url: String,
    pub created_by: String,
    /// Customer code to number the asset under; omitted means no asset id
    #[serde(default)]
    pub asset_customer_code: Option<String>,
    #[serde(default)]
    pub parent_report_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AppendTestRequest {
    pub job_id: String,
    pub result: TestResult,
    #[serde(default)]
    pub tested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListAssetsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

fn default_limit() -> u32 {
    20
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateAssetRequest>,
) -> Result<Json<JSend<AssetResponse>>, ApiError> {
    require_non_blank("job_id", &req.job_id)?;
    require_non_blank("customer_id", &req.customer_id)?;
    require_non_blank("name", &req.name)?;
    require_non_blank("created_by", &req.created_by)?;

    if let Some(ref report_id) = req.parent_report_id {
        if state.db.get_report(report_id)?.is_none() {
            return Err(ApiError::not_found("Parent report not found"));
        }
    }

    let asset = state
        .allocator
        .create_asset(NewAsset {
            job_id: req.job_id,
            customer_id: req.customer_id,
            name: req.name,
            file_url: req.file_url,
            created_by: req.created_by,
            asset_customer_code: req.asset_customer_code,
            parent_report_id: req.parent_report_id,
        })
        .await?;

    Ok(JSend::success(asset_to_response(&asset)))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<AssetResponse>>, ApiError> {
    let asset = find_asset(&state, &id)?;
    Ok(JSend::success(asset_to_response(&asset)))
}

pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    if !state.db.delete_asset(&id)? {
        return Err(ApiError::not_found("Asset not found"));
    }

    tracing::debug!(asset = %id, "Deleted asset");
    Ok(JSend::success(()))
}

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListAssetsParams>,
) -> Result<Json<JSendPaginated<AssetResponse>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let assets = state
        .db
        .list_assets(params.customer_id.as_deref(), params.job_id.as_deref())?;

    let total = assets.len() as u64;
    let items: Vec<AssetResponse> = assets
        .iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(asset_to_response)
        .collect();

    Ok(JSendPaginated::success(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    ))
}

pub async fn append_test_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AppendTestRequest>,
) -> Result<Json<JSend<TestEntryResponse>>, ApiError> {
    require_non_blank("job_id", &req.job_id)?;
    let asset = find_asset(&state, &id)?;

    let entry = TestHistoryEntry {
        id: uuid::Uuid::new_v4().to_string(),
        asset_record_id: asset.id,
        job_id: req.job_id,
        result: req.result,
        tested_at: req.tested_at.unwrap_or_else(Utc::now),
        technician: req.technician,
        notes: req.notes,
    };
    state.db.append_test_entry(&entry)?;

    tracing::debug!(asset = %id, result = ?entry.result, "Recorded test");
    Ok(JSend::success(test_entry_to_response(&entry)))
}

pub async fn list_test_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<Vec<TestEntryResponse>>>, ApiError> {
    let asset = find_asset(&state, &id)?;
    let entries = state.db.get_test_history(&asset.id)?;

    Ok(JSend::success(
        entries.iter().map(test_entry_to_response).collect(),
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn find_asset(state: &AppState, id: &str) -> Result<AssetRecord, ApiError> {
    state
        .db
        .get_asset(id)?
        .ok_or_else(|| ApiError::not_found("Asset not found"))
}

pub(super) fn asset_to_response(asset: &AssetRecord) -> AssetResponse {
    AssetResponse {
        asset_id: asset.asset_id.clone(),
        created_at: asset.created_at.to_rfc3339(),
        created_by: asset.created_by.clone(),
        customer_id: asset.customer_id.clone(),
        file_url: asset.file_url.clone(),
        id: asset.id.clone(),
        job_id: asset.job_id.clone(),
        name: asset.name.clone(),
        report_id: asset.report_id.clone(),
    }
}

pub(super) fn test_entry_to_response(entry: &TestHistoryEntry) -> TestEntryResponse {
    TestEntryResponse {
        asset_record_id: entry.asset_record_id.clone(),
        id: entry.id.clone(),
        job_id: entry.job_id.clone(),
        notes: entry.notes.clone(),
        result: entry.result,
        technician: entry.technician.clone(),
        tested_at: entry.tested_at.to_rfc3339(),
    }
}
