use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::assets::{asset_to_response, test_entry_to_response, AssetResponse, TestEntryResponse};
use crate::allocator::NewAsset;
use crate::api::response::{require_non_blank, ApiError, AppJson, JSend};
use crate::storage::models::{CertificateReport, EquipmentType, TestHistoryEntry, TestResult};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub created_at: String,
    pub created_by: String,
    pub customer_id: String,
    pub equipment: EquipmentType,
    pub file_url: String,
    pub form: serde_json::Map<String, serde_json::Value>,
    pub id: String,
    pub job_id: String,
    pub name: String,
    pub result: TestResult,
}

/// Outcome of saving a certificate. The report is always saved when this is
/// returned; asset and history problems show up in `warnings`.
#[derive(Debug, Serialize)]
pub struct SaveCertificateResponse {
    pub asset: Option<AssetResponse>,
    pub report: CertificateResponse,
    pub test_entry: Option<TestEntryResponse>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SaveCertificateRequest {
    pub job_id: String,
    pub customer_id: String,
    pub equipment: EquipmentType,
    pub name: String,
    pub file_url: String,
    pub result: TestResult,
    #[serde(default)]
    pub form: serde_json::Map<String, serde_json::Value>,
    pub created_by: String,
    /// Customer code for the asset id, defaults to `customer_id`
    #[serde(default)]
    pub asset_customer_code: Option<String>,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Save a certificate, then create its asset and first test history row.
pub async fn save_certificate(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SaveCertificateRequest>,
) -> Result<Json<JSend<SaveCertificateResponse>>, ApiError> {
    require_non_blank("job_id", &req.job_id)?;
    require_non_blank("customer_id", &req.customer_id)?;
    require_non_blank("name", &req.name)?;
    require_non_blank("created_by", &req.created_by)?;

    let report = CertificateReport {
        id: uuid::Uuid::new_v4().to_string(),
        job_id: req.job_id,
        customer_id: req.customer_id,
        equipment: req.equipment,
        name: req.name,
        file_url: req.file_url,
        result: req.result,
        form: req.form,
        created_by: req.created_by,
        created_at: Utc::now(),
    };
    state.db.put_report(&report)?;
    tracing::debug!(report = %report.id, job = %report.job_id, "Saved certificate");

    // Past this point the save has succeeded; later failures become warnings
    let mut warnings = Vec::new();

    let code = req
        .asset_customer_code
        .unwrap_or_else(|| report.customer_id.clone());
    let created = state
        .allocator
        .create_asset(NewAsset {
            job_id: report.job_id.clone(),
            customer_id: report.customer_id.clone(),
            name: report.name.clone(),
            file_url: report.file_url.clone(),
            created_by: report.created_by.clone(),
            asset_customer_code: Some(code),
            parent_report_id: Some(report.id.clone()),
        })
        .await;

    let asset = match created {
        Ok(asset) => Some(asset),
        Err(e) => {
            tracing::warn!(report = %report.id, error = %e, "Certificate saved without asset");
            warnings.push(format!(
                "Certificate saved, but the asset record could not be created: {e}"
            ));
            None
        }
    };

    let mut test_entry = None;
    if let Some(ref asset) = asset {
        let entry = TestHistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            asset_record_id: asset.id.clone(),
            job_id: report.job_id.clone(),
            result: report.result,
            tested_at: report.created_at,
            technician: req.technician,
            notes: req.notes,
        };
        match state.db.append_test_entry(&entry) {
            Ok(()) => test_entry = Some(entry),
            Err(e) => {
                tracing::warn!(asset = %asset.id, error = %e, "Failed to record test history");
                warnings.push(format!(
                    "Certificate saved, but the test history could not be recorded: {e}"
                ));
            }
        }
    }

    Ok(JSend::success(SaveCertificateResponse {
        asset: asset.as_ref().map(asset_to_response),
        report: report_to_response(&report),
        test_entry: test_entry.as_ref().map(test_entry_to_response),
        warnings,
    }))
}

pub async fn get_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<CertificateResponse>>, ApiError> {
    let report = state
        .db
        .get_report(&id)?
        .ok_or_else(|| ApiError::not_found("Certificate not found"))?;

    Ok(JSend::success(report_to_response(&report)))
}

// ============================================================================
// Helpers
// ============================================================================

fn report_to_response(report: &CertificateReport) -> CertificateResponse {
    CertificateResponse {
        created_at: report.created_at.to_rfc3339(),
        created_by: report.created_by.clone(),
        customer_id: report.customer_id.clone(),
        equipment: report.equipment,
        file_url: report.file_url.clone(),
        form: report.form.clone(),
        id: report.id.clone(),
        job_id: report.job_id.clone(),
        name: report.name.clone(),
        result: report.result,
    }
}
