//! JSend envelopes and the error type every handler returns.
//!
//! Client mistakes answer with `{"status": "fail", "data": {"message": ..}}`,
//! server faults with `{"status": "error", "message": ..}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::allocator::StoreError;
use crate::storage::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Success,
}

#[derive(Debug, Serialize)]
pub struct JSend<T: Serialize> {
    pub data: T,
    pub status: JSendStatus,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            data,
            status: JSendStatus::Success,
        })
    }
}

/// A page of list results plus the window it was cut from.
#[derive(Debug, Serialize)]
pub struct JSendPaginated<T: Serialize> {
    pub data: PaginatedData<T>,
    pub status: JSendStatus,
}

#[derive(Debug, Serialize)]
pub struct PaginatedData<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
}

impl<T: Serialize> JSendPaginated<T> {
    pub fn success(items: Vec<T>, pagination: Pagination) -> Json<JSendPaginated<T>> {
        Json(JSendPaginated {
            data: PaginatedData { items, pagination },
            status: JSendStatus::Success,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, PartialEq)]
pub enum ApiError {
    /// Malformed body or query, or a blank required field
    Invalid(String),
    NotFound(String),
    /// An asset id was claimed by another writer and retries ran out
    AssetIdTaken(String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AssetIdTaken(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Invalid(message) | ApiError::NotFound(message) => {
                json!({ "status": "fail", "data": { "message": message } })
            }
            ApiError::AssetIdTaken(asset_id) => json!({
                "status": "fail",
                "data": { "message": format!("asset id '{asset_id}' is already in use") },
            }),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                json!({ "status": "error", "message": message })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::AssetIdTaken(asset_id) => ApiError::AssetIdTaken(asset_id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(asset_id) => ApiError::AssetIdTaken(asset_id),
            StoreError::Backend(message) => ApiError::Internal(message),
        }
    }
}

/// Reject missing or whitespace-only required strings.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} must not be empty")));
    }
    Ok(())
}

// ============================================================================
// Extractors
// ============================================================================

/// `axum::Json` that rejects with a JSend fail body.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(body_error(&rejection)))?;
        Ok(AppJson(value))
    }
}

fn body_error(rejection: &JsonRejection) -> String {
    match rejection {
        // e.g. unknown equipment type, missing job_id
        JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected Content-Type: application/json".to_string()
        }
        _ => "Could not read request body".to_string(),
    }
}

/// Query-string extractor for list filters (`customer_id`, `job_id`,
/// `limit`, `offset`).
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        let query = parts.uri.query().unwrap_or_default();
        serde_qs::from_str(query)
            .map(AppQuery)
            .map_err(|e| ApiError::bad_request(query_error(&e.to_string())))
    }
}

/// `limit` and `offset` are the only numeric filters; name them the way a
/// caller would rather than by Rust type.
fn query_error(raw: &str) -> String {
    let cleaned = raw.replace("u32", "a non-negative whole number");
    format!("Invalid list filter: {cleaned}")
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_is_fail() {
        let (status, json) = render(ApiError::not_found("Asset not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "fail");
        assert_eq!(json["data"]["message"], "Asset not found");
    }

    #[tokio::test]
    async fn test_taken_asset_id_is_conflict() {
        let err = ApiError::from(StoreError::Conflict("42-8".to_string()));
        let (status, json) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["data"]["message"], "asset id '42-8' is already in use");

        let err = ApiError::from(DatabaseError::AssetIdTaken("42-8".to_string()));
        assert_eq!(err, ApiError::AssetIdTaken("42-8".to_string()));
    }

    #[tokio::test]
    async fn test_backend_failure_is_error() {
        let err = ApiError::from(StoreError::Backend("disk full".to_string()));
        let (status, json) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "disk full");
    }

    #[test]
    fn test_query_error_wording() {
        assert_eq!(
            query_error("limit: invalid digit found in string, expected u32"),
            "Invalid list filter: limit: invalid digit found in string, expected a non-negative whole number"
        );
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("job_id", "job-1").is_ok());
        assert_eq!(
            require_non_blank("job_id", "  "),
            Err(ApiError::Invalid("job_id must not be empty".to_string()))
        );
    }
}
