use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lab asset created when a certificate is first saved. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    /// "{customer}-{n}", present when an asset code was allocated
    #[serde(default)]
    pub asset_id: Option<String>,
    pub customer_id: String,
    pub job_id: String,
    pub name: String,
    pub file_url: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub report_id: Option<String>,
}

/// Advisory cache of the next number to hand out for a customer code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAssetCounter {
    pub customer_id: String,
    pub next_counter: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Pass,
    Fail,
}

/// A single pass/fail row in an asset's test history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestHistoryEntry {
    pub id: String,
    pub asset_record_id: String,
    pub job_id: String,
    pub result: TestResult,
    pub tested_at: DateTime<Utc>,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Kind of equipment a certificate covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Gloves,
    LineHose,
    Meter,
    Other,
    Sleeves,
}

/// A saved test certificate. The form body is kept as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateReport {
    pub id: String,
    pub job_id: String,
    pub customer_id: String,
    pub equipment: EquipmentType,
    pub name: String,
    pub file_url: String,
    pub result: TestResult,
    #[serde(default)]
    pub form: serde_json::Map<String, serde_json::Value>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
