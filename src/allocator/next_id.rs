//! Per-customer asset id allocation.
//!
//! Ids have the form `{customer}-{n}`. The next number is derived from the
//! highest suffix already stored for the customer; the counter table is only
//! consulted when that scan fails. Allocation never returns an error: each
//! failure degrades to a synthesized id so that saving a certificate is never
//! blocked on numbering.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::{AssetStore, StoreError};
use crate::storage::models::AssetRecord;

/// Code substituted for customer ids that look like UUIDs.
pub const FALLBACK_CUSTOMER_CODE: &str = "1";

/// Some callers pass the customer's database UUID instead of its short code.
/// Any hyphen is taken as a sign of that.
pub fn is_likely_uuid(customer_id: &str) -> bool {
    customer_id.contains('-')
}

/// Map a caller-supplied customer id to the code used as the id namespace.
pub fn normalize_customer_code(customer_id: &str) -> &str {
    if is_likely_uuid(customer_id) {
        FALLBACK_CUSTOMER_CODE
    } else {
        customer_id
    }
}

/// Numeric suffix of an asset id. Anything other than exactly two
/// hyphen-separated tokens with an integer second token yields `None`.
pub fn parse_suffix(asset_id: &str) -> Option<u64> {
    let mut parts = asset_id.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(suffix), None) => suffix.parse().ok(),
        _ => None,
    }
}

/// Input for [`AssetIdAllocator::create_asset`].
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub job_id: String,
    pub customer_id: String,
    pub name: String,
    pub file_url: String,
    pub created_by: String,
    /// Customer code to number the asset under. Without one the asset is
    /// stored with no asset id.
    pub asset_customer_code: Option<String>,
    pub parent_report_id: Option<String>,
}

pub struct AssetIdAllocator {
    store: Arc<dyn AssetStore>,
    insert_attempts: u32,
}

impl AssetIdAllocator {
    pub fn new(store: Arc<dyn AssetStore>, insert_attempts: u32) -> Self {
        Self {
            store,
            insert_attempts: insert_attempts.max(1),
        }
    }

    /// Compute the next asset id for a customer without reserving it.
    pub async fn allocate_next_id(&self, customer_id: &str) -> String {
        if customer_id.is_empty() {
            return format!("{customer_id}-1");
        }

        let code = normalize_customer_code(customer_id);
        if code != customer_id {
            debug!(customer_id, code, "Customer id looks like a UUID, using fallback code");
        }

        match self.next_from_existing(code).await {
            Ok(next) => {
                self.bump_counter(code, next).await;
                format!("{code}-{next}")
            }
            Err(e) => {
                warn!(customer = %code, error = %e, "Asset id scan failed, using counter");
                match self.next_from_counter(code).await {
                    Ok(asset_id) => asset_id,
                    Err(e) => {
                        warn!(customer = %code, error = %e, "Asset counter unavailable, using timestamp");
                        format!("{code}-{}", Utc::now().timestamp_millis())
                    }
                }
            }
        }
    }

    /// `max(existing suffixes) + 1`. Gaps below the maximum are not reused.
    async fn next_from_existing(&self, code: &str) -> Result<u64, StoreError> {
        let prefix = format!("{code}-");
        let existing = self.store.list_asset_ids_with_prefix(&prefix).await?;
        let max = existing
            .iter()
            .filter_map(|asset_id| parse_suffix(asset_id))
            .max()
            .unwrap_or(0);
        Ok(max.saturating_add(1))
    }

    /// Keep the advisory counter ahead of `next`. Failures are only logged.
    async fn bump_counter(&self, code: &str, next: u64) {
        let wanted = next.saturating_add(1);
        let result = match self.store.get_counter(code).await {
            Ok(Some(counter)) if counter.next_counter > next => Ok(()),
            Ok(_) => self.store.put_counter(code, wanted).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(customer = %code, error = %e, "Failed to update asset counter");
        }
    }

    /// Counter-only numbering, used when existing ids cannot be listed.
    async fn next_from_counter(&self, code: &str) -> Result<String, StoreError> {
        match self.store.get_counter(code).await? {
            None => {
                if let Err(e) = self.store.put_counter(code, 2).await {
                    warn!(customer = %code, error = %e, "Failed to create asset counter");
                }
                Ok(format!("{code}-1"))
            }
            Some(counter) => {
                let current = counter.next_counter;
                if let Err(e) = self.store.put_counter(code, current.saturating_add(1)).await {
                    warn!(customer = %code, error = %e, "Failed to advance asset counter");
                }
                Ok(format!("{code}-{current}"))
            }
        }
    }

    /// Persist a new asset, minting a fresh asset id for it when a customer
    /// code is given. A duplicate id (another writer got there first) is
    /// retried with a newly allocated id; other store errors are returned.
    pub async fn create_asset(&self, new: NewAsset) -> Result<AssetRecord, StoreError> {
        let code = new
            .asset_customer_code
            .as_deref()
            .filter(|code| !code.is_empty());

        let mut attempt = 0;
        loop {
            attempt += 1;

            let asset_id = match code {
                Some(code) => Some(self.allocate_next_id(code).await).filter(|id| !id.is_empty()),
                None => None,
            };

            let record = AssetRecord {
                id: uuid::Uuid::new_v4().to_string(),
                asset_id,
                customer_id: new.customer_id.clone(),
                job_id: new.job_id.clone(),
                name: new.name.clone(),
                file_url: new.file_url.clone(),
                created_by: new.created_by.clone(),
                created_at: Utc::now(),
                report_id: new.parent_report_id.clone(),
            };

            match self.store.insert_asset(record).await {
                Ok(created) => {
                    debug!(
                        asset = %created.id,
                        asset_id = created.asset_id.as_deref().unwrap_or(""),
                        "Created asset"
                    );
                    return Ok(created);
                }
                Err(StoreError::Conflict(taken)) if attempt < self.insert_attempts => {
                    warn!(asset_id = %taken, attempt, "Asset id taken concurrently, reallocating");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
