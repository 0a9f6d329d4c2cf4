//! Master data sync
//!
//! Pulls the product master from a remote CSV export and replaces the
//! local store wholesale. Reconciliation only ever reads the local copy,
//! so a failed sync leaves the previous master intact.

use crate::reconcile::strip_ean_artifact;
use crate::storage::{ConsignmentStorage, StorageError};
use shared::error::{AppError, ErrorCode};
use shared::models::{LineItem, MasterRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("MASTER_DATA_URL is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotConfigured => {
                AppError::with_message(ErrorCode::ConfigError, err.to_string())
            }
            SyncError::MissingColumn(col) => AppError::with_message(
                ErrorCode::MasterColumnMissing,
                format!("Column '{}' missing from master data", col),
            ),
            SyncError::Storage(e) => AppError::database(e.to_string()),
            other => AppError::with_message(ErrorCode::MasterSyncFailed, other.to_string()),
        }
    }
}

/// Master data sync service
#[derive(Debug, Clone)]
pub struct MasterSyncService {
    http: reqwest::Client,
    url: Option<String>,
    storage: ConsignmentStorage,
}

impl MasterSyncService {
    pub fn new(url: Option<String>, storage: ConsignmentStorage) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            storage,
        }
    }

    /// Fetch the remote CSV and replace the local master table.
    ///
    /// Returns the number of records stored.
    pub async fn sync(&self) -> Result<usize, SyncError> {
        let url = self.url.as_deref().ok_or(SyncError::NotConfigured)?;

        tracing::info!(url = %url, "syncing master data");
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let records = parse_master_csv(body.as_bytes())?;
        self.storage.replace_master(&records)?;

        tracing::info!(records = records.len(), "master data synced");
        Ok(records.len())
    }
}

/// Parse a master data CSV export.
///
/// `SKU` and `PPCN` columns are mandatory; everything else is best-effort.
pub fn parse_master_csv(bytes: &[u8]) -> Result<Vec<MasterRecord>, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let sku_idx = col("SKU").ok_or(SyncError::MissingColumn("SKU"))?;
    let ppcn_idx = col("PPCN").ok_or(SyncError::MissingColumn("PPCN"))?;
    let name_idx = col("Product Name");
    let ean_idx = col("EAN");
    let fsn_idx = col("FSN");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let sku = row.get(sku_idx).unwrap_or("").trim().to_string();
        if sku.is_empty() {
            continue;
        }

        let ppcn_raw = row.get(ppcn_idx).and_then(|v| v.trim().parse::<f64>().ok());

        records.push(MasterRecord {
            sku,
            product_name: name_idx
                .and_then(|i| row.get(i))
                .unwrap_or("")
                .to_string(),
            units_per_carton: LineItem::coerce_ppcn(ppcn_raw),
            ean: ean_idx
                .and_then(|i| row.get(i))
                .map(strip_ean_artifact)
                .filter(|s| !s.is_empty()),
            fsn: fsn_idx
                .and_then(|i| row.get(i))
                .map(str::to_string)
                .filter(|s| !s.is_empty()),
        });
    }

    Ok(records)
}
