//! Reconciliation Module
//!
//! Turns an uploaded shipment CSV into a reconciled line-item table by
//! joining every row against master data. Missing SKUs fail the whole
//! batch before anything is committed; per-row numeric damage is clamped
//! to safe defaults and logged instead.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use shared::error::{AppError, ErrorCode};
use shared::models::{LineItem, MasterRecord};
use std::collections::HashMap;
use thiserror::Error;

const SKU_COLUMN: &str = "SKU Id";
const QTY_COLUMN: &str = "Quantity Sent";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),

    #[error("{} SKUs are missing from master data", .0.len())]
    MissingSkus(Vec<String>),

    #[error("Master data is empty, sync required")]
    MasterDataEmpty,
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::MissingSkus(skus) => AppError::with_message(
                ErrorCode::SkuNotInMaster,
                "Uploaded file contains SKUs that are not in master data",
            )
            .with_detail("missing_skus", skus),
            ReconcileError::MasterDataEmpty => AppError::new(ErrorCode::MasterDataEmpty),
            ReconcileError::MissingColumn(col) => {
                AppError::with_message(ErrorCode::RequiredField, format!("Column '{}' missing", col))
            }
            ReconcileError::EmptyFile => AppError::new(ErrorCode::EmptyFile),
            ReconcileError::Csv(e) => {
                AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
            }
        }
    }
}

/// Result of reconciling one uploaded file
#[derive(Debug)]
pub struct ReconciledUpload {
    pub line_items: Vec<LineItem>,
}

/// Reconcile an uploaded CSV against master data.
///
/// Hard validation gate: every SKU must exist in master data or the whole
/// batch fails with the full list of offenders.
pub fn reconcile_csv(
    csv_bytes: &[u8],
    master: &HashMap<String, MasterRecord>,
) -> Result<ReconciledUpload, ReconcileError> {
    if master.is_empty() {
        return Err(ReconcileError::MasterDataEmpty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_bytes);

    let headers = reader.headers()?.clone();
    let sku_idx = column_index(&headers, SKU_COLUMN)
        .ok_or(ReconcileError::MissingColumn(SKU_COLUMN))?;
    let qty_idx = column_index(&headers, QTY_COLUMN)
        .ok_or(ReconcileError::MissingColumn(QTY_COLUMN))?;
    let fsn_idx = column_index(&headers, "FSN");

    struct RawRow {
        sku: String,
        qty: Option<String>,
        fsn: Option<String>,
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let sku = record.get(sku_idx).unwrap_or("").trim().to_string();
        if sku.is_empty() {
            continue;
        }
        rows.push(RawRow {
            sku,
            qty: record.get(qty_idx).map(str::to_string),
            fsn: fsn_idx.and_then(|i| record.get(i)).map(str::to_string),
        });
    }

    if rows.is_empty() {
        return Err(ReconcileError::EmptyFile);
    }

    // Validation gate: collect every offender before reporting
    let mut missing: Vec<String> = rows
        .iter()
        .filter(|r| !master.contains_key(&r.sku))
        .map(|r| r.sku.clone())
        .collect();
    missing.sort();
    missing.dedup();
    if !missing.is_empty() {
        return Err(ReconcileError::MissingSkus(missing));
    }

    let line_items = rows
        .iter()
        .map(|row| {
            let record = &master[&row.sku];
            let qty = parse_qty(row.qty.as_deref());
            let ppcn = LineItem::coerce_ppcn(Some(record.units_per_carton));

            let fsn = record
                .fsn
                .clone()
                .or_else(|| row.fsn.clone())
                .filter(|s| !s.is_empty());
            let ean = record
                .ean
                .as_deref()
                .map(strip_ean_artifact)
                .filter(|s| !s.is_empty());

            LineItem {
                sku_id: row.sku.clone(),
                product_name: record.product_name.clone(),
                editable_qty: qty,
                units_per_carton: ppcn,
                editable_boxes: round_boxes(qty as f64 / ppcn),
                fsn,
                ean,
            }
        })
        .collect();

    Ok(ReconciledUpload { line_items })
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Parse a shipped quantity; damaged values clamp to zero
fn parse_qty(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else { return 0 };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.trunc() as u32,
        Ok(_) => 0,
        Err(_) => {
            if !raw.trim().is_empty() {
                tracing::warn!(value = %raw, "unparseable quantity clamped to 0");
            }
            0
        }
    }
}

/// Two-decimal display rounding for the box count
pub(crate) fn round_boxes(raw: f64) -> f64 {
    Decimal::from_f64(raw)
        .map(|d| d.round_dp(2))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// Strip the trailing ".0" spreadsheet artifact from an EAN
pub fn strip_ean_artifact(ean: &str) -> String {
    ean.trim().strip_suffix(".0").unwrap_or(ean.trim()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> HashMap<String, MasterRecord> {
        let mut map = HashMap::new();
        for (sku, ppcn, ean) in [("A", 5.0, "8901.0"), ("B", 3.0, "8902")] {
            map.insert(
                sku.to_string(),
                MasterRecord {
                    sku: sku.to_string(),
                    product_name: format!("Product {}", sku),
                    units_per_carton: ppcn,
                    ean: Some(ean.to_string()),
                    fsn: Some(format!("FSN-{}", sku)),
                },
            );
        }
        map
    }

    #[test]
    fn test_reconcile_joins_master() {
        let csv = b"SKU Id,Quantity Sent\nA,20\nB,9\n";
        let upload = reconcile_csv(csv, &master()).unwrap();

        assert_eq!(upload.line_items.len(), 2);
        let a = &upload.line_items[0];
        assert_eq!(a.sku_id, "A");
        assert_eq!(a.editable_qty, 20);
        assert_eq!(a.units_per_carton, 5.0);
        assert_eq!(a.editable_boxes, 4.0);
        assert_eq!(a.ean.as_deref(), Some("8901"));
        assert_eq!(a.fsn.as_deref(), Some("FSN-A"));
    }

    #[test]
    fn test_missing_sku_fails_whole_batch() {
        let csv = b"SKU Id,Quantity Sent\nA,20\nZZZ,5\nYYY,2\n";
        let err = reconcile_csv(csv, &master()).unwrap_err();
        match err {
            ReconcileError::MissingSkus(skus) => {
                assert_eq!(skus, vec!["YYY".to_string(), "ZZZ".to_string()]);
            }
            other => panic!("expected MissingSkus, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_master_rejected() {
        let csv = b"SKU Id,Quantity Sent\nA,20\n";
        assert!(matches!(
            reconcile_csv(csv, &HashMap::new()),
            Err(ReconcileError::MasterDataEmpty)
        ));
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = b"SKU,Qty\nA,20\n";
        assert!(matches!(
            reconcile_csv(csv, &master()),
            Err(ReconcileError::MissingColumn("SKU Id"))
        ));
    }

    #[test]
    fn test_damaged_quantity_clamps_to_zero() {
        let csv = b"SKU Id,Quantity Sent\nA,garbage\nB,9\n";
        let upload = reconcile_csv(csv, &master()).unwrap();
        assert_eq!(upload.line_items[0].editable_qty, 0);
        assert_eq!(upload.line_items[0].editable_boxes, 0.0);
        assert_eq!(upload.line_items[1].editable_qty, 9);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let csv = b"SKU Id , Quantity Sent \n A , 20 \n";
        let upload = reconcile_csv(csv, &master()).unwrap();
        assert_eq!(upload.line_items[0].sku_id, "A");
        assert_eq!(upload.line_items[0].editable_qty, 20);
    }

    #[test]
    fn test_boxes_rounded_to_two_decimals() {
        let csv = b"SKU Id,Quantity Sent\nB,10\n";
        let upload = reconcile_csv(csv, &master()).unwrap();
        // 10 / 3 = 3.333... -> 3.33
        assert_eq!(upload.line_items[0].editable_boxes, 3.33);
    }

    #[test]
    fn test_strip_ean_artifact() {
        assert_eq!(strip_ean_artifact("8901234.0"), "8901234");
        assert_eq!(strip_ean_artifact("8901234"), "8901234");
        assert_eq!(strip_ean_artifact(" 8901234.0 "), "8901234");
    }
}
