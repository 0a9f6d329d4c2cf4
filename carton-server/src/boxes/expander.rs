//! Box expander
//!
//! Turns a line-item table into the ordered list of physical boxes.
//! The expansion is a pure function of the table: it is re-derived on every
//! access and never persisted, so box numbers can never drift from the data
//! that produced them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::models::LineItem;

/// One physical shipping carton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    /// 1-based, dense, assigned in ascending SKU order
    pub box_number: u32,
    pub sku: String,
    pub fsn: Option<String>,
    pub ean: Option<String>,
    /// Units inside this one box (= units_per_carton of the owning item)
    pub qty: f64,
}

/// Expand a line-item table into boxes.
///
/// Items are walked in ascending `sku_id` order (stable, ties keep original
/// order); each emits `floor(editable_boxes)` boxes numbered by a running
/// counter starting at 1. Items with damaged or non-positive counts emit
/// zero boxes; the rest of the table still expands.
pub fn expand(line_items: &[LineItem]) -> Vec<BoxRecord> {
    let mut sorted: Vec<&LineItem> = line_items.iter().collect();
    sorted.sort_by(|a, b| a.sku_id.cmp(&b.sku_id));

    let mut boxes = Vec::new();
    let mut next_number = 1u32;

    for item in sorted {
        for _ in 0..item.box_count() {
            boxes.push(BoxRecord {
                box_number: next_number,
                sku: item.sku_id.clone(),
                fsn: item.fsn.clone(),
                ean: item.ean.clone(),
                qty: item.units_per_carton,
            });
            next_number += 1;
        }
    }

    boxes
}

/// Total box count, identical to `expand(..).len()`
pub fn total_boxes(line_items: &[LineItem]) -> u32 {
    line_items.iter().map(|i| i.box_count()).sum()
}

/// Content address of the line-item table.
///
/// SHA-256 over every field that feeds the expansion or the rendered slips,
/// in expansion (sorted) order. Two tables that produce the same box list
/// and slip content hash identically; any box-count-affecting edit changes
/// the hash, which is how stale merged documents are detected.
pub fn table_fingerprint(line_items: &[LineItem]) -> String {
    let mut sorted: Vec<&LineItem> = line_items.iter().collect();
    sorted.sort_by(|a, b| a.sku_id.cmp(&b.sku_id));

    let mut hasher = Sha256::new();
    for item in sorted {
        hasher.update(item.sku_id.as_bytes());
        hasher.update([0]);
        hasher.update(item.box_count().to_le_bytes());
        hasher.update(item.units_per_carton.to_le_bytes());
        hasher.update(item.fsn.as_deref().unwrap_or("").as_bytes());
        hasher.update([0]);
        hasher.update(item.ean.as_deref().unwrap_or("").as_bytes());
        hasher.update([0]);
    }
    hex::encode(hasher.finalize())
}
