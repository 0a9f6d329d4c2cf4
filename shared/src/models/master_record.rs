//! Master data record

use serde::{Deserialize, Serialize};

/// One product master row, keyed by SKU. Populated by the master data sync
/// and consulted at reconciliation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    pub sku: String,
    pub product_name: String,
    /// Units packed per carton; > 0, coerced during sync
    pub units_per_carton: f64,
    pub ean: Option<String>,
    pub fsn: Option<String>,
}
