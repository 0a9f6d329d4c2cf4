//! Label-data export generator
//!
//! Feeds the downstream barcode-label tool: one row per line item with the
//! master identifiers and the shipped quantity. EAN values in this file
//! must carry no spreadsheet ".0" artifact; the barcode tool encodes them
//! verbatim.

use super::{GeneratorError, finish_csv};
use crate::reconcile::strip_ean_artifact;
use shared::models::Consignment;

pub fn generate(consignment: &Consignment) -> Result<Vec<u8>, GeneratorError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["SKU", "Product Name", "PPCN", "FSN", "EAN", "QTY"])?;

    for item in &consignment.line_items {
        writer.write_record([
            item.sku_id.clone(),
            item.product_name.clone(),
            format_ppcn(item.units_per_carton),
            item.fsn.clone().unwrap_or_default(),
            item.ean.as_deref().map(strip_ean_artifact).unwrap_or_default(),
            item.editable_qty.to_string(),
        ])?;
    }

    finish_csv(writer)
}

fn format_ppcn(ppcn: f64) -> String {
    if ppcn.fract() == 0.0 {
        format!("{}", ppcn as i64)
    } else {
        format!("{}", ppcn)
    }
}
