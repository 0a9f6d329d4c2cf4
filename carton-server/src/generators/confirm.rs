//! Confirmation CSV generator
//!
//! One row per physical box for the channel's consignment-confirmation
//! upload. Box numbers come from the shared expander, so they are exactly
//! the numbers printed on the labels.

use super::{GeneratorError, finish_csv};
use crate::boxes;
use shared::models::Consignment;

// Standard carton dimensions declared on every confirmation row
const LENGTH_CM: u32 = 75;
const BREADTH_CM: u32 = 55;
const HEIGHT_CM: u32 = 40;
const WEIGHT_KG: u32 = 10;
/// Declared value per unit (INR)
const NOMINAL_VALUE_PER_UNIT: f64 = 350.0;

pub fn generate(consignment: &Consignment) -> Result<Vec<u8>, GeneratorError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "BOX NUMBER",
        "BOX NAME",
        "LENGTH (cm)",
        "BREADTH (cm)",
        "HEIGHT (cm)",
        "WEIGHT (kg)",
        "NOMINAL VALUE (INR)",
        "FSN",
        "QUANTITY",
    ])?;

    for record in boxes::expand(&consignment.line_items) {
        let qty = record.qty.trunc().max(0.0) as u64;
        let nominal = (NOMINAL_VALUE_PER_UNIT * qty as f64) as u64;
        writer.write_record([
            record.box_number.to_string(),
            record.box_number.to_string(),
            LENGTH_CM.to_string(),
            BREADTH_CM.to_string(),
            HEIGHT_CM.to_string(),
            WEIGHT_KG.to_string(),
            nominal.to_string(),
            record.fsn.clone().unwrap_or_default(),
            qty.to_string(),
        ])?;
    }

    finish_csv(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Address, Channel, LineItem};
    use std::collections::BTreeSet;

    fn consignment() -> Consignment {
        Consignment {
            id: "C1".into(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            channel: Channel::Flipkart,
            line_items: vec![
                LineItem {
                    sku_id: "A".into(),
                    product_name: "Shoe A".into(),
                    editable_qty: 20,
                    units_per_carton: 5.0,
                    editable_boxes: 4.0,
                    fsn: Some("FSN-A".into()),
                    ean: None,
                },
                LineItem {
                    sku_id: "B".into(),
                    product_name: "Shoe B".into(),
                    editable_qty: 9,
                    units_per_carton: 3.0,
                    editable_boxes: 3.0,
                    fsn: None,
                    ean: None,
                },
            ],
            original_csv: String::new(),
            sender: Address::default(),
            receiver: Address::default(),
            printed_boxes: BTreeSet::new(),
            created_at: 0,
        }
    }

    #[test]
    fn test_one_row_per_box() {
        let bytes = generate(&consignment()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // header + 7 boxes
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("BOX NUMBER,BOX NAME"));

        // box 1 is an A box: qty 5, nominal 5 * 350
        assert_eq!(lines[1], "1,1,75,55,40,10,1750,FSN-A,5");
        // box 5 is the first B box: qty 3, nominal 1050, blank FSN
        assert_eq!(lines[5], "5,5,75,55,40,10,1050,,3");
    }
}
