//! Consignment model

use super::address::Address;
use super::line_item::LineItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sales channel a consignment ships through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Flipkart,
    Amazon,
    Myntra,
}

impl Channel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::Flipkart => "Flipkart",
            Channel::Amazon => "Amazon",
            Channel::Myntra => "Myntra",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Flipkart" => Ok(Channel::Flipkart),
            "Amazon" => Ok(Channel::Amazon),
            "Myntra" => Ok(Channel::Myntra),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

/// A consignment: one uploaded shipment file, reconciled against master
/// data, plus the durable print workflow state.
///
/// `id` is globally unique and immutable once created. Deletion is a hard
/// delete. `printed_boxes` grows monotonically through the scan workflow
/// and must round-trip exactly through save/load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consignment {
    pub id: String,
    /// Pickup date (ISO yyyy-mm-dd)
    pub date: chrono::NaiveDate,
    pub channel: Channel,
    pub line_items: Vec<LineItem>,
    /// Unmodified copy of the uploaded CSV, kept for audit/download
    #[serde(default)]
    pub original_csv: String,
    pub sender: Address,
    pub receiver: Address,
    /// Box numbers already dispatched to the printer
    #[serde(default)]
    pub printed_boxes: BTreeSet<u32>,
    /// Unix timestamp
    pub created_at: i64,
}

impl Consignment {
    /// Total units across all line items
    pub fn total_qty(&self) -> u64 {
        self.line_items.iter().map(|i| i.editable_qty as u64).sum()
    }

    /// Total physical boxes, identical to the count the box expander emits
    pub fn total_boxes(&self) -> u32 {
        self.line_items.iter().map(|i| i.box_count()).sum()
    }

    pub fn summary(&self) -> ConsignmentSummary {
        ConsignmentSummary {
            id: self.id.clone(),
            date: self.date,
            channel: self.channel,
            total_qty: self.total_qty(),
            total_boxes: self.total_boxes(),
            printed_boxes: self.printed_boxes.len() as u32,
        }
    }
}

/// Lightweight listing row for a consignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsignmentSummary {
    pub id: String,
    pub date: chrono::NaiveDate,
    pub channel: Channel,
    pub total_qty: u64,
    pub total_boxes: u32,
    pub printed_boxes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consignment() -> Consignment {
        Consignment {
            id: "CON-1".into(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            channel: Channel::Flipkart,
            line_items: vec![
                LineItem {
                    sku_id: "A".into(),
                    product_name: "Shoe A".into(),
                    editable_qty: 20,
                    units_per_carton: 5.0,
                    editable_boxes: 4.0,
                    fsn: None,
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
    fn test_totals() {
        let c = consignment();
        assert_eq!(c.total_qty(), 29);
        assert_eq!(c.total_boxes(), 7);
    }

    #[test]
    fn test_printed_boxes_roundtrip() {
        let mut c = consignment();
        c.printed_boxes.insert(3);
        c.printed_boxes.insert(7);

        let json = serde_json::to_string(&c).unwrap();
        let back: Consignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.printed_boxes, c.printed_boxes);
    }

    #[test]
    fn test_printed_boxes_defaults_empty() {
        // Records written before the scan workflow existed have no field.
        let mut json: serde_json::Value =
            serde_json::to_value(consignment()).unwrap();
        json.as_object_mut().unwrap().remove("printed_boxes");
        let back: Consignment = serde_json::from_value(json).unwrap();
        assert!(back.printed_boxes.is_empty());
    }
}
