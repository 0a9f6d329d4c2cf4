//! Line item model

use serde::{Deserialize, Serialize};

/// One reconciled row of a consignment: a SKU plus the quantities that
/// drive box expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Primary join key (non-empty, pre-trimmed)
    pub sku_id: String,
    pub product_name: String,
    /// Units to ship
    pub editable_qty: u32,
    /// Units packed per carton ("PPCN"); always > 0, coerced at construction
    pub units_per_carton: f64,
    /// editable_qty / units_per_carton, rounded to 2 decimals for display.
    /// The box count used for expansion is the truncated integer part.
    pub editable_boxes: f64,
    /// Alternate product code
    pub fsn: Option<String>,
    /// Barcode, trailing ".0" artifacts stripped
    pub ean: Option<String>,
}

impl LineItem {
    /// Number of physical boxes this item expands to.
    ///
    /// Damaged values collapse to zero boxes rather than failing: a bad row
    /// is a soft error, the rest of the table still expands.
    pub fn box_count(&self) -> u32 {
        if !self.editable_boxes.is_finite() || self.editable_boxes <= 0.0 {
            return 0;
        }
        self.editable_boxes.trunc() as u32
    }

    /// Coerce a raw PPCN value into the invariant form (> 0, default 1)
    pub fn coerce_ppcn(raw: Option<f64>) -> f64 {
        match raw {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(boxes: f64) -> LineItem {
        LineItem {
            sku_id: "SKU-1".into(),
            product_name: "Shoe".into(),
            editable_qty: 10,
            units_per_carton: 5.0,
            editable_boxes: boxes,
            fsn: None,
            ean: None,
        }
    }

    #[test]
    fn test_box_count_truncates() {
        assert_eq!(item(4.0).box_count(), 4);
        assert_eq!(item(4.99).box_count(), 4);
        assert_eq!(item(0.5).box_count(), 0);
    }

    #[test]
    fn test_box_count_damaged_values() {
        assert_eq!(item(-3.0).box_count(), 0);
        assert_eq!(item(f64::NAN).box_count(), 0);
        assert_eq!(item(f64::INFINITY).box_count(), 0);
    }

    #[test]
    fn test_coerce_ppcn() {
        assert_eq!(LineItem::coerce_ppcn(Some(6.0)), 6.0);
        assert_eq!(LineItem::coerce_ppcn(Some(0.0)), 1.0);
        assert_eq!(LineItem::coerce_ppcn(Some(-2.0)), 1.0);
        assert_eq!(LineItem::coerce_ppcn(Some(f64::NAN)), 1.0);
        assert_eq!(LineItem::coerce_ppcn(None), 1.0);
    }
}
