//! Manifest PDF generator
//!
//! The consignment data sheet: header block plus an SKU / quantity / box
//! grid with a totals row, paginated.

use super::GeneratorError;
use crate::labels::pdf::{A4_HEIGHT, DocumentBuilder, Font, MM, PageCanvas};
use shared::models::Consignment;

const ROWS_PER_PAGE: usize = 40;
const ROW_HEIGHT: f32 = 7.0 * MM;

// Column x positions (left edges; the table spans 10mm..180mm)
const X_LEFT: f32 = 10.0 * MM;
const X_QTY: f32 = 120.0 * MM;
const X_BOX: f32 = 150.0 * MM;
const X_RIGHT: f32 = 180.0 * MM;

pub fn generate(consignment: &Consignment) -> Result<Vec<u8>, GeneratorError> {
    let mut items = consignment.line_items.clone();
    items.sort_by(|a, b| a.sku_id.cmp(&b.sku_id));

    let total_qty: u64 = items.iter().map(|i| i.editable_qty as u64).sum();
    let total_boxes: u32 = items.iter().map(|i| i.box_count()).sum();

    struct Row {
        sku: String,
        qty: String,
        boxes: String,
        bold: bool,
    }

    let mut rows: Vec<Row> = items
        .iter()
        .map(|i| Row {
            sku: i.sku_id.clone(),
            qty: i.editable_qty.to_string(),
            boxes: i.box_count().to_string(),
            bold: false,
        })
        .collect();
    rows.push(Row {
        sku: "TOTAL".to_string(),
        qty: total_qty.to_string(),
        boxes: total_boxes.to_string(),
        bold: true,
    });

    let mut builder = DocumentBuilder::new();

    for (page_index, chunk) in rows.chunks(ROWS_PER_PAGE).enumerate() {
        let mut canvas = PageCanvas::new();
        let mut y = A4_HEIGHT - 20.0 * MM;

        if page_index == 0 {
            canvas.text(
                Font::Bold,
                16.0,
                X_LEFT,
                y,
                &format!("Consignment ID: {}", consignment.id),
            );
            y -= 8.0 * MM;
            canvas.text(
                Font::Regular,
                11.0,
                X_LEFT,
                y,
                &format!("Pickup Date: {}", consignment.date),
            );
            y -= 4.0 * MM;
            canvas.text(
                Font::Regular,
                11.0,
                X_LEFT,
                y,
                &format!("Channel: {}", consignment.channel),
            );
            y -= 10.0 * MM;
        }

        // Header row, shaded
        canvas.fill_rect(X_LEFT, y - 2.0 * MM, X_RIGHT - X_LEFT, ROW_HEIGHT, 0.85);
        canvas.text(Font::Bold, 11.0, X_LEFT + 2.0 * MM, y, "SKU");
        canvas.text(Font::Bold, 11.0, X_QTY + 2.0 * MM, y, "QTY");
        canvas.text(Font::Bold, 11.0, X_BOX + 2.0 * MM, y, "No. of Box");
        draw_row_grid(&mut canvas, y);
        y -= ROW_HEIGHT;

        for row in chunk {
            let font = if row.bold { Font::Bold } else { Font::Regular };
            canvas.text(font, 10.0, X_LEFT + 2.0 * MM, y, &row.sku);
            canvas.text(font, 10.0, X_QTY + 2.0 * MM, y, &row.qty);
            canvas.text(font, 10.0, X_BOX + 2.0 * MM, y, &row.boxes);
            draw_row_grid(&mut canvas, y);
            y -= ROW_HEIGHT;
        }

        builder.add_page(canvas)?;
    }

    Ok(builder.finish()?)
}

fn draw_row_grid(canvas: &mut PageCanvas, baseline: f32) {
    let top = baseline + ROW_HEIGHT - 2.0 * MM;
    let bottom = baseline - 2.0 * MM;

    canvas.line_width(0.75);
    canvas.line(X_LEFT, top, X_RIGHT, top);
    canvas.line(X_LEFT, bottom, X_RIGHT, bottom);
    for x in [X_LEFT, X_QTY, X_BOX, X_RIGHT] {
        canvas.line(x, bottom, x, top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Address, Channel, LineItem};
    use std::collections::BTreeSet;

    fn consignment(items: usize) -> Consignment {
        Consignment {
            id: "C1".into(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            channel: Channel::Amazon,
            line_items: (0..items)
                .map(|i| LineItem {
                    sku_id: format!("SKU-{:03}", i),
                    product_name: format!("Product {}", i),
                    editable_qty: 10,
                    units_per_carton: 5.0,
                    editable_boxes: 2.0,
                    fsn: None,
                    ean: None,
                })
                .collect(),
            original_csv: String::new(),
            sender: Address::default(),
            receiver: Address::default(),
            printed_boxes: BTreeSet::new(),
            created_at: 0,
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_single_page_manifest() {
        let bytes = generate(&consignment(10)).unwrap();
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_manifest_paginates() {
        // 90 rows + totals split across 40-row pages
        let bytes = generate(&consignment(90)).unwrap();
        assert_eq!(page_count(&bytes), 3);
    }
}
