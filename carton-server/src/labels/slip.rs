//! Packing slip page layout
//!
//! One A4 page per box, carrying the slip block twice: the physical sheet
//! holds two slips and is cut in half, so the same box is described on the
//! top and bottom halves. Geometry is in millimetres, converted at draw
//! time.

use super::pdf::{A4_HEIGHT, A4_WIDTH, Font, MM, PageCanvas};
use crate::boxes::BoxRecord;

/// Render the full slip page (both halves plus cut rules) for one box
pub fn render_slip_page(record: &BoxRecord) -> PageCanvas {
    let mut canvas = PageCanvas::new();

    draw_slip(&mut canvas, record, 240.0 * MM);
    canvas.line_width(2.0);
    canvas.line(0.0, 210.0 * MM, A4_WIDTH, 210.0 * MM);

    draw_slip(&mut canvas, record, 155.0 * MM);
    canvas.line_width(1.0);
    canvas.line(0.0, A4_HEIGHT / 2.0, A4_WIDTH, A4_HEIGHT / 2.0);

    canvas
}

/// Draw one slip block anchored at `y_base`
fn draw_slip(canvas: &mut PageCanvas, record: &BoxRecord, y_base: f32) {
    canvas.text_centered(
        Font::Bold,
        30.0,
        A4_WIDTH / 2.0,
        y_base + 45.0 * MM,
        "PACKING SLIP",
    );

    let y_data = draw_grid(canvas, record, y_base + 32.0 * MM);

    let caption = format!(
        "BOX NO.- {}         BOX NAME- {}",
        record.box_number, record.box_number
    );
    canvas.text_centered(Font::Bold, 30.0, A4_WIDTH / 2.0, y_data - 5.0 * MM, &caption);
}

/// Draw the bordered 4-column grid; returns the data row's baseline y
fn draw_grid(canvas: &mut PageCanvas, record: &BoxRecord, y_header: f32) -> f32 {
    let row_h = 10.0 * MM;
    let y_h = y_header;
    let y_d = y_header - row_h;

    let x = 10.0 * MM;
    let x1 = 30.0 * MM;
    let x2 = 85.0 * MM;
    let x3 = 175.0 * MM;
    let xe = A4_WIDTH - 10.0 * MM;

    canvas.line_width(1.0);
    canvas.line(x, y_h + row_h, xe, y_h + row_h);
    canvas.line(x, y_h, xe, y_h);
    canvas.line(x, y_d, xe, y_d);
    for vx in [x, x1, x2, x3, xe] {
        canvas.line(vx, y_d, vx, y_h + row_h);
    }

    canvas.text(Font::Bold, 12.0, x + 2.0 * MM, y_h + 3.0 * MM, "SR NO.");
    canvas.text(Font::Bold, 12.0, x1 + 2.0 * MM, y_h + 3.0 * MM, "FSN");
    canvas.text(Font::Bold, 12.0, x2 + 2.0 * MM, y_h + 3.0 * MM, "SKU ID");
    canvas.text(Font::Bold, 12.0, x3 + 2.0 * MM, y_h + 3.0 * MM, "QTY");

    canvas.text(Font::Regular, 12.0, x + 2.0 * MM, y_d + 3.0 * MM, "1.");
    canvas.text(
        Font::Regular,
        12.0,
        x1 + 2.0 * MM,
        y_d + 3.0 * MM,
        record.fsn.as_deref().unwrap_or(""),
    );
    canvas.text(
        Font::Regular,
        12.0,
        x2 + 2.0 * MM,
        y_d + 3.0 * MM,
        &truncate_chars(&record.sku, 35),
    );
    canvas.text(
        Font::Bold,
        14.0,
        x3 + 2.0 * MM,
        y_d + 3.0 * MM,
        &format_qty(record.qty),
    );

    y_d
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Best-effort integer rendering; damaged quantities print as 0 rather
/// than aborting the batch.
fn format_qty(qty: f64) -> String {
    if qty.is_finite() && qty > 0.0 {
        format!("{}", qty.trunc() as i64)
    } else {
        "0".to_string()
    }
}
