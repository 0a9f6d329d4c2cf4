//! Label compositor
//!
//! Merges the generated packing-slip layout with the uploaded carrier label
//! document: one output page per box, where carrier page `floor(i / 2)` is
//! shared by two consecutive boxes. The carrier page is imported as a Form
//! XObject and translated so its content lands under the correct half of
//! the slip sheet; for the bottom half the XObject BBox additionally clips
//! the carrier to its lower band so the two halves never overlap.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use thiserror::Error;
use tracing::debug;

use super::pdf::{A4_HEIGHT, A4_WIDTH, DocumentBuilder, MM, real};
use super::slip;
use crate::boxes::BoxRecord;

/// Vertical offset nudging carrier content up under the slip block.
/// Tunable alignment constant; anything that keeps the halves legible and
/// non-overlapping works.
const SHIFT_UP: f32 = 25.0 * MM;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// The carrier document could not be parsed; the whole build aborts
    /// with no output (all-or-nothing at the document level).
    #[error("Carrier document unreadable: {0}")]
    CarrierUnreadable(lopdf::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// A zero-page document is not a printable artifact
    #[error("Line items expand to zero boxes")]
    EmptyBoxList,
}

/// Per-carrier-page data captured before the object graph is imported
struct CarrierPage {
    content: Vec<u8>,
    resources: Option<Object>,
    /// [x0, y0, x1, y1]
    media_box: [f32; 4],
}

/// Composite slips and carrier pages into the merged label document.
///
/// `progress` receives a 0..=100 percentage as pages complete.
pub fn composite(
    boxes: &[BoxRecord],
    carrier_pdf: &[u8],
    mut progress: impl FnMut(u8),
) -> Result<Vec<u8>, ComposeError> {
    if boxes.is_empty() {
        return Err(ComposeError::EmptyBoxList);
    }

    let mut carrier = Document::load_mem(carrier_pdf).map_err(ComposeError::CarrierUnreadable)?;
    let mut builder = DocumentBuilder::new();

    // Renumber the carrier's objects past ours and capture what each page
    // needs, then import the whole graph once. XObjects built later can
    // reference imported resources directly.
    carrier.renumber_objects_with(builder.doc_mut().max_id + 1);
    let carrier_page_ids: Vec<ObjectId> = carrier.get_pages().into_values().collect();

    let mut carrier_pages = Vec::with_capacity(carrier_page_ids.len());
    for page_id in &carrier_page_ids {
        carrier_pages.push(CarrierPage {
            content: carrier.get_page_content(*page_id)?,
            resources: inherited_attr(&carrier, *page_id, b"Resources").cloned(),
            media_box: media_box(&carrier, *page_id)
                .unwrap_or([0.0, 0.0, A4_WIDTH, A4_HEIGHT]),
        });
    }

    builder.doc_mut().objects.extend(carrier.objects.clone());
    builder.doc_mut().max_id = carrier.max_id;

    debug!(
        boxes = boxes.len(),
        carrier_pages = carrier_pages.len(),
        "compositing label pages"
    );

    let total = boxes.len();
    for (index, record) in boxes.iter().enumerate() {
        let canvas = slip::render_slip_page(record);

        // Every carrier page serves two consecutive boxes; a short carrier
        // yields slip-only pages for the excess.
        let overlay = match carrier_pages.get(index / 2) {
            Some(page) => Some(carrier_xobject(
                builder.doc_mut(),
                page,
                index % 2 == 0,
            )?),
            None => None,
        };

        builder.add_page_with_overlay(canvas, overlay)?;
        progress((((index + 1) * 100) / total) as u8);
    }

    Ok(builder.finish()?)
}

/// Build the translated (and, for bottom halves, clipped) Form XObject for
/// one carrier page.
fn carrier_xobject(
    doc: &mut Document,
    page: &CarrierPage,
    is_top: bool,
) -> Result<ObjectId, ComposeError> {
    let [x0, y0, x1, y1] = page.media_box;
    let height = y1 - y0;

    let ty = if is_top {
        -(0.65 * height) + SHIFT_UP
    } else {
        -(0.2 * height) + SHIFT_UP
    };

    // BBox clips in form space (pre-Matrix): the bottom half only shows the
    // carrier's lower band so it cannot bleed into the top half.
    let bbox = if is_top {
        [x0, y0, x1, y1]
    } else {
        [x0, y0 + 0.2 * height - SHIFT_UP, x1, y0 + 0.6 * height]
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![real(bbox[0]), real(bbox[1]), real(bbox[2]), real(bbox[3])],
        "Matrix" => vec![
            real(1.0), real(0.0), real(0.0),
            real(1.0), real(0.0), real(ty),
        ],
    };
    if let Some(resources) = &page.resources {
        dict.set("Resources", resources.clone());
    }

    Ok(doc.add_object(Stream::new(dict, page.content.clone())))
}

/// Look up a page attribute, walking Parent links for inheritable entries
fn inherited_attr<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    loop {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }
}

/// Resolve a page's MediaBox (possibly inherited, possibly a reference)
fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let obj = inherited_attr(doc, page_id, b"MediaBox")?;
    let arr = resolve(doc, obj)?.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }

    let mut out = [0.0f32; 4];
    for (slot, value) in out.iter_mut().zip(arr.iter()) {
        *slot = match resolve(doc, value)? {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            _ => return None,
        };
    }
    Some(out)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}
