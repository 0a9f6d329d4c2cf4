//! Low-level PDF page construction helpers
//!
//! A small fluent canvas over lopdf content operations plus a document
//! builder that assembles canvases (and optional carrier overlays) into a
//! finished multi-page file. Everything here works in points; use [`MM`]
//! to convert from the millimetre values the layouts are specified in.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Points per millimetre
pub const MM: f32 = 72.0 / 25.4;

/// A4 page size in points
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// Numeric operand helper
#[inline]
pub fn real(v: f32) -> Object {
    Object::Real(v)
}

/// The two fonts every generated page carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Fluent builder for one page's content stream
#[derive(Debug, Default)]
pub struct PageCanvas {
    ops: Vec<Operation>,
}

impl PageCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stroke line width
    pub fn line_width(&mut self, width: f32) -> &mut Self {
        self.ops.push(Operation::new("w", vec![real(width)]));
        self
    }

    /// Stroke a straight line
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.ops.push(Operation::new("m", vec![real(x1), real(y1)]));
        self.ops.push(Operation::new("l", vec![real(x2), real(y2)]));
        self.ops.push(Operation::new("S", vec![]));
        self
    }

    /// Fill a rectangle with a gray level (0 = black, 1 = white)
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, gray: f32) -> &mut Self {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new("g", vec![real(gray)]));
        self.ops
            .push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
        self.ops.push(Operation::new("f", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
        self
    }

    /// Draw text with its baseline origin at (x, y)
    pub fn text(&mut self, font: Font, size: f32, x: f32, y: f32, s: &str) -> &mut Self {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![font.resource_name().into(), real(size)],
        ));
        self.ops.push(Operation::new("Td", vec![real(x), real(y)]));
        self.ops
            .push(Operation::new("Tj", vec![Object::string_literal(s)]));
        self.ops.push(Operation::new("ET", vec![]));
        self
    }

    /// Draw text horizontally centered on `center_x`.
    ///
    /// Helvetica metrics are not embedded here; 0.5 em per glyph is a crude
    /// estimate that centers the short captions these layouts use.
    pub fn text_centered(
        &mut self,
        font: Font,
        size: f32,
        center_x: f32,
        y: f32,
        s: &str,
    ) -> &mut Self {
        let estimated_width = 0.5 * size * s.chars().count() as f32;
        self.text(font, size, center_x - estimated_width / 2.0, y, s)
    }

    pub fn into_content(self) -> Content {
        Content {
            operations: self.ops,
        }
    }
}

/// Assembles canvases into a finished multi-page PDF.
///
/// Each page gets the standard Helvetica font pair; an optional per-page
/// overlay (a Form XObject already added to the document) is painted after
/// the canvas content.
pub struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_regular: ObjectId,
    font_bold: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });

        Self {
            doc,
            pages_id,
            font_regular,
            font_bold,
            page_ids: Vec::new(),
        }
    }

    /// Direct access for callers that import foreign objects (XObjects)
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append a page containing only the canvas content
    pub fn add_page(&mut self, canvas: PageCanvas) -> Result<(), lopdf::Error> {
        self.add_page_with_overlay(canvas, None)
    }

    /// Append a page; if `overlay` is given, its XObject is painted on top
    /// of the canvas content.
    pub fn add_page_with_overlay(
        &mut self,
        canvas: PageCanvas,
        overlay: Option<ObjectId>,
    ) -> Result<(), lopdf::Error> {
        let encoded = canvas.into_content().encode()?;
        let base_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));
        let mut contents: Vec<Object> = vec![base_id.into()];

        let mut resources = dictionary! {
            "Font" => Object::Dictionary(dictionary! {
                "F1" => self.font_regular,
                "F2" => self.font_bold,
            }),
        };

        if let Some(xobject_id) = overlay {
            let paint = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new("Do", vec!["OV0".into()]),
                    Operation::new("Q", vec![]),
                ],
            };
            let paint_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, paint.encode()?));
            contents.push(paint_id.into());

            let mut xobjects = Dictionary::new();
            xobjects.set("OV0", Object::Reference(xobject_id));
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(A4_WIDTH), real(A4_HEIGHT)],
            "Resources" => Object::Dictionary(resources),
            "Contents" => Object::Array(contents),
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Close the page tree and serialize the document
    pub fn finish(mut self) -> Result<Vec<u8>, lopdf::Error> {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let count = self.page_ids.len() as i64;

        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        // Imported carrier graphs drag their own page trees along; drop
        // everything unreachable from the new catalog.
        self.doc.prune_objects();
        self.doc.compress();

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf)?;
        Ok(buf)
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_document() {
        let mut builder = DocumentBuilder::new();
        let mut canvas = PageCanvas::new();
        canvas.text(Font::Bold, 30.0, 100.0, 700.0, "PACKING SLIP");
        canvas.line_width(2.0).line(0.0, 500.0, A4_WIDTH, 500.0);
        builder.add_page(canvas).unwrap();

        let bytes = builder.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_count_matches_added_pages() {
        let mut builder = DocumentBuilder::new();
        for i in 0..5 {
            let mut canvas = PageCanvas::new();
            canvas.text(Font::Regular, 12.0, 50.0, 800.0, &format!("page {}", i));
            builder.add_page(canvas).unwrap();
        }
        assert_eq!(builder.page_count(), 5);

        let bytes = builder.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn test_mm_conversion() {
        assert!((210.0 * MM - A4_WIDTH).abs() < 1.0);
        assert!((297.0 * MM - A4_HEIGHT).abs() < 1.0);
    }
}
