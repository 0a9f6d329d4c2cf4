//! Label Compositing Module
//!
//! Builds the merged label document: a generated packing-slip layout
//! composited with the uploaded carrier label pages, one finished page per
//! box, persisted per consignment.

pub mod compositor;
pub mod document;
pub mod pdf;
pub mod slip;

pub use compositor::{ComposeError, composite};
pub use document::{DocumentError, DocumentResult, LabelDocumentStore};
