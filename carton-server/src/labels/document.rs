//! Merged-label document store
//!
//! Persists per-consignment artifacts on disk so scan/print requests never
//! repeat the compositing work:
//!
//! ```text
//! <files_dir>/<consignment id>/
//!     box_labels.pdf      uploaded carrier document
//!     merged_labels.pdf   composited output, one page per box
//!     merged_labels.fp    line-item table fingerprint at build time
//! ```
//!
//! Merged documents are replaced atomically (tempfile + rename) so a
//! crashed build can never leave a truncated document behind.

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CARRIER_FILE: &str = "box_labels.pdf";
const MERGED_FILE: &str = "merged_labels.pdf";
const FINGERPRINT_FILE: &str = "merged_labels.fp";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("No carrier label document uploaded")]
    CarrierMissing,

    #[error("Merged label document has not been built")]
    MergedMissing,

    #[error("Box {box_number} is beyond the document's {pages} pages")]
    PageOutOfRange { box_number: u32, pages: u32 },

    #[error("Failed to persist document: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Filesystem store for carrier and merged label documents
#[derive(Debug, Clone)]
pub struct LabelDocumentStore {
    files_dir: PathBuf,
}

impl LabelDocumentStore {
    /// Create the store, ensuring the base directory exists
    pub fn new(files_dir: impl Into<PathBuf>) -> DocumentResult<Self> {
        let files_dir = files_dir.into();
        std::fs::create_dir_all(&files_dir)?;
        Ok(Self { files_dir })
    }

    fn consignment_dir(&self, consignment_id: &str) -> PathBuf {
        self.files_dir.join(consignment_id)
    }

    fn path(&self, consignment_id: &str, file: &str) -> PathBuf {
        self.consignment_dir(consignment_id).join(file)
    }

    // ========== Carrier document ==========

    /// Store the uploaded carrier document
    pub fn save_carrier(&self, consignment_id: &str, bytes: &[u8]) -> DocumentResult<()> {
        let dir = self.consignment_dir(consignment_id);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(self.path(consignment_id, CARRIER_FILE), bytes)?;
        Ok(())
    }

    pub fn load_carrier(&self, consignment_id: &str) -> DocumentResult<Vec<u8>> {
        read_or(self.path(consignment_id, CARRIER_FILE), DocumentError::CarrierMissing)
    }

    // ========== Merged document ==========

    pub fn has_merged(&self, consignment_id: &str) -> bool {
        self.path(consignment_id, MERGED_FILE).exists()
    }

    /// Atomically replace the merged document and record the line-item
    /// table fingerprint it was built from.
    pub fn store_merged(
        &self,
        consignment_id: &str,
        bytes: &[u8],
        fingerprint: &str,
    ) -> DocumentResult<()> {
        let dir = self.consignment_dir(consignment_id);
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(self.path(consignment_id, MERGED_FILE))?;

        std::fs::write(self.path(consignment_id, FINGERPRINT_FILE), fingerprint)?;
        Ok(())
    }

    pub fn load_merged(&self, consignment_id: &str) -> DocumentResult<Vec<u8>> {
        read_or(self.path(consignment_id, MERGED_FILE), DocumentError::MergedMissing)
    }

    /// Fingerprint recorded when the merged document was built
    pub fn merged_fingerprint(&self, consignment_id: &str) -> Option<String> {
        std::fs::read_to_string(self.path(consignment_id, FINGERPRINT_FILE)).ok()
    }

    /// Page count of the merged document
    pub fn page_count(&self, consignment_id: &str) -> DocumentResult<u32> {
        let bytes = self.load_merged(consignment_id)?;
        let doc = Document::load_mem(&bytes)?;
        Ok(doc.get_pages().len() as u32)
    }

    /// Extract the single page for a 1-based box number.
    ///
    /// Out-of-range numbers return [`DocumentError::PageOutOfRange`], never
    /// a panic past this boundary.
    pub fn extract_page(&self, consignment_id: &str, box_number: u32) -> DocumentResult<Vec<u8>> {
        let bytes = self.load_merged(consignment_id)?;
        let mut doc = Document::load_mem(&bytes)?;

        let pages = doc.get_pages().len() as u32;
        if box_number == 0 || box_number > pages {
            return Err(DocumentError::PageOutOfRange { box_number, pages });
        }

        let others: Vec<u32> = (1..=pages).filter(|n| *n != box_number).collect();
        doc.delete_pages(&others);
        doc.prune_objects();

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }

    /// Drop the merged document and its fingerprint (carrier stays)
    pub fn delete_merged(&self, consignment_id: &str) -> DocumentResult<()> {
        remove_if_exists(&self.path(consignment_id, MERGED_FILE))?;
        remove_if_exists(&self.path(consignment_id, FINGERPRINT_FILE))?;
        Ok(())
    }

    /// Remove every artifact for a consignment
    pub fn delete_all(&self, consignment_id: &str) -> DocumentResult<()> {
        let dir = self.consignment_dir(consignment_id);
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

fn read_or(path: PathBuf, missing: DocumentError) -> DocumentResult<Vec<u8>> {
    if !path.exists() {
        return Err(missing);
    }
    Ok(std::fs::read(path)?)
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::pdf::{DocumentBuilder, Font, PageCanvas};

    fn store() -> (tempfile::TempDir, LabelDocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LabelDocumentStore::new(dir.path().join("files")).unwrap();
        (dir, store)
    }

    fn pdf(pages: usize) -> Vec<u8> {
        let mut builder = DocumentBuilder::new();
        for i in 0..pages {
            let mut canvas = PageCanvas::new();
            canvas.text(Font::Regular, 12.0, 50.0, 700.0, &format!("page {}", i + 1));
            builder.add_page(canvas).unwrap();
        }
        builder.finish().unwrap()
    }

    #[test]
    fn test_merged_roundtrip() {
        let (_dir, store) = store();
        assert!(!store.has_merged("C1"));

        store.store_merged("C1", &pdf(3), "fp-1").unwrap();
        assert!(store.has_merged("C1"));
        assert_eq!(store.page_count("C1").unwrap(), 3);
        assert_eq!(store.merged_fingerprint("C1").as_deref(), Some("fp-1"));
    }

    #[test]
    fn test_rebuild_overwrites() {
        let (_dir, store) = store();
        store.store_merged("C1", &pdf(3), "fp-1").unwrap();
        store.store_merged("C1", &pdf(5), "fp-2").unwrap();
        assert_eq!(store.page_count("C1").unwrap(), 5);
        assert_eq!(store.merged_fingerprint("C1").as_deref(), Some("fp-2"));
    }

    #[test]
    fn test_extract_page_bounds() {
        let (_dir, store) = store();
        store.store_merged("C1", &pdf(3), "fp").unwrap();

        let page = store.extract_page("C1", 2).unwrap();
        assert_eq!(Document::load_mem(&page).unwrap().get_pages().len(), 1);

        assert!(matches!(
            store.extract_page("C1", 0),
            Err(DocumentError::PageOutOfRange { .. })
        ));
        assert!(matches!(
            store.extract_page("C1", 4),
            Err(DocumentError::PageOutOfRange { box_number: 4, pages: 3 })
        ));
    }

    #[test]
    fn test_missing_documents() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load_carrier("nope"),
            Err(DocumentError::CarrierMissing)
        ));
        assert!(matches!(
            store.load_merged("nope"),
            Err(DocumentError::MergedMissing)
        ));
    }

    #[test]
    fn test_delete_merged_keeps_carrier() {
        let (_dir, store) = store();
        store.save_carrier("C1", &pdf(1)).unwrap();
        store.store_merged("C1", &pdf(2), "fp").unwrap();

        store.delete_merged("C1").unwrap();
        assert!(!store.has_merged("C1"));
        assert!(store.merged_fingerprint("C1").is_none());
        assert!(store.load_carrier("C1").is_ok());
    }
}
