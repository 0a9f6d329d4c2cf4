//! Scan session
//!
//! Per-consignment working state for the scan-to-print workflow: the
//! expanded box list plus the fingerprint of the table it came from.
//! Sessions exist so repeated scans don't re-expand the table, but they are
//! always validated against the current table hash before use; an edit
//! invalidates the session rather than silently serving stale box numbers.

use crate::boxes::{self, BoxRecord};
use shared::models::Consignment;

/// Cached expansion of one consignment's line-item table
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub boxes: Vec<BoxRecord>,
    pub fingerprint: String,
}

impl ScanSession {
    /// Expand the consignment's table and stamp it with its content hash
    pub fn build(consignment: &Consignment) -> Self {
        Self {
            boxes: boxes::expand(&consignment.line_items),
            fingerprint: boxes::table_fingerprint(&consignment.line_items),
        }
    }

    /// Does this session still describe the given table?
    pub fn matches(&self, consignment: &Consignment) -> bool {
        self.fingerprint == boxes::table_fingerprint(&consignment.line_items)
    }
}
