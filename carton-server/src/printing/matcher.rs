//! Scan matcher
//!
//! Maps a scanned token to the next unprinted box carrying that identifier.

use crate::boxes::BoxRecord;
use std::collections::BTreeSet;

/// Outcome of resolving one scan event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The lowest unprinted box number matching the token
    Match(u32),
    /// The token matched boxes, but every one of them is already printed
    AlreadyPrinted,
    /// The token matched nothing
    NoMatch,
    /// Empty or whitespace-only input; a no-op
    Empty,
}

/// Resolve a scan token against the box list and the printed set.
///
/// A token matches a box when it equals (exact, case-sensitive, trimmed)
/// any of the box's sku, fsn, or ean. Boxes arrive in box-number order, so
/// the first unprinted match realizes "print the next unprinted box of
/// this product".
pub fn resolve(scan: &str, boxes: &[BoxRecord], printed: &BTreeSet<u32>) -> ScanOutcome {
    let token = scan.trim();
    if token.is_empty() {
        return ScanOutcome::Empty;
    }

    let mut saw_match = false;
    for record in boxes {
        let matches = record.sku == token
            || record.fsn.as_deref() == Some(token)
            || record.ean.as_deref() == Some(token);
        if !matches {
            continue;
        }
        if !printed.contains(&record.box_number) {
            return ScanOutcome::Match(record.box_number);
        }
        saw_match = true;
    }

    if saw_match {
        ScanOutcome::AlreadyPrinted
    } else {
        ScanOutcome::NoMatch
    }
}
