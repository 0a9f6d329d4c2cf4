//! Scan & print service - drives the scan-to-print workflow
//!
//! One scan event runs to completion before the next is accepted (the
//! single-operator model): resolve the token, extract the page, submit it
//! to the transport, then durably record the box as printed. Transport
//! failures leave the printed set untouched so rescanning retries the same
//! box; a persistence failure after a successful physical print is reported
//! as a warning, never rolled back.

use crate::labels::{DocumentError, LabelDocumentStore};
use crate::printing::matcher::{self, ScanOutcome};
use crate::printing::session::ScanSession;
use crate::storage::{ConsignmentStorage, StorageError};
use carton_printer::{PrintError, PrintTransport};
use dashmap::DashMap;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Consignment;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrintServiceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Consignment not found: {0}")]
    ConsignmentNotFound(String),

    #[error("Merged label document has not been built")]
    MergedDocumentMissing,

    #[error("Merged label document is stale; rebuild before printing")]
    DocumentStale,

    #[error("Box {0} is beyond the merged document's page count")]
    PageOutOfRange(u32),

    #[error("Document error: {0}")]
    Document(DocumentError),

    #[error("Print transport error: {0}")]
    Transport(#[from] PrintError),
}

impl From<DocumentError> for PrintServiceError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::MergedMissing | DocumentError::CarrierMissing => {
                PrintServiceError::MergedDocumentMissing
            }
            DocumentError::PageOutOfRange { box_number, .. } => {
                PrintServiceError::PageOutOfRange(box_number)
            }
            other => PrintServiceError::Document(other),
        }
    }
}

impl From<PrintServiceError> for AppError {
    fn from(err: PrintServiceError) -> Self {
        match err {
            PrintServiceError::Storage(e) => AppError::database(e.to_string()),
            PrintServiceError::ConsignmentNotFound(id) => {
                AppError::with_message(ErrorCode::ConsignmentNotFound, format!(
                    "Consignment {} not found",
                    id
                ))
            }
            PrintServiceError::MergedDocumentMissing => {
                AppError::new(ErrorCode::MergedDocumentMissing)
            }
            PrintServiceError::DocumentStale => AppError::new(ErrorCode::DocumentStale),
            PrintServiceError::PageOutOfRange(box_number) => {
                AppError::page_out_of_range(box_number)
            }
            PrintServiceError::Document(e) => AppError::internal(e.to_string()),
            PrintServiceError::Transport(e) => AppError::print_failed(e.to_string()),
        }
    }
}

pub type PrintServiceResult<T> = Result<T, PrintServiceError>;

/// Result of processing one scan event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanResult {
    /// The box label was submitted to the printer. `persisted` is false
    /// when the physical print succeeded but recording it durably failed.
    Printed { box_number: u32, persisted: bool },
    /// Every box matching the token is already printed
    AlreadyPrinted,
    /// Nothing matches the token
    NoMatch,
    /// Empty scan input; nothing happened
    Ignored,
}

/// One row of the operator's box table
#[derive(Debug, Clone, Serialize)]
pub struct BoxStatusRow {
    pub box_number: u32,
    pub sku: String,
    pub fsn: Option<String>,
    pub ean: Option<String>,
    pub qty: f64,
    pub printed: bool,
}

/// Scan & print service
///
/// Responsibilities:
/// - Resolve scan tokens to the next unprinted box
/// - Dispatch single pages through the print transport
/// - Durably track printed boxes (exactly-once per box via rescan retry)
/// - Provide manual reprint that bypasses the printed-set exclusion
#[derive(Clone)]
pub struct ScanPrintService {
    storage: ConsignmentStorage,
    documents: Arc<LabelDocumentStore>,
    transport: Arc<dyn PrintTransport>,
    sessions: Arc<DashMap<String, ScanSession>>,
}

impl ScanPrintService {
    pub fn new(
        storage: ConsignmentStorage,
        documents: Arc<LabelDocumentStore>,
        transport: Arc<dyn PrintTransport>,
    ) -> Self {
        Self {
            storage,
            documents,
            transport,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Drop the cached session for a consignment (edits, deletes)
    pub fn invalidate_session(&self, consignment_id: &str) {
        self.sessions.remove(consignment_id);
    }

    /// Get the session for a consignment, rebuilding it when the table
    /// changed underneath it.
    fn session_for(&self, consignment: &Consignment) -> ScanSession {
        if let Some(existing) = self.sessions.get(&consignment.id)
            && existing.matches(consignment)
        {
            return existing.value().clone();
        }

        let session = ScanSession::build(consignment);
        self.sessions
            .insert(consignment.id.clone(), session.clone());
        session
    }

    fn load_consignment(&self, id: &str) -> PrintServiceResult<Consignment> {
        self.storage
            .get_consignment(id)?
            .ok_or_else(|| PrintServiceError::ConsignmentNotFound(id.to_string()))
    }

    /// Ensure the merged document exists and was built from the current
    /// line-item table.
    fn check_document_fresh(&self, id: &str, session: &ScanSession) -> PrintServiceResult<()> {
        if !self.documents.has_merged(id) {
            return Err(PrintServiceError::MergedDocumentMissing);
        }
        match self.documents.merged_fingerprint(id) {
            Some(built) if built == session.fingerprint => Ok(()),
            _ => Err(PrintServiceError::DocumentStale),
        }
    }

    /// Process one scan event: resolve, print, record
    pub async fn process_scan(
        &self,
        consignment_id: &str,
        token: &str,
        target: &str,
    ) -> PrintServiceResult<ScanResult> {
        let mut consignment = self.load_consignment(consignment_id)?;
        let session = self.session_for(&consignment);
        self.check_document_fresh(consignment_id, &session)?;

        let box_number =
            match matcher::resolve(token, &session.boxes, &consignment.printed_boxes) {
                ScanOutcome::Empty => return Ok(ScanResult::Ignored),
                ScanOutcome::NoMatch => {
                    tracing::info!(token = %token.trim(), "scan matched nothing");
                    return Ok(ScanResult::NoMatch);
                }
                ScanOutcome::AlreadyPrinted => {
                    tracing::info!(token = %token.trim(), "all matching boxes already printed");
                    return Ok(ScanResult::AlreadyPrinted);
                }
                ScanOutcome::Match(n) => n,
            };

        let page = self.documents.extract_page(consignment_id, box_number)?;

        // A transport failure propagates here with printed_boxes untouched:
        // the identical rescan resolves to the same box again.
        self.transport.submit(&page, target).await?;

        consignment.printed_boxes.insert(box_number);
        let persisted = match self.storage.put_consignment(&consignment) {
            Ok(()) => true,
            Err(e) => {
                // The page is physically printing; surface the stale-state
                // warning instead of pretending the print didn't happen.
                tracing::warn!(
                    consignment_id = %consignment_id,
                    box_number,
                    error = %e,
                    "printed but state could not be persisted"
                );
                false
            }
        };

        tracing::info!(
            consignment_id = %consignment_id,
            box_number,
            persisted,
            "box label dispatched"
        );

        Ok(ScanResult::Printed {
            box_number,
            persisted,
        })
    }

    /// Manual reprint for an operator-chosen box.
    ///
    /// Bypasses the matcher and does not consult or mutate printed_boxes:
    /// the box is already a member, reprints never double-count.
    pub async fn reprint(
        &self,
        consignment_id: &str,
        box_number: u32,
        target: &str,
    ) -> PrintServiceResult<()> {
        let _ = self.load_consignment(consignment_id)?;

        let page = self.documents.extract_page(consignment_id, box_number)?;
        self.transport.submit(&page, target).await?;

        tracing::info!(consignment_id = %consignment_id, box_number, "box label reprinted");
        Ok(())
    }

    /// The operator's box table: every box with its printed status
    pub fn box_table(&self, consignment_id: &str) -> PrintServiceResult<Vec<BoxStatusRow>> {
        let consignment = self.load_consignment(consignment_id)?;
        let session = self.session_for(&consignment);

        Ok(session
            .boxes
            .iter()
            .map(|b| BoxStatusRow {
                box_number: b.box_number,
                sku: b.sku.clone(),
                fsn: b.fsn.clone(),
                ean: b.ean.clone(),
                qty: b.qty,
                printed: consignment.printed_boxes.contains(&b.box_number),
            })
            .collect())
    }
}

impl std::fmt::Debug for ScanPrintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPrintService")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}
