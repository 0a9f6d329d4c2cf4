//! Document API Handlers
//!
//! Carrier upload triggers the merged-document build; the download routes
//! serve the merged labels plus the stateless generator outputs.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Consignment;

use crate::boxes;
use crate::core::ServerState;
use crate::generators;
use crate::labels;

#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub pages: u32,
}

/// POST /api/consignments/{id}/carrier - upload carrier labels and build
/// the merged document
///
/// The build is idempotent: re-uploading replaces the carrier and rebuilds
/// the merged document from the current line-item table.
pub async fn upload_carrier(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<BuildResponse>> {
    let consignment = load(&state, &id)?;

    let mut pdf_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_request(e.to_string()))?;
            pdf_bytes = Some(bytes.to_vec());
        }
    }

    let pdf_bytes = pdf_bytes.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    if pdf_bytes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if !pdf_bytes.starts_with(b"%PDF") {
        return Err(AppError::new(ErrorCode::UnsupportedFileFormat));
    }

    state
        .documents
        .save_carrier(&id, &pdf_bytes)
        .map_err(|e| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()))?;

    let pages = build_merged(&state, &consignment, &pdf_bytes)?;
    Ok(Json(BuildResponse { pages }))
}

/// POST /api/consignments/{id}/documents/rebuild - rebuild the merged
/// document from the stored carrier
///
/// This is the recovery path after a quantity edit invalidated the merged
/// document: the carrier is still on disk, only the compositing reruns
/// against the current line-item table.
pub async fn rebuild(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BuildResponse>> {
    let consignment = load(&state, &id)?;

    let carrier = state.documents.load_carrier(&id).map_err(|e| match e {
        labels::DocumentError::CarrierMissing => AppError::new(ErrorCode::CarrierDocumentMissing),
        other => AppError::internal(other.to_string()),
    })?;

    let pages = build_merged(&state, &consignment, &carrier)?;
    Ok(Json(BuildResponse { pages }))
}

/// Composite and persist the merged document for the consignment's current
/// line-item table.
fn build_merged(
    state: &ServerState,
    consignment: &Consignment,
    carrier: &[u8],
) -> AppResult<u32> {
    let box_list = boxes::expand(&consignment.line_items);
    if box_list.is_empty() {
        return Err(AppError::new(ErrorCode::ConsignmentEmpty));
    }

    // Batch compositing over potentially hundreds of boxes; surface
    // progress in the log at coarse steps.
    let id = consignment.id.as_str();
    let mut last_logged = 0u8;
    let merged = labels::composite(&box_list, carrier, |pct| {
        if pct >= last_logged + 20 || pct == 100 {
            last_logged = pct;
            tracing::info!(consignment_id = %id, pct, "compositing merged labels");
        }
    })
    .map_err(compose_error)?;

    let fingerprint = boxes::table_fingerprint(&consignment.line_items);
    state
        .documents
        .store_merged(id, &merged, &fingerprint)
        .map_err(|e| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()))?;

    let pages = box_list.len() as u32;
    tracing::info!(consignment_id = %id, pages, "merged label document built");
    Ok(pages)
}

/// GET /api/consignments/{id}/documents/{kind}
///
/// Kinds: `merged` (label PDF), `manifest` (data PDF), `confirm` (box CSV),
/// `label-data` (barcode-tool CSV), `original` (uploaded CSV, verbatim).
pub async fn download(
    State(state): State<ServerState>,
    Path((id, kind)): Path<(String, String)>,
) -> AppResult<axum::response::Response> {
    let consignment = load(&state, &id)?;

    let (bytes, content_type, filename) = match kind.as_str() {
        "merged" => {
            let bytes = state.documents.load_merged(&id).map_err(|e| match e {
                labels::DocumentError::MergedMissing => {
                    AppError::new(ErrorCode::MergedDocumentMissing)
                }
                other => AppError::internal(other.to_string()),
            })?;
            (bytes, "application/pdf", format!("Merged_{}.pdf", id))
        }
        "manifest" => (
            generators::manifest::generate(&consignment)?,
            "application/pdf",
            format!("Data_{}.pdf", id),
        ),
        "confirm" => (
            generators::confirm::generate(&consignment)?,
            "text/csv",
            format!("Confirm_{}.csv", id),
        ),
        "label-data" => (
            generators::label_data::generate(&consignment)?,
            "text/csv",
            format!("LabelData_{}.csv", id),
        ),
        "original" => (
            consignment.original_csv.clone().into_bytes(),
            "text/csv",
            format!("{}.csv", id),
        ),
        other => {
            return Err(AppError::invalid_request(format!(
                "Unknown document kind: {}",
                other
            )));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn load(state: &ServerState, id: &str) -> AppResult<Consignment> {
    state
        .storage
        .get_consignment(id)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ConsignmentNotFound,
                format!("Consignment {} not found", id),
            )
        })
}

fn compose_error(err: labels::ComposeError) -> AppError {
    match err {
        labels::ComposeError::CarrierUnreadable(e) => AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Carrier document unreadable: {}", e),
        ),
        labels::ComposeError::EmptyBoxList => AppError::new(ErrorCode::ConsignmentEmpty),
        labels::ComposeError::Pdf(e) => {
            AppError::with_message(ErrorCode::DocumentRenderFailed, e.to_string())
        }
    }
}
