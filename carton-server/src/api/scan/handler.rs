//! Scan & print API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

use crate::core::ServerState;
use crate::printing::{BoxStatusRow, ScanResult};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub token: String,
    /// Printer/destination override; defaults to the configured printer
    pub target: Option<String>,
}

/// POST /api/consignments/{id}/scan - resolve a scan and print the box
pub async fn scan(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<ScanRequest>,
) -> AppResult<Json<ScanResult>> {
    let target = request
        .target
        .unwrap_or_else(|| state.config.printer_name.clone());

    let result = state
        .scan_print
        .process_scan(&id, &request.token, &target)
        .await?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ReprintRequest {
    pub box_number: u32,
    pub target: Option<String>,
}

/// POST /api/consignments/{id}/reprint - operator-chosen manual reprint
pub async fn reprint(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<ReprintRequest>,
) -> AppResult<Json<bool>> {
    let target = request
        .target
        .unwrap_or_else(|| state.config.printer_name.clone());

    state
        .scan_print
        .reprint(&id, request.box_number, &target)
        .await?;

    Ok(Json(true))
}

/// GET /api/consignments/{id}/boxes - the operator's box table
pub async fn box_table(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<BoxStatusRow>>> {
    Ok(Json(state.scan_print.box_table(&id)?))
}

#[derive(Debug, Serialize)]
pub struct QueuedPagePayload {
    pub target: String,
    /// Base64-encoded page, loaded into a hidden frame and printed by the
    /// browser client
    pub data: String,
}

/// GET /api/print-queue/next - pop the next staged page (web print mode)
pub async fn next_queued_page(
    State(state): State<ServerState>,
) -> AppResult<Json<Option<QueuedPagePayload>>> {
    let queue = state
        .web_queue
        .as_ref()
        .ok_or_else(|| AppError::invalid_request("Web print mode is not active"))?;

    let payload = queue.take_next().map(|page| QueuedPagePayload {
        target: page.target,
        data: base64::engine::general_purpose::STANDARD.encode(&page.data),
    });

    Ok(Json(payload))
}
